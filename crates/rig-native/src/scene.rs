use std::collections::BTreeMap;

use rig_core::{CableHandle, CablePath, Scene};

/// In-memory scene: keeps the latest path per handle and logs every call.
#[derive(Default)]
pub struct MemoryScene {
    next: u32,
    pub cables: BTreeMap<u32, (CablePath, [f32; 3])>,
}

impl Scene for MemoryScene {
    fn draw_cable(&mut self, path: &CablePath, color: [f32; 3]) -> CableHandle {
        self.next += 1;
        log::debug!(
            "[scene] draw #{} ({} points, arch {:.3})",
            self.next,
            path.points.len(),
            path.arch_height
        );
        self.cables.insert(self.next, (path.clone(), color));
        CableHandle(self.next)
    }

    fn remove_cable(&mut self, handle: CableHandle) {
        if self.cables.remove(&handle.0).is_none() {
            log::warn!("[scene] remove of unknown cable #{}", handle.0);
        }
    }

    fn update_cable_path(&mut self, handle: CableHandle, path: &CablePath) {
        match self.cables.get_mut(&handle.0) {
            Some(entry) => entry.0 = path.clone(),
            None => log::warn!("[scene] update of unknown cable #{}", handle.0),
        }
    }
}
