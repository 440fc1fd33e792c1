// Shared fixtures for the rig-core integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use glam::Vec3;
use rig_core::{CableHandle, CablePath, Device, Scene};

pub fn mixer_at(x: f32) -> Device {
    Device::place("djm-900", "DJM-900NXS2", "mixer", Vec3::new(x, 1.0, 0.0))
        .with_inputs(["Line In", "Line In", "Line In", "Line In"])
        .with_outputs(["Master Out"])
}

pub fn mixer() -> Device {
    mixer_at(0.0)
}

/// Mixer with a send/return loop on top of four line inputs.
pub fn fx_mixer() -> Device {
    Device::place("djm-900", "DJM-900NXS2", "mixer", Vec3::new(0.0, 1.0, 0.0))
        .with_inputs(["Line In", "Line In", "Line In", "Line In", "Return In"])
        .with_outputs(["Master Out", "Send Out"])
}

pub fn cdj(name: &str, x: f32) -> Device {
    Device::place("cdj-3000", name, "player", Vec3::new(x, 1.0, 0.0)).with_outputs(["Line Out"])
}

pub fn fx_unit(x: f32) -> Device {
    Device::place("rmx-1000", "RMX-1000", "fx", Vec3::new(x, 1.0, -0.5))
        .with_inputs(["Send In"])
        .with_outputs(["Return Out"])
}

pub fn speaker(x: f32, z: f32) -> Device {
    Device::place("hs8", "HS8 Speaker", "speaker", Vec3::new(x, 1.0, z))
}

/// Scene double that records every call.
#[derive(Default)]
pub struct RecordingScene {
    next: u32,
    pub live: BTreeMap<u32, CablePath>,
    pub draws: usize,
    pub removes: usize,
    pub updates: usize,
}

impl Scene for RecordingScene {
    fn draw_cable(&mut self, path: &CablePath, _color: [f32; 3]) -> CableHandle {
        self.next += 1;
        self.draws += 1;
        self.live.insert(self.next, path.clone());
        CableHandle(self.next)
    }

    fn remove_cable(&mut self, handle: CableHandle) {
        self.removes += 1;
        assert!(
            self.live.remove(&handle.0).is_some(),
            "removed unknown cable handle {}",
            handle.0
        );
    }

    fn update_cable_path(&mut self, handle: CableHandle, path: &CablePath) {
        self.updates += 1;
        assert!(self.live.contains_key(&handle.0), "updated unknown cable handle");
        self.live.insert(handle.0, path.clone());
    }
}

pub fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}
