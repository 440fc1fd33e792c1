//! Keyed diff between synthesized connections and the cables already drawn.
//!
//! A cable whose key survives a pass keeps its geometry unless one of its
//! endpoints moved. New keys are drawn, vanished keys removed, and a kept key
//! whose kind changed is redrawn.

use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec3;

use crate::cable::{cable_color, draw, line_ordinals, CablePath};
use crate::connection::{Connection, ConnectionKey, ConnectionKind};
use crate::params::RoutingParams;

/// Opaque id the scene hands back for a drawn cable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CableHandle(pub u32);

/// The rendering collaborator. Implementations place primitives only; all
/// geometry is computed on this side.
pub trait Scene {
    fn draw_cable(&mut self, path: &CablePath, color: [f32; 3]) -> CableHandle;
    fn remove_cable(&mut self, handle: CableHandle);
    fn update_cable_path(&mut self, handle: CableHandle, path: &CablePath);
}

/// A cable currently present in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedCable {
    pub key: ConnectionKey,
    pub handle: CableHandle,
    pub kind: ConnectionKind,
    pub start: Vec3,
    pub end: Vec3,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CableDiff {
    pub to_add: Vec<Connection>,
    pub to_remove: Vec<ConnectionKey>,
    /// Kept keys whose endpoints moved.
    pub to_update: Vec<Connection>,
}

impl CableDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.to_update.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyCounts {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
}

/// Compare `connections` against `existing` by key.
pub fn diff(connections: &[Connection], existing: &[RenderedCable], epsilon: f32) -> CableDiff {
    let live: FnvHashMap<&ConnectionKey, &RenderedCable> =
        existing.iter().map(|c| (&c.key, c)).collect();
    let wanted: FnvHashSet<ConnectionKey> = connections.iter().map(Connection::key).collect();

    let mut out = CableDiff {
        to_remove: existing
            .iter()
            .filter(|c| !wanted.contains(&c.key))
            .map(|c| c.key.clone())
            .collect(),
        ..CableDiff::default()
    };
    for connection in connections {
        match live.get(&connection.key()) {
            None => out.to_add.push(connection.clone()),
            // color is fixed at draw time, so a new kind means a new cable
            Some(cable) if cable.kind != connection.kind => {
                out.to_remove.push(cable.key.clone());
                out.to_add.push(connection.clone());
            }
            Some(cable) => {
                let moved = cable.start.distance(connection.start) > epsilon
                    || cable.end.distance(connection.end) > epsilon;
                if moved {
                    out.to_update.push(connection.clone());
                }
            }
        }
    }
    out
}

/// Push `plan` into the scene and bring `cables` in line with it.
///
/// `connections` is the full synthesized set the plan was computed from; it
/// decides the per-pair arch ordinals of new and moved cables.
pub fn apply<S: Scene>(
    scene: &mut S,
    cables: &mut Vec<RenderedCable>,
    connections: &[Connection],
    plan: &CableDiff,
    params: &RoutingParams,
) -> ApplyCounts {
    let mut counts = ApplyCounts::default();

    if !plan.to_remove.is_empty() {
        let gone: FnvHashSet<&ConnectionKey> = plan.to_remove.iter().collect();
        cables.retain(|c| {
            if gone.contains(&c.key) {
                scene.remove_cable(c.handle);
                counts.removed += 1;
                false
            } else {
                true
            }
        });
    }

    if plan.to_add.is_empty() && plan.to_update.is_empty() {
        return counts;
    }
    let ordinals: FnvHashMap<ConnectionKey, usize> = connections
        .iter()
        .map(Connection::key)
        .zip(line_ordinals(connections))
        .collect();
    let ordinal_of = |c: &Connection| ordinals.get(&c.key()).copied().unwrap_or(0);

    for connection in &plan.to_update {
        let key = connection.key();
        if let Some(cable) = cables.iter_mut().find(|c| c.key == key) {
            let path = draw(connection, ordinal_of(connection), params);
            scene.update_cable_path(cable.handle, &path);
            cable.start = path.start;
            cable.end = path.end;
            counts.updated += 1;
        }
    }

    for connection in &plan.to_add {
        let path = draw(connection, ordinal_of(connection), params);
        let handle = scene.draw_cable(&path, cable_color(connection.kind));
        cables.push(RenderedCable {
            key: connection.key(),
            handle,
            kind: connection.kind,
            start: path.start,
            end: path.end,
        });
        counts.added += 1;
    }
    counts
}
