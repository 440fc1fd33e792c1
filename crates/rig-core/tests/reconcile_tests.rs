mod common;

use common::*;
use glam::Vec3;
use rig_core::reconcile::{apply, diff};
use rig_core::{synthesize, CableHandle, Connection, ConnectionKind, RenderedCable, RoutingParams};

fn rendered(connections: &[Connection]) -> Vec<RenderedCable> {
    connections
        .iter()
        .enumerate()
        .map(|(i, c)| RenderedCable {
            key: c.key(),
            handle: CableHandle(i as u32 + 100),
            kind: c.kind,
            start: c.start,
            end: c.end,
        })
        .collect()
}

fn setup() -> Vec<Connection> {
    let devices = vec![fx_mixer(), cdj("CDJ-A", -1.0), cdj("CDJ-B", 1.0), fx_unit(2.0)];
    synthesize(&devices, &RoutingParams::default()).connections
}

#[test]
fn fresh_scene_adds_everything() {
    let connections = setup();
    let plan = diff(&connections, &[], 1e-4);
    assert_eq!(plan.to_add.len(), 4);
    assert!(plan.to_remove.is_empty());
    assert!(plan.to_update.is_empty());
}

#[test]
fn unchanged_set_is_empty() {
    let connections = setup();
    let existing = rendered(&connections);
    assert!(diff(&connections, &existing, 1e-4).is_empty());
}

#[test]
fn vanished_keys_are_removed() {
    let connections = setup();
    let existing = rendered(&connections);
    let plan = diff(&connections[..2], &existing, 1e-4);
    assert!(plan.to_add.is_empty());
    assert_eq!(plan.to_remove, vec![existing[2].key.clone(), existing[3].key.clone()]);
}

#[test]
fn only_moved_endpoints_update() {
    let connections = setup();
    let mut existing = rendered(&connections);
    existing[0].start += Vec3::new(0.5, 0.0, 0.0);
    existing[1].end += Vec3::splat(1e-6);

    let plan = diff(&connections, &existing, 1e-4);
    assert_eq!(plan.to_update.len(), 1);
    assert_eq!(plan.to_update[0].key(), existing[0].key);
    assert!(plan.to_add.is_empty() && plan.to_remove.is_empty());
}

#[test]
fn apply_keeps_handles_of_kept_cables() {
    let connections = setup();
    let params = RoutingParams::default();
    let mut scene = RecordingScene::default();
    let mut cables: Vec<RenderedCable> = Vec::new();

    let plan = diff(&connections, &cables, params.endpoint_epsilon);
    let counts = apply(&mut scene, &mut cables, &connections, &plan, &params);
    assert_eq!(counts.added, 4);
    let kept = cables[0].handle;

    let fewer = &connections[..3];
    let plan = diff(fewer, &cables, params.endpoint_epsilon);
    let counts = apply(&mut scene, &mut cables, fewer, &plan, &params);
    assert_eq!((counts.added, counts.removed, counts.updated), (0, 1, 0));
    assert_eq!(cables.len(), 3);
    assert_eq!(cables[0].handle, kept);
    assert_eq!(scene.live.len(), 3);
    assert_eq!(scene.live[&kept.0].points.len(), params.cable_points);
}

#[test]
fn channel_change_on_a_kept_key_redraws() {
    let connections = setup();
    let params = RoutingParams::default();
    let mut scene = RecordingScene::default();
    let mut cables: Vec<RenderedCable> = Vec::new();
    let plan = diff(&connections, &cables, params.endpoint_epsilon);
    apply(&mut scene, &mut cables, &connections, &plan, &params);
    let old = cables[0].handle;

    let mut rechanneled = connections.clone();
    rechanneled[0].kind = ConnectionKind::Line { channel: 3 };
    let plan = diff(&rechanneled, &cables, params.endpoint_epsilon);
    assert_eq!(plan.to_remove, vec![rechanneled[0].key()]);
    assert_eq!(plan.to_add.len(), 1);
    assert!(plan.to_update.is_empty());

    let counts = apply(&mut scene, &mut cables, &rechanneled, &plan, &params);
    assert_eq!((counts.added, counts.removed), (1, 1));
    let redrawn = cables.iter().find(|c| c.key == rechanneled[0].key()).unwrap();
    assert_ne!(redrawn.handle, old);
    assert_eq!(redrawn.kind, ConnectionKind::Line { channel: 3 });
    assert_eq!(scene.live.len(), 4);
    assert!(diff(&rechanneled, &cables, params.endpoint_epsilon).is_empty());
}
