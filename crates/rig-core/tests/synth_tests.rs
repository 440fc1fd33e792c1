mod common;

use std::collections::HashSet;

use common::*;
use glam::Vec3;
use rig_core::constants::DEFAULT_SPEAKER_INPUT;
use rig_core::synth::assign_speaker_sides;
use rig_core::{
    synthesize, ConnectionKind, Device, Diagnostic, RoutingParams, SetupKind, Side,
};

fn dj() -> RoutingParams {
    RoutingParams::default()
}

fn producer() -> RoutingParams {
    RoutingParams::for_setup(SetupKind::Producer)
}

#[test]
fn two_players_land_on_channels_one_and_two() {
    let devices = vec![mixer(), cdj("CDJ-A", -1.0), cdj("CDJ-B", 1.0)];
    let out = synthesize(&devices, &dj());

    assert_eq!(out.connections.len(), 2);
    let a = &out.connections[0];
    let b = &out.connections[1];
    assert_eq!(a.source_device, devices[1].unique_id);
    assert_eq!(a.kind, ConnectionKind::Line { channel: 1 });
    assert_eq!(a.target_port.index, 0);
    assert_eq!(b.source_device, devices[2].unique_id);
    assert_eq!(b.kind, ConnectionKind::Line { channel: 2 });
    assert_eq!(b.target_port.index, 1);
    assert_ne!(a.target_port, b.target_port);
}

#[test]
fn no_hub_means_no_connections() {
    let devices = vec![cdj("CDJ-A", -1.0), fx_unit(1.0)];
    let out = synthesize(&devices, &dj());
    assert!(out.connections.is_empty());
    assert_eq!(out.diagnostics, vec![Diagnostic::NoHub]);
}

#[test]
fn synthesis_is_deterministic() {
    let devices = vec![
        cdj("CDJ-B", 1.0),
        fx_unit(2.0),
        fx_mixer(),
        cdj("CDJ-A", -1.0),
        cdj("CDJ-C", -2.0),
    ];
    let first = synthesize(&devices, &dj());
    let second = synthesize(&devices, &dj());
    let a = serde_json::to_string(&first.connections).unwrap();
    let b = serde_json::to_string(&second.connections).unwrap();
    assert_eq!(a, b);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn send_return_pair_regardless_of_insertion_order() {
    for devices in [
        vec![fx_mixer(), fx_unit(1.0)],
        vec![fx_unit(1.0), fx_mixer()],
    ] {
        let out = synthesize(&devices, &dj());
        assert_eq!(out.connections.len(), 2);
        let kinds: Vec<ConnectionKind> = out.connections.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ConnectionKind::Send));
        assert!(kinds.contains(&ConnectionKind::Return));
    }
}

#[test]
fn no_input_is_targeted_twice() {
    let mut hub = fx_mixer();
    hub.inputs.truncate(3);
    let devices = vec![
        hub,
        cdj("P1", -2.0),
        cdj("P2", -1.0),
        cdj("P3", 1.0),
        cdj("P4", 2.0),
        fx_unit(0.5),
    ];
    let out = synthesize(&devices, &dj());
    let mut targets = HashSet::new();
    for c in &out.connections {
        assert!(
            targets.insert((c.target_device.clone(), c.target_port.index)),
            "input {} on {} used twice",
            c.target_port.index,
            c.target_device
        );
    }
    // three line inputs for four players: the last player takes nothing
    assert!(out
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::Unmatched { source, .. } if *source == devices[4].unique_id)));
}

#[test]
fn duplicate_placement_yields_one_cable() {
    let player = cdj("CDJ-A", -1.0);
    let mut hub = mixer();
    hub.inputs = vec!["Line 1".into()];
    let devices = vec![hub, player.clone(), player];
    let out = synthesize(&devices, &dj());
    assert_eq!(out.connections.len(), 1);
}

#[test]
fn missing_coordinates_still_yield_finite_endpoints() {
    let devices = vec![mixer(), cdj("CDJ-A", -1.0), fx_unit(1.5)];
    let out = synthesize(&devices, &dj());
    assert!(!out.connections.is_empty());
    for c in &out.connections {
        assert!(c.start.is_finite(), "{:?}", c);
        assert!(c.end.is_finite(), "{:?}", c);
    }
}

#[test]
fn speakers_take_sides_from_spot_tags() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let right = speaker(-2.0, 1.0).with_spot("speaker-right");
    let left = speaker(-2.5, 1.0).with_spot("speaker-left");
    let devices = vec![hub, right, left];
    let out = synthesize(&devices, &producer());

    assert_eq!(out.connections.len(), 2);
    let to_right = out
        .connections
        .iter()
        .find(|c| c.target_device == devices[1].unique_id)
        .unwrap();
    assert_eq!(to_right.kind, ConnectionKind::Master { side: Side::Right });
    assert_eq!(to_right.source_port.label, "Master Out R");
    assert!(to_right.target_port.implicit);
    assert_eq!(to_right.target_offset, DEFAULT_SPEAKER_INPUT);
    assert!(!out
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::SpeakerSideGuessed { .. })));
}

#[test]
fn speakers_take_sides_from_position() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let devices = vec![hub, speaker(2.0, 1.0), speaker(-2.0, 1.0)];
    let refs: Vec<&Device> = devices[1..].iter().collect();
    let sides: Vec<(Side, bool)> = assign_speaker_sides(&refs, &devices[0])
        .into_iter()
        .map(|(_, s, g)| (s, g))
        .collect();
    assert_eq!(sides, vec![(Side::Right, false), (Side::Left, false)]);
}

#[test]
fn untagged_speakers_at_hub_alternate() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let devices = vec![hub, speaker(0.0, 1.0), speaker(0.0, -1.0)];
    let out = synthesize(&devices, &producer());

    let sides: Vec<ConnectionKind> = out.connections.iter().map(|c| c.kind).collect();
    assert_eq!(
        sides,
        vec![
            ConnectionKind::Master { side: Side::Left },
            ConnectionKind::Master { side: Side::Right },
        ]
    );
    let guessed = out
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::SpeakerSideGuessed { .. }))
        .count();
    assert_eq!(guessed, 2);
}

#[test]
fn second_speaker_on_a_taken_side_alternates() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let devices = vec![hub, speaker(-2.0, 1.0), speaker(-3.0, 1.0)];
    let refs: Vec<&Device> = devices[1..].iter().collect();
    let sides: Vec<(Side, bool)> = assign_speaker_sides(&refs, &devices[0])
        .into_iter()
        .map(|(_, s, g)| (s, g))
        .collect();
    assert_eq!(sides, vec![(Side::Left, false), (Side::Right, true)]);
}

#[test]
fn two_speakers_on_one_side_still_split() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let devices = vec![hub, speaker(2.0, 1.0), speaker(3.0, 1.0)];
    let out = synthesize(&devices, &producer());

    let wired: Vec<(ConnectionKind, &str)> = out
        .connections
        .iter()
        .map(|c| (c.kind, c.source_port.label.as_str()))
        .collect();
    assert_eq!(
        wired,
        vec![
            (ConnectionKind::Master { side: Side::Right }, "Master Out R"),
            (ConnectionKind::Master { side: Side::Left }, "Master Out L"),
        ]
    );
}

#[test]
fn tagged_speaker_keeps_its_side_next_to_an_untagged_one() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let tagged = speaker(-2.0, 1.0).with_spot("speaker-left");
    let devices = vec![hub, speaker(0.0, 1.0), tagged];
    let out = synthesize(&devices, &producer());

    assert_eq!(out.connections.len(), 2);
    let to_tagged = out
        .connections
        .iter()
        .find(|c| c.target_device == devices[2].unique_id)
        .unwrap();
    assert_eq!(to_tagged.kind, ConnectionKind::Master { side: Side::Left });
    assert_eq!(to_tagged.source_port.label, "Master Out L");
    let to_untagged = out
        .connections
        .iter()
        .find(|c| c.target_device == devices[1].unique_id)
        .unwrap();
    assert_eq!(to_untagged.kind, ConnectionKind::Master { side: Side::Right });
    assert_eq!(to_untagged.source_port.label, "Master Out R");
}

#[test]
fn third_speaker_alternates_by_index() {
    let hub = mixer();
    let devices = vec![hub, speaker(-1.0, 1.0), speaker(1.0, 1.0), speaker(2.0, 1.0)];
    let refs: Vec<&Device> = devices[1..].iter().collect();
    let sides: Vec<(Side, bool)> = assign_speaker_sides(&refs, &devices[0])
        .into_iter()
        .map(|(_, s, g)| (s, g))
        .collect();
    assert_eq!(
        sides,
        vec![(Side::Left, false), (Side::Right, false), (Side::Left, true)]
    );
}

#[test]
fn dj_setups_do_not_wire_speakers() {
    let hub = mixer().with_outputs(["Master Out L", "Master Out R"]);
    let devices = vec![hub, speaker(-2.0, 1.0), speaker(2.0, 1.0)];
    let out = synthesize(&devices, &dj());
    assert!(out.connections.is_empty());
}

#[test]
fn speaker_with_listed_input_uses_it() {
    let hub = mixer().with_outputs(["Main Out"]);
    let monitor = Device::place("lsr", "LSR305 Monitor", "", Vec3::new(-2.0, 1.0, 0.0))
        .with_inputs(["XLR In"]);
    let devices = vec![hub, monitor];
    let out = synthesize(&devices, &producer());
    assert_eq!(out.connections.len(), 1);
    let c = &out.connections[0];
    assert_eq!(c.target_port.label, "XLR In");
    assert!(!c.target_port.implicit);
    assert_eq!(c.source_port.label, "Main Out");
}

#[test]
fn full_setup_wires_everything_once() {
    let devices = vec![
        fx_mixer(),
        cdj("CDJ-1", -2.0),
        cdj("CDJ-2", -1.0),
        cdj("CDJ-3", 1.0),
        cdj("CDJ-4", 2.0),
        fx_unit(0.0),
    ];
    let out = synthesize(&devices, &dj());
    assert_eq!(out.connections.len(), 6);
    let channels: Vec<u8> = out
        .connections
        .iter()
        .filter_map(|c| c.kind.channel())
        .collect();
    assert_eq!(channels, vec![1, 2, 3, 4]);
    let targets: Vec<usize> = out
        .connections
        .iter()
        .take(4)
        .map(|c| c.target_port.index)
        .collect();
    assert_eq!(targets, vec![0, 1, 2, 3]);
}
