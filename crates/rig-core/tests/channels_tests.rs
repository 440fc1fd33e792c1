mod common;

use common::*;
use rig_core::{assign_channels, synthesize, ChannelChoice, Device, Diagnostic, RoutingParams};

fn refs(devices: &[Device]) -> Vec<&Device> {
    devices.iter().collect()
}

#[test]
fn single_peripheral_gets_channel_one() {
    let hub = mixer();
    let players = vec![cdj("CDJ-A", 1.0)];
    let plan = assign_channels(&refs(&players), &hub);
    assert_eq!(plan.resolve(&players[0].unique_id), ChannelChoice::Assigned(1));
}

#[test]
fn two_peripherals_left_then_right() {
    let hub = mixer();
    let players = vec![cdj("CDJ-B", 1.0), cdj("CDJ-A", -1.0)];
    let plan = assign_channels(&refs(&players), &hub);
    assert_eq!(plan.channel_of(&players[1].unique_id), Some(1));
    assert_eq!(plan.channel_of(&players[0].unique_id), Some(2));
    assert_eq!(plan.left(), &[players[1].unique_id.clone()]);
    assert_eq!(plan.right(), &[players[0].unique_id.clone()]);
}

#[test]
fn three_peripherals_follow_x_order() {
    let hub = mixer();
    let players = vec![cdj("C", 2.0), cdj("A", -1.0), cdj("B", 1.0)];
    let plan = assign_channels(&refs(&players), &hub);
    assert_eq!(plan.channel_of(&players[1].unique_id), Some(1));
    assert_eq!(plan.channel_of(&players[2].unique_id), Some(2));
    assert_eq!(plan.channel_of(&players[0].unique_id), Some(3));
}

#[test]
fn four_peripherals_map_to_one_through_four() {
    let hub = mixer();
    let players = vec![
        cdj("P3", 1.0),
        cdj("P1", -2.0),
        cdj("P4", 2.0),
        cdj("P2", -1.0),
    ];
    let plan = assign_channels(&refs(&players), &hub);
    let got: Vec<Option<u8>> = ["P1", "P2", "P3", "P4"]
        .iter()
        .map(|n| {
            let d = players.iter().find(|d| d.name == *n).unwrap();
            plan.channel_of(&d.unique_id)
        })
        .collect();
    assert_eq!(got, vec![Some(1), Some(2), Some(3), Some(4)]);
}

#[test]
fn equal_x_keeps_input_order() {
    let hub = mixer();
    let mut first = cdj("First", -1.0);
    first.unique_id = "first".into();
    let mut second = cdj("Second", -1.0);
    second.unique_id = "second".into();
    let players = vec![first, second];
    let plan = assign_channels(&refs(&players), &hub);
    assert_eq!(plan.sorted(), &["first".to_string(), "second".to_string()]);
    assert_eq!(plan.channel_of("first"), Some(1));
    assert_eq!(plan.channel_of("second"), Some(2));
}

#[test]
fn fifth_peripheral_overflows() {
    let hub = mixer();
    let players: Vec<Device> = [-3.0, -2.0, -1.0, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, x)| cdj(&format!("P{}", i + 1), *x))
        .collect();
    let plan = assign_channels(&refs(&players), &hub);
    for (i, d) in players.iter().take(4).enumerate() {
        assert_eq!(plan.resolve(&d.unique_id), ChannelChoice::Assigned(i as u8 + 1));
    }
    assert_eq!(plan.resolve(&players[4].unique_id), ChannelChoice::Overflow);
    assert_eq!(ChannelChoice::Overflow.channel(), None);
}

#[test]
fn peripheral_at_hub_x_uses_fallback_order() {
    let hub = mixer();
    let players = vec![cdj("L", -1.0), cdj("Centre", 0.0), cdj("R", 1.0)];
    let plan = assign_channels(&refs(&players), &hub);
    assert!(plan.channel_of(&players[1].unique_id).is_none());
    assert_eq!(plan.channel_of(&players[0].unique_id), Some(1));
    assert_eq!(plan.channel_of(&players[2].unique_id), Some(2));
    // sorted index 1 -> second entry of [2, 3, 1, 4]
    assert_eq!(plan.resolve(&players[1].unique_id), ChannelChoice::Fallback(3));
}

#[test]
fn fallback_and_overflow_surface_as_diagnostics() {
    let mut hub = mixer();
    hub.inputs = (0..6).map(|_| "Line In".into()).collect();
    let mut devices = vec![hub, cdj("Centre", 0.0)];
    for (i, x) in [-3.0, -2.0, -1.0, 1.0, 2.0].iter().enumerate() {
        devices.push(cdj(&format!("P{}", i + 1), *x));
    }
    let out = synthesize(&devices, &RoutingParams::default());

    // Centre sits at sorted index 3 -> fourth entry of [2, 3, 1, 4]
    let centre = devices[1].unique_id.clone();
    let last = devices[6].unique_id.clone();
    assert!(out.diagnostics.contains(&Diagnostic::ChannelFallback {
        device: centre.clone(),
        channel: 4,
    }));
    assert!(out
        .diagnostics
        .contains(&Diagnostic::ChannelOverflow { device: last.clone() }));
    assert!(out.connections.iter().any(|c| c.source_device == centre));
    assert!(out.connections.iter().all(|c| c.source_device != last));
    assert_eq!(out.connections.len(), 5);
}
