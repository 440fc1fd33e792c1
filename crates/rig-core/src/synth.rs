//! Connection synthesis over a whole device set.
//!
//! [`synthesize`] is a pure function of the device list and the routing
//! params: the same list in the same order always yields the same connections
//! in the same order.

use fnv::FnvHashSet;
use serde::Serialize;
use smallvec::SmallVec;

use crate::channels::{assign_channels, ChannelChoice};
use crate::connection::{Connection, ConnectionKey};
use crate::device::{Device, Role, Side};
use crate::params::RoutingParams;
use crate::ports::{
    find_matching_ports, label_side, match_master, FallbackLevel, MatchAttempt, MatchOutcome,
    MissReason, PortLedger, Rule,
};

/// Non-fatal observations made while synthesizing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "diagnostic", rename_all = "kebab-case")]
pub enum Diagnostic {
    NoHub,
    ChannelFallback {
        device: String,
        channel: u8,
    },
    ChannelOverflow {
        device: String,
    },
    Unmatched {
        rule: Rule,
        source: String,
        target: String,
        reason: MissReason,
    },
    Fallback {
        rule: Rule,
        source: String,
        target: String,
        level: FallbackLevel,
    },
    SpeakerSideGuessed {
        device: String,
        side: Side,
    },
    DuplicateSuppressed {
        key: ConnectionKey,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Synthesis {
    pub connections: Vec<Connection>,
    pub attempts: Vec<MatchAttempt>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Synthesis {
    fn record(&mut self, attempt: MatchAttempt, seen: &mut FnvHashSet<ConnectionKey>) {
        match attempt.outcome {
            MatchOutcome::NoCandidate(reason) => self.diagnostics.push(Diagnostic::Unmatched {
                rule: attempt.rule,
                source: attempt.source_device.clone(),
                target: attempt.target_device.clone(),
                reason,
            }),
            MatchOutcome::UsedFallback(level) => self.diagnostics.push(Diagnostic::Fallback {
                rule: attempt.rule,
                source: attempt.source_device.clone(),
                target: attempt.target_device.clone(),
                level,
            }),
            MatchOutcome::Matched => {}
        }
        if let Some(connection) = &attempt.connection {
            let key = connection.key();
            if seen.insert(key.clone()) {
                self.connections.push(connection.clone());
            } else {
                log::debug!("[synth] duplicate connection {} suppressed", key);
                self.diagnostics.push(Diagnostic::DuplicateSuppressed { key });
            }
        }
        self.attempts.push(attempt);
    }
}

/// Derive every cable the device set implies.
pub fn synthesize(devices: &[Device], params: &RoutingParams) -> Synthesis {
    let mut out = Synthesis::default();
    let Some(hub) = devices.iter().find(|d| d.has_role(Role::Hub)) else {
        log::debug!("[synth] no hub among {} devices", devices.len());
        out.diagnostics.push(Diagnostic::NoHub);
        return out;
    };

    let hub_id = hub.unique_id.as_str();
    let others = move || devices.iter().filter(move |d| d.unique_id != hub_id);
    let peripherals: Vec<&Device> = others().filter(|d| d.has_role(Role::Peripheral)).collect();
    let satellites: Vec<&Device> = others().filter(|d| d.has_role(Role::Satellite)).collect();
    let speakers: Vec<&Device> = others().filter(|d| d.has_role(Role::Speaker)).collect();

    let mut ledger = PortLedger::new();
    let mut seen = FnvHashSet::default();

    // Peripherals, left to right
    let plan = assign_channels(&peripherals, hub);
    for uid in plan.sorted() {
        let Some(device) = peripherals.iter().find(|d| &d.unique_id == uid) else {
            continue;
        };
        let channel = match plan.resolve(uid) {
            ChannelChoice::Assigned(ch) => ch,
            ChannelChoice::Fallback(ch) => {
                out.diagnostics.push(Diagnostic::ChannelFallback {
                    device: uid.clone(),
                    channel: ch,
                });
                ch
            }
            ChannelChoice::Overflow => {
                out.diagnostics
                    .push(Diagnostic::ChannelOverflow { device: uid.clone() });
                continue;
            }
        };
        for attempt in find_matching_ports(device, hub, &mut ledger, Some(channel), params) {
            out.record(attempt, &mut seen);
        }
    }

    // Send/return loops
    for sat in &satellites {
        for attempt in find_matching_ports(hub, sat, &mut ledger, None, params) {
            out.record(attempt, &mut seen);
        }
        for attempt in find_matching_ports(sat, hub, &mut ledger, None, params) {
            out.record(attempt, &mut seen);
        }
    }

    // Monitors off the master bus
    if params.setup.supports_speakers() && !speakers.is_empty() {
        for (speaker, side, guessed) in assign_speaker_sides(&speakers, hub) {
            if guessed {
                out.diagnostics.push(Diagnostic::SpeakerSideGuessed {
                    device: speaker.unique_id.clone(),
                    side,
                });
            }
            let attempt = match_master(hub, speaker, side, &mut ledger);
            out.record(attempt, &mut seen);
        }
    }

    log::info!(
        "[synth] {} connections from {} devices ({} diagnostics)",
        out.connections.len(),
        devices.len(),
        out.diagnostics.len()
    );
    out
}

/// Left/right for each speaker: spot tag first, then the free slot on the
/// speaker's side of the hub, then whichever side is still free, then
/// alternating by index once both sides are taken. The flag marks speakers
/// whose side came from neither their tag nor their position.
pub fn assign_speaker_sides<'a>(
    speakers: &[&'a Device],
    hub: &Device,
) -> Vec<(&'a Device, Side, bool)> {
    let mut sides: Vec<Option<(Side, bool)>> = speakers
        .iter()
        .map(|s| s.spot.as_deref().and_then(label_side).map(|side| (side, false)))
        .collect();
    let mut taken: SmallVec<[Side; 2]> = sides.iter().flatten().map(|(side, _)| *side).collect();

    for (i, speaker) in speakers.iter().enumerate() {
        if sides[i].is_some() {
            continue;
        }
        let natural = if speaker.position.x < hub.position.x {
            Some(Side::Left)
        } else if speaker.position.x > hub.position.x {
            Some(Side::Right)
        } else {
            None
        };
        let free = [Side::Left, Side::Right]
            .into_iter()
            .find(|side| !taken.contains(side));
        let (side, guessed) = match (natural, free) {
            (Some(side), _) if !taken.contains(&side) => (side, false),
            (_, Some(side)) => (side, true),
            _ if i % 2 == 0 => (Side::Left, true),
            _ => (Side::Right, true),
        };
        taken.push(side);
        sides[i] = Some((side, guessed));
    }

    speakers
        .iter()
        .zip(sides)
        .filter_map(|(s, side)| side.map(|(side, guessed)| (*s, side, guessed)))
        .collect()
}
