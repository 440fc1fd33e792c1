//! Port compatibility rules.
//!
//! Each rule walks an ordered fallback chain and reports *which* step produced
//! the pairing through [`MatchOutcome`], so callers can tell an exact match
//! from a guess without reading logs. No rule ever fails hard: an unresolvable
//! pair is a [`MatchOutcome::NoCandidate`] attempt and synthesis moves on.

use std::sync::LazyLock;

use fnv::FnvHashSet;
use glam::Vec3;
use regex::Regex;
use serde::Serialize;
use smallvec::SmallVec;

use crate::connection::{Connection, ConnectionKind, PortRef};
use crate::constants::{
    DEFAULT_HUB_CHANNEL_INPUTS, DEFAULT_HUB_INPUT, DEFAULT_HUB_MASTER_LEFT,
    DEFAULT_HUB_MASTER_RIGHT, DEFAULT_HUB_RETURN, DEFAULT_HUB_SEND, DEFAULT_PERIPHERAL_OUTPUT,
    DEFAULT_SATELLITE_INPUT, DEFAULT_SATELLITE_OUTPUT, DEFAULT_SPEAKER_INPUT,
    EXPECTED_CHANNEL_INPUT_X, IMPLICIT_SPEAKER_PORT,
};
use crate::device::{Device, Direction, Port, Role, Side};
use crate::params::RoutingParams;

static CHANNEL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:line|channel|ch)\s?(\d+)\b").expect("channel label pattern")
});
static LEFT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:l|left)\b").expect("left label pattern"));
static RIGHT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:r|right)\b").expect("right label pattern"));

/// Which rule an attempt belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    Channel,
    Send,
    Return,
    Master,
}

/// Step of a fallback chain that produced a pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackLevel {
    /// RCA/quarter-inch input found by its expected channel position.
    Position,
    /// First free RCA/quarter-inch or line input.
    LineLike,
    /// First free input of any type.
    AnyInput,
    /// Send/return pairing through a port that merely is not a line jack.
    NonLinePort,
    /// Master output without a matching L/R label.
    UnlabelledMaster,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissReason {
    NoChannel,
    NoCompatibleOutput,
    NoSourcePort,
    NoTargetPort,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "kebab-case")]
pub enum MatchOutcome {
    Matched,
    UsedFallback(FallbackLevel),
    NoCandidate(MissReason),
}

/// Result of one rule evaluation between two devices.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchAttempt {
    pub rule: Rule,
    pub source_device: String,
    pub target_device: String,
    pub outcome: MatchOutcome,
    pub connection: Option<Connection>,
}

impl MatchAttempt {
    fn miss(rule: Rule, source: &Device, target: &Device, reason: MissReason) -> Self {
        Self {
            rule,
            source_device: source.unique_id.clone(),
            target_device: target.unique_id.clone(),
            outcome: MatchOutcome::NoCandidate(reason),
            connection: None,
        }
    }

    fn hit(rule: Rule, outcome: MatchOutcome, connection: Connection) -> Self {
        Self {
            rule,
            source_device: connection.source_device.clone(),
            target_device: connection.target_device.clone(),
            outcome,
            connection: Some(connection),
        }
    }
}

/// Ports already carrying a cable in the current pass.
#[derive(Clone, Debug, Default)]
pub struct PortLedger {
    claimed: FnvHashSet<(String, Direction, usize)>,
}

impl PortLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, unique_id: &str, direction: Direction, index: usize) -> bool {
        !self
            .claimed
            .contains(&(unique_id.to_string(), direction, index))
    }

    pub fn claim(&mut self, unique_id: &str, direction: Direction, index: usize) -> bool {
        self.claimed
            .insert((unique_id.to_string(), direction, index))
    }

    /// Claim both ends of a connection. Implicit ports are not tracked.
    pub fn claim_connection(&mut self, connection: &Connection) {
        if !connection.source_port.implicit {
            self.claim(
                &connection.source_device,
                Direction::Output,
                connection.source_port.index,
            );
        }
        if !connection.target_port.implicit {
            self.claim(
                &connection.target_device,
                Direction::Input,
                connection.target_port.index,
            );
        }
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

// ---------------- Port-type heuristics ----------------

#[inline]
fn lower(port: &Port) -> String {
    port.kind.to_ascii_lowercase()
}

fn is_rca_or_quarter(label: &str) -> bool {
    label.contains("rca") || label.contains("1/4")
}

fn is_line_like(label: &str) -> bool {
    label.contains("line") || is_rca_or_quarter(label)
}

/// Outputs a player may feed into a hub channel.
pub fn is_channel_output(port: &Port) -> bool {
    let t = lower(port);
    t == "line out"
        || t == "rca"
        || t == "1/4\""
        || (t.contains("line") && t.contains("out"))
        || t.contains("rca")
        || t.contains("1/4")
}

/// Channel number written into a label such as `Line 2`, `CH3` or `Channel 1`.
pub fn channel_label_number(label: &str) -> Option<u8> {
    CHANNEL_LABEL
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Stereo side written into a label such as `Master Out L`.
pub fn label_side(label: &str) -> Option<Side> {
    match (LEFT_LABEL.is_match(label), RIGHT_LABEL.is_match(label)) {
        (true, false) => Some(Side::Left),
        (false, true) => Some(Side::Right),
        _ => None,
    }
}

fn is_master_output(port: &Port) -> bool {
    let t = lower(port);
    t.contains("master") || t.contains("main")
}

/// First free port on `device` whose lowercased type satisfies `pred`.
fn first_free<F>(device: &Device, direction: Direction, ledger: &PortLedger, pred: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    device
        .ports(direction)
        .iter()
        .enumerate()
        .find(|(i, p)| ledger.is_free(&device.unique_id, direction, *i) && pred(&lower(p)))
        .map(|(i, _)| i)
}

fn offset_or(device: &Device, direction: Direction, index: usize, default: Vec3) -> Vec3 {
    device
        .ports(direction)
        .get(index)
        .and_then(Port::valid_coordinate)
        .unwrap_or(default)
}

fn channel_input_default(channel: u8) -> Vec3 {
    usize::from(channel)
        .checked_sub(1)
        .and_then(|i| DEFAULT_HUB_CHANNEL_INPUTS.get(i).copied())
        .unwrap_or(DEFAULT_HUB_INPUT)
}

// ---------------- Rules ----------------

/// Evaluate every rule that applies to the `(source, target)` role pair.
///
/// `channel` is required by the peripheral-to-hub rule. Claimed ports are
/// recorded in `ledger` so later calls never reuse them.
pub fn find_matching_ports(
    source: &Device,
    target: &Device,
    ledger: &mut PortLedger,
    channel: Option<u8>,
    params: &RoutingParams,
) -> Vec<MatchAttempt> {
    let mut attempts = Vec::new();
    if source.unique_id == target.unique_id {
        return attempts;
    }
    if source.has_role(Role::Hub) && target.has_role(Role::Satellite) {
        attempts.push(match_send(source, target, ledger));
    }
    if source.has_role(Role::Satellite) && target.has_role(Role::Hub) {
        attempts.push(match_return(source, target, ledger));
    }
    if source.has_role(Role::Peripheral) && target.has_role(Role::Hub) {
        match channel {
            Some(ch) => attempts.extend(match_channel(source, target, ledger, ch, params)),
            None => attempts.push(MatchAttempt::miss(
                Rule::Channel,
                source,
                target,
                MissReason::NoChannel,
            )),
        }
    }
    attempts
}

/// Hub send output into a satellite send input.
pub fn match_send(hub: &Device, satellite: &Device, ledger: &mut PortLedger) -> MatchAttempt {
    let out = first_free(hub, Direction::Output, ledger, |t| t.contains("send"))
        .map(|i| (i, false))
        .or_else(|| first_free(hub, Direction::Output, ledger, |t| !is_line_like(t)).map(|i| (i, true)));
    let inp = first_free(satellite, Direction::Input, ledger, |t| t.contains("send"))
        .map(|i| (i, false))
        .or_else(|| {
            first_free(satellite, Direction::Input, ledger, |t| !is_line_like(t)).map(|i| (i, true))
        });
    let (Some((out, out_fb)), Some((inp, in_fb))) = (out, inp) else {
        let reason = if out.is_none() {
            MissReason::NoSourcePort
        } else {
            MissReason::NoTargetPort
        };
        log::warn!(
            "[ports] no send pairing {} -> {} ({:?})",
            hub.name,
            satellite.name,
            reason
        );
        return MatchAttempt::miss(Rule::Send, hub, satellite, reason);
    };
    let connection = Connection::between(
        hub,
        PortRef::on(hub, Direction::Output, out),
        offset_or(hub, Direction::Output, out, DEFAULT_HUB_SEND),
        satellite,
        PortRef::on(satellite, Direction::Input, inp),
        offset_or(satellite, Direction::Input, inp, DEFAULT_SATELLITE_INPUT),
        ConnectionKind::Send,
    );
    ledger.claim_connection(&connection);
    MatchAttempt::hit(Rule::Send, fallback_outcome(out_fb || in_fb), connection)
}

/// Satellite return output back into the hub return input.
pub fn match_return(satellite: &Device, hub: &Device, ledger: &mut PortLedger) -> MatchAttempt {
    let out = first_free(satellite, Direction::Output, ledger, |t| t.contains("return"))
        .map(|i| (i, false))
        .or_else(|| {
            first_free(satellite, Direction::Output, ledger, |t| !t.contains("send")).map(|i| (i, true))
        });
    let inp = first_free(hub, Direction::Input, ledger, |t| t.contains("return"))
        .map(|i| (i, false))
        .or_else(|| first_free(hub, Direction::Input, ledger, |t| !is_line_like(t)).map(|i| (i, true)));
    let (Some((out, out_fb)), Some((inp, in_fb))) = (out, inp) else {
        let reason = if out.is_none() {
            MissReason::NoSourcePort
        } else {
            MissReason::NoTargetPort
        };
        log::warn!(
            "[ports] no return pairing {} -> {} ({:?})",
            satellite.name,
            hub.name,
            reason
        );
        return MatchAttempt::miss(Rule::Return, satellite, hub, reason);
    };
    let connection = Connection::between(
        satellite,
        PortRef::on(satellite, Direction::Output, out),
        offset_or(satellite, Direction::Output, out, DEFAULT_SATELLITE_OUTPUT),
        hub,
        PortRef::on(hub, Direction::Input, inp),
        offset_or(hub, Direction::Input, inp, DEFAULT_HUB_RETURN),
        ConnectionKind::Return,
    );
    ledger.claim_connection(&connection);
    MatchAttempt::hit(Rule::Return, fallback_outcome(out_fb || in_fb), connection)
}

fn fallback_outcome(used_fallback: bool) -> MatchOutcome {
    if used_fallback {
        MatchOutcome::UsedFallback(FallbackLevel::NonLinePort)
    } else {
        MatchOutcome::Matched
    }
}

/// Peripheral line outputs into the hub inputs of `channel`.
///
/// Every free compatible output gets one attempt; each attempt searches the
/// hub inputs by label, then by expected position, then any line-like input,
/// then any input at all.
pub fn match_channel(
    peripheral: &Device,
    hub: &Device,
    ledger: &mut PortLedger,
    channel: u8,
    params: &RoutingParams,
) -> Vec<MatchAttempt> {
    let outputs: SmallVec<[usize; 4]> = peripheral
        .outputs
        .iter()
        .enumerate()
        .filter(|(i, p)| {
            is_channel_output(p) && ledger.is_free(&peripheral.unique_id, Direction::Output, *i)
        })
        .map(|(i, _)| i)
        .collect();
    if outputs.is_empty() {
        log::debug!(
            "[ports] {} has no free line output for channel {}",
            peripheral.name,
            channel
        );
        return vec![MatchAttempt::miss(
            Rule::Channel,
            peripheral,
            hub,
            MissReason::NoCompatibleOutput,
        )];
    }

    let mut attempts = Vec::with_capacity(outputs.len());
    for out in outputs {
        let Some((inp, outcome)) = find_channel_input(hub, ledger, channel, params) else {
            log::debug!(
                "[ports] no free input on {} for {} channel {}",
                hub.name,
                peripheral.name,
                channel
            );
            attempts.push(MatchAttempt::miss(
                Rule::Channel,
                peripheral,
                hub,
                MissReason::NoTargetPort,
            ));
            continue;
        };
        if let MatchOutcome::UsedFallback(level) = outcome {
            log::debug!(
                "[ports] {} channel {} -> {} input {} via {:?}",
                peripheral.name,
                channel,
                hub.name,
                inp,
                level
            );
        }
        let connection = Connection::between(
            peripheral,
            PortRef::on(peripheral, Direction::Output, out),
            offset_or(peripheral, Direction::Output, out, DEFAULT_PERIPHERAL_OUTPUT),
            hub,
            PortRef::on(hub, Direction::Input, inp),
            offset_or(hub, Direction::Input, inp, channel_input_default(channel)),
            ConnectionKind::Line { channel },
        );
        ledger.claim_connection(&connection);
        attempts.push(MatchAttempt::hit(Rule::Channel, outcome, connection));
    }
    attempts
}

fn find_channel_input(
    hub: &Device,
    ledger: &PortLedger,
    channel: u8,
    params: &RoutingParams,
) -> Option<(usize, MatchOutcome)> {
    if let Some(i) = first_free(hub, Direction::Input, ledger, |t| {
        channel_label_number(t) == Some(channel)
    }) {
        return Some((i, MatchOutcome::Matched));
    }

    let expected_x = usize::from(channel)
        .checked_sub(1)
        .and_then(|i| EXPECTED_CHANNEL_INPUT_X.get(i).copied());
    if let Some(expected_x) = expected_x {
        let by_position = hub.inputs.iter().enumerate().find(|(i, p)| {
            ledger.is_free(&hub.unique_id, Direction::Input, *i)
                && is_rca_or_quarter(&lower(p))
                && p.valid_coordinate()
                    .is_some_and(|c| (c.x - expected_x).abs() <= params.position_tolerance)
        });
        if let Some((i, _)) = by_position {
            return Some((i, MatchOutcome::UsedFallback(FallbackLevel::Position)));
        }
    }

    if let Some(i) = first_free(hub, Direction::Input, ledger, |t| {
        is_rca_or_quarter(t) || (t.contains("line") && t.contains("in"))
    }) {
        return Some((i, MatchOutcome::UsedFallback(FallbackLevel::LineLike)));
    }

    first_free(hub, Direction::Input, ledger, |_| true)
        .map(|i| (i, MatchOutcome::UsedFallback(FallbackLevel::AnyInput)))
}

/// Hub master output into a speaker on `side`.
pub fn match_master(
    hub: &Device,
    speaker: &Device,
    side: Side,
    ledger: &mut PortLedger,
) -> MatchAttempt {
    let labelled = hub.outputs.iter().enumerate().find(|(i, p)| {
        ledger.is_free(&hub.unique_id, Direction::Output, *i)
            && is_master_output(p)
            && label_side(&p.kind) == Some(side)
    });
    let pick = labelled.map(|(i, _)| (i, MatchOutcome::Matched)).or_else(|| {
        first_free(hub, Direction::Output, ledger, |t| {
            (t.contains("master") || t.contains("main")) && label_side(t) != Some(side.other())
        })
        .or_else(|| {
            first_free(hub, Direction::Output, ledger, |t| {
                t.contains("master") || t.contains("main")
            })
        })
        .map(|i| (i, MatchOutcome::UsedFallback(FallbackLevel::UnlabelledMaster)))
    });
    let Some((out, outcome)) = pick else {
        log::warn!(
            "[ports] no free master output on {} for {:?} speaker {}",
            hub.name,
            side,
            speaker.name
        );
        return MatchAttempt::miss(Rule::Master, hub, speaker, MissReason::NoSourcePort);
    };

    let (target_port, target_offset) =
        match first_free(speaker, Direction::Input, ledger, |_| true) {
            Some(i) => (
                PortRef::on(speaker, Direction::Input, i),
                offset_or(speaker, Direction::Input, i, DEFAULT_SPEAKER_INPUT),
            ),
            None if speaker.inputs.is_empty() => {
                (PortRef::implicit(IMPLICIT_SPEAKER_PORT), DEFAULT_SPEAKER_INPUT)
            }
            None => {
                log::warn!("[ports] speaker {} has no free input", speaker.name);
                return MatchAttempt::miss(Rule::Master, hub, speaker, MissReason::NoTargetPort);
            }
        };
    let default_out = match side {
        Side::Left => DEFAULT_HUB_MASTER_LEFT,
        Side::Right => DEFAULT_HUB_MASTER_RIGHT,
    };
    let connection = Connection::between(
        hub,
        PortRef::on(hub, Direction::Output, out),
        offset_or(hub, Direction::Output, out, default_out),
        speaker,
        target_port,
        target_offset,
        ConnectionKind::Master { side },
    );
    ledger.claim_connection(&connection);
    MatchAttempt::hit(Rule::Master, outcome, connection)
}
