use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::device::{Device, Direction, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConnectionKind {
    /// Peripheral into a numbered hub channel.
    Line { channel: u8 },
    /// Hub send into a satellite.
    Send,
    /// Satellite back into the hub return.
    Return,
    /// Hub master bus into a speaker.
    Master { side: Side },
}

impl ConnectionKind {
    pub fn channel(&self) -> Option<u8> {
        match self {
            ConnectionKind::Line { channel } => Some(*channel),
            _ => None,
        }
    }
}

/// Address of one jack on a device.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub index: usize,
    pub label: String,
    /// Jack that the catalog does not list (speakers without inputs).
    #[serde(default)]
    pub implicit: bool,
}

impl PortRef {
    pub fn on(device: &Device, direction: Direction, index: usize) -> Self {
        Self {
            index,
            label: device.port_label(direction, index),
            implicit: false,
        }
    }

    pub fn implicit(label: &str) -> Self {
        Self {
            index: 0,
            label: label.to_string(),
            implicit: true,
        }
    }
}

/// Identity of a cable across reconciliation passes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionKey {
    pub source_device: String,
    pub target_device: String,
    pub source_port: String,
    pub target_port: String,
}

impl ConnectionKey {
    pub fn touches(&self, unique_id: &str) -> bool {
        self.source_device == unique_id || self.target_device == unique_id
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.source_device, self.source_port, self.target_device, self.target_port
        )
    }
}

/// A resolved output-to-input pairing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source_device: String,
    pub source_port: PortRef,
    pub target_device: String,
    pub target_port: PortRef,
    pub kind: ConnectionKind,
    /// Offsets relative to each device; defaults already substituted.
    pub source_offset: Vec3,
    pub target_offset: Vec3,
    /// World-space endpoints.
    pub start: Vec3,
    pub end: Vec3,
}

impl Connection {
    pub fn between(
        source: &Device,
        source_port: PortRef,
        source_offset: Vec3,
        target: &Device,
        target_port: PortRef,
        target_offset: Vec3,
        kind: ConnectionKind,
    ) -> Self {
        Self {
            source_device: source.unique_id.clone(),
            target_device: target.unique_id.clone(),
            start: source.world_point(source_offset),
            end: target.world_point(target_offset),
            source_port,
            target_port,
            source_offset,
            target_offset,
            kind,
        }
    }

    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            source_device: self.source_device.clone(),
            target_device: self.target_device.clone(),
            source_port: self.source_port.label.clone(),
            target_port: self.target_port.label.clone(),
        }
    }

    pub fn touches(&self, unique_id: &str) -> bool {
        self.source_device == unique_id || self.target_device == unique_id
    }
}
