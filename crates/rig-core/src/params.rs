use serde::{Deserialize, Serialize};

use crate::constants::{
    CABLE_ARCH_HEIGHT, CABLE_CHANNEL_ARCH_STEP, CABLE_POINTS, CHANNEL_POSITION_TOLERANCE,
    ENDPOINT_EPSILON,
};
use crate::device::SetupKind;

/// Runtime routing knobs. Every field falls back to the shared constants, so a
/// config file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingParams {
    pub setup: SetupKind,
    pub arch_height: f32,
    pub channel_arch_step: f32,
    pub cable_points: usize,
    /// Max distance between an input's relative X and its expected channel position.
    pub position_tolerance: f32,
    pub endpoint_epsilon: f32,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            setup: SetupKind::default(),
            arch_height: CABLE_ARCH_HEIGHT,
            channel_arch_step: CABLE_CHANNEL_ARCH_STEP,
            cable_points: CABLE_POINTS,
            position_tolerance: CHANNEL_POSITION_TOLERANCE,
            endpoint_epsilon: ENDPOINT_EPSILON,
        }
    }
}

impl RoutingParams {
    pub fn for_setup(setup: SetupKind) -> Self {
        Self {
            setup,
            ..Self::default()
        }
    }

    /// True when both produce identically shaped cables.
    pub fn same_geometry(&self, other: &Self) -> bool {
        self.arch_height == other.arch_height
            && self.channel_arch_step == other.channel_arch_step
            && self.cable_points == other.cable_points
    }
}
