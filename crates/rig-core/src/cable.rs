//! Cable geometry.
//!
//! Cables are cubic Bézier curves between two port positions. The two inner
//! control points sit on the chord at 1/3 and 2/3 and are lifted along +Y so
//! the curve midpoint ends up exactly `arch_height` above the chord midpoint,
//! which keeps cables arcing over device bodies instead of through them.

use glam::Vec3;

use crate::connection::{Connection, ConnectionKind};
use crate::constants::{LINE_CHANNEL_COLORS, MASTER_COLOR, RETURN_COLOR, SEND_COLOR};
use crate::params::RoutingParams;

// B(0.5) lifts the inner control points by 3/4 of their offset
const MIDPOINT_LIFT_RATIO: f32 = 0.75;

#[derive(Clone, Debug, PartialEq)]
pub struct CablePath {
    pub start: Vec3,
    pub end: Vec3,
    pub arch_height: f32,
    pub points: Vec<Vec3>,
}

impl CablePath {
    /// Sample an arched curve from `start` to `end` with `samples` points
    /// (at least two: the endpoints).
    pub fn arched(start: Vec3, end: Vec3, arch_height: f32, samples: usize) -> Self {
        let start = finite_or_origin(start);
        let end = finite_or_origin(end);
        let arch_height = if arch_height.is_finite() { arch_height } else { 0.0 };
        let lift = Vec3::Y * (arch_height / MIDPOINT_LIFT_RATIO);
        let c1 = start.lerp(end, 1.0 / 3.0) + lift;
        let c2 = start.lerp(end, 2.0 / 3.0) + lift;
        let n = samples.max(2);
        let points = (0..n)
            .map(|i| cubic_bezier(start, c1, c2, end, i as f32 / (n - 1) as f32))
            .collect();
        Self {
            start,
            end,
            arch_height,
            points,
        }
    }

    /// Curve point halfway along the parameter range.
    pub fn midpoint(&self) -> Vec3 {
        let lift = Vec3::Y * (self.arch_height / MIDPOINT_LIFT_RATIO);
        cubic_bezier(
            self.start,
            self.start.lerp(self.end, 1.0 / 3.0) + lift,
            self.start.lerp(self.end, 2.0 / 3.0) + lift,
            self.end,
            0.5,
        )
    }

    /// Points as a flat `[x0, y0, z0, x1, ...]` slice for upload.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }
}

#[inline]
fn finite_or_origin(p: Vec3) -> Vec3 {
    if p.is_finite() {
        p
    } else {
        log::warn!("[cable] non-finite endpoint replaced with origin");
        Vec3::ZERO
    }
}

#[inline]
pub fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Arch height for a connection. Line cables rise a little per channel and per
/// earlier Line cable between the same two devices (`ordinal`).
pub fn arch_height_for(connection: &Connection, ordinal: usize, params: &RoutingParams) -> f32 {
    match connection.kind {
        ConnectionKind::Line { channel } => {
            params.arch_height
                + params.channel_arch_step * f32::from(channel.saturating_sub(1))
                + params.channel_arch_step * 0.5 * ordinal as f32
        }
        _ => params.arch_height,
    }
}

/// For each connection, how many Line connections before it join the same two devices.
pub fn line_ordinals(connections: &[Connection]) -> Vec<usize> {
    connections
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if c.kind.channel().is_none() {
                return 0;
            }
            connections[..i]
                .iter()
                .filter(|p| {
                    p.kind.channel().is_some()
                        && p.source_device == c.source_device
                        && p.target_device == c.target_device
                })
                .count()
        })
        .collect()
}

/// Build the curve for `connection`.
pub fn draw(connection: &Connection, ordinal: usize, params: &RoutingParams) -> CablePath {
    CablePath::arched(
        connection.start,
        connection.end,
        arch_height_for(connection, ordinal, params),
        params.cable_points,
    )
}

/// Palette color for a connection kind.
pub fn cable_color(kind: ConnectionKind) -> [f32; 3] {
    match kind {
        ConnectionKind::Line { channel } => {
            let i = usize::from(channel.max(1) - 1) % LINE_CHANNEL_COLORS.len();
            LINE_CHANNEL_COLORS[i]
        }
        ConnectionKind::Send => SEND_COLOR,
        ConnectionKind::Return => RETURN_COLOR,
        ConnectionKind::Master { .. } => MASTER_COLOR,
    }
}
