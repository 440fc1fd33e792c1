use glam::Vec3;

// Shared routing and cable tuning constants used by both web and native frontends.

// Channel layout
pub const MAX_TABLE_CHANNELS: usize = 4; // conventional 2/4-channel mixer layouts
pub const FALLBACK_CHANNEL_ORDER: [u8; 4] = [2, 3, 1, 4];

/// Channel numbers handed out left-to-right, keyed by peripheral count.
pub const CHANNEL_TABLE: [&[u8]; MAX_TABLE_CHANNELS] = [&[1], &[1, 2], &[1, 2, 3], &[1, 2, 3, 4]];

// Expected relative X of a mixer's RCA/quarter-inch channel inputs, indexed by channel - 1
pub const EXPECTED_CHANNEL_INPUT_X: [f32; 4] = [0.085, -0.04, 0.005, -0.12];
pub const CHANNEL_POSITION_TOLERANCE: f32 = 0.1;

// Default port offsets used when a catalog coordinate is missing or malformed
pub const DEFAULT_HUB_CHANNEL_INPUTS: [Vec3; 4] = [
    Vec3::new(0.085, 0.04, -0.2),
    Vec3::new(-0.04, 0.04, -0.2),
    Vec3::new(0.005, 0.04, -0.2),
    Vec3::new(-0.12, 0.04, -0.2),
];
pub const DEFAULT_HUB_INPUT: Vec3 = Vec3::new(0.0, 0.04, -0.2);
pub const DEFAULT_HUB_SEND: Vec3 = Vec3::new(0.14, 0.04, -0.2);
pub const DEFAULT_HUB_RETURN: Vec3 = Vec3::new(0.16, 0.04, -0.2);
pub const DEFAULT_HUB_MASTER_LEFT: Vec3 = Vec3::new(-0.16, 0.04, -0.2);
pub const DEFAULT_HUB_MASTER_RIGHT: Vec3 = Vec3::new(-0.18, 0.04, -0.2);
pub const DEFAULT_PERIPHERAL_OUTPUT: Vec3 = Vec3::new(0.0, 0.05, -0.18);
pub const DEFAULT_SATELLITE_INPUT: Vec3 = Vec3::new(-0.05, 0.03, -0.12);
pub const DEFAULT_SATELLITE_OUTPUT: Vec3 = Vec3::new(0.05, 0.03, -0.12);
pub const DEFAULT_SPEAKER_INPUT: Vec3 = Vec3::new(0.0, 0.1, -0.15);

// Implicit speaker jack when the catalog lists no inputs
pub const IMPLICIT_SPEAKER_PORT: &str = "Input";

// Cable geometry
pub const CABLE_POINTS: usize = 64; // samples along each rendered curve
pub const CABLE_ARCH_HEIGHT: f32 = 0.25; // lift of the curve midpoint above the chord
pub const CABLE_CHANNEL_ARCH_STEP: f32 = 0.04; // extra lift per channel so parallel cables separate
pub const ENDPOINT_EPSILON: f32 = 1e-4; // endpoint motion below this keeps the old geometry

// Cable palette (cosmetic)
pub const LINE_CHANNEL_COLORS: [[f32; 3]; 4] = [
    [0.9, 0.3, 0.3], // red-ish
    [0.3, 0.9, 0.4], // green-ish
    [0.3, 0.5, 0.9], // blue-ish
    [0.9, 0.8, 0.3], // amber
];
pub const SEND_COLOR: [f32; 3] = [0.95, 0.55, 0.15];
pub const RETURN_COLOR: [f32; 3] = [0.65, 0.35, 0.9];
pub const MASTER_COLOR: [f32; 3] = [0.85, 0.85, 0.85];
