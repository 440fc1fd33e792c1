//! Cable inference and routing for placed music equipment.
//!
//! Given placed devices with typed jacks, [`synthesize`] works out which ports
//! get cabled together, [`cable`] turns each connection into an arched curve,
//! and [`Rig`] keeps a [`Scene`] in sync with the device set.

pub mod cable;
pub mod catalog;
pub mod channels;
pub mod connection;
pub mod constants;
pub mod device;
pub mod error;
pub mod params;
pub mod ports;
pub mod reconcile;
pub mod rig;
pub mod synth;

pub use cable::{cable_color, CablePath};
pub use catalog::{import_devices, infer_roles, DeviceRecord};
pub use channels::{assign_channels, ChannelChoice, ChannelPlan};
pub use connection::{Connection, ConnectionKey, ConnectionKind, PortRef};
pub use device::{Device, Direction, Port, Role, RoleTags, SetupKind, Side};
pub use error::RigError;
pub use params::RoutingParams;
pub use ports::{find_matching_ports, FallbackLevel, MatchAttempt, MatchOutcome, PortLedger, Rule};
pub use reconcile::{CableDiff, CableHandle, RenderedCable, Scene};
pub use rig::{ReconcileReport, Rig};
pub use synth::{synthesize, Diagnostic, Synthesis};
