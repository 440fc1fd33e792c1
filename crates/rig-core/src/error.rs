//! Hard failures. Routing itself never fails; these cover malformed input and
//! misuse of the [`Rig`](crate::Rig) API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigError {
    /// Device documents could not be parsed.
    #[error("failed to parse device records: {0}")]
    Parse(#[from] serde_json::Error),

    /// A device position was missing or not a finite 3D point.
    #[error("device '{id}' has no usable position")]
    InvalidPosition { id: String },

    /// A rotation was not a finite angle.
    #[error("device '{id}' has no usable rotation")]
    InvalidRotation { id: String },

    /// The same placement was added twice.
    #[error("device '{0}' is already placed")]
    DuplicatePlacement(String),

    /// No placed device carries this unique id.
    #[error("no placed device with unique id '{0}'")]
    UnknownDevice(String),
}
