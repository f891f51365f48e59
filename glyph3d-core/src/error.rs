/// Error types shared by every Glyph3D module
use thiserror::Error;

/// Errors produced by the Glyph3D core.
#[derive(Debug, Error)]
pub enum Glyph3dError {
    #[error("parameter {parameter} = {value} must be positive and finite")]
    InvalidParameter { parameter: &'static str, value: f32 },

    #[error("solid handle does not refer to a solid in this scene")]
    UnknownSolid,

    #[error("unknown {kind}: {name:?}")]
    UnknownName { kind: &'static str, name: String },

    /// A vertex lies exactly on the camera focal plane.
    #[error("vertex lies on the focal plane")]
    DegenerateProjection,

    /// The screen-space triangle has (almost) zero area.
    #[error("degenerate triangle")]
    DegenerateTriangle,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ron::error::SpannedError),
}

/// Convenience type alias for results using [`Glyph3dError`].
pub type Result<T> = std::result::Result<T, Glyph3dError>;

/// Checks that a user supplied quantity is a positive, finite number.
pub(crate) fn ensure_positive(parameter: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Glyph3dError::InvalidParameter { parameter, value })
    }
}
