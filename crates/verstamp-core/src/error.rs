//! Error taxonomy for verstamp.
//!
//! Only version-encoding preconditions are fatal; provenance resolution
//! failures degrade to sentinel values and never surface here.

/// Errors produced by verstamp operations.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("version field {field} out of encodable range: {value} (max {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("unknown pre-release identifier: {0}")]
    UnknownIdentifier(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for verstamp operations.
pub type Result<T> = std::result::Result<T, VersionError>;
