//! Persistence error types

/// Errors from the key/value store behind the persistence adapter.
///
/// These never abort the grid: callers log a warning and behave as if no
/// saved state existed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    /// The backing storage is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded.
    #[error("malformed value in slot {slot:?}: {message}")]
    Malformed {
        /// The storage slot.
        slot: String,
        /// Decode error description.
        message: String,
    },

    /// Serialization of a value to be stored failed.
    #[error("serialize failed: {0}")]
    Serialize(String),
}

impl PersistError {
    /// Creates an unavailable-storage error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a malformed-value error.
    pub fn malformed(slot: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            slot: slot.into(),
            message: message.into(),
        }
    }
}
