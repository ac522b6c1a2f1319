use crate::config::Direction;

/// Errors that can occur while building a control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The storage handed to a channel is not exactly its configured size.
    #[error("{direction} channel {index}: storage is {actual} bytes, configured size is {expected}")]
    StorageSizeMismatch {
        direction: Direction,
        index: usize,
        expected: u32,
        actual: usize,
    },

    /// The identifier does not fit the 16-byte header field.
    #[error("control block identifier is {len} bytes (max 16)")]
    IdentifierTooLong { len: usize },
}

pub type Result<T> = core::result::Result<T, ConfigError>;
