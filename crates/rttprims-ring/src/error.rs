/// Errors that can occur while decoding a channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    /// The numeric mode code is not one of the three defined policies.
    #[error("unknown channel mode code {0} (expected 0, 1 or 2)")]
    UnknownCode(u32),

    /// The textual mode name is not recognised.
    #[error("unknown channel mode name (expected skip, trim or block)")]
    UnknownName,
}

pub type Result<T> = core::result::Result<T, ModeError>;
