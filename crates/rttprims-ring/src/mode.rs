//! Channel overflow policies.
//!
//! The numeric codes are stored in the `flags` word of every channel record
//! and probes decode them for display, so they never change:
//! - 0: skip (all-or-nothing)
//! - 1: trim (partial fit)
//! - 2: block (spin until the whole request is transferred)

use core::fmt;
use core::str::FromStr;

use crate::error::{ModeError, Result};

/// What a transfer does when the ring cannot take (or supply) the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ChannelMode {
    /// Transfer the whole request or nothing at all.
    NoBlockSkip = 0,
    /// Transfer whatever currently fits and hand back the rest.
    NoBlockTrim = 1,
    /// Busy-wait until the counterpart makes room, with no timeout.
    ///
    /// If the probe never drains the channel the caller never returns.
    #[default]
    BlockIfFull = 2,
}

impl ChannelMode {
    /// The code stored in the channel record.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decode a record code.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::NoBlockSkip),
            1 => Some(Self::NoBlockTrim),
            2 => Some(Self::BlockIfFull),
            _ => None,
        }
    }

    /// Short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoBlockSkip => "skip",
            Self::NoBlockTrim => "trim",
            Self::BlockIfFull => "block",
        }
    }

    /// Returns true if transfers in this mode may spin.
    pub const fn blocks(self) -> bool {
        matches!(self, Self::BlockIfFull)
    }
}

impl TryFrom<u32> for ChannelMode {
    type Error = ModeError;

    fn try_from(code: u32) -> Result<Self> {
        Self::from_code(code).ok_or(ModeError::UnknownCode(code))
    }
}

impl FromStr for ChannelMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "skip" | "no-block-skip" => Ok(Self::NoBlockSkip),
            "trim" | "no-block-trim" => Ok(Self::NoBlockTrim),
            "block" | "block-if-full" => Ok(Self::BlockIfFull),
            _ => Err(ModeError::UnknownName),
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ChannelMode::NoBlockSkip.code(), 0);
        assert_eq!(ChannelMode::NoBlockTrim.code(), 1);
        assert_eq!(ChannelMode::BlockIfFull.code(), 2);
        assert_eq!(core::mem::size_of::<ChannelMode>(), 4);
    }

    #[test]
    fn decodes_known_codes() {
        for mode in [
            ChannelMode::NoBlockSkip,
            ChannelMode::NoBlockTrim,
            ChannelMode::BlockIfFull,
        ] {
            assert_eq!(ChannelMode::try_from(mode.code()), Ok(mode));
        }
    }

    #[test]
    fn rejects_unknown_code() {
        assert_eq!(ChannelMode::try_from(3), Err(ModeError::UnknownCode(3)));
        assert_eq!(ChannelMode::from_code(u32::MAX), None);
    }

    #[test]
    fn parses_names() {
        assert_eq!("skip".parse::<ChannelMode>(), Ok(ChannelMode::NoBlockSkip));
        assert_eq!("no-block-trim".parse::<ChannelMode>(), Ok(ChannelMode::NoBlockTrim));
        assert_eq!(" block ".parse::<ChannelMode>(), Ok(ChannelMode::BlockIfFull));
        assert_eq!("drop".parse::<ChannelMode>(), Err(ModeError::UnknownName));
    }

    #[test]
    fn default_is_block() {
        assert_eq!(ChannelMode::default(), ChannelMode::BlockIfFull);
        assert!(ChannelMode::default().blocks());
        assert!(!ChannelMode::NoBlockTrim.blocks());
    }
}
