use core::fmt;

use crate::error::{ConfigError, Result};

/// The 16-byte pattern a probe scans for.
///
/// Use a distinct identifier to host several independent control blocks in
/// one address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ControlBlockId([u8; 16]);

impl ControlBlockId {
    pub const LEN: usize = 16;

    /// `"SEGGER RTT"` followed by six NUL bytes.
    pub const DEFAULT: Self = Self(*b"SEGGER RTT\0\0\0\0\0\0");

    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// NUL-pad a shorter identifier to 16 bytes.
    pub const fn from_prefix(prefix: &[u8]) -> Result<Self> {
        if prefix.len() > Self::LEN {
            return Err(ConfigError::IdentifierTooLong { len: prefix.len() });
        }
        let mut bytes = [0u8; Self::LEN];
        let mut i = 0;
        while i < prefix.len() {
            bytes[i] = prefix[i];
            i += 1;
        }
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// The identifier without trailing NUL padding.
    pub fn trimmed(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(Self::LEN);
        &self.0[..end]
    }
}

impl Default for ControlBlockId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for ControlBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.trimmed()) {
            Ok(text) => write!(f, "ControlBlockId({text:?})"),
            Err(_) => write!(f, "ControlBlockId({:02x?})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_segger_rtt() {
        let id = ControlBlockId::default();
        assert_eq!(&id.as_bytes()[..10], b"SEGGER RTT");
        assert!(id.as_bytes()[10..].iter().all(|&b| b == 0));
        assert_eq!(id.trimmed(), b"SEGGER RTT");
    }

    #[test]
    fn prefix_is_nul_padded() {
        let id = ControlBlockId::from_prefix(b"MY RTT").unwrap();
        assert_eq!(id.trimmed(), b"MY RTT");
        assert_eq!(id.as_bytes().len(), 16);
    }

    #[test]
    fn full_length_prefix_has_no_padding() {
        let id = ControlBlockId::from_prefix(b"0123456789abcdef").unwrap();
        assert_eq!(id.trimmed(), b"0123456789abcdef");
    }

    #[test]
    fn oversized_prefix_rejected() {
        let err = ControlBlockId::from_prefix(b"0123456789abcdefg").unwrap_err();
        assert_eq!(err, ConfigError::IdentifierTooLong { len: 17 });
    }

    #[test]
    fn debug_shows_text() {
        let text = std::format!("{:?}", ControlBlockId::DEFAULT);
        assert_eq!(text, "ControlBlockId(\"SEGGER RTT\")");
    }
}
