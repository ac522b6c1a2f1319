use core::ffi::CStr;

use crate::mode::ChannelMode;

/// Build-time description of one channel.
///
/// Capacity, mode and name are fixed for the life of the channel. A capacity
/// of zero (or one) is accepted but the channel can never move a byte, since
/// one slot is always kept free to tell "full" from "empty".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Size of the backing storage in bytes.
    pub size: u32,
    /// Overflow policy. Default: [`ChannelMode::BlockIfFull`].
    pub mode: ChannelMode,
    /// Name shown by the probe. Default: none (null pointer in the record).
    pub name: Option<&'static CStr>,
}

impl ChannelConfig {
    /// An unnamed, blocking channel of `size` bytes.
    pub const fn new(size: u32) -> Self {
        Self {
            size,
            mode: ChannelMode::BlockIfFull,
            name: None,
        }
    }

    pub const fn with_mode(self, mode: ChannelMode) -> Self {
        Self { mode, ..self }
    }

    pub const fn with_name(self, name: &'static CStr) -> Self {
        Self {
            name: Some(name),
            ..self
        }
    }

    /// Largest number of bytes that can be in flight at once.
    pub const fn usable_capacity(&self) -> u32 {
        self.size.saturating_sub(1)
    }
}
