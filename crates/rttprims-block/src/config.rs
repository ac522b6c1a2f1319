use core::fmt;

use rttprims_ring::{ChannelConfig, ChannelMode};

use crate::id::ControlBlockId;

/// Direction of a channel, seen from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Target to probe.
    Up,
    /// Probe to target.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// Declarative description of a whole control block.
///
/// Channel counts are type parameters: they are part of the layout and can
/// never change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBlockConfig<const UP: usize, const DOWN: usize> {
    /// Identifier written at the start of the block. Default: `"SEGGER RTT"`.
    pub id: ControlBlockId,
    /// Up channels in record order.
    pub up: [ChannelConfig; UP],
    /// Down channels in record order, placed after all up channels.
    pub down: [ChannelConfig; DOWN],
}

impl<const UP: usize, const DOWN: usize> ControlBlockConfig<UP, DOWN> {
    pub const fn new(up: [ChannelConfig; UP], down: [ChannelConfig; DOWN]) -> Self {
        Self {
            id: ControlBlockId::DEFAULT,
            up,
            down,
        }
    }

    pub const fn with_id(self, id: ControlBlockId) -> Self {
        Self { id, ..self }
    }

    pub const fn channel_count(&self) -> usize {
        UP + DOWN
    }
}

impl<const UP: usize> ControlBlockConfig<UP, 0> {
    /// Unnamed up channels sharing one mode, no down channels.
    pub const fn up_only(mode: ChannelMode, sizes: [u32; UP]) -> Self {
        let mut up = [ChannelConfig::new(0); UP];
        let mut i = 0;
        while i < UP {
            up[i] = ChannelConfig::new(sizes[i]).with_mode(mode);
            i += 1;
        }
        Self::new(up, [])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_only_applies_one_mode() {
        const CFG: ControlBlockConfig<2, 0> =
            ControlBlockConfig::up_only(ChannelMode::NoBlockSkip, [512, 64]);

        assert_eq!(CFG.id, ControlBlockId::DEFAULT);
        assert_eq!(CFG.up[0].size, 512);
        assert_eq!(CFG.up[1].size, 64);
        assert!(CFG.up.iter().all(|c| c.mode == ChannelMode::NoBlockSkip));
        assert!(CFG.up.iter().all(|c| c.name.is_none()));
        assert_eq!(CFG.channel_count(), 2);
    }

    #[test]
    fn custom_id_replaces_default() {
        let id = ControlBlockId::new(*b"ANOTHER RTT\0\0\0\0\0");
        let cfg = ControlBlockConfig::new([ChannelConfig::new(16)], [ChannelConfig::new(16)])
            .with_id(id);
        assert_eq!(cfg.id, id);
        assert_eq!(cfg.channel_count(), 2);
    }

    #[test]
    fn direction_display() {
        assert_eq!(std::format!("{}", Direction::Up), "up");
        assert_eq!(std::format!("{}", Direction::Down), "down");
    }
}
