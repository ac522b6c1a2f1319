//! Real-time transfer channels between a running program and a debug probe.
//!
//! rttprims lays out a control block in memory that a probe can find by
//! scanning for its identifier, and moves bytes through lock-free
//! single-producer single-consumer rings without stopping the program.
//!
//! # Crate Structure
//!
//! - [`ring`]: channel configuration, overflow modes and the ring engine
//! - [`block`]: the control block, its byte layout and the target/probe ports
//!
//! Both crates are `no_std` and never allocate.

/// Re-export ring types.
pub mod ring {
    pub use rttprims_ring::*;
}

/// Re-export control block types.
pub mod block {
    pub use rttprims_block::*;
}

pub use rttprims_block::{ControlBlock, ControlBlockConfig, ControlBlockId};
pub use rttprims_ring::{ChannelBuffer, ChannelConfig, ChannelMode, Region};
