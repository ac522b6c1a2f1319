//! RTT control block.
//!
//! The control block is what a debug probe looks for: it scans target RAM
//! for the 16-byte identifier and then decodes the bytes behind it as
//! - up channel count (4 bytes)
//! - down channel count (4 bytes)
//! - one 24-byte channel record per channel, up channels first
//!
//! The block borrows caller-owned storage, never allocates and must stay at
//! one address for as long as the probe may look at it.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod block;
pub mod config;
pub mod error;
pub mod id;
pub mod layout;
pub mod port;

pub use block::ControlBlock;
pub use config::{ControlBlockConfig, Direction};
pub use error::{ConfigError, Result};
pub use id::ControlBlockId;
pub use port::{Probe, Target};
