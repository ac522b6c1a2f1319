//! Lock-free ring-buffer transfer engine for RTT (Real-Time Transfer) channels.
//!
//! Every channel is a circular byte store shared between two actors: the
//! firmware running on the target and a debug probe that reads and writes the
//! same memory out of band. Each channel record is laid out exactly as the
//! probe expects:
//! - name pointer (NUL-terminated string or null)
//! - buffer pointer
//! - buffer size, write offset, read offset and mode, 4 bytes each
//!
//! No allocation, no locks, no error path while transferring.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod channel;
pub mod config;
pub mod error;
pub mod mode;
pub mod storage;

mod sync;
mod transfer;

pub use channel::{Channel, HOST_RECORD_SIZE};
pub use config::ChannelConfig;
pub use error::{ModeError, Result};
pub use mode::ChannelMode;
pub use storage::{ChannelBuffer, Region};
