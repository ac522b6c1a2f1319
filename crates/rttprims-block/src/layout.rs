//! Byte layout of the control block on the target (4-byte pointers).
//!
//! ```text
//! ┌──────────────┬──────────┬──────────┬──────────────┬─────┬──────────────┐
//! │ id (16B)     │ up (4B)  │ down (4B)│ record 0     │ ... │ record N-1   │
//! │ "SEGGER RTT" │          │          │ (24B)        │     │ (24B)        │
//! └──────────────┴──────────┴──────────┴──────────────┴─────┴──────────────┘
//! ```
//! Up channel records come first, then down channel records. Nothing is
//! padded. On 32-bit targets these offsets are checked against the Rust
//! layout at compile time.

pub const ID_OFFSET: usize = 0;
pub const ID_LEN: usize = 16;
pub const UP_COUNT_OFFSET: usize = 16;
pub const DOWN_COUNT_OFFSET: usize = 20;

/// Header: identifier plus the two channel counts.
pub const HEADER_SIZE: usize = 24;
pub const RECORDS_OFFSET: usize = HEADER_SIZE;
pub const RECORD_SIZE: usize = 24;

/// Field offsets inside one channel record.
pub mod field {
    pub const NAME: usize = 0;
    pub const BUFFER: usize = 4;
    pub const SIZE: usize = 8;
    pub const WRITE: usize = 12;
    pub const READ: usize = 16;
    pub const MODE: usize = 20;
}

/// Offset of the record for channel `index`, counting up channels first.
pub const fn record_offset(index: usize) -> usize {
    RECORDS_OFFSET + index * RECORD_SIZE
}

/// Total size of a block with `up` + `down` channels.
pub const fn block_size(up: usize, down: usize) -> usize {
    record_offset(up + down)
}
