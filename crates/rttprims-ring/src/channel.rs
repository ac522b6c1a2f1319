//! The per-channel ring record and its transfer algorithm.
//!
//! Record layout (`#[repr(C)]`, 24 bytes on 32-bit targets):
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ name     │ buffer   │ size     │ write    │ read     │ mode     │
//! │ (ptr)    │ (ptr)    │ (u32)    │ (u32)    │ (u32)    │ (u32)    │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//! The producer side owns `write`, the consumer side owns `read`. Each side
//! reloads the other's word on every step and never writes it. The mode word
//! holds the raw code, which the probe may overwrite.

use core::ffi::CStr;
use core::marker::PhantomData;
use core::ptr;
use core::mem::size_of;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::ChannelConfig;
use crate::mode::ChannelMode;
use crate::storage::Region;
use crate::sync;
use crate::transfer;

/// Bytes of one record on the machine running this code.
pub const HOST_RECORD_SIZE: usize = size_of::<Channel<'static>>();

#[cfg(target_pointer_width = "32")]
const _: () = assert!(HOST_RECORD_SIZE == 24);

const _: () = assert!(HOST_RECORD_SIZE == 2 * size_of::<usize>() + 16);

/// One channel of the control block.
#[derive(Debug)]
#[repr(C)]
pub struct Channel<'a> {
    name: *const u8,
    buffer: *mut u8,
    size: u32,
    write: AtomicU32,
    read: AtomicU32,
    mode: AtomicU32,
    _storage: PhantomData<&'a mut [u8]>,
}

#[derive(Clone, Copy)]
enum Side {
    Producer,
    Consumer,
}

impl<'a> Channel<'a> {
    /// Create an empty channel over `storage`.
    ///
    /// # Panics
    ///
    /// Panics if the storage length differs from `config.size`. In a `static`
    /// initializer this is a compile error.
    pub const fn new(config: &ChannelConfig, storage: Region<'a>) -> Self {
        assert!(
            storage.len() == config.size as usize,
            "channel storage length does not match configured size"
        );
        let name = match config.name {
            Some(name) => name.as_ptr().cast::<u8>(),
            None => ptr::null(),
        };
        Self {
            name,
            buffer: storage.as_mut_ptr(),
            size: config.size,
            write: AtomicU32::new(0),
            read: AtomicU32::new(0),
            mode: AtomicU32::new(config.mode.code()),
            _storage: PhantomData,
        }
    }

    /// Copy `data` into the ring and return the suffix that was not written.
    ///
    /// - skip: either all of `data` is written or none of it.
    /// - trim: as much as currently fits is written.
    /// - block: spins until every byte is written.
    ///
    /// # Safety
    ///
    /// The caller must be the only producer of this channel: no other thread,
    /// interrupt handler or probe may write to it concurrently.
    pub unsafe fn write<'d>(&self, data: &'d [u8]) -> &'d [u8] {
        let src = data.as_ptr();
        // SAFETY: single producer per the contract above.
        let written = unsafe {
            self.transfer(Side::Producer, data.len(), |offset, ring, n| {
                // SAFETY: `offset + n <= data.len()` and `ring` has `n` bytes up to the
                // physical end of the buffer, which the consumer is not reading.
                unsafe { ptr::copy_nonoverlapping(src.add(offset), ring, n) }
            })
        };
        &data[written..]
    }

    /// Copy from the ring into `into` and return the filled prefix.
    ///
    /// The mode applies the same way as for [`write`](Self::write); under skip
    /// nothing is read unless `into` can be filled completely.
    ///
    /// # Safety
    ///
    /// The caller must be the only consumer of this channel.
    pub unsafe fn read<'d>(&self, into: &'d mut [u8]) -> &'d mut [u8] {
        let dst = into.as_mut_ptr();
        // SAFETY: single consumer per the contract above.
        let filled = unsafe {
            self.transfer(Side::Consumer, into.len(), |offset, ring, n| {
                // SAFETY: `offset + n <= into.len()` and the producer has published these
                // `n` bytes and will not touch them until `read` moves past them.
                unsafe { ptr::copy_nonoverlapping(ring.cast_const(), dst.add(offset), n) }
            })
        };
        &mut into[..filled]
    }

    /// Move up to `len` bytes and return how many moved.
    ///
    /// `copy(offset, ring, n)` moves `n` bytes between request offset `offset`
    /// and ring address `ring`.
    unsafe fn transfer(
        &self,
        side: Side,
        len: usize,
        mut copy: impl FnMut(usize, *mut u8, usize),
    ) -> usize {
        let (own, counterpart) = match side {
            Side::Producer => (&self.write, &self.read),
            Side::Consumer => (&self.read, &self.write),
        };
        let step = |pos: u32, other: u32| match side {
            Side::Producer => transfer::writable(self.size, pos, other),
            Side::Consumer => transfer::readable(self.size, pos, other),
        };

        let mode = self.policy();
        let mut pos = own.load(sync::OWN);
        let mut done = 0usize;
        while done < len {
            let remaining = u32::try_from(len - done).unwrap_or(u32::MAX);
            let other = counterpart.load(sync::LOAD);
            let n = step(pos, other).min(remaining);

            if n == 0 {
                match mode {
                    ChannelMode::BlockIfFull => continue,
                    ChannelMode::NoBlockSkip | ChannelMode::NoBlockTrim => break,
                }
            }

            if mode == ChannelMode::NoBlockSkip {
                // At most one wrap separates us from the end of the request: look at
                // the segment after a hypothetical advance before committing anything.
                let rest = remaining - n;
                let next = step(transfer::advance(self.size, pos, n), other).min(rest);
                if n + next != remaining {
                    tracing::trace!(
                        requested = remaining,
                        room = n + next,
                        "skip: request dropped"
                    );
                    break;
                }
            }

            // SAFETY: `pos < size` and `n <= size - pos`, so the range stays inside the
            // caller's storage, which outlives `'a`.
            copy(done, unsafe { self.buffer.add(pos as usize) }, n as usize);
            pos = transfer::advance(self.size, pos, n);
            own.store(pos, sync::STORE);
            done += n as usize;
        }
        done
    }

    pub const fn capacity(&self) -> u32 {
        self.size
    }

    /// The decoded mode word, or `None` if it holds an unknown code.
    pub fn mode(&self) -> Option<ChannelMode> {
        ChannelMode::from_code(self.mode_code())
    }

    pub fn mode_code(&self) -> u32 {
        self.mode.load(Ordering::Relaxed)
    }

    /// Mode applied to a transfer. Unknown codes transfer as trim.
    fn policy(&self) -> ChannelMode {
        self.mode().unwrap_or(ChannelMode::NoBlockTrim)
    }

    pub fn name(&self) -> Option<&'static CStr> {
        if self.name.is_null() {
            return None;
        }
        // SAFETY: a non-null name always comes from a `&'static CStr` in `new`.
        Some(unsafe { CStr::from_ptr(self.name.cast()) })
    }

    /// Address of the backing storage, as the probe sees it.
    pub fn buffer_ptr(&self) -> *const u8 {
        self.buffer.cast_const()
    }

    pub fn write_position(&self) -> u32 {
        self.write.load(sync::LOAD)
    }

    pub fn read_position(&self) -> u32 {
        self.read.load(sync::LOAD)
    }

    /// Bytes written but not yet read.
    pub fn bytes_available(&self) -> u32 {
        transfer::in_flight(self.size, self.read_position(), self.write_position())
    }

    /// Bytes that can be written before the ring is full.
    pub fn free_space(&self) -> u32 {
        self.size.saturating_sub(1) - self.bytes_available()
    }

    pub fn is_empty(&self) -> bool {
        self.write_position() == self.read_position()
    }

    /// Copy the record as it sits in memory into `out`.
    ///
    /// Positions and mode are loaded atomically, so a snapshot may be taken
    /// while either side is transferring.
    pub fn snapshot(&self, out: &mut [u8; HOST_RECORD_SIZE]) {
        let ptr_width = size_of::<usize>();
        let (pointers, words) = out.split_at_mut(2 * ptr_width);
        pointers[..ptr_width].copy_from_slice(&self.name.addr().to_ne_bytes());
        pointers[ptr_width..].copy_from_slice(&self.buffer.addr().to_ne_bytes());

        let values = [
            self.size,
            self.write.load(Ordering::Relaxed),
            self.read.load(Ordering::Relaxed),
            self.mode.load(Ordering::Relaxed),
        ];
        for (word, value) in words.chunks_exact_mut(4).zip(values) {
            word.copy_from_slice(&value.to_ne_bytes());
        }
    }
}
