//! Caller-owned channel storage.
//!
//! Channels never own or copy their backing bytes. The embedding application
//! allocates them (usually as a `static` [`ChannelBuffer`], or on the heap
//! before construction) and hands a borrowed [`Region`] to the channel. The
//! region's lifetime keeps the storage alive for as long as the channel.

use core::cell::UnsafeCell;
use core::marker::PhantomData;

/// Fixed-size storage for one channel that can live in a `static`.
#[repr(transparent)]
pub struct ChannelBuffer<const N: usize> {
    bytes: UnsafeCell<[u8; N]>,
}

// SAFETY: the bytes are only touched through a `Channel`, whose single-producer
// single-consumer contract keeps the two sides on disjoint ranges.
unsafe impl<const N: usize> Sync for ChannelBuffer<N> {}

impl<const N: usize> ChannelBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new([0; N]),
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Borrow this buffer as channel storage.
    ///
    /// # Safety
    ///
    /// Each buffer backs at most one channel. The returned region must be the
    /// only one ever created over this buffer; two channels sharing the bytes
    /// would let two producers write them at once.
    ///
    /// ```compile_fail,E0133
    /// use rttprims_ring::ChannelBuffer;
    ///
    /// static TERMINAL: ChannelBuffer<16> = ChannelBuffer::new();
    /// let _ = TERMINAL.region();
    /// ```
    pub const unsafe fn region(&self) -> Region<'_> {
        // SAFETY: forwarded to the caller.
        unsafe { Region::from_buffer(self) }
    }
}

impl<const N: usize> Default for ChannelBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed byte region handed to exactly one channel.
#[derive(Debug)]
pub struct Region<'a> {
    ptr: *mut u8,
    len: usize,
    _borrow: PhantomData<&'a mut [u8]>,
}

impl<'a> Region<'a> {
    /// # Safety
    ///
    /// Same contract as [`ChannelBuffer::region`]: one region per buffer.
    pub const unsafe fn from_buffer<const N: usize>(buffer: &'a ChannelBuffer<N>) -> Self {
        Self {
            ptr: buffer.bytes.get().cast::<u8>(),
            len: N,
            _borrow: PhantomData,
        }
    }

    /// Use caller-allocated memory, e.g. a boxed slice created at startup.
    ///
    /// The exclusive borrow keeps any second region off the same bytes:
    ///
    /// ```compile_fail,E0499
    /// use rttprims_ring::Region;
    ///
    /// let mut storage = [0u8; 16];
    /// let up = Region::from_slice(&mut storage);
    /// let down = Region::from_slice(&mut storage);
    /// drop((up, down));
    /// ```
    pub const fn from_slice(slice: &'a mut [u8]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _borrow: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STATIC_BUFFER: ChannelBuffer<32> = ChannelBuffer::new();

    #[test]
    fn static_buffer_region_covers_whole_buffer() {
        // SAFETY: the only region over STATIC_BUFFER.
        let region = unsafe { STATIC_BUFFER.region() };
        assert_eq!(region.len(), 32);
        assert!(!region.is_empty());
        let expected: *const u8 = STATIC_BUFFER.bytes.get().cast_const().cast();
        assert_eq!(region.as_mut_ptr().cast_const(), expected);
    }

    #[test]
    fn slice_region_borrows_caller_memory() {
        let mut heap = std::vec![0u8; 100].into_boxed_slice();
        let expected = heap.as_mut_ptr();
        let region = Region::from_slice(&mut heap);
        assert_eq!(region.len(), 100);
        assert_eq!(region.as_mut_ptr(), expected);
    }

    #[test]
    fn zero_sized_buffer_is_empty() {
        let buffer = ChannelBuffer::<0>::new();
        assert!(buffer.is_empty());
        // SAFETY: single use.
        assert!(unsafe { buffer.region() }.is_empty());
    }
}
