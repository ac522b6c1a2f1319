//! The two sides of a control block.
//!
//! Every channel has exactly one producer and one consumer. [`Target`] is
//! the producer of up channels and the consumer of down channels; [`Probe`]
//! is the opposite. A hardware debug probe plays the `Probe` role from
//! outside the program, so an in-process `Probe` is only for hosts and tests.

use crate::block::ControlBlock;

/// Embedding-side handle: writes up channels, reads down channels.
pub struct Target<'b, 'a, const UP: usize, const DOWN: usize> {
    block: &'b ControlBlock<'a, UP, DOWN>,
}

/// Observer-side handle: reads up channels, writes down channels.
pub struct Probe<'b, 'a, const UP: usize, const DOWN: usize> {
    block: &'b ControlBlock<'a, UP, DOWN>,
}

impl<'b, 'a, const UP: usize, const DOWN: usize> Target<'b, 'a, UP, DOWN> {
    pub(crate) const fn new(block: &'b ControlBlock<'a, UP, DOWN>) -> Self {
        Self { block }
    }

    /// Write to up channel `I` and return the unwritten suffix.
    pub fn write<'d, const I: usize>(
        &mut self,
        data: &'d (impl AsRef<[u8]> + ?Sized),
    ) -> &'d [u8] {
        const { assert!(I < UP, "up channel index out of range") };
        // SAFETY: only one `Target` exists per block, and `&mut self`
        // serialises its calls.
        unsafe { self.block.up_channels()[I].write(data.as_ref()) }
    }

    /// Read from down channel `I` and return the filled prefix.
    pub fn read<'d, const I: usize>(&mut self, into: &'d mut [u8]) -> &'d mut [u8] {
        const { assert!(I < DOWN, "down channel index out of range") };
        // SAFETY: as for `write`; `Probe` never consumes down channels.
        unsafe { self.block.down_channels()[I].read(into) }
    }

    pub fn block(&self) -> &'b ControlBlock<'a, UP, DOWN> {
        self.block
    }
}

impl<'b, 'a, const UP: usize, const DOWN: usize> Probe<'b, 'a, UP, DOWN> {
    pub(crate) const fn new(block: &'b ControlBlock<'a, UP, DOWN>) -> Self {
        Self { block }
    }

    /// Drain up channel `I` into `into` and return the filled prefix.
    pub fn read<'d, const I: usize>(&mut self, into: &'d mut [u8]) -> &'d mut [u8] {
        const { assert!(I < UP, "up channel index out of range") };
        // SAFETY: only one `Probe` exists per block, and `Target` never
        // consumes up channels.
        unsafe { self.block.up_channels()[I].read(into) }
    }

    /// Send to down channel `I` and return the unwritten suffix.
    pub fn write<'d, const I: usize>(
        &mut self,
        data: &'d (impl AsRef<[u8]> + ?Sized),
    ) -> &'d [u8] {
        const { assert!(I < DOWN, "down channel index out of range") };
        // SAFETY: as for `read`; `Target` never produces on down channels.
        unsafe { self.block.down_channels()[I].write(data.as_ref()) }
    }

    pub fn block(&self) -> &'b ControlBlock<'a, UP, DOWN> {
        self.block
    }
}
