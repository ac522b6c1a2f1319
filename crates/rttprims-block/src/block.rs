use core::mem::{size_of, MaybeUninit};
use core::ptr;

use rttprims_ring::{Channel, ChannelConfig, Region, HOST_RECORD_SIZE};

use crate::config::{ControlBlockConfig, Direction};
use crate::error::{ConfigError, Result};
use crate::id::ControlBlockId;
use crate::layout;
use crate::port::{Probe, Target};

/// The control block: header followed by every channel record.
///
/// Build it once, before the probe starts scanning, and keep it at a fixed
/// address (a `static`, or a leaked box) for the rest of the program.
#[repr(C)]
pub struct ControlBlock<'a, const UP: usize, const DOWN: usize> {
    id: ControlBlockId,
    up_count: u32,
    down_count: u32,
    up: [Channel<'a>; UP],
    down: [Channel<'a>; DOWN],
}

// SAFETY: positions are atomic words and every byte of channel storage is only
// touched by the single producer or single consumer of its channel. `Target`
// and `Probe` hand out those roles exclusively.
unsafe impl<const UP: usize, const DOWN: usize> Sync for ControlBlock<'_, UP, DOWN> {}

// SAFETY: the block only borrows storage; moving it between threads moves no
// ownership of the bytes.
unsafe impl<const UP: usize, const DOWN: usize> Send for ControlBlock<'_, UP, DOWN> {}

#[cfg(target_pointer_width = "32")]
const _: () = {
    use core::mem::offset_of;

    type Block = ControlBlock<'static, 1, 1>;
    assert!(offset_of!(Block, id) == layout::ID_OFFSET);
    assert!(offset_of!(Block, up_count) == layout::UP_COUNT_OFFSET);
    assert!(offset_of!(Block, down_count) == layout::DOWN_COUNT_OFFSET);
    assert!(offset_of!(Block, up) == layout::record_offset(0));
    assert!(offset_of!(Block, down) == layout::record_offset(1));
    assert!(size_of::<Channel<'static>>() == layout::RECORD_SIZE);
    assert!(size_of::<Block>() == layout::block_size(1, 1));
};

impl<'a, const UP: usize, const DOWN: usize> ControlBlock<'a, UP, DOWN> {
    /// Bytes of the block in memory, and of a full [`snapshot`](Self::snapshot).
    pub const SIZE: usize = size_of::<Self>();

    const LAYOUT: () = assert!(
        size_of::<Self>() == layout::HEADER_SIZE + (UP + DOWN) * size_of::<Channel<'static>>(),
        "control block layout has padding"
    );

    /// Build the block over caller-owned storage, one region per channel.
    ///
    /// # Panics
    ///
    /// Panics if any region differs from its channel's configured size. When
    /// the block is a `static` this is reported at compile time.
    pub const fn new(
        config: &ControlBlockConfig<UP, DOWN>,
        up: [Region<'a>; UP],
        down: [Region<'a>; DOWN],
    ) -> Self {
        let () = Self::LAYOUT;
        match Self::validate(config, &up, &down) {
            Ok(()) => {}
            Err(ConfigError::StorageSizeMismatch {
                direction: Direction::Up,
                ..
            }) => panic!("up channel storage does not match its configured size"),
            Err(_) => panic!("down channel storage does not match its configured size"),
        }
        Self {
            id: config.id,
            up_count: UP as u32,
            down_count: DOWN as u32,
            up: channels(&config.up, up),
            down: channels(&config.down, down),
        }
    }

    /// Build the block over storage sized at runtime (e.g. allocated at startup).
    pub fn try_new(
        config: &ControlBlockConfig<UP, DOWN>,
        up: [Region<'a>; UP],
        down: [Region<'a>; DOWN],
    ) -> Result<Self> {
        if let Err(err) = Self::validate(config, &up, &down) {
            tracing::warn!(error = %err, "control block storage rejected");
            return Err(err);
        }
        let block = Self::new(config, up, down);
        tracing::debug!(id = ?config.id, up = UP, down = DOWN, "control block initialised");
        Ok(block)
    }

    /// Check every region against its configured size.
    pub const fn validate(
        config: &ControlBlockConfig<UP, DOWN>,
        up: &[Region<'a>; UP],
        down: &[Region<'a>; DOWN],
    ) -> Result<()> {
        if let Err(err) = check_sizes(Direction::Up, &config.up, up) {
            return Err(err);
        }
        check_sizes(Direction::Down, &config.down, down)
    }

    /// Write to up channel `I` and return the unwritten suffix.
    ///
    /// `I` is checked at compile time.
    pub fn write<'d, const I: usize>(
        &mut self,
        data: &'d (impl AsRef<[u8]> + ?Sized),
    ) -> &'d [u8] {
        const { assert!(I < UP, "up channel index out of range") };
        // SAFETY: `&mut self` makes this the only producer in the program; the
        // probe only ever consumes up channels.
        unsafe { self.up[I].write(data.as_ref()) }
    }

    /// Read from down channel `I` and return the filled prefix.
    ///
    /// `I` is checked at compile time.
    pub fn read<'d, const I: usize>(&mut self, into: &'d mut [u8]) -> &'d mut [u8] {
        const { assert!(I < DOWN, "down channel index out of range") };
        // SAFETY: `&mut self` makes this the only consumer in the program; the
        // probe only ever produces on down channels.
        unsafe { self.down[I].read(into) }
    }

    /// Split into the target-side and probe-side ports.
    ///
    /// The two ports can be moved to different threads.
    pub fn split(&mut self) -> (Target<'_, 'a, UP, DOWN>, Probe<'_, 'a, UP, DOWN>) {
        let this: &Self = self;
        (Target::new(this), Probe::new(this))
    }

    /// Target-side port of a block that cannot be borrowed mutably, e.g. a `static`.
    ///
    /// # Safety
    ///
    /// At most one `Target` for this block may exist at any time, and
    /// [`write`](Self::write)/[`read`](Self::read) must not run while it does.
    pub unsafe fn target(&self) -> Target<'_, 'a, UP, DOWN> {
        Target::new(self)
    }

    /// Probe-side port of a block that cannot be borrowed mutably.
    ///
    /// # Safety
    ///
    /// At most one `Probe` for this block may exist at any time, and no
    /// external probe may be attached while it does.
    pub unsafe fn probe(&self) -> Probe<'_, 'a, UP, DOWN> {
        Probe::new(self)
    }

    pub const fn id(&self) -> &ControlBlockId {
        &self.id
    }

    pub const fn up_count(&self) -> u32 {
        self.up_count
    }

    pub const fn down_count(&self) -> u32 {
        self.down_count
    }

    pub const fn up_channels(&self) -> &[Channel<'a>; UP] {
        &self.up
    }

    pub const fn down_channels(&self) -> &[Channel<'a>; DOWN] {
        &self.down
    }

    /// Copy the block as the probe sees it into `out` and return the filled
    /// prefix, or `None` if `out` is shorter than [`Self::SIZE`].
    ///
    /// Every position word is read with an atomic load, so this may run while
    /// the target and probe are transferring. Each record is consistent with
    /// itself only as far as its individual words are.
    pub fn snapshot<'o>(&self, out: &'o mut [u8]) -> Option<&'o [u8]> {
        let out = out.get_mut(..Self::SIZE)?;
        let (header, records) = out.split_at_mut(layout::HEADER_SIZE);
        header[layout::ID_OFFSET..][..layout::ID_LEN].copy_from_slice(self.id.as_bytes());
        header[layout::UP_COUNT_OFFSET..][..4].copy_from_slice(&self.up_count.to_ne_bytes());
        header[layout::DOWN_COUNT_OFFSET..][..4].copy_from_slice(&self.down_count.to_ne_bytes());

        let channels = self.up.iter().chain(&self.down);
        for (record, channel) in records.chunks_exact_mut(HOST_RECORD_SIZE).zip(channels) {
            channel.snapshot(record.try_into().ok()?);
        }
        Some(&*out)
    }
}

const fn check_sizes<const N: usize>(
    direction: Direction,
    configs: &[ChannelConfig; N],
    regions: &[Region<'_>; N],
) -> Result<()> {
    let mut index = 0;
    while index < N {
        let expected = configs[index].size;
        let actual = regions[index].len();
        if actual != expected as usize {
            return Err(ConfigError::StorageSizeMismatch {
                direction,
                index,
                expected,
                actual,
            });
        }
        index += 1;
    }
    Ok(())
}

const fn channels<'a, const N: usize>(
    configs: &[ChannelConfig; N],
    regions: [Region<'a>; N],
) -> [Channel<'a>; N] {
    let mut out = MaybeUninit::<[Channel<'a>; N]>::uninit();
    let base = out.as_mut_ptr().cast::<Channel<'a>>();
    let mut i = 0;
    while i < N {
        // SAFETY: each region is read exactly once; `Region` has no destructor.
        let region = unsafe { ptr::read(&regions[i]) };
        // SAFETY: `i < N`, so the slot is inside `out`.
        unsafe { base.add(i).write(Channel::new(&configs[i], region)) };
        i += 1;
    }
    core::mem::forget(regions);
    // SAFETY: every one of the `N` slots was written above.
    unsafe { out.assume_init() }
}
