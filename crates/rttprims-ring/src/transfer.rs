//! Position arithmetic shared by both transfer directions.
//!
//! Every function returns the size of one *contiguous* step: a single copy
//! never wraps past the physical end of the buffer.

/// Bytes the producer may copy starting at `write`, given the consumer's `read`.
///
/// The slot just behind `read` is never filled, so `write == read` always
/// means empty.
pub(crate) fn writable(size: u32, write: u32, read: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let free = if read > write {
        read - write - 1
    } else {
        size - (write - read + 1)
    };
    free.min(size - write)
}

/// Bytes the consumer may copy starting at `read`, given the producer's `write`.
///
/// A `write` at or past `size` is capped to the physical end.
pub(crate) fn readable(size: u32, read: u32, write: u32) -> u32 {
    if read > write {
        size - read
    } else {
        (write - read).min(size - read)
    }
}

/// Position after moving `n` bytes forward from `pos`.
///
/// `pos + n` never exceeds `size`, so only the exact-end case needs folding.
pub(crate) fn advance(size: u32, pos: u32, n: u32) -> u32 {
    if size.is_power_of_two() {
        (pos + n) & (size - 1)
    } else {
        let next = pos + n;
        if next == size {
            0
        } else {
            next
        }
    }
}

/// Bytes currently in flight between `read` and `write`.
pub(crate) fn in_flight(size: u32, read: u32, write: u32) -> u32 {
    if write >= read {
        write - read
    } else {
        size - read + write
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_reserves_slot_before_read() {
        // empty, read at 0: may not fill the last slot
        assert_eq!(writable(16, 0, 0), 15);
        // empty, read in the middle: capped at the physical end
        assert_eq!(writable(16, 10, 10), 6);
        // write behind read
        assert_eq!(writable(16, 3, 10), 6);
        // full
        assert_eq!(writable(16, 9, 10), 0);
        assert_eq!(writable(16, 15, 0), 0);
    }

    #[test]
    fn readable_stops_at_write_or_end() {
        assert_eq!(readable(16, 0, 0), 0);
        assert_eq!(readable(16, 2, 10), 8);
        assert_eq!(readable(16, 12, 4), 4);
        assert_eq!(readable(16, 0, 15), 15);
    }

    #[test]
    fn readable_caps_write_past_end() {
        assert_eq!(readable(16, 4, 40), 12);
        assert_eq!(readable(16, 0, 16), 16);
        assert_eq!(readable(12, 11, u32::MAX), 1);
    }

    #[test]
    fn zero_size_never_moves() {
        assert_eq!(writable(0, 0, 0), 0);
        assert_eq!(readable(0, 0, 0), 0);
        assert_eq!(in_flight(0, 0, 0), 0);
    }

    #[test]
    fn masked_and_general_advance_agree() {
        for size in 1..=64u32 {
            for pos in 0..size {
                for n in 0..=(size - pos) {
                    assert_eq!(
                        advance(size, pos, n),
                        (pos + n) % size,
                        "size={size} pos={pos} n={n}"
                    );
                }
            }
        }
    }

    #[test]
    fn contiguous_steps_add_up_to_total_room() {
        for size in 2..=24u32 {
            for read in 0..size {
                for write in 0..size {
                    let used = in_flight(size, read, write);
                    let first = writable(size, write, read);
                    let second = writable(size, advance(size, write, first), read);
                    assert_eq!(first + second, size - 1 - used, "size={size} r={read} w={write}");

                    let first = readable(size, read, write);
                    let second = readable(size, advance(size, read, first), write);
                    assert_eq!(first + second, used, "size={size} r={read} w={write}");
                }
            }
        }
    }
}
