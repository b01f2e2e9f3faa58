//! Slab and header geometry.
//!
//! All layout constants in one place: slab capacity, header size, the
//! alignment floor, the scrub pattern, and the synthetic address ranges
//! that slab slots and oversized mappings are carved from.

/// Total footprint of one slab, in bytes (16 KiB / 4 pages).
pub const SLAB_CAPACITY: usize = 16 * 1024;

/// Size of one region header: a u32 tag followed by a u32 payload length.
pub const HEADER_SIZE: usize = 8;

/// Alignment floor: every request is aligned to at least the native word.
pub const MIN_ALIGN: usize = size_of::<usize>();

/// Payload length of a fresh slab's single empty region (one leading header
/// and the trailing sentinel header are carved out of the capacity).
pub const INITIAL_FREE: usize = SLAB_CAPACITY - 2 * HEADER_SIZE;

/// Largest payload a slab can ever place. First-fit placement demands room
/// for the allocated region's header plus a trailing free-region header, so
/// the ceiling sits two headers below the initial free payload. Anything
/// larger is served by the oversized path.
pub const MAX_SLAB_ALLOC: usize = INITIAL_FREE - 2 * HEADER_SIZE;

/// Byte written over freshly initialized free space and over headers removed
/// by coalescing, so reads of dead metadata are visible in diagnostics.
pub const SCRUB_BYTE: u8 = 0xEF;

/// A header-sized read of scrubbed memory yields this word. Never a valid
/// tag; diagnostics name it when a stale read is misinterpreted as a header.
pub const SCRUB_WORD: u32 = u32::from_le_bytes([SCRUB_BYTE; 4]);

/// Base of the synthetic address range slab slots are carved from.
pub const SLAB_REGION_BASE: usize = 0x1_0000;

/// Base of the synthetic address range for oversized mappings. High enough
/// that slab and oversized addresses can never collide.
pub const OVERSIZED_BASE: usize = 0x1_0000_0000;

/// Base address of the slab in registry slot `slot`.
#[must_use]
pub const fn slab_base(slot: usize) -> usize {
    SLAB_REGION_BASE + slot * SLAB_CAPACITY
}

/// Rounds `size` up to the next multiple of `align` (any nonzero alignment,
/// not just powers of two). `None` on arithmetic overflow.
#[must_use]
pub fn round_up(size: usize, align: usize) -> Option<usize> {
    size.checked_next_multiple_of(align)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        assert_eq!(INITIAL_FREE, 16368);
        assert_eq!(MAX_SLAB_ALLOC, 16352);
        // Region boundaries stay word-aligned only if the ceiling is too.
        assert_eq!(MAX_SLAB_ALLOC % MIN_ALIGN, 0);
        assert_eq!(SCRUB_WORD, 0xEFEF_EFEF);
    }

    #[test]
    fn test_slab_bases_are_disjoint() {
        assert_eq!(slab_base(0), 0x1_0000);
        assert_eq!(slab_base(1) - slab_base(0), SLAB_CAPACITY);
        assert!(slab_base(1000) < OVERSIZED_BASE);
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 8), Some(0));
        assert_eq!(round_up(1, 8), Some(8));
        assert_eq!(round_up(8, 8), Some(8));
        assert_eq!(round_up(9, 8), Some(16));
        assert_eq!(round_up(5, 24), Some(24));
        assert_eq!(round_up(usize::MAX, 16), None);
    }
}
