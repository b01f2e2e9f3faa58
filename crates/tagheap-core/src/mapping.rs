//! Anonymous memory acquisition.
//!
//! The engine models OS-backed anonymous mappings as owned byte buffers so
//! the rest of the crate stays free of raw pointers. Non-root slabs and
//! oversized blocks go through the fallible path, which reports exhaustion
//! instead of aborting; the root slab uses the infallible path, since its
//! storage is permanently resident for the life of the process.

/// Maps `len` zeroed bytes, or `None` if the reservation fails.
pub(crate) fn map_anonymous(len: usize) -> Option<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).ok()?;
    buf.resize(len, 0);
    Some(buf.into_boxed_slice())
}

/// Maps `len` zeroed bytes for process-lifetime storage. Cannot fail short
/// of the process itself dying.
pub(crate) fn map_resident(len: usize) -> Box<[u8]> {
    vec![0u8; len].into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_zeroed_and_exactly_sized() {
        let buf = map_anonymous(4096).expect("small mapping succeeds");
        assert_eq!(buf.len(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn resident_mapping_matches() {
        let buf = map_resident(64);
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
