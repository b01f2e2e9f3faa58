//! Fault taxonomy for the heap engine.
//!
//! Two categories share one type: `MappingFailed` is ordinary resource
//! exhaustion and surfaces to callers as a null allocation; everything else
//! is caller misuse or heap corruption, which the engine cannot safely
//! continue past. The hook layer checks `is_fatal` and terminates on the
//! unrecoverable category after printing the diagnostic.

use thiserror::Error;

/// A failed heap operation. Every variant names the offending address or
/// tag so the diagnostic is actionable before the process terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapFault {
    /// An anonymous mapping request could not be satisfied. The only
    /// recoverable fault; never retried internally.
    #[error("anonymous mapping of {len} bytes failed")]
    MappingFailed { len: usize },

    /// An allocation was requested with alignment 0.
    #[error("alignment must be nonzero")]
    ZeroAlignment,

    /// The address is not owned by any slab or oversized mapping.
    #[error("address {addr:#x} was not allocated on this heap")]
    ForeignAddress { addr: usize },

    /// The region preceding the address is already marked freed.
    #[error("double free of address {addr:#x}")]
    DoubleFree { addr: usize },

    /// A header read produced a word that is not a defined tag, or a
    /// zero-length region somewhere other than the sentinel.
    #[error("corrupt region header at address {addr:#x} (tag {tag:#010x})")]
    CorruptHeader { addr: usize, tag: u32 },

    /// A region's recorded length walks past its slab boundary.
    #[error("region at address {addr:#x} extends past its slab boundary")]
    TruncatedRegion { addr: usize },
}

impl HeapFault {
    /// True for the unrecoverable category: misuse and corruption. Only
    /// `MappingFailed` may be handled by returning null to the caller.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::MappingFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_failure_is_the_only_recoverable_fault() {
        assert!(!HeapFault::MappingFailed { len: 4096 }.is_fatal());
        assert!(HeapFault::ZeroAlignment.is_fatal());
        assert!(HeapFault::ForeignAddress { addr: 0xDEAD }.is_fatal());
        assert!(HeapFault::DoubleFree { addr: 0x1_0008 }.is_fatal());
        assert!(
            HeapFault::CorruptHeader {
                addr: 0x1_0000,
                tag: 0xEFEF_EFEF
            }
            .is_fatal()
        );
        assert!(HeapFault::TruncatedRegion { addr: 0x1_0000 }.is_fatal());
    }

    #[test]
    fn diagnostics_name_the_offending_address() {
        let fault = HeapFault::DoubleFree { addr: 0x1_0008 };
        assert_eq!(fault.to_string(), "double free of address 0x10008");

        let fault = HeapFault::CorruptHeader {
            addr: 0x1_0020,
            tag: 0xEFEF_EFEF,
        };
        assert_eq!(
            fault.to_string(),
            "corrupt region header at address 0x10020 (tag 0xefefefef)"
        );
    }
}
