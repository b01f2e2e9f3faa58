//! Diagnostic data model: heap dumps and leak reports.
//!
//! The engine produces structured records; rendering to text happens in the
//! `Display` impls so the hook layer and the harness can print the same
//! thing while machine consumers keep the data.

use std::fmt;

use crate::header::RegionTag;

/// One region as seen by a structural walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRecord {
    /// Header offset within the slab's data area.
    pub offset: usize,
    /// Payload length in bytes.
    pub len: usize,
    /// Offset of the successor header, if this is not the sentinel.
    pub next_offset: Option<usize>,
    /// Region state.
    pub tag: RegionTag,
    /// User-visible payload address (header address + header size).
    pub addr: usize,
}

/// One slab's regions, in address order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlabDump {
    /// Base address of the slab.
    pub base: usize,
    /// Base address of the next slab in the chain, if any.
    pub next_base: Option<usize>,
    /// Every region in the slab, sentinel included.
    pub regions: Vec<RegionRecord>,
}

/// One live oversized mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OversizedRecord {
    /// User-visible payload address.
    pub addr: usize,
    /// Base address of the mapping (header address).
    pub base: usize,
    /// Full mapped length, header included.
    pub mapped_len: usize,
    /// Payload length.
    pub payload_len: usize,
}

/// A structural walk of the whole heap: every slab in chain order, then
/// every live oversized mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapDump {
    pub slabs: Vec<SlabDump>,
    pub oversized: Vec<OversizedRecord>,
}

impl fmt::Display for HeapDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slab in &self.slabs {
            match slab.next_base {
                Some(next) => writeln!(f, " :: slab {:#x}; next = {next:#x}", slab.base)?,
                None => writeln!(f, " :: slab {:#x}; next = none", slab.base)?,
            }
            for region in &slab.regions {
                write!(f, "    * {} +{}", region.offset, region.len)?;
                if let Some(next) = region.next_offset {
                    write!(f, " next: {next}")?;
                }
                if region.tag.is_available() {
                    write!(f, " (available)")?;
                }
                if region.tag == RegionTag::Freed {
                    write!(f, " (freed)")?;
                }
                writeln!(f, " {} :: addr: {:#x}", region.tag.name(), region.addr)?;
            }
        }
        for block in &self.oversized {
            writeln!(
                f,
                " :: oversized {:#x} +{} (mapped {} at {:#x})",
                block.addr, block.payload_len, block.mapped_len, block.base
            )?;
        }
        Ok(())
    }
}

/// One leaked allocation: a region still marked used at leak-check time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakRecord {
    /// User-visible payload address.
    pub addr: usize,
    /// Payload length in bytes.
    pub len: usize,
}

/// Outcome of a leak check. An empty `leaks` list is the explicit clean
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeakReport {
    pub leaks: Vec<LeakRecord>,
}

impl LeakReport {
    /// True when the walk found no live allocation.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "(leak check) no leak found");
        }
        for leak in &self.leaks {
            writeln!(f, "(leak check) leaked {} bytes at {:#x}", leak.len, leak.addr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_render_includes_offset_length_successor_and_class() {
        let dump = HeapDump {
            slabs: vec![SlabDump {
                base: 0x1_0000,
                next_base: None,
                regions: vec![
                    RegionRecord {
                        offset: 0,
                        len: 400,
                        next_offset: Some(408),
                        tag: RegionTag::Used,
                        addr: 0x1_0008,
                    },
                    RegionRecord {
                        offset: 16376,
                        len: 0,
                        next_offset: None,
                        tag: RegionTag::EndEdge,
                        addr: 0x1_0000 + 16384,
                    },
                ],
            }],
            oversized: Vec::new(),
        };
        let text = dump.to_string();
        assert!(text.contains(" :: slab 0x10000; next = none"));
        assert!(text.contains("* 0 +400 next: 408 USED :: addr: 0x10008"));
        assert!(text.contains("* 16376 +0 END_EDGE"));
    }

    #[test]
    fn freed_region_renders_both_classifications() {
        let dump = HeapDump {
            slabs: vec![SlabDump {
                base: 0x1_0000,
                next_base: None,
                regions: vec![RegionRecord {
                    offset: 0,
                    len: 64,
                    next_offset: Some(72),
                    tag: RegionTag::Freed,
                    addr: 0x1_0008,
                }],
            }],
            oversized: Vec::new(),
        };
        let text = dump.to_string();
        assert!(text.contains("(available) (freed) FREED"));
    }

    #[test]
    fn leak_report_render() {
        let clean = LeakReport::default();
        assert!(clean.is_clean());
        assert_eq!(clean.to_string(), "(leak check) no leak found\n");

        let dirty = LeakReport {
            leaks: vec![LeakRecord {
                addr: 0x1_0008,
                len: 256,
            }],
        };
        assert!(!dirty.is_clean());
        assert_eq!(
            dirty.to_string(),
            "(leak check) leaked 256 bytes at 0x10008\n"
        );
    }
}
