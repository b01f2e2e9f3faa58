//! The heap root: slab registry, chain routing, and the oversized bypass.
//!
//! One `Heap` owns everything: a registry of slabs (`Vec<Option<Slab>>`
//! with free-slot reuse) whose slot 0 is the permanent root, and the
//! oversized table. Allocation walks the chain from the root and grows it
//! lazily; release routes by address — oversized table first, then the
//! chain — and returns a non-root slab's mapping the moment it is fully
//! empty. Process-wide use wraps one `Heap` in the hook layer's
//! lazily-initialized global; the engine itself is single-threaded.

use crate::diag::{HeapDump, LeakRecord, LeakReport, SlabDump};
use crate::fault::HeapFault;
use crate::geometry::{MAX_SLAB_ALLOC, MIN_ALIGN, SLAB_CAPACITY, round_up, slab_base};
use crate::header::RegionTag;
use crate::mapping;
use crate::oversized::OversizedTable;
use crate::slab::Slab;

const ROOT_SLOT: usize = 0;

/// The allocator context: slab chain plus oversized table.
#[derive(Debug)]
pub struct Heap {
    slabs: Vec<Option<Slab>>,
    free_slots: Vec<usize>,
    oversized: OversizedTable,
}

impl Heap {
    /// Creates a heap with its permanent root slab. The root's storage is
    /// process-lifetime and is never returned, so its acquisition does not
    /// participate in the recoverable mapping-failure policy.
    #[must_use]
    pub fn new() -> Self {
        let root = Slab::new(
            slab_base(ROOT_SLOT),
            None,
            mapping::map_resident(SLAB_CAPACITY),
        );
        Self {
            slabs: vec![Some(root)],
            free_slots: Vec::new(),
            oversized: OversizedTable::new(),
        }
    }

    /// Allocates `size` bytes with at least `align` alignment of the
    /// rounded size (not of the returned address; addresses are word-
    /// aligned by slab geometry and carry no stronger guarantee).
    ///
    /// Zero-size requests are bumped to one byte so no zero-length used
    /// region can ever exist. The rounded size picks the route: past the
    /// slab ceiling it goes to an individually mapped oversized block,
    /// otherwise first-fit across the chain, growing it by one slab at a
    /// time when every existing slab declines.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<usize, HeapFault> {
        if align == 0 {
            return Err(HeapFault::ZeroAlignment);
        }
        let align = align.max(MIN_ALIGN);
        let size =
            round_up(size.max(1), align).ok_or(HeapFault::MappingFailed { len: size })?;

        if size > MAX_SLAB_ALLOC {
            return self.oversized.alloc(size);
        }

        let mut slot = ROOT_SLOT;
        loop {
            if let Some(offset) = self.slab_mut(slot).try_place(size)? {
                return Ok(self.slab(slot).base() + offset);
            }
            slot = match self.slab(slot).next() {
                Some(next) => next,
                None => self.grow(slot)?,
            };
        }
    }

    /// Releases the allocation at `addr`.
    ///
    /// Oversized blocks are recognized first and unmapped without touching
    /// any slab. Otherwise the chain is walked for the owning slab, which
    /// marks the region freed and coalesces; a non-root slab left fully
    /// empty is unlinked and its mapping returned.
    pub fn release(&mut self, addr: usize) -> Result<(), HeapFault> {
        if self.oversized.owns(addr) {
            return self.oversized.release(addr);
        }

        let mut slot = ROOT_SLOT;
        loop {
            if self.slab(slot).contains(addr) {
                let offset = addr - self.slab(slot).base();
                self.slab_mut(slot).release_at(offset)?;
                if slot != ROOT_SLOT && self.slab(slot).is_vacant() {
                    self.unlink(slot);
                }
                return Ok(());
            }
            match self.slab(slot).next() {
                Some(next) => slot = next,
                None => return Err(HeapFault::ForeignAddress { addr }),
            }
        }
    }

    /// Structural walk of every slab in chain order plus every live
    /// oversized mapping. Read-only; corruption surfaces as a fault.
    pub fn dump(&self) -> Result<HeapDump, HeapFault> {
        let mut slabs = Vec::new();
        let mut slot = Some(ROOT_SLOT);
        while let Some(current) = slot {
            let slab = self.slab(current);
            slabs.push(SlabDump {
                base: slab.base(),
                next_base: slab.next().map(|next| self.slab(next).base()),
                regions: slab.snapshot()?,
            });
            slot = slab.next();
        }
        Ok(HeapDump {
            slabs,
            oversized: self.oversized.records(),
        })
    }

    /// Walks the whole heap and reports every live allocation: used slab
    /// regions with nonzero payload, and every live oversized mapping.
    /// Corruption surfaces exactly as in `dump`.
    pub fn leak_check(&self) -> Result<LeakReport, HeapFault> {
        let mut leaks = Vec::new();
        let mut slot = Some(ROOT_SLOT);
        while let Some(current) = slot {
            let slab = self.slab(current);
            for region in slab.snapshot()? {
                if region.tag == RegionTag::Used && region.len > 0 {
                    leaks.push(LeakRecord {
                        addr: region.addr,
                        len: region.len,
                    });
                }
            }
            slot = slab.next();
        }
        for record in self.oversized.records() {
            leaks.push(LeakRecord {
                addr: record.addr,
                len: record.payload_len,
            });
        }
        Ok(LeakReport { leaks })
    }

    /// Payload bytes of the live allocation at `addr`.
    pub fn payload(&self, addr: usize) -> Result<&[u8], HeapFault> {
        if let Some(bytes) = self.oversized.payload(addr) {
            return Ok(bytes);
        }
        let slot = self.owning_slot(addr)?;
        self.slab(slot).payload(addr - self.slab(slot).base())
    }

    /// Mutable payload bytes of the live allocation at `addr`.
    pub fn payload_mut(&mut self, addr: usize) -> Result<&mut [u8], HeapFault> {
        if self.oversized.owns(addr) {
            return self
                .oversized
                .payload_mut(addr)
                .ok_or(HeapFault::ForeignAddress { addr });
        }
        let slot = self.owning_slot(addr)?;
        let base = self.slab(slot).base();
        self.slab_mut(slot).payload_mut(addr - base)
    }

    /// Number of live slabs in the chain (never below one: the root).
    #[must_use]
    pub fn slab_count(&self) -> usize {
        self.slabs.iter().flatten().count()
    }

    /// Number of live oversized allocations.
    #[must_use]
    pub fn oversized_count(&self) -> usize {
        self.oversized.active_count()
    }

    fn slab(&self, slot: usize) -> &Slab {
        self.slabs[slot].as_ref().expect("live slab slot")
    }

    fn slab_mut(&mut self, slot: usize) -> &mut Slab {
        self.slabs[slot].as_mut().expect("live slab slot")
    }

    fn owning_slot(&self, addr: usize) -> Result<usize, HeapFault> {
        let mut slot = ROOT_SLOT;
        loop {
            if self.slab(slot).contains(addr) {
                return Ok(slot);
            }
            match self.slab(slot).next() {
                Some(next) => slot = next,
                None => return Err(HeapFault::ForeignAddress { addr }),
            }
        }
    }

    /// Maps one more slab and links it behind the current tail.
    fn grow(&mut self, tail: usize) -> Result<usize, HeapFault> {
        let data = mapping::map_anonymous(SLAB_CAPACITY)
            .ok_or(HeapFault::MappingFailed { len: SLAB_CAPACITY })?;
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.slabs.push(None);
                self.slabs.len() - 1
            }
        };
        self.slabs[slot] = Some(Slab::new(slab_base(slot), Some(tail), data));
        self.slab_mut(tail).set_next(Some(slot));
        Ok(slot)
    }

    /// Unlinks a fully empty non-root slab and drops its mapping. The slot
    /// goes back on the free list for the next growth.
    fn unlink(&mut self, slot: usize) {
        let slab = self.slabs[slot].take().expect("live slab slot");
        if let Some(prev) = slab.prev() {
            self.slab_mut(prev).set_next(slab.next());
        }
        if let Some(next) = slab.next() {
            self.slab_mut(next).set_prev(slab.prev());
        }
        self.free_slots.push(slot);
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
