//! Allocation hooks (`th_malloc`, `th_free`, diagnostics, placement mode).
//!
//! The process-wide heap lives behind a `OnceLock`: it is constructed
//! exactly once, on the first allocation or leak check, and every entry
//! point serializes on one mutex (the engine itself is single-threaded by
//! design). Null is 0 in the synthetic address space, so `th_malloc`
//! reports a recoverable mapping failure as 0; everything else that goes
//! wrong is misuse or corruption and terminates per the fatal policy.

use std::sync::OnceLock;

use parking_lot::Mutex;
use tagheap_core::{Heap, HeapFault};

use crate::config::{FatalPolicy, fatal_policy};

static HEAP: OnceLock<Mutex<Heap>> = OnceLock::new();

/// The process-wide heap, constructed on first use.
fn global_heap() -> &'static Mutex<Heap> {
    HEAP.get_or_init(|| Mutex::new(Heap::new()))
}

/// Terminates on an unrecoverable fault, after emitting the diagnostic.
fn fail(fault: HeapFault) -> ! {
    eprintln!("tagheap: {fault}");
    match fatal_policy() {
        FatalPolicy::Panic => panic!("tagheap: {fault}"),
        FatalPolicy::Abort => std::process::abort(),
    }
}

/// Allocates `size` bytes with at least `align` alignment of the rounded
/// size. Returns 0 when the OS declines to map more memory; terminates on
/// misuse (zero alignment) or corruption.
#[unsafe(no_mangle)]
pub extern "C" fn th_malloc(size: usize, align: usize) -> usize {
    match global_heap().lock().allocate(size, align) {
        Ok(addr) => addr,
        Err(fault) if fault.is_fatal() => fail(fault),
        Err(_) => 0,
    }
}

/// Releases a previous allocation. Every fault on this path — foreign
/// address, double free, corrupt header — is unrecoverable.
#[unsafe(no_mangle)]
pub extern "C" fn th_free(addr: usize) {
    if let Err(fault) = global_heap().lock().release(addr) {
        fail(fault);
    }
}

/// Prints the structural heap dump. Does not force initialization: before
/// the first allocation there is no heap to walk, and the dump says so.
#[unsafe(no_mangle)]
pub extern "C" fn th_heap_dump() {
    println!("----- HEAP DUMP BEGIN -----");
    match HEAP.get() {
        None => println!("(heap is not initialized)"),
        Some(heap) => match heap.lock().dump() {
            Ok(dump) => print!("{dump}"),
            Err(fault) => fail(fault),
        },
    }
    println!("----- HEAP DUMP END -----");
}

/// Runs the leak check and prints the report (or the explicit clean
/// outcome). Initializes the heap if this is the first call of the
/// process, which trivially reports clean.
#[unsafe(no_mangle)]
pub extern "C" fn th_leak_check() {
    match global_heap().lock().leak_check() {
        Ok(report) => print!("{report}"),
        Err(fault) => fail(fault),
    }
}

/// Placement-only construction hook: returns the caller-supplied address
/// unchanged and performs no allocation.
#[unsafe(no_mangle)]
pub extern "C" fn th_emplace(addr: usize) -> usize {
    addr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emplace_is_identity() {
        assert_eq!(th_emplace(0x1234), 0x1234);
        assert_eq!(th_emplace(0), 0);
    }

    #[test]
    fn malloc_free_round_trip() {
        let addr = th_malloc(64, 1);
        assert_ne!(addr, 0);
        th_free(addr);
    }

    #[test]
    fn zero_size_gets_a_distinct_address() {
        let a = th_malloc(0, 1);
        let b = th_malloc(0, 1);
        assert_ne!(a, 0);
        assert_ne!(b, 0);
        assert_ne!(a, b);
        th_free(a);
        th_free(b);
    }

    #[test]
    fn diagnostics_do_not_fault_on_a_live_heap() {
        let addr = th_malloc(128, 1);
        th_heap_dump();
        th_leak_check();
        th_free(addr);
    }
}
