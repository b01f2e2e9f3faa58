//! # tagheap-abi
//!
//! The thin hook surface a host language runtime calls for object
//! construction and destruction. Every entry point is pure pass-through to
//! the `tagheap-core` engine: no allocation policy lives here, only the
//! process-wide heap instance, the serialization mutex around it, and the
//! fatal-termination policy for unrecoverable faults.

pub mod config;
pub mod heap_abi;

pub use config::{FatalPolicy, fatal_policy};
pub use heap_abi::{th_emplace, th_free, th_heap_dump, th_leak_check, th_malloc};
