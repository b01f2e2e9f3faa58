//! Fatal-termination policy.
//!
//! Unrecoverable faults (misuse, corruption) cannot be continued past; the
//! only choice is how the process ends. The policy is read once from the
//! `TAGHEAP_FATAL` environment variable:
//! - `abort` (default): print the diagnostic and abort the process.
//! - `panic`: raise a Rust panic instead, for hosts and test harnesses
//!   that need to observe the fault before dying.

use std::sync::OnceLock;

/// How the hook layer terminates on an unrecoverable fault.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Print the diagnostic and abort the process.
    #[default]
    Abort,
    /// Panic with the diagnostic as the message.
    Panic,
}

impl FatalPolicy {
    /// Parse from string (case-insensitive); anything unrecognized falls
    /// back to the default.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "panic" | "unwind" => Self::Panic,
            _ => Self::Abort,
        }
    }
}

static GLOBAL_POLICY: OnceLock<FatalPolicy> = OnceLock::new();

/// The configured policy (reads the env var on first call, caches after).
#[must_use]
pub fn fatal_policy() -> FatalPolicy {
    *GLOBAL_POLICY.get_or_init(|| {
        std::env::var("TAGHEAP_FATAL")
            .map(|value| FatalPolicy::from_str_loose(&value))
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fatal_policies() {
        assert_eq!(FatalPolicy::from_str_loose("abort"), FatalPolicy::Abort);
        assert_eq!(FatalPolicy::from_str_loose("panic"), FatalPolicy::Panic);
        assert_eq!(FatalPolicy::from_str_loose("PANIC"), FatalPolicy::Panic);
        assert_eq!(FatalPolicy::from_str_loose("unwind"), FatalPolicy::Panic);
        assert_eq!(FatalPolicy::from_str_loose(""), FatalPolicy::Abort);
        assert_eq!(FatalPolicy::from_str_loose("nonsense"), FatalPolicy::Abort);
    }
}
