//! Implicit-exception profiling.
//!
//! Adaptive interpreters specialize a call site for the fault-free path until
//! the first fault is observed there. The access layer reports that fault
//! through this profile; the profile never influences the fault itself.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Per-call-site record of implicit faults (bounds, negative size, ...).
///
/// # Examples
///
/// ```
/// use core_types::ImplicitExceptionProfile;
///
/// let profile = ImplicitExceptionProfile::new();
/// assert!(profile.enter());
/// assert!(!profile.enter());
/// assert_eq!(profile.hits(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ImplicitExceptionProfile {
    entered: AtomicBool,
    hits: AtomicU64,
}

impl ImplicitExceptionProfile {
    /// Creates a profile that has not seen a fault yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault. Returns true only for the first one, which is when
    /// the owning site should be respecialized.
    pub fn enter(&self) -> bool {
        self.hits.fetch_add(1, Ordering::Relaxed);
        !self.entered.swap(true, Ordering::AcqRel)
    }

    /// Whether any fault was recorded.
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }

    /// Number of faults recorded.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}
