//! Debug Context - the runtime as a debugger sees it
//!
//! This component provides:
//! - Stable object and class identifiers ([`Ids`])
//! - Thread validity, status and contended-monitor queries
//! - Class lookup by descriptor and debugger value tags
//! - Array inspection and allocation on behalf of a debugger
//! - Monitor bookkeeping for forced early returns ([`DebugContext::force_early_return`])
//! - Class redefinition entry point ([`DebugContext::redefine_classes`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod ids;
pub mod tracker;

// Re-export main types
pub use context::{DebugContext, DebugFrame, MonitorStackInfo};
pub use ids::{DebugEntity, Ids, NULL_ID};
pub use tracker::ContendedMonitorTracker;
