//! Monitor - intrinsic lock protocol and thread-state bookkeeping
//!
//! This component provides:
//! - `monitorenter` / `monitorexit` / `wait` / `notify` semantics over the
//!   per-object [`IntrinsicLock`](object_model::IntrinsicLock)
//!   ([`MonitorProtocol`])
//! - Per-thread state, blocked-on object and interrupt flag ([`ThreadRecord`])
//! - The table of live guest threads ([`ThreadRegistry`])
//! - Observer hooks for debuggers ([`MonitorListener`])
//!
//! The calling thread is always passed explicitly; the protocol never
//! consults host thread identity.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod listener;
pub mod protocol;
pub mod registry;
pub mod thread;

// Re-export main types
pub use listener::{EmptyListener, MonitorListener};
pub use protocol::MonitorProtocol;
pub use registry::ThreadRegistry;
pub use thread::{status, ThreadRecord, ThreadRef, ThreadState};
