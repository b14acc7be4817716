//! Stack Trace - captures the frames of a throwable
//!
//! This component provides:
//! - Capture from a trace already collected by the unwinding engine
//!   ([`StackTraceCapture::fill_in_stack_trace_from_collected`])
//! - Capture by walking live frames
//!   ([`StackTraceCapture::fill_in_stack_trace_live`])
//! - Filtering of the fill-in entry points and throwable constructors
//!   ([`FrameFilter`])
//!
//! Both modes produce a [`StackTrace`](object_model::StackTrace), innermost
//! frame first, and attach it to the throwable at most once.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod filter;
pub mod frames;

// Re-export main types
pub use capture::StackTraceCapture;
pub use filter::{FrameFilter, FILL_IN_STACK_TRACE, FILL_IN_STACK_TRACE0};
pub use frames::{CollectedElement, CollectedTrace, FrameInstance, FrameWalker, LocationNode, NodeKind};
