//! Core runtime types shared by every execution-support component.
//!
//! This crate provides the foundational vocabulary of the runtime: primitive
//! kinds, the guest-visible fault taxonomy, runtime configuration and the
//! implicit-exception profile hook used by the access layer.
//!
//! # Overview
//!
//! - [`JavaKind`] - Element/field kind of every typed access
//! - [`VmError`] - Guest-visible faults and internal invariant violations
//! - [`RuntimeConfig`] - Tunables loaded from defaults or JSON
//! - [`ImplicitExceptionProfile`] - Per-call-site "a fault was seen" hint
//!
//! # Examples
//!
//! ```
//! use core_types::{JavaKind, RuntimeConfig, VmError};
//!
//! assert_eq!(JavaKind::from_descriptor('I'), Some(JavaKind::Int));
//!
//! let config = RuntimeConfig::default();
//! assert!(config.java9_or_later());
//!
//! let fault = VmError::ArrayIndexOutOfBounds { index: 7, length: 3 };
//! assert_eq!(fault.guest_class_name(), "java/lang/ArrayIndexOutOfBoundsException");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
mod error;
mod kind;
mod profile;

pub use config::{ConfigError, RuntimeConfig, DEFAULT_STACK_SIZE};
pub use error::{VmError, VmResult};
pub use kind::{tag, JavaKind};
pub use profile::ImplicitExceptionProfile;
