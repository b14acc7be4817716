//! Object Model - Klass descriptors, heap objects and intrinsic locks
//!
//! This component provides:
//! - Runtime type descriptors ([`Klass`]) with the assignability relation
//! - A class table bootstrapped with the well-known classes ([`KlassTable`])
//! - Heap objects, instances and typed arrays ([`HeapObject`])
//! - The reentrant per-object lock backing monitors ([`IntrinsicLock`])
//! - Captured backtrace elements ([`StackTrace`])
//!
//! Objects are shared through [`ObjectRef`] (`Arc<HeapObject>`); the null
//! reference is `None` in a [`Reference`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backtrace;
pub mod field;
pub mod klass;
pub mod klass_table;
pub mod lock;
pub mod method;
pub mod object;
pub mod value;

// Re-export main types
pub use backtrace::{StackElement, StackTrace, NATIVE_BCI, UNKNOWN_BCI};
pub use field::{Field, FieldRef};
pub use klass::{access_flags, ClassDefinition, InitState, Klass, KlassKind, KlassRef};
pub use klass_table::{names, KlassTable, THROWABLE_DEPTH_FIELD};
pub use lock::{IntrinsicLock, ThreadId, WaitOutcome};
pub use method::{Method, MethodRef};
pub use object::{ArrayElement, ArrayStorage, HeapObject, ObjectBody, ObjectRef, Reference};
pub use value::Value;
