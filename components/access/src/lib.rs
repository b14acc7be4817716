//! Access - the object and array access layer called by the interpreter
//!
//! This component provides:
//! - Typed, bounds-checked array element reads and writes ([`InterpreterToVm`])
//! - Typed instance field reads and writes
//! - Array allocation, including multi-dimensional arrays
//! - `instanceof` / `checkcast` and plain object allocation
//!
//! Out-of-range indices surface as
//! [`VmError::ArrayIndexOutOfBounds`](core_types::VmError) values, never as
//! host panics.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use core_types::{JavaKind, RuntimeConfig};
//! use object_model::KlassTable;
//! use access::InterpreterToVm;
//!
//! let vm = InterpreterToVm::new(RuntimeConfig::default(), Arc::new(KlassTable::new()));
//! let ints = vm.allocate_primitive_array(JavaKind::Int, 4).unwrap();
//! vm.set_array_int(&ints, 3, 42, None).unwrap();
//! assert_eq!(vm.get_array_int(&ints, 3, None).unwrap(), 42);
//! assert!(vm.get_array_int(&ints, 4, None).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod arrays;
pub mod fields;
pub mod interpreter_to_vm;

// Re-export main types
pub use allocator::{Allocator, HeapAllocator};
pub use interpreter_to_vm::InterpreterToVm;
