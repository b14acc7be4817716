//! Entry point of the access layer.
//!
//! Array and field accessors live in [`arrays`](crate::arrays) and
//! [`fields`](crate::fields); this module holds the shared state, allocation
//! and type checks.

use std::fmt;
use std::sync::Arc;

use core_types::{ImplicitExceptionProfile, JavaKind, RuntimeConfig, VmError, VmResult};
use object_model::{KlassRef, KlassTable, ObjectRef, Reference};

use crate::allocator::{Allocator, HeapAllocator};

/// Services the interpreter calls for object and array operations.
///
/// The layer performs no locking of its own beyond what the object storage
/// needs for memory safety.
pub struct InterpreterToVm {
    config: RuntimeConfig,
    klasses: Arc<KlassTable>,
    allocator: Arc<dyn Allocator>,
}

impl InterpreterToVm {
    /// Creates the access layer over a class table, allocating on the heap.
    pub fn new(config: RuntimeConfig, klasses: Arc<KlassTable>) -> Self {
        InterpreterToVm {
            config,
            klasses,
            allocator: Arc::new(HeapAllocator),
        }
    }

    /// Replaces the allocator.
    pub fn with_allocator(mut self, allocator: Arc<dyn Allocator>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Class table the layer resolves well-known classes in.
    pub fn klasses(&self) -> &Arc<KlassTable> {
        &self.klasses
    }

    /// Reports an array access fault to the call-site profile.
    pub(crate) fn profiled<T>(
        &self,
        result: VmResult<T>,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<T> {
        if let (Err(VmError::ArrayIndexOutOfBounds { .. }), Some(profile)) = (&result, profile) {
            if self.config.implicit_exception_profiling && profile.enter() {
                log::trace!("first implicit exception at profiled site");
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    /// Allocates an array of `component` references, every element null.
    ///
    /// # Errors
    ///
    /// `NegativeArraySize` if `length` is negative.
    pub fn new_reference_array(&self, component: &KlassRef, length: i32) -> VmResult<ObjectRef> {
        debug_assert!(!component.is_primitive(), "{:?}", component);
        let length = check_length(length)?;
        self.allocator.allocate_array(&component.array_class(), length)
    }

    /// Allocates a zero-filled primitive array.
    ///
    /// # Errors
    ///
    /// `NegativeArraySize` if `length` is negative; `Internal` if `kind` is
    /// not a primitive element kind.
    pub fn allocate_primitive_array(&self, kind: JavaKind, length: i32) -> VmResult<ObjectRef> {
        let length = check_length(length)?;
        if !kind.is_primitive() {
            return Err(VmError::internal(format!(
                "no primitive array of {}",
                kind.java_name()
            )));
        }
        let array_klass = self.klasses.primitive(kind).array_class();
        self.allocator.allocate_array(&array_klass, length)
    }

    /// Allocates a `dimensions.len()`-dimensional array whose innermost
    /// elements are of type `element`.
    ///
    /// Every dimension is validated before anything is allocated. A zero
    /// length ends the recursion for its branch.
    ///
    /// # Arguments
    ///
    /// * `element` - Type of the innermost elements
    /// * `dimensions` - Length of each dimension, outermost first
    ///
    /// # Errors
    ///
    /// `IllegalArgument` for a `void` element type, `NegativeArraySize` if
    /// any dimension is negative, `Internal` for an empty dimension list.
    pub fn new_multi_array(&self, element: &KlassRef, dimensions: &[i32]) -> VmResult<ObjectRef> {
        if element.java_kind() == JavaKind::Void {
            return Err(VmError::IllegalArgument(
                "cannot allocate an array of void".to_string(),
            ));
        }
        if dimensions.is_empty() {
            return Err(VmError::internal("multi-array allocation without dimensions"));
        }
        if let Some(&size) = dimensions.iter().find(|d| **d < 0) {
            return Err(VmError::NegativeArraySize { size });
        }
        self.allocate_multi_array(element, dimensions)
    }

    fn allocate_multi_array(&self, element: &KlassRef, dimensions: &[i32]) -> VmResult<ObjectRef> {
        let (&length, inner) = dimensions
            .split_first()
            .ok_or_else(|| VmError::internal("multi-array allocation without dimensions"))?;
        let array_klass = element.array_class_of_dimension(dimensions.len() as u32);
        let array = self.allocator.allocate_array(&array_klass, length as usize)?;
        if !inner.is_empty() {
            for index in 0..length {
                let sub_array = self.allocate_multi_array(element, inner)?;
                array.array_set::<Reference>(index, Some(sub_array))?;
            }
        }
        Ok(array)
    }

    /// Allocates an instance of `klass` without running a constructor,
    /// initializing the class first.
    ///
    /// # Errors
    ///
    /// For an abstract class or an interface, `InstantiationError` when
    /// `throws_error` is set and `InstantiationException` otherwise. Class
    /// initialization failures propagate.
    pub fn new_object(&self, klass: &KlassRef, throws_error: bool) -> VmResult<ObjectRef> {
        if !klass.is_instance() {
            return Err(VmError::internal(format!(
                "{} is not an instance class",
                klass.name()
            )));
        }
        if klass.is_abstract() || klass.is_interface() {
            let class = klass.name();
            return Err(if throws_error {
                VmError::InstantiationError { class }
            } else {
                VmError::InstantiationException { class }
            });
        }
        klass.safe_initialize()?;
        self.allocator.allocate_instance(klass)
    }

    // ------------------------------------------------------------------
    // Type checks
    // ------------------------------------------------------------------

    /// `instanceof`: false for null.
    pub fn instance_of(&self, object: Option<&ObjectRef>, klass: &KlassRef) -> bool {
        object.is_some_and(|object| klass.is_assignable_from(object.klass()))
    }

    /// `checkcast`: null always passes.
    ///
    /// # Errors
    ///
    /// `ClassCast` naming both types when the object is not an instance of
    /// `klass`.
    pub fn check_cast(&self, object: Option<&ObjectRef>, klass: &KlassRef) -> VmResult<()> {
        match object {
            Some(object) if !klass.is_assignable_from(object.klass()) => Err(VmError::ClassCast {
                object_type: object.klass().name(),
                target_type: klass.name(),
            }),
            _ => Ok(()),
        }
    }

    /// Number of elements of an array.
    pub fn array_length(&self, array: &ObjectRef) -> VmResult<i32> {
        array
            .array_length()
            .map(|length| length as i32)
            .ok_or_else(|| VmError::internal(format!("{:?} is not an array", array)))
    }
}

fn check_length(length: i32) -> VmResult<usize> {
    usize::try_from(length).map_err(|_| VmError::NegativeArraySize { size: length })
}

impl fmt::Debug for InterpreterToVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterToVm")
            .field("config", &self.config)
            .finish()
    }
}
