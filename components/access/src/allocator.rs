//! Allocation capability used by the access layer.

use core_types::VmResult;
use object_model::{HeapObject, KlassRef, ObjectRef};

/// Source of fresh heap objects.
///
/// The access layer allocates every object through this trait, so a
/// collector or an instrumented test heap can be plugged in.
pub trait Allocator: Send + Sync {
    /// Allocates a zero-initialized instance of `klass`.
    fn allocate_instance(&self, klass: &KlassRef) -> VmResult<ObjectRef>;

    /// Allocates a zero-filled array of the array klass `array_klass`.
    fn allocate_array(&self, array_klass: &KlassRef, length: usize) -> VmResult<ObjectRef>;
}

/// Allocates straight on the reference-counted heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl Allocator for HeapAllocator {
    fn allocate_instance(&self, klass: &KlassRef) -> VmResult<ObjectRef> {
        HeapObject::new_instance(klass)
    }

    fn allocate_array(&self, array_klass: &KlassRef, length: usize) -> VmResult<ObjectRef> {
        HeapObject::new_array(array_klass, length)
    }
}
