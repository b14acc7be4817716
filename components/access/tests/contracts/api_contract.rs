//! Contract tests verifying the access layer API shape.

use std::sync::Arc;

use access::{Allocator, HeapAllocator, InterpreterToVm};
use core_types::{ImplicitExceptionProfile, JavaKind, RuntimeConfig, VmResult};
use object_model::{KlassTable, Reference};

fn vm() -> InterpreterToVm {
    InterpreterToVm::new(RuntimeConfig::default(), Arc::new(KlassTable::new()))
}

/// InterpreterToVm is shared between interpreter threads
#[test]
fn contract_interpreter_to_vm_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InterpreterToVm>();
}

/// HeapAllocator is usable as a trait object
#[test]
fn contract_allocator_object_safe() {
    let allocator: Arc<dyn Allocator> = Arc::new(HeapAllocator);
    let _ = vm().with_allocator(allocator);
}

/// get_array_int(&ObjectRef, i32, Option<&ImplicitExceptionProfile>) -> VmResult<i32>
#[test]
fn contract_get_array_int_signature() {
    let vm = vm();
    let profile = ImplicitExceptionProfile::new();
    let array = vm.allocate_primitive_array(JavaKind::Int, 1).unwrap();
    let value: VmResult<i32> = vm.get_array_int(&array, 0, Some(&profile));
    assert_eq!(value, Ok(0));
}

/// get_array_object returns a nullable reference
#[test]
fn contract_get_array_object_signature() {
    let vm = vm();
    let array = vm
        .new_reference_array(&vm.klasses().object().clone(), 1)
        .unwrap();
    let value: VmResult<Reference> = vm.get_array_object(&array, 0, None);
    assert!(value.unwrap().is_none());
}

/// new_multi_array(&KlassRef, &[i32]) -> VmResult<ObjectRef>
#[test]
fn contract_new_multi_array_signature() {
    let vm = vm();
    let long = vm.klasses().primitive(JavaKind::Long).clone();
    let array = vm.new_multi_array(&long, &[1, 1]).unwrap();
    assert_eq!(vm.array_length(&array), Ok(1));
}
