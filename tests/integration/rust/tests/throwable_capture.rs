//! Stack Trace and Access Integration Tests
//!
//! Tests that throwables allocated through the access layer capture their
//! frames, expose the recorded depth through field access, and can be
//! handed to a debugger by id.

use std::sync::Arc;

use access::InterpreterToVm;
use core_types::{tag, RuntimeConfig};
use debug_context::Ids;
use object_model::{
    access_flags, ClassDefinition, KlassRef, KlassTable, Method, MethodRef, THROWABLE_DEPTH_FIELD,
};
use stack_trace::{
    CollectedElement, CollectedTrace, FrameInstance, LocationNode, NodeKind, StackTraceCapture,
    FILL_IN_STACK_TRACE, FILL_IN_STACK_TRACE0,
};

struct Runtime {
    table: Arc<KlassTable>,
    vm: InterpreterToVm,
    capture: StackTraceCapture,
    error: KlassRef,
    service: KlassRef,
}

impl Runtime {
    fn new(config: RuntimeConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let table = Arc::new(KlassTable::new());
        let error = table
            .define(ClassDefinition::new("app/ServiceError").extends("java/lang/Throwable"))
            .unwrap();
        let service = table.define(ClassDefinition::new("app/Service")).unwrap();
        Runtime {
            vm: InterpreterToVm::new(config.clone(), table.clone()),
            capture: StackTraceCapture::new(config, table.clone()),
            table,
            error,
            service,
        }
    }

    fn method(&self, owner: &KlassRef, name: &str, flags: u32) -> MethodRef {
        Method::new(name, owner.clone(), access_flags::ACC_PUBLIC | flags)
    }

    /// Frames of `Service.call -> Service.handle -> new ServiceError()`.
    fn frames(&self) -> Vec<FrameInstance> {
        let throwable = self.table.throwable();
        vec![
            FrameInstance::new(self.method(throwable, FILL_IN_STACK_TRACE0, access_flags::ACC_NATIVE), 0),
            FrameInstance::new(self.method(throwable, FILL_IN_STACK_TRACE, 0), 1),
            FrameInstance::new(self.method(throwable, "<init>", 0), 4),
            FrameInstance::new(self.method(&self.error, "<init>", 0), 2),
            FrameInstance::new(self.method(&self.service, "handle", 0), 17),
            FrameInstance::new(self.method(&self.service, "call", 0), 3),
        ]
    }
}

/// Test: Live capture of an access-layer throwable records the guest frames
/// and the depth field
#[test]
fn test_live_capture_sets_depth_field() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let error = runtime.vm.new_object(&runtime.error, true).unwrap();

    runtime
        .capture
        .fill_in_stack_trace_live(&error, runtime.frames().as_slice(), false)
        .unwrap();

    let trace = runtime.capture.backtrace_of(&error).unwrap();
    let recorded: Vec<(&str, i32)> = trace
        .elements()
        .iter()
        .map(|e| (e.method.name(), e.bci))
        .collect();
    assert_eq!(recorded, vec![("handle", 17), ("call", 3)]);

    let depth = runtime.error.lookup_field(THROWABLE_DEPTH_FIELD).unwrap();
    assert_eq!(runtime.vm.get_field_int(&error, &depth), Ok(2));
}

/// Test: Before Java 9 the depth field is left alone
#[test]
fn test_depth_field_untouched_before_java9() {
    let config = RuntimeConfig {
        java_version: 8,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::new(config);
    let error = runtime.vm.new_object(&runtime.error, true).unwrap();

    runtime
        .capture
        .fill_in_stack_trace_live(&error, runtime.frames().as_slice(), false)
        .unwrap();

    let depth = runtime.error.lookup_field(THROWABLE_DEPTH_FIELD).unwrap();
    assert_eq!(runtime.vm.get_field_int(&error, &depth), Ok(0));
    assert_eq!(runtime.capture.backtrace_of(&error).unwrap().len(), 2);
}

/// Test: The configured depth limit bounds live capture
#[test]
fn test_depth_limit_from_config() {
    let config = RuntimeConfig {
        max_stack_depth: 1,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::new(config);
    let error = runtime.vm.new_object(&runtime.error, true).unwrap();

    runtime
        .capture
        .fill_in_stack_trace_live(&error, runtime.frames().as_slice(), false)
        .unwrap();

    let trace = runtime.capture.backtrace_of(&error).unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace.elements()[0].method.name(), "handle");
}

/// Test: A trace collected during unwinding resolves offsets from the node
/// tree and survives a later live capture
#[test]
fn test_collected_trace_then_live_capture() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let error = runtime.vm.new_object(&runtime.error, false).unwrap();
    let root = LocationNode::root(NodeKind::Bytecode { bci: 9 });
    let wrapper = LocationNode::child(&root, NodeKind::Wrapper);
    let trace = CollectedTrace::new(vec![
        CollectedElement::new(runtime.method(&runtime.error, "<init>", 0), None),
        CollectedElement::internal(None),
        CollectedElement::new(runtime.method(&runtime.service, "handle", 0), Some(wrapper)),
    ]);

    runtime
        .capture
        .fill_in_stack_trace_from_collected(&error, Some(&trace))
        .unwrap();
    runtime
        .capture
        .fill_in_stack_trace_live(&error, runtime.frames().as_slice(), false)
        .unwrap();

    let trace = runtime.capture.backtrace_of(&error).unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace.elements()[0].bci, 9);
    let depth = runtime.error.lookup_field(THROWABLE_DEPTH_FIELD).unwrap();
    assert_eq!(runtime.vm.get_field_int(&error, &depth), Ok(1));
}

/// Test: A captured throwable is an ordinary object to the debugger
#[test]
fn test_throwable_debugger_identity() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let error = runtime.vm.new_object(&runtime.error, true).unwrap();
    runtime
        .capture
        .fill_in_stack_trace_live(&error, runtime.frames().as_slice(), false)
        .unwrap();

    let ids = Ids::new();
    let id = ids.id_of_object(Some(&error));
    let resolved = ids.object(id).unwrap();
    assert!(Arc::ptr_eq(&resolved, &error));
    assert!(Arc::ptr_eq(&resolved.backtrace().unwrap(), &error));
    assert_eq!(resolved.klass().java_kind().tag(), tag::OBJECT);
}
