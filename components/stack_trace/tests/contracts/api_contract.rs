//! Contract tests for the stack_trace public API

use std::sync::Arc;

use core_types::{RuntimeConfig, VmError};
use object_model::{access_flags, HeapObject, KlassTable, Method};
use stack_trace::{CollectedTrace, FrameFilter, FrameInstance, StackTraceCapture};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn contract_capture_is_shareable() {
    assert_send_sync::<StackTraceCapture>();
}

#[test]
fn contract_empty_collected_trace_attaches_empty_backtrace() {
    let table = Arc::new(KlassTable::new());
    let capture = StackTraceCapture::new(RuntimeConfig::default(), table.clone());
    let error = HeapObject::new_instance(table.throwable()).unwrap();
    capture
        .fill_in_stack_trace_from_collected(&error, Some(&CollectedTrace::default()))
        .unwrap();
    assert!(capture.backtrace_of(&error).unwrap().is_empty());
}

#[test]
fn contract_live_capture_rejects_non_throwable() {
    let table = Arc::new(KlassTable::new());
    let capture = StackTraceCapture::new(RuntimeConfig::default(), table.clone());
    let thread = HeapObject::new_instance(table.thread()).unwrap();
    let frames: Vec<FrameInstance> = Vec::new();
    let result = capture.fill_in_stack_trace_live(&thread, &frames, false);
    assert!(matches!(result, Err(VmError::Internal(_))));
    assert!(capture.backtrace_of(&thread).is_none());
}

#[test]
fn contract_filter_latches_never_reopen() {
    let table = KlassTable::new();
    let throwable = table.throwable();
    let main = Method::new("main", table.object().clone(), access_flags::ACC_PUBLIC);
    let fill_in = Method::new("fillInStackTrace", throwable.clone(), access_flags::ACC_PUBLIC);
    let mut filter = FrameFilter::new(throwable, throwable);
    assert!(!filter.should_skip(&main));
    assert!(!filter.should_skip(&fill_in));
}

#[test]
fn contract_backtrace_absent_before_capture() {
    let table = Arc::new(KlassTable::new());
    let capture = StackTraceCapture::new(RuntimeConfig::default(), table.clone());
    let error = HeapObject::new_instance(table.throwable()).unwrap();
    assert!(capture.backtrace_of(&error).is_none());
}
