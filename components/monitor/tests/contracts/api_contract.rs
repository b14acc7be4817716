//! Contract tests verifying the monitor API shape.

use std::sync::Arc;

use core_types::{RuntimeConfig, VmResult};
use monitor::{EmptyListener, MonitorListener, MonitorProtocol, ThreadRecord, ThreadRegistry, ThreadState};
use object_model::{HeapObject, KlassTable, ThreadId};

/// Protocol, records and registry are shared across threads
#[test]
fn contract_types_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MonitorProtocol>();
    assert_send_sync::<ThreadRecord>();
    assert_send_sync::<ThreadRegistry>();
}

/// MonitorListener is object safe and has no required methods
#[test]
fn contract_listener_defaults() {
    struct Silent;
    impl MonitorListener for Silent {}
    let listener: Arc<dyn MonitorListener> = Arc::new(Silent);
    let _ = MonitorProtocol::new(&RuntimeConfig::default()).with_listener(listener);
    let _ = MonitorProtocol::new(&RuntimeConfig::default()).with_listener(Arc::new(EmptyListener));
}

/// monitor_exit(&ThreadRecord, &ObjectRef) -> VmResult<()>
#[test]
fn contract_monitor_exit_signature() {
    let table = KlassTable::new();
    let object = HeapObject::new_instance(table.object()).unwrap();
    let thread = ThreadRecord::new(ThreadId(1), "main", None);
    let monitors = MonitorProtocol::new(&RuntimeConfig::default());
    monitors.monitor_enter(&thread, &object);
    let result: VmResult<()> = monitors.monitor_exit(&thread, &object);
    assert!(result.is_ok());
}

/// ThreadRecord starts New
#[test]
fn contract_thread_record_new_state() {
    let thread = ThreadRecord::new(ThreadId(1), "main", None);
    assert_eq!(thread.state(), ThreadState::New);
    assert_eq!(thread.status(), 0);
}
