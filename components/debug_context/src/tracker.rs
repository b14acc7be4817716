//! Contended-monitor tracking for debugger queries.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use monitor::{MonitorListener, ThreadRecord};
use object_model::{HeapObject, ObjectRef, Reference, ThreadId};
use parking_lot::Mutex;

/// Remembers which monitor each thread is blocked entering and forwards
/// every event to a delegate listener.
pub struct ContendedMonitorTracker {
    delegate: Arc<dyn MonitorListener>,
    contended: Mutex<HashMap<ThreadId, Weak<HeapObject>>>,
}

impl ContendedMonitorTracker {
    /// Creates a tracker forwarding to `delegate`.
    pub fn new(delegate: Arc<dyn MonitorListener>) -> Self {
        ContendedMonitorTracker {
            delegate,
            contended: Mutex::new(HashMap::new()),
        }
    }

    /// Monitor `thread` is currently blocked entering.
    pub fn contended_monitor(&self, thread: ThreadId) -> Reference {
        self.contended.lock().get(&thread).and_then(Weak::upgrade)
    }
}

impl MonitorListener for ContendedMonitorTracker {
    fn on_monitor_enter(&self, thread: &ThreadRecord, object: &ObjectRef) {
        self.delegate.on_monitor_enter(thread, object);
    }

    fn on_contended_monitor_enter(&self, thread: &ThreadRecord, object: &ObjectRef) {
        self.contended
            .lock()
            .insert(thread.id(), Arc::downgrade(object));
        self.delegate.on_contended_monitor_enter(thread, object);
    }

    fn on_contended_monitor_entered(&self, thread: &ThreadRecord, object: &ObjectRef) {
        self.contended.lock().remove(&thread.id());
        self.delegate.on_contended_monitor_entered(thread, object);
    }

    fn on_monitor_exit(&self, thread: &ThreadRecord, object: &ObjectRef) {
        self.delegate.on_monitor_exit(thread, object);
    }

    fn on_monitor_wait(&self, thread: &ThreadRecord, object: &ObjectRef, timeout_millis: i64) {
        self.delegate.on_monitor_wait(thread, object, timeout_millis);
    }

    fn on_monitor_waited(&self, thread: &ThreadRecord, object: &ObjectRef, timed_out: bool) {
        self.delegate.on_monitor_waited(thread, object, timed_out);
    }
}
