//! Observer hooks for monitor events.

use object_model::ObjectRef;

use crate::thread::ThreadRecord;

/// Receives monitor events, typically to forward them to a debugger.
///
/// Every hook has an empty default. Hooks run on the thread performing the
/// operation and cannot change its outcome: a panicking hook is caught and
/// logged by the protocol.
pub trait MonitorListener: Send + Sync {
    /// `thread` entered the monitor of `object`, contended or not.
    fn on_monitor_enter(&self, _thread: &ThreadRecord, _object: &ObjectRef) {}

    /// `thread` found the monitor of `object` owned and is about to block.
    fn on_contended_monitor_enter(&self, _thread: &ThreadRecord, _object: &ObjectRef) {}

    /// `thread` acquired the monitor it blocked on.
    fn on_contended_monitor_entered(&self, _thread: &ThreadRecord, _object: &ObjectRef) {}

    /// `thread` released one hold of the monitor of `object`.
    fn on_monitor_exit(&self, _thread: &ThreadRecord, _object: &ObjectRef) {}

    /// `thread` is about to wait on `object` for `timeout_millis` (0 waits
    /// without bound).
    fn on_monitor_wait(&self, _thread: &ThreadRecord, _object: &ObjectRef, _timeout_millis: i64) {}

    /// `thread` finished waiting on `object`.
    fn on_monitor_waited(&self, _thread: &ThreadRecord, _object: &ObjectRef, _timed_out: bool) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyListener;

impl MonitorListener for EmptyListener {}
