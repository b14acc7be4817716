//! The monitor protocol.
//!
//! # Thread states
//!
//! ```text
//! RUNNABLE --contended enter--> BLOCKED --acquired--> RUNNABLE
//! RUNNABLE --wait(0)----------> WAITING ------------> [BLOCKED] --> RUNNABLE
//! RUNNABLE --wait(n > 0)------> TIMED_WAITING ------> [BLOCKED] --> RUNNABLE
//! ```
//!
//! A waiting thread reacquires the monitor before it is RUNNABLE again,
//! whether it was notified, timed out or interrupted. It is BLOCKED while
//! another thread still owns the monitor at that point.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use core_types::{RuntimeConfig, VmError, VmResult};
use object_model::{ObjectRef, ThreadId, WaitOutcome};

use crate::listener::{EmptyListener, MonitorListener};
use crate::thread::{ThreadRecord, ThreadState};

/// Implements `monitorenter`, `monitorexit`, `Object.wait`,
/// `Object.notify` and `Object.notifyAll`.
///
/// # Examples
///
/// ```
/// use core_types::RuntimeConfig;
/// use monitor::{MonitorProtocol, ThreadRecord};
/// use object_model::{HeapObject, KlassTable, ThreadId};
///
/// let table = KlassTable::new();
/// let object = HeapObject::new_instance(table.object()).unwrap();
/// let main = ThreadRecord::new(ThreadId(1), "main", None);
/// let other = ThreadRecord::new(ThreadId(2), "other", None);
///
/// let monitors = MonitorProtocol::new(&RuntimeConfig::default());
/// monitors.monitor_enter(&main, &object);
/// assert!(monitors.holds_lock(&main, &object));
/// assert!(monitors.monitor_exit(&other, &object).is_err());
/// monitors.monitor_exit(&main, &object).unwrap();
/// ```
pub struct MonitorProtocol {
    enable_management: bool,
    listener: Arc<dyn MonitorListener>,
}

impl MonitorProtocol {
    /// Creates the protocol with a listener that ignores every event.
    pub fn new(config: &RuntimeConfig) -> Self {
        MonitorProtocol {
            enable_management: config.enable_management,
            listener: Arc::new(EmptyListener),
        }
    }

    /// Replaces the listener.
    pub fn with_listener(mut self, listener: Arc<dyn MonitorListener>) -> Self {
        self.listener = listener;
        self
    }

    /// The installed listener.
    pub fn listener(&self) -> &Arc<dyn MonitorListener> {
        &self.listener
    }

    fn notify_listener<F>(&self, event: &str, hook: F)
    where
        F: FnOnce(&dyn MonitorListener),
    {
        let listener = self.listener.as_ref();
        if panic::catch_unwind(AssertUnwindSafe(|| hook(listener))).is_err() {
            log::warn!("monitor listener panicked handling {}", event);
        }
    }

    /// Enters the monitor of `object`, blocking while another thread owns
    /// it. Reentrant.
    pub fn monitor_enter(&self, thread: &ThreadRecord, object: &ObjectRef) {
        let lock = object.lock();
        if !lock.try_lock(thread.id()) {
            thread.set_state(ThreadState::Blocked);
            if self.enable_management {
                thread.set_blocked_object(Some(object.clone()));
                thread.increment_blocked_count();
            }
            self.notify_listener("contended monitor enter", |l| {
                l.on_contended_monitor_enter(thread, object)
            });
            lock.lock(thread.id());
            self.notify_listener("contended monitor entered", |l| {
                l.on_contended_monitor_entered(thread, object)
            });
            if self.enable_management {
                thread.set_blocked_object(None);
            }
            thread.set_state(ThreadState::Runnable);
        }
        self.notify_listener("monitor enter", |l| l.on_monitor_enter(thread, object));
    }

    /// Enters the monitor of `object` only if that does not block.
    pub fn monitor_try_enter(&self, thread: &ThreadRecord, object: &ObjectRef) -> bool {
        let entered = object.lock().try_lock(thread.id());
        if entered {
            self.notify_listener("monitor enter", |l| l.on_monitor_enter(thread, object));
        }
        entered
    }

    /// Releases one hold of the monitor of `object`.
    ///
    /// # Errors
    ///
    /// `IllegalMonitorState` if `thread` does not own the monitor; the
    /// monitor is left untouched.
    pub fn monitor_exit(&self, thread: &ThreadRecord, object: &ObjectRef) -> VmResult<()> {
        if !self.holds_lock(thread, object) {
            return Err(VmError::IllegalMonitorState);
        }
        object.lock().unlock(thread.id())?;
        self.notify_listener("monitor exit", |l| l.on_monitor_exit(thread, object));
        Ok(())
    }

    /// `Object.wait`: releases the monitor, waits up to `timeout_millis`
    /// (0 waits without bound) and reacquires it.
    ///
    /// Returns true if the thread was notified and false if the timeout
    /// elapsed.
    ///
    /// # Errors
    ///
    /// `IllegalArgument` for a negative timeout, `IllegalMonitorState` if
    /// `thread` does not own the monitor, `Interrupted` if the thread was
    /// interrupted before or during the wait. The interrupt flag is cleared
    /// when `Interrupted` is returned.
    pub fn monitor_wait(
        &self,
        thread: &ThreadRecord,
        object: &ObjectRef,
        timeout_millis: i64,
    ) -> VmResult<bool> {
        if timeout_millis < 0 {
            return Err(VmError::IllegalArgument(
                "timeout value is negative".to_string(),
            ));
        }
        if !self.holds_lock(thread, object) {
            return Err(VmError::IllegalMonitorState);
        }

        let timeout = (timeout_millis > 0).then(|| Duration::from_millis(timeout_millis as u64));
        thread.set_state(if timeout.is_some() {
            ThreadState::TimedWaiting
        } else {
            ThreadState::Waiting
        });
        if self.enable_management {
            thread.increment_waited_count();
        }
        thread.set_waiting_on(Some(object));
        self.notify_listener("monitor wait", |l| {
            l.on_monitor_wait(thread, object, timeout_millis)
        });

        let result = object.lock().await_signal_then(
            thread.id(),
            timeout,
            thread.interrupt_flag(),
            |contended| {
                if contended {
                    thread.set_state(ThreadState::Blocked);
                    if self.enable_management {
                        thread.set_blocked_object(Some(object.clone()));
                        thread.increment_blocked_count();
                    }
                }
            },
        );

        if self.enable_management {
            thread.set_blocked_object(None);
        }
        thread.set_waiting_on(None);
        thread.set_state(ThreadState::Runnable);
        let timed_out = matches!(result, Ok(WaitOutcome::TimedOut));
        self.notify_listener("monitor waited", |l| {
            l.on_monitor_waited(thread, object, timed_out)
        });
        result.map(|outcome| outcome == WaitOutcome::Notified)
    }

    /// `Object.notify`: wakes one waiter, if any.
    ///
    /// # Errors
    ///
    /// `IllegalMonitorState` if `thread` does not own the monitor.
    pub fn monitor_notify(&self, thread: &ThreadRecord, object: &ObjectRef) -> VmResult<()> {
        object.lock().signal(thread.id())
    }

    /// `Object.notifyAll`: wakes every waiter.
    ///
    /// # Errors
    ///
    /// `IllegalMonitorState` if `thread` does not own the monitor.
    pub fn monitor_notify_all(&self, thread: &ThreadRecord, object: &ObjectRef) -> VmResult<()> {
        object.lock().signal_all(thread.id())
    }

    /// Whether `thread` owns the monitor of `object`.
    pub fn holds_lock(&self, thread: &ThreadRecord, object: &ObjectRef) -> bool {
        object
            .existing_lock()
            .is_some_and(|lock| lock.is_held_by(thread.id()))
    }

    /// Current owner of the monitor of `object`.
    pub fn monitor_owner(&self, object: &ObjectRef) -> Option<ThreadId> {
        object.existing_lock().and_then(|lock| lock.owner())
    }

    /// Hold count of the monitor of `object`; 0 when unowned.
    pub fn entry_count(&self, object: &ObjectRef) -> u32 {
        object.existing_lock().map_or(0, |lock| lock.hold_count())
    }
}
