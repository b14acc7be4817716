//! Guest thread records.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crossbeam::atomic::AtomicCell;
use object_model::{HeapObject, ObjectRef, Reference, ThreadId};
use parking_lot::{Mutex, RwLock};

/// Shared handle to a thread record.
pub type ThreadRef = Arc<ThreadRecord>;

/// Thread status bits as reported to debuggers.
pub mod status {
    /// Thread is alive
    pub const ALIVE: i32 = 0x0001;
    /// Thread has completed
    pub const TERMINATED: i32 = 0x0002;
    /// Thread is runnable
    pub const RUNNABLE: i32 = 0x0004;
    /// Waiting without a timeout
    pub const WAITING_INDEFINITELY: i32 = 0x0010;
    /// Waiting with a timeout
    pub const WAITING_WITH_TIMEOUT: i32 = 0x0020;
    /// Waiting in `Object.wait`
    pub const WAITING: i32 = 0x0080;
    /// Blocked entering a monitor
    pub const BLOCKED_ON_MONITOR_ENTER: i32 = 0x0400;
}

/// Lifecycle state of a guest thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadState {
    /// Created, not started
    #[default]
    New,
    /// Executing or ready to execute
    Runnable,
    /// Blocked entering a contended monitor
    Blocked,
    /// In an unbounded wait
    Waiting,
    /// In a wait with a timeout
    TimedWaiting,
    /// Finished
    Terminated,
}

impl ThreadState {
    /// Status bits of this state.
    pub fn status(self) -> i32 {
        match self {
            ThreadState::New => 0,
            ThreadState::Runnable => status::ALIVE | status::RUNNABLE,
            ThreadState::Blocked => status::ALIVE | status::BLOCKED_ON_MONITOR_ENTER,
            ThreadState::Waiting => {
                status::ALIVE | status::WAITING | status::WAITING_INDEFINITELY
            }
            ThreadState::TimedWaiting => {
                status::ALIVE | status::WAITING | status::WAITING_WITH_TIMEOUT
            }
            ThreadState::Terminated => status::TERMINATED,
        }
    }

    /// Started and not yet terminated.
    pub fn is_alive(self) -> bool {
        !matches!(self, ThreadState::New | ThreadState::Terminated)
    }
}

/// Bookkeeping for one guest thread.
///
/// The record is owned by the [`ThreadRegistry`](crate::ThreadRegistry) and
/// mutated by the monitor protocol on contended entries and waits.
pub struct ThreadRecord {
    id: ThreadId,
    name: RwLock<String>,
    guest: Reference,
    state: AtomicCell<ThreadState>,
    blocked_object: Mutex<Reference>,
    blocked_count: AtomicU64,
    waited_count: AtomicU64,
    interrupted: AtomicBool,
    waiting_on: Mutex<Option<Weak<HeapObject>>>,
}

impl ThreadRecord {
    /// Creates a record in the `New` state.
    pub fn new(id: ThreadId, name: impl Into<String>, guest: Reference) -> Self {
        ThreadRecord {
            id,
            name: RwLock::new(name.into()),
            guest,
            state: AtomicCell::new(ThreadState::New),
            blocked_object: Mutex::new(None),
            blocked_count: AtomicU64::new(0),
            waited_count: AtomicU64::new(0),
            interrupted: AtomicBool::new(false),
            waiting_on: Mutex::new(None),
        }
    }

    /// Lock-ownership identity.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Thread name.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Renames the thread.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// The guest `java/lang/Thread` object, if one was attached.
    pub fn guest(&self) -> Option<&ObjectRef> {
        self.guest.as_ref()
    }

    /// Current state.
    pub fn state(&self) -> ThreadState {
        self.state.load()
    }

    /// Moves the thread to `state`.
    pub fn set_state(&self, state: ThreadState) {
        self.state.store(state);
    }

    /// Status bits of the current state.
    pub fn status(&self) -> i32 {
        self.state().status()
    }

    /// Object whose monitor the thread is blocked entering.
    pub fn blocked_object(&self) -> Reference {
        self.blocked_object.lock().clone()
    }

    pub(crate) fn set_blocked_object(&self, object: Reference) {
        *self.blocked_object.lock() = object;
    }

    /// Number of contended monitor entries.
    pub fn blocked_count(&self) -> u64 {
        self.blocked_count.load(Ordering::Relaxed)
    }

    pub(crate) fn increment_blocked_count(&self) {
        self.blocked_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of `wait` calls.
    pub fn waited_count(&self) -> u64 {
        self.waited_count.load(Ordering::Relaxed)
    }

    pub(crate) fn increment_waited_count(&self) {
        self.waited_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Sets the interrupt flag and wakes the thread if it is waiting.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        let waiting_on = self.waiting_on.lock().as_ref().and_then(Weak::upgrade);
        if let Some(object) = waiting_on {
            log::trace!("interrupting {} waiting on {:?}", self, object);
            object.lock().wake_waiters();
        }
    }

    /// Whether the interrupt flag is set.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Reads and clears the interrupt flag.
    pub fn clear_interrupted(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn interrupt_flag(&self) -> &AtomicBool {
        &self.interrupted
    }

    /// Object the thread is waiting on, if any.
    pub fn waiting_on(&self) -> Reference {
        self.waiting_on.lock().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_waiting_on(&self, object: Option<&ObjectRef>) {
        *self.waiting_on.lock() = object.map(Arc::downgrade);
    }
}

impl fmt::Display for ThreadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.name(), self.id)
    }
}

impl fmt::Debug for ThreadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRecord")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}
