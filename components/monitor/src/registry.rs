//! Table of guest threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use object_model::{ObjectRef, Reference, ThreadId};
use parking_lot::RwLock;

use crate::thread::{ThreadRecord, ThreadRef, ThreadState};

/// Every guest thread known to the runtime, in registration order.
///
/// Terminated threads stay registered until [`remove`](Self::remove) so
/// that debuggers can still query their status.
///
/// # Examples
///
/// ```
/// use monitor::{ThreadRegistry, ThreadState};
///
/// let registry = ThreadRegistry::new();
/// let main = registry.register("main", None);
/// assert_eq!(main.state(), ThreadState::Runnable);
/// assert!(registry.get(main.id()).is_some());
/// ```
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    threads: RwLock<Vec<ThreadRef>>,
    next_id: AtomicU64,
}

impl ThreadRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a started thread; it begins `Runnable`.
    pub fn register(&self, name: impl Into<String>, guest: Reference) -> ThreadRef {
        let id = ThreadId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let thread = Arc::new(ThreadRecord::new(id, name, guest));
        thread.set_state(ThreadState::Runnable);
        log::debug!("registered thread {}", thread);
        self.threads.write().push(thread.clone());
        thread
    }

    /// Finds a thread by id.
    pub fn get(&self, id: ThreadId) -> Option<ThreadRef> {
        self.threads.read().iter().find(|t| t.id() == id).cloned()
    }

    /// Finds the thread whose guest thread object is `guest`.
    pub fn find_by_guest(&self, guest: &ObjectRef) -> Option<ThreadRef> {
        self.threads
            .read()
            .iter()
            .find(|t| t.guest().is_some_and(|g| Arc::ptr_eq(g, guest)))
            .cloned()
    }

    /// Marks a thread terminated.
    pub fn terminate(&self, id: ThreadId) {
        if let Some(thread) = self.get(id) {
            thread.set_state(ThreadState::Terminated);
            log::debug!("thread {} terminated", thread);
        }
    }

    /// Forgets a thread.
    pub fn remove(&self, id: ThreadId) -> Option<ThreadRef> {
        let mut threads = self.threads.write();
        let index = threads.iter().position(|t| t.id() == id)?;
        Some(threads.remove(index))
    }

    /// Every registered thread.
    pub fn all(&self) -> Vec<ThreadRef> {
        self.threads.read().clone()
    }

    /// Registered threads that are alive.
    pub fn live(&self) -> Vec<ThreadRef> {
        self.threads
            .read()
            .iter()
            .filter(|t| t.state().is_alive())
            .cloned()
            .collect()
    }

    /// Number of registered threads.
    pub fn len(&self) -> usize {
        self.threads.read().len()
    }

    /// True if no thread is registered.
    pub fn is_empty(&self) -> bool {
        self.threads.read().is_empty()
    }
}
