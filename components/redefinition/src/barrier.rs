//! The global redefinition barrier.
//!
//! At most one redefinition transaction is open at a time. Interpreter
//! threads call [`RedefinitionBarrier::check_suspend`] at safe points and
//! park there while a transaction is open.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

/// Serializes redefinition transactions and parks interpreter threads
/// while one is open.
///
/// # Examples
///
/// ```
/// use redefinition::RedefinitionBarrier;
///
/// let barrier = RedefinitionBarrier::new();
/// {
///     let _transaction = barrier.begin();
///     assert!(barrier.is_active());
/// }
/// assert!(!barrier.is_active());
/// assert_eq!(barrier.completed_transactions(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RedefinitionBarrier {
    /// Host thread running the open transaction
    owner: Mutex<Option<ThreadId>>,
    cond: Condvar,
    completed: AtomicU64,
}

impl RedefinitionBarrier {
    /// Creates a closed barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a transaction, waiting for any open one to close first.
    ///
    /// The transaction closes when the returned guard is dropped.
    pub fn begin(&self) -> TransactionGuard<'_> {
        let mut owner = self.owner.lock();
        while owner.is_some() {
            self.cond.wait(&mut owner);
        }
        *owner = Some(thread::current().id());
        log::trace!("redefinition transaction opened");
        TransactionGuard { barrier: self }
    }

    /// Whether a transaction is open.
    pub fn is_active(&self) -> bool {
        self.owner.lock().is_some()
    }

    /// Parks the calling thread until no transaction is open. Returns
    /// immediately on the thread that holds the transaction.
    pub fn check_suspend(&self) {
        let current = thread::current().id();
        let mut owner = self.owner.lock();
        while owner.is_some_and(|id| id != current) {
            self.cond.wait(&mut owner);
        }
    }

    /// Number of transactions closed so far.
    pub fn completed_transactions(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn end(&self) {
        let mut owner = self.owner.lock();
        *owner = None;
        self.completed.fetch_add(1, Ordering::AcqRel);
        self.cond.notify_all();
        log::trace!("redefinition transaction closed");
    }
}

/// An open redefinition transaction; closes it on drop.
#[must_use = "the transaction closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TransactionGuard<'a> {
    barrier: &'a RedefinitionBarrier,
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        self.barrier.end();
    }
}
