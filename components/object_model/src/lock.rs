//! Reentrant intrinsic lock owned by every heap object.
//!
//! The lock tracks its owner by [`ThreadId`] rather than by host thread so
//! that ownership checks stay meaningful for guest threads multiplexed onto
//! host threads. Waiting uses tickets: `signal` moves the oldest ticket from
//! the wait queue to the signalled set, which lets a woken waiter tell a
//! notification apart from a timeout or an interrupt.
//!
//! Fairness is not guaranteed; a releasing thread wakes one contender and
//! any thread may barge in before it.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use core_types::{VmError, VmResult};
use parking_lot::{Condvar, Mutex, MutexGuard};

/// Identity of a guest thread for lock ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread#{}", self.0)
    }
}

/// How a wait ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by `signal` or `signal_all`
    Notified,
    /// The timeout elapsed first
    TimedOut,
}

#[derive(Debug, Default)]
struct LockState {
    owner: Option<ThreadId>,
    holds: u32,
    contenders: usize,
    next_ticket: u64,
    waiting: VecDeque<u64>,
    signalled: HashSet<u64>,
}

impl LockState {
    fn try_acquire(&mut self, thread: ThreadId) -> bool {
        match self.owner {
            Some(owner) if owner == thread => {
                self.holds += 1;
                true
            }
            Some(_) => false,
            None => {
                self.owner = Some(thread);
                self.holds = 1;
                true
            }
        }
    }

    fn check_owner(&self, thread: ThreadId) -> VmResult<()> {
        if self.owner == Some(thread) {
            Ok(())
        } else {
            Err(VmError::IllegalMonitorState)
        }
    }

    fn forget_ticket(&mut self, ticket: u64) {
        self.waiting.retain(|t| *t != ticket);
    }
}

/// Reentrant lock with a single wait set.
///
/// # Examples
///
/// ```
/// use object_model::{IntrinsicLock, ThreadId};
///
/// let lock = IntrinsicLock::new();
/// let t1 = ThreadId(1);
/// lock.lock(t1);
/// lock.lock(t1);
/// assert_eq!(lock.hold_count(), 2);
/// assert!(!lock.try_lock(ThreadId(2)));
/// lock.unlock(t1).unwrap();
/// lock.unlock(t1).unwrap();
/// assert!(lock.owner().is_none());
/// assert!(lock.unlock(t1).is_err());
/// ```
#[derive(Default)]
pub struct IntrinsicLock {
    state: Mutex<LockState>,
    entry: Condvar,
    wait_set: Condvar,
}

impl IntrinsicLock {
    /// Creates an unowned lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock if it is free or already held by `thread`.
    pub fn try_lock(&self, thread: ThreadId) -> bool {
        self.state.lock().try_acquire(thread)
    }

    /// Acquires the lock, blocking while another thread holds it.
    pub fn lock(&self, thread: ThreadId) {
        let mut state = self.state.lock();
        if state.try_acquire(thread) {
            return;
        }
        state.contenders += 1;
        while !state.try_acquire(thread) {
            self.entry.wait(&mut state);
        }
        state.contenders -= 1;
    }

    /// Releases one hold. Fails without touching the lock if `thread` is
    /// not the owner.
    pub fn unlock(&self, thread: ThreadId) -> VmResult<()> {
        let mut state = self.state.lock();
        state.check_owner(thread)?;
        state.holds -= 1;
        if state.holds == 0 {
            state.owner = None;
            self.entry.notify_one();
        }
        Ok(())
    }

    /// Releases every hold of `thread`, waits for a signal, then reacquires
    /// with the same hold count before returning.
    ///
    /// `timeout` of `None` waits without bound. `interrupted` is the
    /// thread's interrupt flag: it is consumed when it ends the wait, and a
    /// flag already set on entry fails before the lock is released.
    pub fn await_signal(
        &self,
        thread: ThreadId,
        timeout: Option<Duration>,
        interrupted: &AtomicBool,
    ) -> VmResult<WaitOutcome> {
        self.await_signal_then(thread, timeout, interrupted, |_| {})
    }

    /// Like [`await_signal`](Self::await_signal), calling `on_wake` once the
    /// wait has ended and before reacquiring. Its argument is true if
    /// another thread holds the lock at that point, so reacquiring blocks.
    ///
    /// `on_wake` runs with the lock's internal state held and must not call
    /// back into this lock.
    pub fn await_signal_then<F>(
        &self,
        thread: ThreadId,
        timeout: Option<Duration>,
        interrupted: &AtomicBool,
        on_wake: F,
    ) -> VmResult<WaitOutcome>
    where
        F: FnOnce(bool),
    {
        let mut state = self.state.lock();
        state.check_owner(thread)?;
        if interrupted.swap(false, Ordering::AcqRel) {
            return Err(VmError::Interrupted);
        }

        let holds = state.holds;
        state.owner = None;
        state.holds = 0;
        self.entry.notify_one();

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiting.push_back(ticket);

        let deadline = timeout.map(|t| Instant::now() + t);
        let outcome = loop {
            if state.signalled.remove(&ticket) {
                break Ok(WaitOutcome::Notified);
            }
            if interrupted.swap(false, Ordering::AcqRel) {
                state.forget_ticket(ticket);
                break Err(VmError::Interrupted);
            }
            match deadline {
                Some(deadline) => {
                    if self.wait_set.wait_until(&mut state, deadline).timed_out() {
                        if state.signalled.remove(&ticket) {
                            break Ok(WaitOutcome::Notified);
                        }
                        state.forget_ticket(ticket);
                        break Ok(WaitOutcome::TimedOut);
                    }
                }
                None => self.wait_set.wait(&mut state),
            }
        };

        on_wake(state.owner.is_some());
        self.reacquire(&mut state, thread, holds);
        outcome
    }

    fn reacquire(&self, state: &mut MutexGuard<'_, LockState>, thread: ThreadId, holds: u32) {
        state.contenders += 1;
        while state.owner.is_some() {
            self.entry.wait(state);
        }
        state.contenders -= 1;
        state.owner = Some(thread);
        state.holds = holds;
    }

    /// Wakes the longest-waiting thread, if any. Requires ownership.
    pub fn signal(&self, thread: ThreadId) -> VmResult<()> {
        let mut state = self.state.lock();
        state.check_owner(thread)?;
        if let Some(ticket) = state.waiting.pop_front() {
            state.signalled.insert(ticket);
            self.wait_set.notify_all();
        }
        Ok(())
    }

    /// Wakes every waiting thread. Requires ownership.
    pub fn signal_all(&self, thread: ThreadId) -> VmResult<()> {
        let mut state = self.state.lock();
        state.check_owner(thread)?;
        if !state.waiting.is_empty() {
            let woken: Vec<u64> = state.waiting.drain(..).collect();
            state.signalled.extend(woken);
            self.wait_set.notify_all();
        }
        Ok(())
    }

    /// Makes waiters re-check their interrupt flags.
    pub fn wake_waiters(&self) {
        let _state = self.state.lock();
        self.wait_set.notify_all();
    }

    /// Current owner.
    pub fn owner(&self) -> Option<ThreadId> {
        self.state.lock().owner
    }

    /// True if `thread` owns the lock.
    pub fn is_held_by(&self, thread: ThreadId) -> bool {
        self.state.lock().owner == Some(thread)
    }

    /// Reentrant hold count of the owner; 0 when free.
    pub fn hold_count(&self) -> u32 {
        self.state.lock().holds
    }

    /// Threads blocked acquiring the lock.
    pub fn contender_count(&self) -> usize {
        self.state.lock().contenders
    }

    /// Threads in the wait set not yet signalled.
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiting.len()
    }
}

impl fmt::Debug for IntrinsicLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("IntrinsicLock")
            .field("owner", &state.owner)
            .field("holds", &state.holds)
            .field("waiters", &state.waiting.len())
            .finish()
    }
}
