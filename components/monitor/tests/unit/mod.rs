//! Unit tests for the monitor protocol

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use core_types::{RuntimeConfig, VmError};
use monitor::{MonitorListener, MonitorProtocol, ThreadRecord, ThreadRegistry, ThreadState};
use object_model::{HeapObject, KlassTable, ObjectRef};
use parking_lot::Mutex;

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn push(&self, thread: &ThreadRecord, event: &str) {
        self.events.lock().push(format!("{}:{}", thread.name(), event));
    }

    fn snapshot(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl MonitorListener for EventLog {
    fn on_monitor_enter(&self, thread: &ThreadRecord, _: &ObjectRef) {
        self.push(thread, "enter");
    }

    fn on_contended_monitor_enter(&self, thread: &ThreadRecord, _: &ObjectRef) {
        self.push(thread, "contended");
    }

    fn on_contended_monitor_entered(&self, thread: &ThreadRecord, _: &ObjectRef) {
        self.push(thread, "contended-entered");
    }

    fn on_monitor_exit(&self, thread: &ThreadRecord, _: &ObjectRef) {
        self.push(thread, "exit");
    }
}

fn setup(config: RuntimeConfig) -> (Arc<MonitorProtocol>, Arc<EventLog>, ObjectRef) {
    let _ = env_logger::builder().is_test(true).try_init();
    let log = Arc::new(EventLog::default());
    let monitors = Arc::new(MonitorProtocol::new(&config).with_listener(log.clone()));
    let table = KlassTable::new();
    let object = HeapObject::new_instance(table.object()).unwrap();
    (monitors, log, object)
}

fn wait_for_state(thread: &ThreadRecord, state: ThreadState) {
    for _ in 0..5_000 {
        if thread.state() == state {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("{} never reached {:?}", thread, state);
}

fn wait_for_contender(object: &ObjectRef) {
    for _ in 0..5_000 {
        if object.lock().contender_count() == 1 {
            return;
        }
        thread::sleep(Duration::from_millis(1));
    }
    panic!("no thread blocked on {:?}", object);
}

// ============================================================================
// Enter / Exit Tests
// ============================================================================

#[test]
fn test_contended_enter_records_blocked_state() {
    let (monitors, log, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    let contender = registry.register("contender", None);

    monitors.monitor_enter(&owner, &object);

    let handle = {
        let monitors = monitors.clone();
        let contender = contender.clone();
        let object = object.clone();
        thread::spawn(move || {
            monitors.monitor_enter(&contender, &object);
            monitors.monitor_exit(&contender, &object).unwrap();
        })
    };

    wait_for_contender(&object);
    assert_eq!(contender.state(), ThreadState::Blocked);
    let blocked_on = contender.blocked_object().unwrap();
    assert!(Arc::ptr_eq(&blocked_on, &object));
    assert_eq!(contender.status(), 1025);

    monitors.monitor_exit(&owner, &object).unwrap();
    handle.join().unwrap();

    assert_eq!(contender.state(), ThreadState::Runnable);
    assert!(contender.blocked_object().is_none());
    assert_eq!(contender.blocked_count(), 1);
    let events = log.snapshot();
    let of = |name: &str| -> Vec<String> {
        events
            .iter()
            .filter(|e| e.starts_with(name))
            .cloned()
            .collect()
    };
    assert_eq!(of("owner:"), vec!["owner:enter", "owner:exit"]);
    assert_eq!(
        of("contender:"),
        vec![
            "contender:contended",
            "contender:contended-entered",
            "contender:enter",
            "contender:exit",
        ]
    );
}

#[test]
fn test_management_disabled_skips_bookkeeping() {
    let config = RuntimeConfig {
        enable_management: false,
        ..RuntimeConfig::default()
    };
    let (monitors, _, object) = setup(config);
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    let contender = registry.register("contender", None);

    monitors.monitor_enter(&owner, &object);
    let handle = {
        let monitors = monitors.clone();
        let contender = contender.clone();
        let object = object.clone();
        thread::spawn(move || {
            monitors.monitor_enter(&contender, &object);
            monitors.monitor_exit(&contender, &object).unwrap();
        })
    };

    wait_for_contender(&object);
    assert_eq!(contender.state(), ThreadState::Blocked);
    assert!(contender.blocked_object().is_none());
    monitors.monitor_exit(&owner, &object).unwrap();
    handle.join().unwrap();
    assert_eq!(contender.blocked_count(), 0);
}

#[test]
fn test_exit_by_non_owner_keeps_ownership() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    let intruder = registry.register("intruder", None);

    monitors.monitor_enter(&owner, &object);
    assert_eq!(
        monitors.monitor_exit(&intruder, &object),
        Err(VmError::IllegalMonitorState)
    );
    assert!(monitors.holds_lock(&owner, &object));
    assert_eq!(monitors.monitor_owner(&object), Some(owner.id()));
}

#[test]
fn test_try_enter_fails_while_owned() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    let other = registry.register("other", None);

    assert!(monitors.monitor_try_enter(&owner, &object));
    assert!(!monitors.monitor_try_enter(&other, &object));
    monitors.monitor_exit(&owner, &object).unwrap();
    assert!(monitors.monitor_try_enter(&other, &object));
}

#[test]
fn test_try_enter_reports_enter_before_exit() {
    let (monitors, log, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    let other = registry.register("other", None);

    assert!(monitors.monitor_try_enter(&owner, &object));
    assert!(!monitors.monitor_try_enter(&other, &object));
    monitors.monitor_exit(&owner, &object).unwrap();

    assert_eq!(log.snapshot(), vec!["owner:enter", "owner:exit"]);
}

// ============================================================================
// Wait / Notify Tests
// ============================================================================

#[test]
fn test_notify_releases_unbounded_wait() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let waiter = registry.register("waiter", None);
    let notifier = registry.register("notifier", None);
    let (tx, rx) = mpsc::channel();

    let handle = {
        let monitors = monitors.clone();
        let waiter = waiter.clone();
        let object = object.clone();
        thread::spawn(move || {
            monitors.monitor_enter(&waiter, &object);
            let notified = monitors.monitor_wait(&waiter, &object, 0);
            let holds = monitors.holds_lock(&waiter, &object);
            monitors.monitor_exit(&waiter, &object).unwrap();
            tx.send((notified, holds)).unwrap();
        })
    };

    wait_for_state(&waiter, ThreadState::Waiting);
    assert_eq!(waiter.status(), 145);
    monitors.monitor_enter(&notifier, &object);
    monitors.monitor_notify(&notifier, &object).unwrap();
    monitors.monitor_exit(&notifier, &object).unwrap();

    let (notified, holds) = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    handle.join().unwrap();
    assert_eq!(notified, Ok(true));
    assert!(holds);
    assert_eq!(waiter.state(), ThreadState::Runnable);
}

#[test]
fn test_notified_waiter_is_blocked_until_notifier_exits() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let waiter = registry.register("waiter", None);
    let notifier = registry.register("notifier", None);

    let handle = {
        let monitors = monitors.clone();
        let waiter = waiter.clone();
        let object = object.clone();
        thread::spawn(move || {
            monitors.monitor_enter(&waiter, &object);
            let notified = monitors.monitor_wait(&waiter, &object, 0);
            monitors.monitor_exit(&waiter, &object).unwrap();
            notified
        })
    };

    wait_for_state(&waiter, ThreadState::Waiting);
    monitors.monitor_enter(&notifier, &object);
    monitors.monitor_notify(&notifier, &object).unwrap();

    // the notifier keeps the monitor, so the waiter re-contends for it
    wait_for_state(&waiter, ThreadState::Blocked);
    assert_eq!(waiter.status(), 1025);
    let blocked_on = waiter.blocked_object().unwrap();
    assert!(Arc::ptr_eq(&blocked_on, &object));
    assert_eq!(waiter.blocked_count(), 1);
    assert!(monitors.holds_lock(&notifier, &object));

    monitors.monitor_exit(&notifier, &object).unwrap();
    assert_eq!(handle.join().unwrap(), Ok(true));
    assert_eq!(waiter.state(), ThreadState::Runnable);
    assert!(waiter.blocked_object().is_none());
}

#[test]
fn test_notify_all_releases_every_waiter() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = Arc::new(ThreadRegistry::new());
    let notifier = registry.register("notifier", None);

    let waiters: Vec<_> = (0..3)
        .map(|i| {
            let waiter = registry.register(format!("waiter-{}", i), None);
            let monitors = monitors.clone();
            let object = object.clone();
            let record = waiter.clone();
            let handle = thread::spawn(move || {
                monitors.monitor_enter(&record, &object);
                let notified = monitors.monitor_wait(&record, &object, 0);
                monitors.monitor_exit(&record, &object).unwrap();
                notified
            });
            (waiter, handle)
        })
        .collect();

    for (waiter, _) in &waiters {
        wait_for_state(waiter, ThreadState::Waiting);
    }
    loop {
        monitors.monitor_enter(&notifier, &object);
        if object.lock().waiter_count() == 3 {
            break;
        }
        monitors.monitor_exit(&notifier, &object).unwrap();
        thread::sleep(Duration::from_millis(1));
    }
    monitors.monitor_notify_all(&notifier, &object).unwrap();
    monitors.monitor_exit(&notifier, &object).unwrap();

    for (_, handle) in waiters {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}

#[test]
fn test_notify_without_waiters_is_noop() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let owner = registry.register("owner", None);
    monitors.monitor_enter(&owner, &object);
    assert!(monitors.monitor_notify(&owner, &object).is_ok());
    assert!(monitors.monitor_notify_all(&owner, &object).is_ok());
}

#[test]
fn test_wait_and_notify_require_ownership() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let stranger = registry.register("stranger", None);
    assert_eq!(
        monitors.monitor_wait(&stranger, &object, 0),
        Err(VmError::IllegalMonitorState)
    );
    assert_eq!(
        monitors.monitor_notify(&stranger, &object),
        Err(VmError::IllegalMonitorState)
    );
    assert_eq!(
        monitors.monitor_notify_all(&stranger, &object),
        Err(VmError::IllegalMonitorState)
    );
}

#[test]
fn test_timed_wait_reports_timeout() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let waiter = registry.register("waiter", None);
    monitors.monitor_enter(&waiter, &object);
    assert_eq!(monitors.monitor_wait(&waiter, &object, 20), Ok(false));
    assert!(monitors.holds_lock(&waiter, &object));
}

#[test]
fn test_interrupt_surfaces_as_distinct_outcome() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let waiter = registry.register("waiter", None);

    let handle = {
        let monitors = monitors.clone();
        let waiter = waiter.clone();
        let object = object.clone();
        thread::spawn(move || {
            monitors.monitor_enter(&waiter, &object);
            let result = monitors.monitor_wait(&waiter, &object, 0);
            let holds = monitors.holds_lock(&waiter, &object);
            monitors.monitor_exit(&waiter, &object).unwrap();
            (result, holds)
        })
    };

    wait_for_state(&waiter, ThreadState::Waiting);
    waiter.interrupt();

    let (result, holds) = handle.join().unwrap();
    assert_eq!(result, Err(VmError::Interrupted));
    assert!(holds);
    assert!(!waiter.is_interrupted());
}

#[test]
fn test_pending_interrupt_fails_wait_immediately() {
    let (monitors, _, object) = setup(RuntimeConfig::default());
    let registry = ThreadRegistry::new();
    let waiter = registry.register("waiter", None);
    monitors.monitor_enter(&waiter, &object);
    waiter.interrupt();
    assert_eq!(
        monitors.monitor_wait(&waiter, &object, 0),
        Err(VmError::Interrupted)
    );
    assert!(monitors.holds_lock(&waiter, &object));
}
