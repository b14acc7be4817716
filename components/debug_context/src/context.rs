//! The debugger-facing view of the runtime.

use std::sync::Arc;

use access::InterpreterToVm;
use core_types::{tag, JavaKind, RuntimeConfig, VmError, VmResult};
use monitor::{EmptyListener, MonitorListener, MonitorProtocol, ThreadRecord, ThreadRegistry, ThreadState};
use object_model::{names, KlassRef, KlassTable, MethodRef, ObjectRef, Reference, Value};
use redefinition::{Collaborators, RedefineInfo, RedefinitionOrchestrator, RedefinitionReport};

use crate::ids::Ids;
use crate::tracker::ContendedMonitorTracker;

/// A frame of a suspended thread as the interpreter reports it.
#[derive(Debug, Clone)]
pub struct DebugFrame {
    /// Method executing in the frame
    pub method: MethodRef,
    /// Monitor slots of the frame; empty slots are `None`
    pub monitors: Vec<Reference>,
}

impl DebugFrame {
    /// A frame holding no monitors.
    pub fn new(method: MethodRef) -> Self {
        DebugFrame {
            method,
            monitors: Vec::new(),
        }
    }

    /// A frame holding `monitors`.
    pub fn with_monitors(method: MethodRef, monitors: Vec<Reference>) -> Self {
        DebugFrame { method, monitors }
    }
}

/// A monitor owned by a frame.
#[derive(Debug, Clone)]
pub struct MonitorStackInfo {
    /// The owned monitor's object
    pub monitor: ObjectRef,
    /// Depth of the owning frame; 0 is the top frame
    pub stack_depth: usize,
}

/// Answers debugger queries over threads, monitors, classes and values,
/// and runs class redefinitions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use core_types::RuntimeConfig;
/// use debug_context::DebugContext;
/// use object_model::{HeapObject, KlassTable};
/// use redefinition::{Collaborators, TableMatcher};
/// # use object_model::KlassRef;
/// # use redefinition::{ChangeDetector, ChangePacket, ClassRedefiner, HotSwapClassInfo, RedefinitionError};
/// # struct Noop;
/// # impl ChangeDetector for Noop {
/// #     fn detect_class_changes(&self, _: &[HotSwapClassInfo]) -> Result<Vec<ChangePacket>, RedefinitionError> { Ok(Vec::new()) }
/// # }
/// # impl ClassRedefiner for Noop {
/// #     fn redefine_class(&self, _: &ChangePacket, _: &mut Vec<KlassRef>) -> Result<(), RedefinitionError> { Ok(()) }
/// # }
///
/// let table = Arc::new(KlassTable::new());
/// let collaborators = Collaborators {
///     matcher: Arc::new(TableMatcher::new(table.clone())),
///     detector: Arc::new(Noop),
///     redefiner: Arc::new(Noop),
/// };
/// let context = DebugContext::new(RuntimeConfig::default(), table.clone(), collaborators);
///
/// let guest = HeapObject::new_instance(table.thread()).unwrap();
/// context.threads().register("main", Some(guest.clone()));
/// assert!(context.is_valid_thread(Some(&guest), true));
/// assert_eq!(context.thread_name(&guest).as_deref(), Some("main"));
/// ```
pub struct DebugContext {
    config: RuntimeConfig,
    klasses: Arc<KlassTable>,
    threads: Arc<ThreadRegistry>,
    ids: Arc<Ids>,
    tracker: Arc<ContendedMonitorTracker>,
    monitors: Arc<MonitorProtocol>,
    vm: InterpreterToVm,
    redefinition: RedefinitionOrchestrator,
}

impl DebugContext {
    /// Creates the context over `klasses` with an empty thread registry.
    pub fn new(config: RuntimeConfig, klasses: Arc<KlassTable>, collaborators: Collaborators) -> Self {
        let ids = Arc::new(Ids::new());
        let tracker = Arc::new(ContendedMonitorTracker::new(Arc::new(EmptyListener)));
        let monitors = Arc::new(MonitorProtocol::new(&config).with_listener(tracker.clone()));
        DebugContext {
            vm: InterpreterToVm::new(config.clone(), klasses.clone()),
            redefinition: RedefinitionOrchestrator::new(collaborators, ids.clone()),
            config,
            klasses,
            threads: Arc::new(ThreadRegistry::new()),
            ids,
            tracker,
            monitors,
        }
    }

    /// Forwards monitor events to `listener` in addition to tracking
    /// contended monitors.
    pub fn with_monitor_listener(mut self, listener: Arc<dyn MonitorListener>) -> Self {
        self.tracker = Arc::new(ContendedMonitorTracker::new(listener));
        self.monitors = Arc::new(MonitorProtocol::new(&self.config).with_listener(self.tracker.clone()));
        self
    }

    /// Class table.
    pub fn klasses(&self) -> &Arc<KlassTable> {
        &self.klasses
    }

    /// Thread registry.
    pub fn threads(&self) -> &Arc<ThreadRegistry> {
        &self.threads
    }

    /// Identifier registry.
    pub fn ids(&self) -> &Arc<Ids> {
        &self.ids
    }

    /// Monitor protocol the interpreter must use so that contended
    /// monitors are visible here.
    pub fn monitors(&self) -> &Arc<MonitorProtocol> {
        &self.monitors
    }

    /// Access layer.
    pub fn vm(&self) -> &InterpreterToVm {
        &self.vm
    }

    /// Redefinition orchestrator.
    pub fn redefinition(&self) -> &RedefinitionOrchestrator {
        &self.redefinition
    }

    // ------------------------------------------------------------------
    // Threads
    // ------------------------------------------------------------------

    fn record_of(&self, guest: &ObjectRef) -> Option<Arc<ThreadRecord>> {
        self.threads.find_by_guest(guest)
    }

    /// Whether `object` is a thread object; with `check_terminated`, also
    /// that the thread has not terminated.
    pub fn is_valid_thread(&self, object: Option<&ObjectRef>, check_terminated: bool) -> bool {
        let Some(object) = object else {
            return false;
        };
        if !self.klasses.thread().is_assignable_from(object.klass()) {
            return false;
        }
        !check_terminated || self.thread_status(object) != ThreadState::Terminated.status()
    }

    /// Whether `object` is a thread group object.
    pub fn is_valid_thread_group(&self, object: Option<&ObjectRef>) -> bool {
        object.is_some_and(|o| self.klasses.thread_group().is_assignable_from(o.klass()))
    }

    /// Status bits of a thread; unstarted threads report `New`.
    pub fn thread_status(&self, guest: &ObjectRef) -> i32 {
        self.record_of(guest)
            .map_or(ThreadState::New, |record| record.state())
            .status()
    }

    /// Name of a registered thread.
    pub fn thread_name(&self, guest: &ObjectRef) -> Option<String> {
        self.record_of(guest).map(|record| record.name())
    }

    /// Thread objects of all live threads except the reference handler
    /// and finalizer.
    pub fn all_guest_threads(&self) -> Vec<ObjectRef> {
        self.threads
            .live()
            .iter()
            .filter_map(|record| record.guest().cloned())
            .filter(|guest| {
                let name = guest.klass().name();
                name != names::REFERENCE_HANDLER && name != names::FINALIZER_THREAD
            })
            .collect()
    }

    /// Interrupts a thread.
    pub fn interrupt_thread(&self, guest: &ObjectRef) {
        if let Some(record) = self.record_of(guest) {
            record.interrupt();
        }
    }

    /// Object whose monitor the thread is blocked entering, as recorded
    /// by management bookkeeping.
    pub fn blocked_object(&self, guest: &ObjectRef) -> Reference {
        self.record_of(guest).and_then(|record| record.blocked_object())
    }

    /// Monitor the thread is blocked entering or waiting on.
    pub fn current_contended_monitor(&self, guest: &ObjectRef) -> Reference {
        let record = self.record_of(guest)?;
        self.tracker
            .contended_monitor(record.id())
            .or_else(|| record.waiting_on())
    }

    /// Thread object of the owner of the monitor of `object`.
    pub fn monitor_owner_thread(&self, object: &ObjectRef) -> Reference {
        let owner = self.monitors.monitor_owner(object)?;
        self.threads.get(owner)?.guest().cloned()
    }

    /// Monitors held by `frames`, outermost slot last per frame.
    pub fn owned_monitors(&self, frames: &[DebugFrame]) -> Vec<MonitorStackInfo> {
        frames
            .iter()
            .enumerate()
            .flat_map(|(stack_depth, frame)| {
                frame.monitors.iter().flatten().map(move |monitor| MonitorStackInfo {
                    monitor: monitor.clone(),
                    stack_depth,
                })
            })
            .collect()
    }

    /// Releases every monitor held by `top_frame` before the debugger
    /// forces it to return `return_value`.
    ///
    /// # Errors
    ///
    /// `IllegalMonitorState` if `thread` does not own one of the monitors.
    pub fn force_early_return(
        &self,
        thread: &ThreadRecord,
        return_value: &Value,
        top_frame: &DebugFrame,
    ) -> VmResult<bool> {
        for info in self.owned_monitors(std::slice::from_ref(top_frame)) {
            self.monitors.monitor_exit(thread, &info.monitor)?;
        }
        log::debug!(
            "forcing early return of {:?} from {}",
            return_value,
            top_frame.method.name()
        );
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Classes loaded under a descriptor or internal name: `I`,
    /// `[[I`, `[Ljava/lang/String;` or `java/lang/String`.
    ///
    /// # Errors
    ///
    /// `IllegalArgument` for a malformed descriptor.
    pub fn find_loaded_class(&self, slash_name: &str) -> VmResult<Vec<KlassRef>> {
        if slash_name.len() == 1 {
            return Ok(vec![self.primitive_klass(slash_name, true)?.clone()]);
        }
        if slash_name.starts_with('[') {
            let component = slash_name.trim_start_matches('[');
            let dimensions = (slash_name.len() - component.len()) as u32;
            if component.len() == 1 {
                let element = self.primitive_klass(component, false)?;
                return Ok(vec![element.array_class_of_dimension(dimensions)]);
            }
            let name = component
                .strip_prefix('L')
                .and_then(|rest| rest.strip_suffix(';'))
                .ok_or_else(|| {
                    VmError::IllegalArgument(format!("invalid array descriptor {}", slash_name))
                })?;
            return Ok(self
                .klasses
                .lookup(name)
                .map(|klass| klass.array_class_of_dimension(dimensions))
                .into_iter()
                .collect());
        }
        Ok(self.klasses.lookup(slash_name).into_iter().collect())
    }

    fn primitive_klass(&self, descriptor: &str, allow_void: bool) -> VmResult<&KlassRef> {
        descriptor
            .chars()
            .next()
            .and_then(JavaKind::from_descriptor)
            .filter(|kind| kind.is_primitive() || (allow_void && *kind == JavaKind::Void))
            .map(|kind| self.klasses.primitive(kind))
            .ok_or_else(|| {
                VmError::IllegalArgument(format!("invalid primitive component type {}", descriptor))
            })
    }

    /// Every loaded class and interface.
    pub fn all_loaded_classes(&self) -> Vec<KlassRef> {
        self.klasses.all_loaded_classes()
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Whether `object` is a `java/lang/String`.
    pub fn is_string(&self, object: Option<&ObjectRef>) -> bool {
        object.is_some_and(|o| o.klass().name() == names::STRING)
    }

    /// Debugger tag of a reference.
    pub fn tag(&self, object: Option<&ObjectRef>) -> u8 {
        let Some(object) = object else {
            return tag::OBJECT;
        };
        let klass = object.klass();
        if klass.java_kind() != JavaKind::Object {
            return klass.java_kind().tag();
        }
        if self.is_string(Some(object)) {
            tag::STRING
        } else if klass.is_array() {
            tag::ARRAY
        } else if self.klasses.thread().is_assignable_from(klass) {
            tag::THREAD
        } else if self.klasses.thread_group().is_assignable_from(klass) {
            tag::THREAD_GROUP
        } else if Arc::ptr_eq(klass, self.klasses.class()) {
            tag::CLASS_OBJECT
        } else if self.klasses.class_loader().is_assignable_from(klass) {
            tag::CLASS_LOADER
        } else {
            tag::OBJECT
        }
    }

    /// Tag of the elements of `array`; for a non-array, the tag of its
    /// class.
    pub fn type_tag(&self, array: &ObjectRef) -> u8 {
        let klass = array.klass();
        match klass.component_type() {
            Some(_) if klass.dimension() > 1 => tag::ARRAY,
            Some(component) if component.name() == names::STRING => tag::STRING,
            Some(component) => component.java_kind().tag(),
            None if klass.name() == names::STRING => tag::STRING,
            None => klass.java_kind().tag(),
        }
    }

    /// Whether `object` is an array.
    pub fn is_array(&self, object: Option<&ObjectRef>) -> bool {
        object.is_some_and(|o| o.is_array())
    }

    /// Length of an array.
    pub fn array_length(&self, array: &ObjectRef) -> VmResult<i32> {
        self.vm.array_length(array)
    }

    /// Whether `max_index` does not exceed the array's length.
    pub fn verify_array_length(&self, array: &ObjectRef, max_index: i32) -> VmResult<bool> {
        Ok(max_index <= self.array_length(array)?)
    }

    /// Element `index` of an array of any component kind.
    pub fn array_value(&self, array: &ObjectRef, index: i32) -> VmResult<Value> {
        array.array_value(index)
    }

    /// Stores a reference into a reference array.
    pub fn set_array_value(&self, array: &ObjectRef, index: i32, value: Reference) -> VmResult<()> {
        self.vm.set_array_object(array, index, value, None)
    }

    /// Allocates an array of the array class `array_klass`.
    ///
    /// # Errors
    ///
    /// `Internal` if `array_klass` is not an array class,
    /// `NegativeArraySize` for a negative `length`.
    pub fn new_array(&self, array_klass: &KlassRef, length: i32) -> VmResult<ObjectRef> {
        let component = array_klass.component_type().ok_or_else(|| {
            VmError::internal(format!("{} is not an array class", array_klass.name()))
        })?;
        if component.is_primitive() {
            self.vm.allocate_primitive_array(component.java_kind(), length)
        } else {
            self.vm.new_reference_array(component, length)
        }
    }

    /// Whether `object` is an instance of `klass`.
    pub fn is_instance_of(&self, object: &ObjectRef, klass: &KlassRef) -> bool {
        self.vm.instance_of(Some(object), klass)
    }

    // ------------------------------------------------------------------
    // Redefinition
    // ------------------------------------------------------------------

    /// Redefines classes; 0 on success, otherwise the JDWP error code.
    pub fn redefine_classes(&self, infos: &[RedefineInfo]) -> i32 {
        self.redefinition.redefine_classes(infos)
    }

    /// Redefines classes and reports which were applied.
    pub fn redefine_classes_detailed(&self, infos: &[RedefineInfo]) -> RedefinitionReport {
        self.redefinition.redefine_classes_detailed(infos)
    }
}
