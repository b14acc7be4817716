//! Runtime type descriptors.
//!
//! A [`Klass`] describes a loaded type: a primitive, an instance class or
//! interface, or an array. Klasses are shared through [`KlassRef`] and
//! compared by identity.
//!
//! # Assignability
//!
//! `is_assignable_from` is the subtyping partial order of the hosted
//! language:
//! - every type is assignable from itself
//! - a class or interface is assignable from its subclasses and implementors
//! - `S[]` is assignable to `T[]` iff `S` is assignable to `T` (reference
//!   components) or `S` and `T` are the same primitive
//! - every array is assignable to `Object`, `Cloneable` and `Serializable`

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId as HostThreadId};

use core_types::{JavaKind, VmError, VmResult};
use parking_lot::{Condvar, Mutex, RwLock};

use crate::field::{Field, FieldRef};
use crate::klass_table::names;

/// Shared handle to a klass.
pub type KlassRef = Arc<Klass>;

/// Class, field and method flags.
pub mod access_flags {
    /// Public visibility.
    pub const ACC_PUBLIC: u32 = 0x0001;
    /// Cannot be subclassed / overridden.
    pub const ACC_FINAL: u32 = 0x0010;
    /// Native method.
    pub const ACC_NATIVE: u32 = 0x0100;
    /// Interface type.
    pub const ACC_INTERFACE: u32 = 0x0200;
    /// Abstract type or method.
    pub const ACC_ABSTRACT: u32 = 0x0400;
    /// Method hidden from stack walks.
    pub const ACC_LAMBDA_FORM_HIDDEN: u32 = 0x0020_0000;
}

/// Static initializer run once on first initialization. An `Err` carries a
/// description of the failure.
pub type Initializer = Box<dyn Fn(&Klass) -> Result<(), String> + Send + Sync>;

/// Shape of a klass.
pub enum KlassKind {
    /// One of the primitive types or `void`
    Primitive(JavaKind),
    /// Class or interface
    Instance {
        /// Direct superclass; `None` only for `java/lang/Object`
        super_klass: Option<KlassRef>,
        /// Directly implemented interfaces
        interfaces: Vec<KlassRef>,
    },
    /// Array type
    Array {
        /// Element type
        component: KlassRef,
        /// Number of dimensions, at least 1
        dimension: u32,
    },
}

/// Initialization progress of a klass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Initializer not run yet
    Uninitialized,
    /// Initializer running on the given host thread
    Initializing(HostThreadId),
    /// Ready for use
    Initialized,
    /// Initializer failed; every later use fails
    Erroneous,
}

/// Description of a class or interface to define in a
/// [`KlassTable`](crate::KlassTable).
///
/// # Examples
///
/// ```
/// use core_types::JavaKind;
/// use object_model::{ClassDefinition, KlassTable};
///
/// let table = KlassTable::new();
/// let point = table
///     .define(ClassDefinition::new("demo/Point").field("x", JavaKind::Int).field("y", JavaKind::Int))
///     .unwrap();
/// assert_eq!(point.instance_layout(), &[JavaKind::Int, JavaKind::Int]);
/// ```
pub struct ClassDefinition {
    pub(crate) name: String,
    pub(crate) super_name: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) flags: u32,
    pub(crate) fields: Vec<(String, JavaKind)>,
    pub(crate) initializer: Option<Initializer>,
}

impl ClassDefinition {
    /// A public class extending `java/lang/Object`.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDefinition {
            name: name.into(),
            super_name: None,
            interfaces: Vec::new(),
            flags: access_flags::ACC_PUBLIC,
            fields: Vec::new(),
            initializer: None,
        }
    }

    /// Sets the superclass by name.
    pub fn extends(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    /// Adds a directly implemented interface by name.
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Replaces the access flags.
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Declares an instance field.
    pub fn field(mut self, name: impl Into<String>, kind: JavaKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    /// Installs the static initializer.
    pub fn initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&Klass) -> Result<(), String> + Send + Sync + 'static,
    {
        self.initializer = Some(Box::new(initializer));
        self
    }
}

/// A loaded type.
pub struct Klass {
    name: RwLock<String>,
    kind: KlassKind,
    flags: u32,
    declared_fields: Vec<FieldRef>,
    layout: Vec<JavaKind>,
    array_class: OnceLock<KlassRef>,
    init_state: Mutex<InitState>,
    init_done: Condvar,
    initializer: Option<Initializer>,
    layout_epoch: AtomicU64,
    removed: AtomicBool,
}

impl Klass {
    pub(crate) fn new_primitive(kind: JavaKind) -> KlassRef {
        Arc::new(Klass::bare(
            kind.java_name().to_string(),
            KlassKind::Primitive(kind),
            access_flags::ACC_PUBLIC | access_flags::ACC_FINAL | access_flags::ACC_ABSTRACT,
            InitState::Initialized,
        ))
    }

    pub(crate) fn new_instance(
        definition: ClassDefinition,
        super_klass: Option<KlassRef>,
        interfaces: Vec<KlassRef>,
    ) -> KlassRef {
        let ClassDefinition {
            name,
            flags,
            fields,
            initializer,
            ..
        } = definition;
        let mut layout = super_klass
            .as_ref()
            .map(|s| s.layout.clone())
            .unwrap_or_default();

        Arc::new_cyclic(move |this| {
            let declared_fields = fields
                .into_iter()
                .map(|(field_name, kind)| {
                    let slot = layout.len();
                    layout.push(kind);
                    Arc::new(Field::new(field_name, kind, slot, this.clone()))
                })
                .collect();
            let mut klass = Klass::bare(
                name,
                KlassKind::Instance {
                    super_klass,
                    interfaces,
                },
                flags,
                InitState::Uninitialized,
            );
            klass.declared_fields = declared_fields;
            klass.layout = layout;
            klass.initializer = initializer;
            klass
        })
    }

    fn new_array(component: &KlassRef) -> KlassRef {
        let name = match &component.kind {
            KlassKind::Primitive(kind) => format!("[{}", kind.descriptor()),
            KlassKind::Array { .. } => format!("[{}", component.name()),
            KlassKind::Instance { .. } => format!("[L{};", component.name()),
        };
        Arc::new(Klass::bare(
            name,
            KlassKind::Array {
                component: component.clone(),
                dimension: component.dimension() + 1,
            },
            access_flags::ACC_PUBLIC | access_flags::ACC_FINAL | access_flags::ACC_ABSTRACT,
            InitState::Initialized,
        ))
    }

    fn bare(name: String, kind: KlassKind, flags: u32, state: InitState) -> Klass {
        Klass {
            name: RwLock::new(name),
            kind,
            flags,
            declared_fields: Vec::new(),
            layout: Vec::new(),
            array_class: OnceLock::new(),
            init_state: Mutex::new(state),
            init_done: Condvar::new(),
            initializer: None,
            layout_epoch: AtomicU64::new(0),
            removed: AtomicBool::new(false),
        }
    }

    /// Internal name, e.g. `java/lang/String`, `[I`, `int`.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    /// Renames the klass; used when a redefinition renames a class.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Shape of the klass.
    pub fn kind(&self) -> &KlassKind {
        &self.kind
    }

    /// Kind of values of this type; `Object` for classes and arrays.
    pub fn java_kind(&self) -> JavaKind {
        match self.kind {
            KlassKind::Primitive(kind) => kind,
            _ => JavaKind::Object,
        }
    }

    /// Access flags.
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Is an interface.
    pub fn is_interface(&self) -> bool {
        self.flags & access_flags::ACC_INTERFACE != 0
    }

    /// Is abstract (interfaces, primitives and arrays included).
    pub fn is_abstract(&self) -> bool {
        self.flags & access_flags::ACC_ABSTRACT != 0
    }

    /// Is a primitive type or `void`.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, KlassKind::Primitive(_))
    }

    /// Is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, KlassKind::Array { .. })
    }

    /// Is a class or interface.
    pub fn is_instance(&self) -> bool {
        matches!(self.kind, KlassKind::Instance { .. })
    }

    /// Direct superclass.
    pub fn super_klass(&self) -> Option<&KlassRef> {
        match &self.kind {
            KlassKind::Instance { super_klass, .. } => super_klass.as_ref(),
            _ => None,
        }
    }

    /// Directly implemented interfaces.
    pub fn interfaces(&self) -> &[KlassRef] {
        match &self.kind {
            KlassKind::Instance { interfaces, .. } => interfaces,
            _ => &[],
        }
    }

    /// Element type of an array klass.
    pub fn component_type(&self) -> Option<&KlassRef> {
        match &self.kind {
            KlassKind::Array { component, .. } => Some(component),
            _ => None,
        }
    }

    /// Number of array dimensions; 0 for non-arrays.
    pub fn dimension(&self) -> u32 {
        match &self.kind {
            KlassKind::Array { dimension, .. } => *dimension,
            _ => 0,
        }
    }

    /// The array type with this klass as component, created on first use.
    pub fn array_class(self: &Arc<Self>) -> KlassRef {
        self.array_class
            .get_or_init(|| Klass::new_array(self))
            .clone()
    }

    /// The array type with `dimensions` levels of this klass.
    pub fn array_class_of_dimension(self: &Arc<Self>, dimensions: u32) -> KlassRef {
        let mut klass = self.clone();
        for _ in 0..dimensions {
            klass = klass.array_class();
        }
        klass
    }

    /// Fields declared directly by this klass.
    pub fn declared_fields(&self) -> &[FieldRef] {
        &self.declared_fields
    }

    /// Finds an instance field by name in this klass or its superclasses.
    pub fn lookup_field(&self, name: &str) -> Option<FieldRef> {
        self.declared_fields
            .iter()
            .find(|f| f.name() == name)
            .cloned()
            .or_else(|| self.super_klass().and_then(|s| s.lookup_field(name)))
    }

    /// Kinds of every instance slot, superclass slots first.
    pub fn instance_layout(&self) -> &[JavaKind] {
        &self.layout
    }

    /// Subtyping check: can a value of type `other` be stored where this
    /// type is expected.
    pub fn is_assignable_from(&self, other: &Klass) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (&self.kind, &other.kind) {
            (KlassKind::Primitive(_), _) | (_, KlassKind::Primitive(_)) => false,
            (KlassKind::Array { component: to, .. }, KlassKind::Array { component: from, .. }) => {
                if to.is_primitive() || from.is_primitive() {
                    Arc::ptr_eq(to, from)
                } else {
                    to.is_assignable_from(from)
                }
            }
            (KlassKind::Array { .. }, KlassKind::Instance { .. }) => false,
            (KlassKind::Instance { .. }, KlassKind::Array { .. }) => self.is_array_supertype(),
            (KlassKind::Instance { .. }, KlassKind::Instance { .. }) => other.has_supertype(self),
        }
    }

    fn has_supertype(&self, target: &Klass) -> bool {
        if std::ptr::eq(self, target) {
            return true;
        }
        match &self.kind {
            KlassKind::Instance {
                super_klass,
                interfaces,
            } => super_klass
                .iter()
                .chain(interfaces.iter())
                .any(|s| s.has_supertype(target)),
            _ => false,
        }
    }

    fn is_array_supertype(&self) -> bool {
        let name = self.name.read();
        name.as_str() == names::OBJECT
            || name.as_str() == names::CLONEABLE
            || name.as_str() == names::SERIALIZABLE
    }

    /// Current initialization state.
    pub fn init_state(&self) -> InitState {
        *self.init_state.lock()
    }

    /// Initializes the klass at most once, superclass first.
    ///
    /// Concurrent callers wait for the initializing thread; a recursive call
    /// from the initializing thread returns immediately. A failed
    /// initializer leaves the klass erroneous and every later call fails
    /// with `NoClassDefFound`.
    pub fn safe_initialize(&self) -> VmResult<()> {
        let current = thread::current().id();
        {
            let mut state = self.init_state.lock();
            loop {
                match *state {
                    InitState::Initialized => return Ok(()),
                    InitState::Erroneous => {
                        return Err(VmError::NoClassDefFound { class: self.name() })
                    }
                    InitState::Initializing(owner) if owner == current => return Ok(()),
                    InitState::Initializing(_) => self.init_done.wait(&mut state),
                    InitState::Uninitialized => {
                        *state = InitState::Initializing(current);
                        break;
                    }
                }
            }
        }

        let result = self.run_initializer();

        let mut state = self.init_state.lock();
        *state = if result.is_ok() {
            InitState::Initialized
        } else {
            InitState::Erroneous
        };
        self.init_done.notify_all();
        result
    }

    fn run_initializer(&self) -> VmResult<()> {
        if let Some(super_klass) = self.super_klass() {
            super_klass.safe_initialize()?;
        }
        match &self.initializer {
            Some(initializer) => {
                log::trace!("running initializer of {}", self.name());
                initializer(self).map_err(|cause| VmError::ExceptionInInitializer {
                    class: self.name(),
                    cause,
                })
            }
            None => Ok(()),
        }
    }

    /// Called after a superclass was redefined; invalidates cached layout
    /// views (vtables, field offsets) by bumping the layout epoch.
    pub fn on_super_klass_update(&self) {
        let epoch = self.layout_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("{} refreshed for super class update (epoch {})", self.name(), epoch);
    }

    /// Number of superclass refreshes seen.
    pub fn layout_epoch(&self) -> u64 {
        self.layout_epoch.load(Ordering::Acquire)
    }

    /// Marks the klass as removed by a redefinition.
    pub fn remove_by_redefinition(&self) {
        self.removed.store(true, Ordering::Release);
    }

    /// Removed by a redefinition.
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Klass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.kind {
            KlassKind::Primitive(_) => "primitive",
            KlassKind::Instance { .. } if self.is_interface() => "interface",
            KlassKind::Instance { .. } => "class",
            KlassKind::Array { .. } => "array",
        };
        write!(f, "Klass({} {})", shape, self.name())
    }
}
