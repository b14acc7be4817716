//! Table of loaded klasses.
//!
//! The table is bootstrapped with the well-known classes the execution
//! support layer refers to by identity (`Object`, `Throwable`, `Thread`,
//! ...) and the primitive klasses. Further classes are defined by name.

use std::collections::HashMap;
use std::sync::Arc;

use core_types::{JavaKind, VmError, VmResult};
use parking_lot::RwLock;

use crate::klass::{access_flags, ClassDefinition, Klass, KlassRef};

/// Internal names of the well-known classes.
pub mod names {
    /// Root of the class hierarchy.
    pub const OBJECT: &str = "java/lang/Object";
    /// Marker interface implemented by every array.
    pub const CLONEABLE: &str = "java/lang/Cloneable";
    /// Marker interface implemented by every array.
    pub const SERIALIZABLE: &str = "java/io/Serializable";
    /// Root of the exception hierarchy.
    pub const THROWABLE: &str = "java/lang/Throwable";
    /// Guest thread objects.
    pub const THREAD: &str = "java/lang/Thread";
    /// Guest thread groups.
    pub const THREAD_GROUP: &str = "java/lang/ThreadGroup";
    /// Class mirrors.
    pub const CLASS: &str = "java/lang/Class";
    /// Class loaders.
    pub const CLASS_LOADER: &str = "java/lang/ClassLoader";
    /// Strings.
    pub const STRING: &str = "java/lang/String";
    /// System thread processing pending references.
    pub const REFERENCE_HANDLER: &str = "java/lang/ref/Reference$ReferenceHandler";
    /// System thread running finalizers.
    pub const FINALIZER_THREAD: &str = "java/lang/ref/Finalizer$FinalizerThread";
}

/// Field of `Throwable` holding the number of captured frames.
pub const THROWABLE_DEPTH_FIELD: &str = "depth";

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, KlassRef>,
    order: Vec<KlassRef>,
}

/// All loaded klasses plus direct handles to the well-known ones.
///
/// # Examples
///
/// ```
/// use object_model::{ClassDefinition, KlassTable};
///
/// let table = KlassTable::new();
/// let error = table
///     .define(ClassDefinition::new("demo/MyError").extends("java/lang/Throwable"))
///     .unwrap();
/// assert!(table.throwable().is_assignable_from(&error));
/// assert!(table.lookup("demo/MyError").is_some());
/// ```
pub struct KlassTable {
    registry: RwLock<Registry>,
    primitives: Vec<KlassRef>,
    object: KlassRef,
    cloneable: KlassRef,
    serializable: KlassRef,
    throwable: KlassRef,
    thread: KlassRef,
    thread_group: KlassRef,
    class: KlassRef,
    class_loader: KlassRef,
    string: KlassRef,
}

const PRIMITIVE_ORDER: [JavaKind; 9] = [
    JavaKind::Boolean,
    JavaKind::Byte,
    JavaKind::Char,
    JavaKind::Short,
    JavaKind::Int,
    JavaKind::Long,
    JavaKind::Float,
    JavaKind::Double,
    JavaKind::Void,
];

impl KlassTable {
    /// Creates a table holding the bootstrap classes.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let object = Klass::new_instance(ClassDefinition::new(names::OBJECT), None, Vec::new());
        registry.insert(object.clone());

        let interface = access_flags::ACC_PUBLIC | access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT;
        let mut boot = |definition: ClassDefinition, interfaces: Vec<KlassRef>| {
            let klass = Klass::new_instance(definition, Some(object.clone()), interfaces);
            registry.insert(klass.clone());
            klass
        };

        let cloneable = boot(ClassDefinition::new(names::CLONEABLE).flags(interface), Vec::new());
        let serializable = boot(ClassDefinition::new(names::SERIALIZABLE).flags(interface), Vec::new());
        let throwable = boot(
            ClassDefinition::new(names::THROWABLE)
                .field("detailMessage", JavaKind::Object)
                .field(THROWABLE_DEPTH_FIELD, JavaKind::Int),
            vec![serializable.clone()],
        );
        let thread = boot(ClassDefinition::new(names::THREAD), Vec::new());
        let thread_group = boot(ClassDefinition::new(names::THREAD_GROUP), Vec::new());
        let class = boot(
            ClassDefinition::new(names::CLASS).flags(access_flags::ACC_PUBLIC | access_flags::ACC_FINAL),
            vec![serializable.clone()],
        );
        let class_loader = boot(
            ClassDefinition::new(names::CLASS_LOADER)
                .flags(access_flags::ACC_PUBLIC | access_flags::ACC_ABSTRACT),
            Vec::new(),
        );
        let string = boot(
            ClassDefinition::new(names::STRING).flags(access_flags::ACC_PUBLIC | access_flags::ACC_FINAL),
            vec![serializable.clone()],
        );

        let primitives = PRIMITIVE_ORDER.iter().map(|k| Klass::new_primitive(*k)).collect();

        KlassTable {
            registry: RwLock::new(registry),
            primitives,
            object,
            cloneable,
            serializable,
            throwable,
            thread,
            thread_group,
            class,
            class_loader,
            string,
        }
    }

    /// Defines a class or interface. The superclass and interfaces must
    /// already be loaded, and no field may be `void`.
    pub fn define(&self, definition: ClassDefinition) -> VmResult<KlassRef> {
        if let Some((field, _)) = definition.fields.iter().find(|(_, kind)| *kind == JavaKind::Void) {
            return Err(VmError::internal(format!(
                "field {}.{} cannot be void",
                definition.name, field
            )));
        }
        let super_name = definition
            .super_name
            .clone()
            .unwrap_or_else(|| names::OBJECT.to_string());
        let super_klass = self
            .lookup(&super_name)
            .ok_or_else(|| VmError::NoClassDefFound {
                class: super_name.clone(),
            })?;
        let interfaces = definition
            .interfaces
            .iter()
            .map(|name| {
                self.lookup(name)
                    .ok_or_else(|| VmError::NoClassDefFound { class: name.clone() })
            })
            .collect::<VmResult<Vec<_>>>()?;

        let mut registry = self.registry.write();
        if registry.by_name.contains_key(&definition.name) {
            return Err(VmError::Linkage(format!(
                "duplicate class definition: {}",
                definition.name
            )));
        }
        let klass = Klass::new_instance(definition, Some(super_klass), interfaces);
        log::debug!("defined class {}", klass.name());
        registry.insert(klass.clone());
        Ok(klass)
    }

    /// Finds a loaded class or interface by internal name.
    pub fn lookup(&self, name: &str) -> Option<KlassRef> {
        self.registry.read().by_name.get(name).cloned()
    }

    /// Every loaded class and interface, in definition order.
    pub fn all_loaded_classes(&self) -> Vec<KlassRef> {
        self.registry.read().order.clone()
    }

    /// Renames a loaded klass, keeping the name index consistent.
    pub fn rename(&self, klass: &KlassRef, new_name: &str) {
        let mut registry = self.registry.write();
        let old_name = klass.name();
        let indexed = registry
            .by_name
            .get(&old_name)
            .map(|existing| Arc::ptr_eq(existing, klass))
            .unwrap_or(false);
        if indexed {
            registry.by_name.remove(&old_name);
        }
        klass.set_name(new_name);
        registry.by_name.insert(new_name.to_string(), klass.clone());
    }

    /// The klass of a primitive kind or `void`.
    pub fn primitive(&self, kind: JavaKind) -> &KlassRef {
        let index = match kind {
            JavaKind::Boolean => 0,
            JavaKind::Byte => 1,
            JavaKind::Char => 2,
            JavaKind::Short => 3,
            JavaKind::Int => 4,
            JavaKind::Long => 5,
            JavaKind::Float => 6,
            JavaKind::Double => 7,
            JavaKind::Void | JavaKind::Object => 8,
        };
        &self.primitives[index]
    }

    /// `java/lang/Object`
    pub fn object(&self) -> &KlassRef {
        &self.object
    }

    /// `java/lang/Cloneable`
    pub fn cloneable(&self) -> &KlassRef {
        &self.cloneable
    }

    /// `java/io/Serializable`
    pub fn serializable(&self) -> &KlassRef {
        &self.serializable
    }

    /// `java/lang/Throwable`
    pub fn throwable(&self) -> &KlassRef {
        &self.throwable
    }

    /// `java/lang/Thread`
    pub fn thread(&self) -> &KlassRef {
        &self.thread
    }

    /// `java/lang/ThreadGroup`
    pub fn thread_group(&self) -> &KlassRef {
        &self.thread_group
    }

    /// `java/lang/Class`
    pub fn class(&self) -> &KlassRef {
        &self.class
    }

    /// `java/lang/ClassLoader`
    pub fn class_loader(&self) -> &KlassRef {
        &self.class_loader
    }

    /// `java/lang/String`
    pub fn string(&self) -> &KlassRef {
        &self.string
    }
}

impl Default for KlassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    fn insert(&mut self, klass: KlassRef) {
        self.by_name.insert(klass.name(), klass.clone());
        self.order.push(klass);
    }
}
