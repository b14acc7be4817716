//! Debugger identifiers.
//!
//! Every object or class handed to a debugger gets a stable nonzero `u64`
//! id; `0` is the null reference. Ids are never reused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use object_model::{KlassRef, ObjectRef};
use parking_lot::RwLock;
use redefinition::IdRegistry;

/// Id of the null reference.
pub const NULL_ID: u64 = 0;

/// Something a debugger can hold an id for.
#[derive(Debug, Clone)]
pub enum DebugEntity {
    /// Heap object, including thread objects and arrays
    Object(ObjectRef),
    /// Loaded class
    Klass(KlassRef),
}

impl DebugEntity {
    fn address(&self) -> usize {
        match self {
            DebugEntity::Object(object) => Arc::as_ptr(object) as usize,
            DebugEntity::Klass(klass) => Arc::as_ptr(klass) as usize,
        }
    }
}

#[derive(Default)]
struct IdTable {
    entities: HashMap<u64, DebugEntity>,
    by_address: HashMap<usize, u64>,
    klass_names: HashMap<String, u64>,
}

/// Identifier registry shared by the debugger front end and the
/// redefinition pipeline.
///
/// # Examples
///
/// ```
/// use object_model::{HeapObject, KlassTable};
/// use debug_context::Ids;
///
/// let table = KlassTable::new();
/// let ids = Ids::new();
/// let object = HeapObject::new_instance(table.object()).unwrap();
///
/// let id = ids.id_of_object(Some(&object));
/// assert_eq!(ids.id_of_object(Some(&object)), id);
/// assert!(std::sync::Arc::ptr_eq(&ids.object(id).unwrap(), &object));
/// assert_eq!(ids.id_of_object(None), 0);
/// ```
pub struct Ids {
    table: RwLock<IdTable>,
    next_id: AtomicU64,
}

impl Ids {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Ids {
            table: RwLock::new(IdTable::default()),
            next_id: AtomicU64::new(NULL_ID + 1),
        }
    }

    fn id_of(&self, entity: DebugEntity) -> u64 {
        let address = entity.address();
        if let Some(id) = self.table.read().by_address.get(&address) {
            return *id;
        }
        let mut table = self.table.write();
        if let Some(id) = table.by_address.get(&address) {
            return *id;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let DebugEntity::Klass(klass) = &entity {
            table.klass_names.entry(klass.name()).or_insert(id);
        }
        table.by_address.insert(address, id);
        table.entities.insert(id, entity);
        id
    }

    /// Id of an object, registering it on first use; 0 for null.
    pub fn id_of_object(&self, object: Option<&ObjectRef>) -> u64 {
        object.map_or(NULL_ID, |object| self.id_of(DebugEntity::Object(object.clone())))
    }

    /// Id of a class, registering it on first use.
    pub fn id_of_klass(&self, klass: &KlassRef) -> u64 {
        self.id_of(DebugEntity::Klass(klass.clone()))
    }

    /// The entity registered under `id`.
    pub fn entity(&self, id: u64) -> Option<DebugEntity> {
        self.table.read().entities.get(&id).cloned()
    }

    /// The object registered under `id`.
    pub fn object(&self, id: u64) -> Option<ObjectRef> {
        match self.entity(id)? {
            DebugEntity::Object(object) => Some(object),
            DebugEntity::Klass(_) => None,
        }
    }

    /// The class registered under `id`.
    pub fn klass(&self, id: u64) -> Option<KlassRef> {
        match self.entity(id)? {
            DebugEntity::Klass(klass) => Some(klass),
            DebugEntity::Object(_) => None,
        }
    }

    /// Id a class name was first registered under.
    pub fn klass_id_by_name(&self, name: &str) -> Option<u64> {
        self.table.read().klass_names.get(name).copied()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.table.read().entities.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.read().entities.is_empty()
    }
}

impl Default for Ids {
    fn default() -> Self {
        Self::new()
    }
}

impl IdRegistry for Ids {
    /// Re-points ids after `klass` was renamed.
    ///
    /// If a debugger already holds an id for the new name, that id now
    /// resolves to `klass` and so does every later lookup of `klass`.
    /// Otherwise the id of `klass` is indexed under its new name.
    fn update_id(&self, klass: &KlassRef) {
        let name = klass.name();
        let entity = DebugEntity::Klass(klass.clone());
        let address = entity.address();
        let mut table = self.table.write();
        let IdTable {
            entities,
            by_address,
            klass_names,
        } = &mut *table;

        if let Some(own) = by_address.get(&address).copied() {
            klass_names.retain(|indexed, id| *id != own || *indexed == name);
        }

        match klass_names.get(&name).copied() {
            Some(id) => {
                if let Some(previous) = entities.insert(id, entity) {
                    if previous.address() != address {
                        by_address.remove(&previous.address());
                    }
                }
                by_address.insert(address, id);
                log::debug!("id {} now refers to {}", id, name);
            }
            None => {
                let id = match by_address.get(&address) {
                    Some(id) => *id,
                    None => {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        by_address.insert(address, id);
                        entities.insert(id, entity);
                        id
                    }
                };
                klass_names.insert(name, id);
            }
        }
    }
}
