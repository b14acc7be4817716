//! Heap objects: instances and typed arrays.
//!
//! Every object carries its klass, a body and two lazily created hidden
//! slots: the intrinsic lock and the captured stack trace of a throwable.
//! The stack trace slot holds the frames together with the backtrace
//! marker, so both become visible at once. The marker is a weak reference
//! because the only value ever stored there is the throwable itself.

use std::any;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use core_types::{JavaKind, VmError, VmResult};
use parking_lot::RwLock;

use crate::backtrace::StackTrace;
use crate::field::Field;
use crate::klass::KlassRef;
use crate::lock::IntrinsicLock;
use crate::value::Value;

/// Shared handle to a heap object.
pub type ObjectRef = Arc<HeapObject>;

/// A possibly-null reference.
pub type Reference = Option<ObjectRef>;

/// Element storage of an array. `boolean[]` and `byte[]` share the byte
/// representation.
pub enum ArrayStorage {
    /// `boolean[]` and `byte[]`
    Byte(RwLock<Box<[i8]>>),
    /// `char[]`
    Char(RwLock<Box<[u16]>>),
    /// `short[]`
    Short(RwLock<Box<[i16]>>),
    /// `int[]`
    Int(RwLock<Box<[i32]>>),
    /// `long[]`
    Long(RwLock<Box<[i64]>>),
    /// `float[]`
    Float(RwLock<Box<[f32]>>),
    /// `double[]`
    Double(RwLock<Box<[f64]>>),
    /// Arrays of references
    Object(RwLock<Box<[Reference]>>),
}

fn zeroed<T: Clone + Default>(length: usize) -> RwLock<Box<[T]>> {
    RwLock::new(vec![T::default(); length].into_boxed_slice())
}

impl ArrayStorage {
    /// Zero-filled storage for elements of `kind`; `None` for `void`.
    pub fn zeroed(kind: JavaKind, length: usize) -> Option<ArrayStorage> {
        let storage = match kind {
            JavaKind::Boolean | JavaKind::Byte => ArrayStorage::Byte(zeroed(length)),
            JavaKind::Char => ArrayStorage::Char(zeroed(length)),
            JavaKind::Short => ArrayStorage::Short(zeroed(length)),
            JavaKind::Int => ArrayStorage::Int(zeroed(length)),
            JavaKind::Long => ArrayStorage::Long(zeroed(length)),
            JavaKind::Float => ArrayStorage::Float(zeroed(length)),
            JavaKind::Double => ArrayStorage::Double(zeroed(length)),
            JavaKind::Object => ArrayStorage::Object(zeroed(length)),
            JavaKind::Void => return None,
        };
        Some(storage)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayStorage::Byte(cells) => cells.read().len(),
            ArrayStorage::Char(cells) => cells.read().len(),
            ArrayStorage::Short(cells) => cells.read().len(),
            ArrayStorage::Int(cells) => cells.read().len(),
            ArrayStorage::Long(cells) => cells.read().len(),
            ArrayStorage::Float(cells) => cells.read().len(),
            ArrayStorage::Double(cells) => cells.read().len(),
            ArrayStorage::Object(cells) => cells.read().len(),
        }
    }

    /// True for zero-length arrays.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Element types that have a projection out of [`ArrayStorage`].
pub trait ArrayElement: Clone {
    /// The cells of `storage` if it holds elements of this type.
    fn cells(storage: &ArrayStorage) -> Option<&RwLock<Box<[Self]>>>;
}

macro_rules! array_element {
    ($ty:ty, $variant:ident) => {
        impl ArrayElement for $ty {
            fn cells(storage: &ArrayStorage) -> Option<&RwLock<Box<[Self]>>> {
                match storage {
                    ArrayStorage::$variant(cells) => Some(cells),
                    _ => None,
                }
            }
        }
    };
}

array_element!(i8, Byte);
array_element!(u16, Char);
array_element!(i16, Short);
array_element!(i32, Int);
array_element!(i64, Long);
array_element!(f32, Float);
array_element!(f64, Double);
array_element!(Reference, Object);

/// Payload of a heap object.
pub enum ObjectBody {
    /// Instance slots in layout order
    Instance(RwLock<Box<[Value]>>),
    /// Array elements
    Array(ArrayStorage),
}

/// An object on the guest heap.
///
/// # Examples
///
/// ```
/// use core_types::JavaKind;
/// use object_model::{HeapObject, KlassTable};
///
/// let table = KlassTable::new();
/// let ints = HeapObject::new_array(&table.primitive(JavaKind::Int).array_class(), 3).unwrap();
/// ints.array_set::<i32>(2, 7).unwrap();
/// assert_eq!(ints.array_get::<i32>(2).unwrap(), 7);
/// assert!(ints.array_get::<i32>(3).is_err());
/// ```
pub struct HeapObject {
    klass: KlassRef,
    body: ObjectBody,
    lock: OnceLock<IntrinsicLock>,
    stack_trace: OnceLock<CapturedTrace>,
}

struct CapturedTrace {
    frames: Arc<StackTrace>,
    backtrace: Weak<HeapObject>,
}

fn checked_index(index: i32, length: usize) -> VmResult<usize> {
    match usize::try_from(index) {
        Ok(slot) if slot < length => Ok(slot),
        _ => Err(VmError::ArrayIndexOutOfBounds {
            index,
            length: length as i32,
        }),
    }
}

impl HeapObject {
    fn with_body(klass: KlassRef, body: ObjectBody) -> ObjectRef {
        Arc::new(HeapObject {
            klass,
            body,
            lock: OnceLock::new(),
            stack_trace: OnceLock::new(),
        })
    }

    /// Allocates an instance with every field zeroed. The klass is not
    /// checked for instantiability.
    pub fn new_instance(klass: &KlassRef) -> VmResult<ObjectRef> {
        if !klass.is_instance() {
            return Err(VmError::internal(format!(
                "cannot allocate an instance of {}",
                klass.name()
            )));
        }
        let slots: Vec<Value> = klass
            .instance_layout()
            .iter()
            .filter_map(|kind| Value::zero(*kind))
            .collect();
        Ok(Self::with_body(
            klass.clone(),
            ObjectBody::Instance(RwLock::new(slots.into_boxed_slice())),
        ))
    }

    /// Allocates a zero-filled array of the given array klass.
    pub fn new_array(array_klass: &KlassRef, length: usize) -> VmResult<ObjectRef> {
        let component = array_klass.component_type().ok_or_else(|| {
            VmError::internal(format!("{} is not an array class", array_klass.name()))
        })?;
        let storage = ArrayStorage::zeroed(component.java_kind(), length).ok_or_else(|| {
            VmError::internal(format!("no storage for {}", array_klass.name()))
        })?;
        Ok(Self::with_body(array_klass.clone(), ObjectBody::Array(storage)))
    }

    /// Runtime type.
    pub fn klass(&self) -> &KlassRef {
        &self.klass
    }

    /// Payload.
    pub fn body(&self) -> &ObjectBody {
        &self.body
    }

    /// Is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.body, ObjectBody::Array(_))
    }

    /// Element storage of an array.
    pub fn array_storage(&self) -> Option<&ArrayStorage> {
        match &self.body {
            ObjectBody::Array(storage) => Some(storage),
            ObjectBody::Instance(_) => None,
        }
    }

    /// Number of array elements; `None` for instances.
    pub fn array_length(&self) -> Option<usize> {
        self.array_storage().map(ArrayStorage::len)
    }

    fn cells<T: ArrayElement>(&self) -> VmResult<&RwLock<Box<[T]>>> {
        self.array_storage()
            .and_then(T::cells)
            .ok_or_else(|| {
                VmError::internal(format!(
                    "{} is not an array of {}",
                    self.klass.name(),
                    any::type_name::<T>()
                ))
            })
    }

    /// Reads an element. Fails with `ArrayIndexOutOfBounds` outside
    /// `0..length`.
    pub fn array_get<T: ArrayElement>(&self, index: i32) -> VmResult<T> {
        let cells = self.cells::<T>()?.read();
        let slot = checked_index(index, cells.len())?;
        Ok(cells[slot].clone())
    }

    /// Writes an element. Fails with `ArrayIndexOutOfBounds` outside
    /// `0..length`; the array is left unchanged on failure.
    pub fn array_set<T: ArrayElement>(&self, index: i32, value: T) -> VmResult<()> {
        let mut cells = self.cells::<T>()?.write();
        let slot = checked_index(index, cells.len())?;
        cells[slot] = value;
        Ok(())
    }

    /// Reads an element as a [`Value`] of the component kind.
    pub fn array_value(&self, index: i32) -> VmResult<Value> {
        let component = self
            .klass
            .component_type()
            .map(|c| c.java_kind())
            .ok_or_else(|| VmError::internal(format!("{} is not an array", self.klass.name())))?;
        let value = match component {
            JavaKind::Boolean => Value::Boolean(self.array_get::<i8>(index)? != 0),
            JavaKind::Byte => Value::Byte(self.array_get(index)?),
            JavaKind::Char => Value::Char(self.array_get(index)?),
            JavaKind::Short => Value::Short(self.array_get(index)?),
            JavaKind::Int => Value::Int(self.array_get(index)?),
            JavaKind::Long => Value::Long(self.array_get(index)?),
            JavaKind::Float => Value::Float(self.array_get(index)?),
            JavaKind::Double => Value::Double(self.array_get(index)?),
            JavaKind::Object => Value::Object(self.array_get(index)?),
            JavaKind::Void => return Err(VmError::internal("void array")),
        };
        Ok(value)
    }

    fn slots(&self) -> VmResult<&RwLock<Box<[Value]>>> {
        match &self.body {
            ObjectBody::Instance(slots) => Ok(slots),
            ObjectBody::Array(_) => Err(VmError::internal(format!(
                "{} has no instance fields",
                self.klass.name()
            ))),
        }
    }

    /// Reads an instance field.
    pub fn get_field(&self, field: &Field) -> VmResult<Value> {
        self.slots()?
            .read()
            .get(field.slot())
            .cloned()
            .ok_or_else(|| {
                VmError::internal(format!("{:?} is not a field of {}", field, self.klass.name()))
            })
    }

    /// Writes an instance field. The value must have the field's kind.
    pub fn set_field(&self, field: &Field, value: Value) -> VmResult<()> {
        if value.kind() != field.kind() {
            return Err(VmError::internal(format!(
                "cannot store {:?} into {:?}",
                value.kind(),
                field
            )));
        }
        let mut slots = self.slots()?.write();
        let slot = slots.get_mut(field.slot()).ok_or_else(|| {
            VmError::internal(format!("{:?} is not a field of {}", field, self.klass.name()))
        })?;
        *slot = value;
        Ok(())
    }

    /// The intrinsic lock, created on first use.
    pub fn lock(&self) -> &IntrinsicLock {
        self.lock.get_or_init(IntrinsicLock::new)
    }

    /// The intrinsic lock if it was ever used.
    pub fn existing_lock(&self) -> Option<&IntrinsicLock> {
        self.lock.get()
    }

    /// Frames captured for this throwable.
    pub fn frames(&self) -> Option<&Arc<StackTrace>> {
        self.stack_trace.get().map(|trace| &trace.frames)
    }

    /// The object stored in the backtrace marker, if still alive.
    pub fn backtrace(&self) -> Option<ObjectRef> {
        self.stack_trace.get().and_then(|trace| trace.backtrace.upgrade())
    }

    /// Stores the frames produced by `capture` with `backtrace` as the
    /// marker. The first call wins; a concurrent call blocks until the
    /// winner's `capture` has returned and both slots are visible, then
    /// returns false without running its own `capture`.
    pub fn attach_stack_trace<F>(&self, backtrace: &ObjectRef, capture: F) -> bool
    where
        F: FnOnce() -> Arc<StackTrace>,
    {
        let mut installed = false;
        self.stack_trace.get_or_init(|| {
            installed = true;
            CapturedTrace {
                frames: capture(),
                backtrace: Arc::downgrade(backtrace),
            }
        });
        installed
    }
}

impl fmt::Debug for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_length() {
            Some(length) => write!(f, "{}[{}]", self.klass.name(), length),
            None => write!(f, "{}@{:p}", self.klass.name(), self),
        }
    }
}
