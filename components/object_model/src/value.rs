//! Typed values stored in fields and exchanged with the interpreter.

use std::fmt;
use std::sync::Arc;

use core_types::JavaKind;

use crate::object::Reference;

/// A value of one of the storable kinds.
///
/// The variant set is closed over [`JavaKind`]; references compare by
/// identity, primitives by value.
///
/// # Examples
///
/// ```
/// use core_types::JavaKind;
/// use object_model::Value;
///
/// let zero = Value::zero(JavaKind::Long).unwrap();
/// assert_eq!(zero, Value::Long(0));
/// assert_eq!(zero.kind(), JavaKind::Long);
/// assert!(Value::zero(JavaKind::Void).is_none());
/// ```
#[derive(Clone)]
pub enum Value {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Reference, `None` is null
    Object(Reference),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> JavaKind {
        match self {
            Value::Boolean(_) => JavaKind::Boolean,
            Value::Byte(_) => JavaKind::Byte,
            Value::Char(_) => JavaKind::Char,
            Value::Short(_) => JavaKind::Short,
            Value::Int(_) => JavaKind::Int,
            Value::Long(_) => JavaKind::Long,
            Value::Float(_) => JavaKind::Float,
            Value::Double(_) => JavaKind::Double,
            Value::Object(_) => JavaKind::Object,
        }
    }

    /// The default value of a kind; `None` for `void`.
    pub fn zero(kind: JavaKind) -> Option<Value> {
        let value = match kind {
            JavaKind::Boolean => Value::Boolean(false),
            JavaKind::Byte => Value::Byte(0),
            JavaKind::Char => Value::Char(0),
            JavaKind::Short => Value::Short(0),
            JavaKind::Int => Value::Int(0),
            JavaKind::Long => Value::Long(0),
            JavaKind::Float => Value::Float(0.0),
            JavaKind::Double => Value::Double(0.0),
            JavaKind::Object => Value::Object(None),
            JavaKind::Void => return None,
        };
        Some(value)
    }

    /// The null reference.
    pub fn null() -> Value {
        Value::Object(None)
    }

    /// True for the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Object(None))
    }

    /// Borrows the reference held by an `Object` value.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Object(reference) => Some(reference),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Object(None), Value::Object(None)) => true,
            (Value::Object(Some(a)), Value::Object(Some(b))) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Value::Byte(v) => f.debug_tuple("Byte").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::Short(v) => f.debug_tuple("Short").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Value::Object(None) => write!(f, "Null"),
            Value::Object(Some(object)) => write!(f, "Object({})", object.klass().name()),
        }
    }
}
