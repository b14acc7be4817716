//! Typed instance field accessors.
//!
//! Resolving the field is the interpreter's job. Using an accessor of the
//! wrong kind, or a field the object does not have, is a bug in the caller:
//! debug builds assert on it and release builds report `Internal`.

use core_types::{JavaKind, VmError, VmResult};
use object_model::{Field, ObjectRef, Reference, Value};

use crate::interpreter_to_vm::InterpreterToVm;

macro_rules! field_accessors {
    ($get:ident, $set:ident, $ty:ty, $variant:ident, $name:literal) => {
        #[doc = concat!("Reads a `", $name, "` field.")]
        pub fn $get(&self, object: &ObjectRef, field: &Field) -> VmResult<$ty> {
            check_field(object, field, JavaKind::$variant);
            match object.get_field(field)? {
                Value::$variant(value) => Ok(value),
                other => Err(kind_mismatch(field, &other)),
            }
        }

        #[doc = concat!("Writes a `", $name, "` field.")]
        pub fn $set(&self, object: &ObjectRef, field: &Field, value: $ty) -> VmResult<()> {
            check_field(object, field, JavaKind::$variant);
            object.set_field(field, Value::$variant(value))
        }
    };
}

impl InterpreterToVm {
    field_accessors!(get_field_boolean, set_field_boolean, bool, Boolean, "boolean");
    field_accessors!(get_field_byte, set_field_byte, i8, Byte, "byte");
    field_accessors!(get_field_char, set_field_char, u16, Char, "char");
    field_accessors!(get_field_short, set_field_short, i16, Short, "short");
    field_accessors!(get_field_int, set_field_int, i32, Int, "int");
    field_accessors!(get_field_long, set_field_long, i64, Long, "long");
    field_accessors!(get_field_float, set_field_float, f32, Float, "float");
    field_accessors!(get_field_double, set_field_double, f64, Double, "double");
    field_accessors!(get_field_object, set_field_object, Reference, Object, "reference");
}

fn check_field(object: &ObjectRef, field: &Field, kind: JavaKind) {
    debug_assert_eq!(field.kind(), kind, "{:?} accessed as {:?}", field, kind);
    debug_assert!(
        field.is_member_of(object.klass()),
        "{:?} is not a field of {:?}",
        field,
        object
    );
}

fn kind_mismatch(field: &Field, found: &Value) -> VmError {
    VmError::internal(format!("{:?} holds a {:?} value", field, found.kind()))
}
