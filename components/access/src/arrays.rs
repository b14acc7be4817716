//! Typed array element accessors.
//!
//! Every accessor takes an optional [`ImplicitExceptionProfile`] for the
//! calling bytecode site; it is entered on an out-of-bounds fault when
//! profiling is enabled and never changes the fault itself.
//!
//! `boolean[]` and `byte[]` share byte storage. Stores through the boolean
//! accessor keep only the low bit, as do byte stores into a `boolean[]`
//! when the hosted library is version 9 or later.

use core_types::{ImplicitExceptionProfile, JavaKind, VmError, VmResult};
use object_model::{ObjectRef, Reference};

use crate::interpreter_to_vm::InterpreterToVm;

macro_rules! primitive_array_accessors {
    ($get:ident, $set:ident, $ty:ty, $name:literal) => {
        #[doc = concat!("Reads an element of a `", $name, "[]`.")]
        pub fn $get(
            &self,
            array: &ObjectRef,
            index: i32,
            profile: Option<&ImplicitExceptionProfile>,
        ) -> VmResult<$ty> {
            self.profiled(array.array_get::<$ty>(index), profile)
        }

        #[doc = concat!("Writes an element of a `", $name, "[]`.")]
        pub fn $set(
            &self,
            array: &ObjectRef,
            index: i32,
            value: $ty,
            profile: Option<&ImplicitExceptionProfile>,
        ) -> VmResult<()> {
            self.profiled(array.array_set::<$ty>(index, value), profile)
        }
    };
}

impl InterpreterToVm {
    primitive_array_accessors!(get_array_char, set_array_char, u16, "char");
    primitive_array_accessors!(get_array_short, set_array_short, i16, "short");
    primitive_array_accessors!(get_array_int, set_array_int, i32, "int");
    primitive_array_accessors!(get_array_long, set_array_long, i64, "long");
    primitive_array_accessors!(get_array_float, set_array_float, f32, "float");
    primitive_array_accessors!(get_array_double, set_array_double, f64, "double");

    /// Reads an element of a `byte[]` or `boolean[]`.
    pub fn get_array_byte(
        &self,
        array: &ObjectRef,
        index: i32,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<i8> {
        self.profiled(array.array_get::<i8>(index), profile)
    }

    /// Writes an element of a `byte[]` or `boolean[]`.
    pub fn set_array_byte(
        &self,
        array: &ObjectRef,
        index: i32,
        value: i8,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<()> {
        let value = if self.config().java9_or_later() && is_boolean_array(array) {
            value & 1
        } else {
            value
        };
        self.profiled(array.array_set::<i8>(index, value), profile)
    }

    /// Reads an element of a `boolean[]` in its byte representation.
    pub fn get_array_boolean(
        &self,
        array: &ObjectRef,
        index: i32,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<i8> {
        self.get_array_byte(array, index, profile)
    }

    /// Writes the low bit of `value` into a `boolean[]`.
    pub fn set_array_boolean(
        &self,
        array: &ObjectRef,
        index: i32,
        value: i8,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<()> {
        self.profiled(array.array_set::<i8>(index, value & 1), profile)
    }

    /// Reads an element of a reference array.
    pub fn get_array_object(
        &self,
        array: &ObjectRef,
        index: i32,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<Reference> {
        self.profiled(array.array_get::<Reference>(index), profile)
    }

    /// Writes an element of a reference array.
    ///
    /// # Errors
    ///
    /// `ArrayIndexOutOfBounds` first, then `ArrayStore` if `value` is not
    /// an instance of the array's component type.
    pub fn set_array_object(
        &self,
        array: &ObjectRef,
        index: i32,
        value: Reference,
        profile: Option<&ImplicitExceptionProfile>,
    ) -> VmResult<()> {
        let length = self.array_length(array)?;
        if index < 0 || index >= length {
            return self.profiled(
                Err(VmError::ArrayIndexOutOfBounds { index, length }),
                profile,
            );
        }
        if let (Some(object), Some(component)) = (&value, array.klass().component_type()) {
            if !component.is_assignable_from(object.klass()) {
                return Err(VmError::ArrayStore {
                    object_type: object.klass().name(),
                    array_type: array.klass().name(),
                });
            }
        }
        array.array_set::<Reference>(index, value)
    }
}

fn is_boolean_array(array: &ObjectRef) -> bool {
    array
        .klass()
        .component_type()
        .is_some_and(|component| component.java_kind() == JavaKind::Boolean)
}
