//! Instance field descriptors.

use std::fmt;
use std::sync::{Arc, Weak};

use core_types::JavaKind;

use crate::klass::{Klass, KlassRef};

/// Shared handle to a field descriptor.
pub type FieldRef = Arc<Field>;

/// An instance field declared by a klass.
///
/// `slot` is the field's index in the instance layout, which places every
/// superclass field before the subclass fields.
pub struct Field {
    name: String,
    kind: JavaKind,
    slot: usize,
    declaring: Weak<Klass>,
}

impl Field {
    pub(crate) fn new(name: String, kind: JavaKind, slot: usize, declaring: Weak<Klass>) -> Self {
        Field {
            name,
            kind,
            slot,
            declaring,
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind of the field.
    pub fn kind(&self) -> JavaKind {
        self.kind
    }

    /// Index of the field in the instance layout.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The klass declaring this field, while it is alive.
    pub fn declaring_klass(&self) -> Option<KlassRef> {
        self.declaring.upgrade()
    }

    /// True if `klass` can hold this field: the field's declaring klass is
    /// assignable from it.
    pub fn is_member_of(&self, klass: &Klass) -> bool {
        self.declaring
            .upgrade()
            .map(|declaring| declaring.is_assignable_from(klass))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .finish()
    }
}
