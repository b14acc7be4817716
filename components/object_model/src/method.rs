//! Method descriptors as seen by frame walkers and stack traces.

use std::fmt;
use std::sync::Arc;

use crate::klass::{access_flags, KlassRef};

/// Shared handle to a method descriptor.
pub type MethodRef = Arc<Method>;

/// Name shared by every constructor.
pub const INIT_NAME: &str = "<init>";

/// A method of a loaded klass.
///
/// # Examples
///
/// ```
/// use object_model::{access_flags, KlassTable, Method};
///
/// let table = KlassTable::new();
/// let init = Method::new("<init>", table.throwable().clone(), access_flags::ACC_PUBLIC);
/// assert!(init.is_constructor());
/// assert!(!init.is_native());
/// ```
pub struct Method {
    name: String,
    declaring: KlassRef,
    flags: u32,
}

impl Method {
    /// Creates a method descriptor.
    pub fn new(name: impl Into<String>, declaring: KlassRef, flags: u32) -> MethodRef {
        Arc::new(Method {
            name: name.into(),
            declaring,
            flags,
        })
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Klass declaring the method.
    pub fn declaring_klass(&self) -> &KlassRef {
        &self.declaring
    }

    /// Access and property flags.
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Implemented outside the interpreter.
    pub fn is_native(&self) -> bool {
        self.flags & access_flags::ACC_NATIVE != 0
    }

    /// Excluded from stack walks.
    pub fn is_lambda_form_hidden(&self) -> bool {
        self.flags & access_flags::ACC_LAMBDA_FORM_HIDDEN != 0
    }

    /// True for `<init>`.
    pub fn is_constructor(&self) -> bool {
        self.name == INIT_NAME
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring.name(), self.name)
    }
}
