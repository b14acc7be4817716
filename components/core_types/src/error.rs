//! Guest-visible faults and internal errors.
//!
//! Faults raised by the execution-support layer are ordinary values that
//! propagate through `Result`. Each variant maps onto the hosted-language
//! exception class the interpreter materializes when it rethrows the fault.

use thiserror::Error;

/// Result alias used across the runtime.
pub type VmResult<T> = Result<T, VmError>;

/// A fault raised by the execution-support layer.
///
/// # Examples
///
/// ```
/// use core_types::VmError;
///
/// let error = VmError::NegativeArraySize { size: -1 };
/// assert_eq!(error.to_string(), "-1");
/// assert!(error.is_guest_visible());
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    /// Array index outside `0..length`
    #[error("Index {index} out of bounds for length {length}")]
    ArrayIndexOutOfBounds {
        /// Offending index
        index: i32,
        /// Length of the accessed array
        length: i32,
    },

    /// Array allocated with a negative length
    #[error("{size}")]
    NegativeArraySize {
        /// Offending dimension
        size: i32,
    },

    /// Failed checked cast
    #[error("class {object_type} cannot be cast to class {target_type}")]
    ClassCast {
        /// Runtime type of the object
        object_type: String,
        /// Type the object was cast to
        target_type: String,
    },

    /// Instantiation of an abstract class or interface (error flavour)
    #[error("{class}")]
    InstantiationError {
        /// Name of the non-instantiable class
        class: String,
    },

    /// Instantiation of an abstract class or interface (checked flavour)
    #[error("{class}")]
    InstantiationException {
        /// Name of the non-instantiable class
        class: String,
    },

    /// Lock operation by a thread that does not own the lock
    #[error("current thread is not owner")]
    IllegalMonitorState,

    /// Reference stored into an array of an incompatible component type
    #[error("{object_type} cannot be stored in {array_type}")]
    ArrayStore {
        /// Runtime type of the stored object
        object_type: String,
        /// Type of the target array
        array_type: String,
    },

    /// Conflicting or inconsistent class definition
    #[error("{0}")]
    Linkage(String),

    /// Invalid argument passed by guest code
    #[error("{0}")]
    IllegalArgument(String),

    /// Thread interrupted while waiting
    #[error("interrupted")]
    Interrupted,

    /// Dereference of a null reference
    #[error("{0}")]
    NullPointer(String),

    /// Static initializer failed on first initialization
    #[error("initialization of {class} failed: {cause}")]
    ExceptionInInitializer {
        /// Class whose initializer failed
        class: String,
        /// Description of the initializer failure
        cause: String,
    },

    /// Use of a class whose earlier initialization failed
    #[error("Could not initialize class {class}")]
    NoClassDefFound {
        /// Class left in the erroneous state
        class: String,
    },

    /// Internal invariant violation; fatal to the operation
    #[error("internal error: {0}")]
    Internal(String),
}

impl VmError {
    /// Creates an internal invariant violation.
    pub fn internal(message: impl Into<String>) -> Self {
        VmError::Internal(message.into())
    }

    /// The hosted-language class used to materialize this fault.
    pub fn guest_class_name(&self) -> &'static str {
        match self {
            VmError::ArrayIndexOutOfBounds { .. } => "java/lang/ArrayIndexOutOfBoundsException",
            VmError::NegativeArraySize { .. } => "java/lang/NegativeArraySizeException",
            VmError::ClassCast { .. } => "java/lang/ClassCastException",
            VmError::InstantiationError { .. } => "java/lang/InstantiationError",
            VmError::InstantiationException { .. } => "java/lang/InstantiationException",
            VmError::IllegalMonitorState => "java/lang/IllegalMonitorStateException",
            VmError::ArrayStore { .. } => "java/lang/ArrayStoreException",
            VmError::Linkage(_) => "java/lang/LinkageError",
            VmError::IllegalArgument(_) => "java/lang/IllegalArgumentException",
            VmError::Interrupted => "java/lang/InterruptedException",
            VmError::NullPointer(_) => "java/lang/NullPointerException",
            VmError::ExceptionInInitializer { .. } => "java/lang/ExceptionInInitializerError",
            VmError::NoClassDefFound { .. } => "java/lang/NoClassDefFoundError",
            VmError::Internal(_) => "java/lang/InternalError",
        }
    }

    /// False only for internal invariant violations.
    pub fn is_guest_visible(&self) -> bool {
        !matches!(self, VmError::Internal(_))
    }
}
