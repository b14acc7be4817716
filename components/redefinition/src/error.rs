//! Redefinition failures.

use core_types::VmError;
use thiserror::Error;

/// JDWP error codes reported for rejected redefinitions.
pub mod error_codes {
    /// Success
    pub const NONE: i32 = 0;
    /// Class bytes are not a valid class file
    pub const INVALID_CLASS_FORMAT: i32 = 60;
    /// The new class would be its own supertype
    pub const CIRCULAR_CLASS_DEFINITION: i32 = 61;
    /// The new class fails verification
    pub const FAILS_VERIFICATION: i32 = 62;
    /// A method would be added
    pub const ADD_METHOD: i32 = 63;
    /// A field would be added or removed
    pub const SCHEMA_CHANGE: i32 = 64;
    /// Supertype or interfaces would change
    pub const HIERARCHY_CHANGE: i32 = 66;
    /// A method would be removed
    pub const DELETE_METHOD: i32 = 67;
    /// Class file version is not supported
    pub const UNSUPPORTED_VERSION: i32 = 68;
    /// Class name in the bytes differs from the redefined class
    pub const NAMES_DONT_MATCH: i32 = 69;
    /// Class modifiers would change
    pub const CLASS_MODIFIERS: i32 = 70;
    /// Method modifiers would change
    pub const METHOD_MODIFIERS: i32 = 71;
    /// Unexpected internal failure
    pub const INTERNAL: i32 = 113;
}

/// A redefinition that cannot be carried out.
///
/// Each variant maps onto a stable JDWP code through
/// [`error_code`](Self::error_code).
///
/// # Examples
///
/// ```
/// use redefinition::{error_codes, RedefinitionError};
///
/// let error = RedefinitionError::HierarchyChange("app/Leaf".into());
/// assert_eq!(error.error_code(), error_codes::HIERARCHY_CHANGE);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RedefinitionError {
    /// Class bytes could not be parsed
    #[error("invalid class format: {0}")]
    InvalidClassFormat(String),

    /// New definition is circular
    #[error("circular class definition: {0}")]
    CircularClassDefinition(String),

    /// New definition fails verification
    #[error("{0} fails verification")]
    FailsVerification(String),

    /// A method would be added
    #[error("adding methods to {0} is not supported")]
    AddMethod(String),

    /// Fields would be added or removed
    #[error("schema change of {0} is not supported")]
    SchemaChange(String),

    /// Supertype or interfaces would change
    #[error("hierarchy change of {0} is not supported")]
    HierarchyChange(String),

    /// A method would be removed
    #[error("deleting methods from {0} is not supported")]
    DeleteMethod(String),

    /// Class file version is not supported
    #[error("unsupported class file version in {0}")]
    UnsupportedVersion(String),

    /// Name in the bytes does not match the class being redefined
    #[error("expected {expected}, found {found}")]
    NamesDontMatch {
        /// Name of the redefined class
        expected: String,
        /// Name found in the new bytes
        found: String,
    },

    /// Class modifiers would change
    #[error("class modifiers of {0} changed")]
    ClassModifiers(String),

    /// Method modifiers would change
    #[error("method modifiers in {0} changed")]
    MethodModifiers(String),

    /// A runtime fault while applying a change
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl RedefinitionError {
    /// The JDWP code reported for this failure.
    pub fn error_code(&self) -> i32 {
        match self {
            RedefinitionError::InvalidClassFormat(_) => error_codes::INVALID_CLASS_FORMAT,
            RedefinitionError::CircularClassDefinition(_) => error_codes::CIRCULAR_CLASS_DEFINITION,
            RedefinitionError::FailsVerification(_) => error_codes::FAILS_VERIFICATION,
            RedefinitionError::AddMethod(_) => error_codes::ADD_METHOD,
            RedefinitionError::SchemaChange(_) => error_codes::SCHEMA_CHANGE,
            RedefinitionError::HierarchyChange(_) => error_codes::HIERARCHY_CHANGE,
            RedefinitionError::DeleteMethod(_) => error_codes::DELETE_METHOD,
            RedefinitionError::UnsupportedVersion(_) => error_codes::UNSUPPORTED_VERSION,
            RedefinitionError::NamesDontMatch { .. } => error_codes::NAMES_DONT_MATCH,
            RedefinitionError::ClassModifiers(_) => error_codes::CLASS_MODIFIERS,
            RedefinitionError::MethodModifiers(_) => error_codes::METHOD_MODIFIERS,
            RedefinitionError::Vm(_) => error_codes::INTERNAL,
        }
    }
}
