//! Primitive and reference kinds.
//!
//! Every typed access in the runtime is keyed by a [`JavaKind`]. The kind
//! decides the storage representation of array elements and fields, the
//! zero value used for fresh allocations, and the debugger tag reported for
//! values of that kind.

use std::fmt;

/// Debugger tag constants (JDWP `Tag`).
pub mod tag {
    /// Array object.
    pub const ARRAY: u8 = b'[';
    /// `byte` value.
    pub const BYTE: u8 = b'B';
    /// `char` value.
    pub const CHAR: u8 = b'C';
    /// Plain object.
    pub const OBJECT: u8 = b'L';
    /// `float` value.
    pub const FLOAT: u8 = b'F';
    /// `double` value.
    pub const DOUBLE: u8 = b'D';
    /// `int` value.
    pub const INT: u8 = b'I';
    /// `long` value.
    pub const LONG: u8 = b'J';
    /// `short` value.
    pub const SHORT: u8 = b'S';
    /// No value.
    pub const VOID: u8 = b'V';
    /// `boolean` value.
    pub const BOOLEAN: u8 = b'Z';
    /// `java.lang.String` instance.
    pub const STRING: u8 = b's';
    /// `java.lang.Thread` instance.
    pub const THREAD: u8 = b't';
    /// `java.lang.ThreadGroup` instance.
    pub const THREAD_GROUP: u8 = b'g';
    /// `java.lang.ClassLoader` instance.
    pub const CLASS_LOADER: u8 = b'l';
    /// `java.lang.Class` instance.
    pub const CLASS_OBJECT: u8 = b'c';
}

/// The kind of a field, array element or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaKind {
    /// `boolean`, stored as a byte
    Boolean,
    /// `byte`
    Byte,
    /// `char`, an unsigned 16-bit code unit
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// Any reference (object or array)
    Object,
    /// `void`; only valid as a method return kind
    Void,
}

impl JavaKind {
    /// All kinds that can be stored in a field or array element.
    pub const STORABLE: [JavaKind; 9] = [
        JavaKind::Boolean,
        JavaKind::Byte,
        JavaKind::Char,
        JavaKind::Short,
        JavaKind::Int,
        JavaKind::Long,
        JavaKind::Float,
        JavaKind::Double,
        JavaKind::Object,
    ];

    /// Parses a single-character type descriptor.
    pub fn from_descriptor(c: char) -> Option<JavaKind> {
        match c {
            'Z' => Some(JavaKind::Boolean),
            'B' => Some(JavaKind::Byte),
            'C' => Some(JavaKind::Char),
            'S' => Some(JavaKind::Short),
            'I' => Some(JavaKind::Int),
            'J' => Some(JavaKind::Long),
            'F' => Some(JavaKind::Float),
            'D' => Some(JavaKind::Double),
            'V' => Some(JavaKind::Void),
            'L' | '[' => Some(JavaKind::Object),
            _ => None,
        }
    }

    /// The single-character type descriptor of this kind.
    pub fn descriptor(self) -> char {
        match self {
            JavaKind::Boolean => 'Z',
            JavaKind::Byte => 'B',
            JavaKind::Char => 'C',
            JavaKind::Short => 'S',
            JavaKind::Int => 'I',
            JavaKind::Long => 'J',
            JavaKind::Float => 'F',
            JavaKind::Double => 'D',
            JavaKind::Object => 'L',
            JavaKind::Void => 'V',
        }
    }

    /// The source-level name of the primitive type (`"int"`, ...).
    pub fn java_name(self) -> &'static str {
        match self {
            JavaKind::Boolean => "boolean",
            JavaKind::Byte => "byte",
            JavaKind::Char => "char",
            JavaKind::Short => "short",
            JavaKind::Int => "int",
            JavaKind::Long => "long",
            JavaKind::Float => "float",
            JavaKind::Double => "double",
            JavaKind::Object => "object",
            JavaKind::Void => "void",
        }
    }

    /// True for the eight primitive value kinds.
    pub fn is_primitive(self) -> bool {
        !matches!(self, JavaKind::Object | JavaKind::Void)
    }

    /// Debugger tag for values of this kind.
    pub fn tag(self) -> u8 {
        self.descriptor() as u8
    }
}

impl fmt::Display for JavaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.java_name())
    }
}
