//! Captured stack traces attached to throwables.

use std::sync::Arc;

use crate::method::MethodRef;

/// Offset recorded when no call site could be resolved for a frame.
pub const UNKNOWN_BCI: i32 = -1;

/// Offset recorded for frames of native methods.
pub const NATIVE_BCI: i32 = -2;

/// One recorded frame: a method and the instruction offset in it.
#[derive(Debug, Clone)]
pub struct StackElement {
    /// Method executing in the frame
    pub method: MethodRef,
    /// Instruction offset, or [`UNKNOWN_BCI`] / [`NATIVE_BCI`]
    pub bci: i32,
}

impl StackElement {
    /// Creates a stack element.
    pub fn new(method: MethodRef, bci: i32) -> Self {
        StackElement { method, bci }
    }

    /// The frame is a native method.
    pub fn is_native(&self) -> bool {
        self.bci == NATIVE_BCI
    }

    /// No call-site offset was resolved.
    pub fn is_unknown(&self) -> bool {
        self.bci == UNKNOWN_BCI
    }
}

impl PartialEq for StackElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.method, &other.method) && self.bci == other.bci
    }
}

/// Ordered frames of a trace, innermost first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackTrace {
    elements: Vec<StackElement>,
}

impl StackTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty trace, attached when nothing could be captured.
    pub fn empty() -> Arc<StackTrace> {
        Arc::new(Self::default())
    }

    /// Appends the next outer frame.
    pub fn push(&mut self, element: StackElement) {
        self.elements.push(element);
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if no frame was recorded.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The recorded frames, innermost first.
    pub fn elements(&self) -> &[StackElement] {
        &self.elements
    }
}
