//! Frame representations handed over by the execution engine.

use std::ops::ControlFlow;
use std::sync::Arc;

use object_model::MethodRef;

/// What a node in a frame's node tree represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Node executing the instruction at `bci`
    Bytecode {
        /// Instruction offset
        bci: i32,
    },
    /// Dispatch or wrapper node without an instruction offset
    Wrapper,
}

/// A node of the executing frame's node tree, linked to its parent.
#[derive(Debug)]
pub struct LocationNode {
    kind: NodeKind,
    parent: Option<Arc<LocationNode>>,
}

impl LocationNode {
    /// Creates a root node.
    pub fn root(kind: NodeKind) -> Arc<LocationNode> {
        Arc::new(LocationNode { kind, parent: None })
    }

    /// Creates a node below `parent`.
    pub fn child(parent: &Arc<LocationNode>, kind: NodeKind) -> Arc<LocationNode> {
        Arc::new(LocationNode {
            kind,
            parent: Some(parent.clone()),
        })
    }

    /// Kind of this node.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Parent node.
    pub fn parent(&self) -> Option<&Arc<LocationNode>> {
        self.parent.as_ref()
    }

    /// Offset of the nearest bytecode node on the path to the root,
    /// starting at this node.
    pub fn enclosing_bci(&self) -> Option<i32> {
        let mut node = Some(self);
        while let Some(current) = node {
            if let NodeKind::Bytecode { bci } = current.kind {
                return Some(bci);
            }
            node = current.parent.as_deref();
        }
        None
    }
}

/// One element of a collected trace.
#[derive(Debug, Clone, Default)]
pub struct CollectedElement {
    /// Node that was executing, if known
    pub location: Option<Arc<LocationNode>>,
    /// Guest method of the frame; `None` for engine-internal frames
    pub method: Option<MethodRef>,
}

impl CollectedElement {
    /// Element for a guest frame.
    pub fn new(method: MethodRef, location: Option<Arc<LocationNode>>) -> Self {
        CollectedElement {
            location,
            method: Some(method),
        }
    }

    /// Element for an engine-internal frame.
    pub fn internal(location: Option<Arc<LocationNode>>) -> Self {
        CollectedElement {
            location,
            method: None,
        }
    }
}

/// A trace collected while an exception unwound, innermost element first.
#[derive(Debug, Clone, Default)]
pub struct CollectedTrace {
    /// Elements, innermost first
    pub elements: Vec<CollectedElement>,
}

impl CollectedTrace {
    /// Creates a trace from its elements.
    pub fn new(elements: Vec<CollectedElement>) -> Self {
        CollectedTrace { elements }
    }
}

/// A live frame seen during a stack walk.
#[derive(Debug, Clone)]
pub struct FrameInstance {
    /// Guest method of the frame; `None` for engine-internal frames
    pub method: Option<MethodRef>,
    /// Current instruction offset
    pub bci: i32,
}

impl FrameInstance {
    /// A guest frame.
    pub fn new(method: MethodRef, bci: i32) -> Self {
        FrameInstance {
            method: Some(method),
            bci,
        }
    }
}

/// Walks the active frames of the current thread.
pub trait FrameWalker {
    /// Calls `visitor` on each frame from the innermost outwards until it
    /// returns `Break` or the frames run out.
    fn iterate_frames(&self, visitor: &mut dyn FnMut(&FrameInstance) -> ControlFlow<()>);
}

impl FrameWalker for [FrameInstance] {
    fn iterate_frames(&self, visitor: &mut dyn FnMut(&FrameInstance) -> ControlFlow<()>) {
        for frame in self {
            if visitor(frame).is_break() {
                break;
            }
        }
    }
}

impl FrameWalker for Vec<FrameInstance> {
    fn iterate_frames(&self, visitor: &mut dyn FnMut(&FrameInstance) -> ControlFlow<()>) {
        self.as_slice().iterate_frames(visitor)
    }
}
