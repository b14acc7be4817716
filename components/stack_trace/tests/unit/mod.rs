//! Unit tests for stack trace capture

use std::ops::ControlFlow;
use std::sync::Arc;

use core_types::RuntimeConfig;
use object_model::{
    access_flags, ClassDefinition, HeapObject, KlassRef, KlassTable, Method, MethodRef, ObjectRef,
    NATIVE_BCI, UNKNOWN_BCI,
};
use stack_trace::{
    CollectedElement, CollectedTrace, FrameInstance, FrameWalker, LocationNode, NodeKind,
    StackTraceCapture, FILL_IN_STACK_TRACE, FILL_IN_STACK_TRACE0,
};

struct Fixture {
    table: Arc<KlassTable>,
    capture: StackTraceCapture,
    error: KlassRef,
    app: KlassRef,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    fn with_config(config: RuntimeConfig) -> Self {
        let table = Arc::new(KlassTable::new());
        let error = table
            .define(ClassDefinition::new("app/AppError").extends("java/lang/Throwable"))
            .unwrap();
        let app = table.define(ClassDefinition::new("app/Main")).unwrap();
        let capture = StackTraceCapture::new(config, table.clone());
        Fixture {
            table,
            capture,
            error,
            app,
        }
    }

    fn method(&self, owner: &KlassRef, name: &str) -> MethodRef {
        Method::new(name, owner.clone(), access_flags::ACC_PUBLIC)
    }

    fn native(&self, owner: &KlassRef, name: &str) -> MethodRef {
        Method::new(name, owner.clone(), access_flags::ACC_PUBLIC | access_flags::ACC_NATIVE)
    }

    fn throwable(&self) -> ObjectRef {
        HeapObject::new_instance(&self.error).unwrap()
    }

    /// The synthetic frames on top of every fresh throwable's stack.
    fn synthetic_frames(&self) -> Vec<FrameInstance> {
        let throwable = self.table.throwable();
        vec![
            FrameInstance::new(self.native(throwable, FILL_IN_STACK_TRACE0), 0),
            FrameInstance::new(self.method(throwable, FILL_IN_STACK_TRACE), 1),
            FrameInstance::new(self.method(throwable, "<init>"), 6),
            FrameInstance::new(self.method(&self.error, "<init>"), 2),
        ]
    }

    fn recorded(&self, throwable: &ObjectRef) -> Vec<(String, i32)> {
        self.capture
            .backtrace_of(throwable)
            .unwrap()
            .elements()
            .iter()
            .map(|e| (e.method.name().to_string(), e.bci))
            .collect()
    }
}

fn bytecode(bci: i32) -> Option<Arc<LocationNode>> {
    Some(LocationNode::root(NodeKind::Bytecode { bci }))
}

// ============================================================================
// Collected Mode Tests
// ============================================================================

#[test]
fn test_collected_trace_filters_synthetic_prefix() {
    let f = Fixture::new();
    let mut elements: Vec<CollectedElement> = f
        .synthetic_frames()
        .into_iter()
        .map(|frame| CollectedElement::new(frame.method.unwrap(), bytecode(frame.bci)))
        .collect();
    elements.push(CollectedElement::new(f.method(&f.app, "compute"), bytecode(12)));
    elements.push(CollectedElement::new(f.method(&f.app, "main"), bytecode(3)));

    let error = f.throwable();
    let returned = f
        .capture
        .fill_in_stack_trace_from_collected(&error, Some(&CollectedTrace::new(elements)))
        .unwrap();

    assert!(Arc::ptr_eq(&returned, &error));
    assert_eq!(
        f.recorded(&error),
        vec![("compute".to_string(), 12), ("main".to_string(), 3)]
    );
}

#[test]
fn test_collected_bci_comes_from_enclosing_bytecode_node() {
    let f = Fixture::new();
    let call = LocationNode::root(NodeKind::Bytecode { bci: 41 });
    let wrapper = LocationNode::child(&call, NodeKind::Wrapper);
    let trace = CollectedTrace::new(vec![
        CollectedElement::new(f.method(&f.app, "wrapped"), Some(wrapper)),
        CollectedElement::new(f.method(&f.app, "orphan"), Some(LocationNode::root(NodeKind::Wrapper))),
        CollectedElement::new(f.method(&f.app, "unplaced"), None),
    ]);

    let error = f.throwable();
    f.capture
        .fill_in_stack_trace_from_collected(&error, Some(&trace))
        .unwrap();

    assert_eq!(
        f.recorded(&error),
        vec![
            ("wrapped".to_string(), 41),
            ("orphan".to_string(), UNKNOWN_BCI),
            ("unplaced".to_string(), UNKNOWN_BCI),
        ]
    );
}

#[test]
fn test_collected_native_and_internal_elements() {
    let f = Fixture::new();
    let trace = CollectedTrace::new(vec![
        CollectedElement::internal(bytecode(0)),
        CollectedElement::new(f.native(&f.app, "arraycopy"), bytecode(7)),
        CollectedElement::internal(None),
        CollectedElement::new(f.method(&f.app, "main"), bytecode(1)),
    ]);

    let error = f.throwable();
    f.capture
        .fill_in_stack_trace_from_collected(&error, Some(&trace))
        .unwrap();

    assert_eq!(
        f.recorded(&error),
        vec![("arraycopy".to_string(), NATIVE_BCI), ("main".to_string(), 1)]
    );
}

#[test]
fn test_collected_capture_is_idempotent() {
    let f = Fixture::new();
    let error = f.throwable();
    let first = CollectedTrace::new(vec![CollectedElement::new(f.method(&f.app, "first"), bytecode(1))]);
    let second = CollectedTrace::new(vec![CollectedElement::new(f.method(&f.app, "second"), bytecode(2))]);

    f.capture
        .fill_in_stack_trace_from_collected(&error, Some(&first))
        .unwrap();
    let before = f.capture.backtrace_of(&error).unwrap();
    f.capture
        .fill_in_stack_trace_from_collected(&error, Some(&second))
        .unwrap();
    f.capture.fill_in_stack_trace_from_collected(&error, None).unwrap();

    assert!(Arc::ptr_eq(&before, &f.capture.backtrace_of(&error).unwrap()));
    assert_eq!(f.recorded(&error), vec![("first".to_string(), 1)]);
}

#[test]
fn test_backtrace_points_at_throwable() {
    let f = Fixture::new();
    let error = f.throwable();
    assert!(error.backtrace().is_none());
    f.capture.fill_in_stack_trace_from_collected(&error, None).unwrap();
    assert!(Arc::ptr_eq(&error.backtrace().unwrap(), &error));
}

// ============================================================================
// Live Mode Tests
// ============================================================================

#[test]
fn test_live_walk_filters_synthetic_prefix() {
    let f = Fixture::new();
    let mut frames = f.synthetic_frames();
    frames.push(FrameInstance::new(f.method(&f.app, "compute"), 12));
    frames.push(FrameInstance::new(f.method(&f.app, "main"), 3));

    let error = f.throwable();
    f.capture.fill_in_stack_trace_live(&error, &frames, false).unwrap();

    assert_eq!(
        f.recorded(&error),
        vec![("compute".to_string(), 12), ("main".to_string(), 3)]
    );
}

#[test]
fn test_live_skip_first_drops_innermost_frame() {
    let f = Fixture::new();
    let frames = vec![
        FrameInstance::new(f.method(&f.app, "intrinsic"), 0),
        FrameInstance::new(f.method(&f.app, "caller"), 5),
    ];

    let error = f.throwable();
    f.capture.fill_in_stack_trace_live(&error, &frames, true).unwrap();

    assert_eq!(f.recorded(&error), vec![("caller".to_string(), 5)]);
}

#[test]
fn test_live_skips_hidden_and_internal_frames() {
    let f = Fixture::new();
    let hidden = Method::new(
        "invokeExact_MT",
        f.app.clone(),
        access_flags::ACC_LAMBDA_FORM_HIDDEN,
    );
    let frames = vec![
        FrameInstance::new(f.method(&f.app, "target"), 4),
        FrameInstance::new(hidden, 9),
        FrameInstance {
            method: None,
            bci: 0,
        },
        FrameInstance::new(f.native(&f.app, "invoke0"), 0),
    ];

    let error = f.throwable();
    f.capture.fill_in_stack_trace_live(&error, &frames, false).unwrap();

    assert_eq!(
        f.recorded(&error),
        vec![("target".to_string(), 4), ("invoke0".to_string(), NATIVE_BCI)]
    );
}

#[test]
fn test_live_walk_stops_at_depth_limit() {
    struct Counting<'a> {
        frames: &'a [FrameInstance],
        visited: std::cell::Cell<usize>,
    }

    impl FrameWalker for Counting<'_> {
        fn iterate_frames(&self, visitor: &mut dyn FnMut(&FrameInstance) -> ControlFlow<()>) {
            for frame in self.frames {
                self.visited.set(self.visited.get() + 1);
                if visitor(frame).is_break() {
                    return;
                }
            }
        }
    }

    let f = Fixture::with_config(RuntimeConfig {
        max_stack_depth: 3,
        ..RuntimeConfig::default()
    });
    let frames: Vec<_> = (0..10)
        .map(|i| FrameInstance::new(f.method(&f.app, "recurse"), i))
        .collect();
    let walker = Counting {
        frames: &frames,
        visited: std::cell::Cell::new(0),
    };

    let error = f.throwable();
    f.capture.fill_in_stack_trace_live(&error, &walker, false).unwrap();

    assert_eq!(f.capture.backtrace_of(&error).unwrap().len(), 3);
    assert_eq!(walker.visited.get(), 4);
}

#[test]
fn test_live_capture_is_idempotent() {
    let f = Fixture::new();
    let error = f.throwable();
    let first = vec![FrameInstance::new(f.method(&f.app, "first"), 1)];
    let second = vec![FrameInstance::new(f.method(&f.app, "second"), 2)];

    f.capture.fill_in_stack_trace_live(&error, &first, false).unwrap();
    f.capture.fill_in_stack_trace_live(&error, &second, false).unwrap();

    assert_eq!(f.recorded(&error), vec![("first".to_string(), 1)]);
}

#[test]
fn test_constructor_frames_of_unrelated_class_are_kept() {
    let f = Fixture::new();
    let mut frames = f.synthetic_frames();
    frames.push(FrameInstance::new(f.method(&f.app, "<init>"), 8));

    let error = f.throwable();
    f.capture.fill_in_stack_trace_live(&error, &frames, false).unwrap();

    assert_eq!(f.recorded(&error), vec![("<init>".to_string(), 8)]);
}
