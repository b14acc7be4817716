//! Attaching captured frames to throwables.
//!
//! A throwable is captured at most once. The captured [`StackTrace`] lives
//! in the throwable's hidden frames slot and the backtrace slot is pointed
//! at the throwable itself; a throwable whose frames slot is already filled
//! is returned unchanged.

use std::ops::ControlFlow;
use std::sync::Arc;

use core_types::{RuntimeConfig, VmError, VmResult};
use object_model::{
    KlassTable, ObjectRef, StackElement, StackTrace, Value, NATIVE_BCI, THROWABLE_DEPTH_FIELD,
    UNKNOWN_BCI,
};

use crate::filter::FrameFilter;
use crate::frames::{CollectedTrace, FrameWalker};

/// Fills in throwable stack traces.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use core_types::RuntimeConfig;
/// use object_model::{access_flags, HeapObject, KlassTable, Method};
/// use stack_trace::{FrameInstance, StackTraceCapture};
///
/// let table = Arc::new(KlassTable::new());
/// let main = Method::new("main", table.object().clone(), access_flags::ACC_PUBLIC);
/// let frames = vec![FrameInstance::new(main, 4)];
///
/// let capture = StackTraceCapture::new(RuntimeConfig::default(), table.clone());
/// let error = HeapObject::new_instance(table.throwable()).unwrap();
/// capture.fill_in_stack_trace_live(&error, &frames, false).unwrap();
/// assert_eq!(capture.backtrace_of(&error).unwrap().len(), 1);
/// ```
pub struct StackTraceCapture {
    config: RuntimeConfig,
    klasses: Arc<KlassTable>,
}

impl StackTraceCapture {
    /// Creates the capture engine.
    pub fn new(config: RuntimeConfig, klasses: Arc<KlassTable>) -> Self {
        StackTraceCapture { config, klasses }
    }

    /// Frames captured for `throwable`, if any.
    pub fn backtrace_of(&self, throwable: &ObjectRef) -> Option<Arc<StackTrace>> {
        throwable.frames().cloned()
    }

    fn check_throwable(&self, throwable: &ObjectRef) -> VmResult<()> {
        if self.klasses.throwable().is_assignable_from(throwable.klass()) {
            Ok(())
        } else {
            Err(VmError::internal(format!(
                "{:?} is not a throwable",
                throwable
            )))
        }
    }

    /// Captures from a trace the unwinding engine already collected.
    ///
    /// Each guest element records the offset of the innermost bytecode node
    /// on its location path, [`UNKNOWN_BCI`] if there is none, or
    /// [`NATIVE_BCI`] for native methods. Engine-internal elements are
    /// dropped. A missing trace attaches the empty trace.
    pub fn fill_in_stack_trace_from_collected(
        &self,
        throwable: &ObjectRef,
        trace: Option<&CollectedTrace>,
    ) -> VmResult<ObjectRef> {
        self.check_throwable(throwable)?;
        if throwable.frames().is_some() {
            return Ok(throwable.clone());
        }
        let Some(trace) = trace else {
            self.attach(throwable, StackTrace::empty())?;
            return Ok(throwable.clone());
        };

        let mut frames = StackTrace::new();
        let mut filter = FrameFilter::new(throwable.klass(), self.klasses.throwable());
        for element in &trace.elements {
            let Some(method) = &element.method else {
                continue;
            };
            if filter.should_skip(method) {
                continue;
            }
            let bci = if method.is_native() {
                NATIVE_BCI
            } else {
                element
                    .location
                    .as_ref()
                    .and_then(|node| node.enclosing_bci())
                    .unwrap_or(UNKNOWN_BCI)
            };
            frames.push(StackElement::new(method.clone(), bci));
        }

        self.attach(throwable, Arc::new(frames))?;
        Ok(throwable.clone())
    }

    /// Captures by walking the live frames of the current thread.
    ///
    /// `skip_first` drops the innermost frame unconditionally. Methods
    /// hidden from stack walks are ignored. At most `max_stack_depth`
    /// frames are recorded; the rest are silently dropped.
    pub fn fill_in_stack_trace_live<W>(
        &self,
        throwable: &ObjectRef,
        walker: &W,
        skip_first: bool,
    ) -> VmResult<ObjectRef>
    where
        W: FrameWalker + ?Sized,
    {
        self.check_throwable(throwable)?;
        if throwable.frames().is_some() {
            return Ok(throwable.clone());
        }

        let limit = self.config.max_stack_depth;
        let mut frames = StackTrace::new();
        let mut filter = FrameFilter::new(throwable.klass(), self.klasses.throwable());
        let mut first = skip_first;
        walker.iterate_frames(&mut |frame| {
            if first {
                first = false;
                return ControlFlow::Continue(());
            }
            if frames.len() >= limit {
                return ControlFlow::Break(());
            }
            if let Some(method) = &frame.method {
                if !method.is_lambda_form_hidden() && !filter.should_skip(method) {
                    let bci = if method.is_native() {
                        NATIVE_BCI
                    } else {
                        frame.bci
                    };
                    frames.push(StackElement::new(method.clone(), bci));
                }
            }
            ControlFlow::Continue(())
        });

        self.attach(throwable, Arc::new(frames))?;
        Ok(throwable.clone())
    }

    fn attach(&self, throwable: &ObjectRef, frames: Arc<StackTrace>) -> VmResult<()> {
        let depth_field = if self.config.java9_or_later() {
            let field = throwable
                .klass()
                .lookup_field(THROWABLE_DEPTH_FIELD)
                .ok_or_else(|| VmError::internal("throwable without depth field"))?;
            Some(field)
        } else {
            None
        };
        let depth = frames.len();
        let mut recorded = Ok(());
        // the depth field is written before the trace becomes visible
        let installed = throwable.attach_stack_trace(throwable, || {
            if let Some(field) = &depth_field {
                recorded = throwable.set_field(field, Value::Int(depth as i32));
            }
            frames
        });
        if !installed {
            log::trace!("{:?} was captured concurrently", throwable);
            return Ok(());
        }
        recorded?;
        log::trace!("captured {} frames for {:?}", depth, throwable);
        Ok(())
    }
}
