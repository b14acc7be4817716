//! Synthetic-frame filtering.
//!
//! Two rules apply from the innermost frame outwards, each with a one-way
//! latch: once a frame does not match a rule, that rule is off for the rest
//! of the walk.
//!
//! 1. Frames of the fill-in entry points are skipped.
//! 2. Constructors declared by the throwable's class or one of its
//!    throwable superclasses are skipped.
//!
//! Rule 2 is only consulted for frames rule 1 did not skip.

use object_model::{Klass, Method};

/// Name of the public fill-in entry point.
pub const FILL_IN_STACK_TRACE: &str = "fillInStackTrace";

/// Name of the native fill-in entry point.
pub const FILL_IN_STACK_TRACE0: &str = "fillInStackTrace0";

/// Latches of one capture.
///
/// # Examples
///
/// ```
/// use object_model::{access_flags, KlassTable, Method};
/// use stack_trace::FrameFilter;
///
/// let table = KlassTable::new();
/// let throwable = table.throwable();
/// let fill_in = Method::new("fillInStackTrace", throwable.clone(), access_flags::ACC_PUBLIC);
/// let init = Method::new("<init>", throwable.clone(), access_flags::ACC_PUBLIC);
/// let main = Method::new("main", table.object().clone(), access_flags::ACC_PUBLIC);
///
/// let mut filter = FrameFilter::new(throwable, throwable);
/// assert!(filter.should_skip(&fill_in));
/// assert!(filter.should_skip(&init));
/// assert!(!filter.should_skip(&main));
/// assert!(!filter.should_skip(&init));
/// ```
#[derive(Debug)]
pub struct FrameFilter<'a> {
    throwable_klass: &'a Klass,
    throwable_root: &'a Klass,
    skip_fill_in: bool,
    skip_throwable_init: bool,
}

impl<'a> FrameFilter<'a> {
    /// Creates a filter for a throwable of class `throwable_klass`;
    /// `throwable_root` is `java/lang/Throwable`.
    pub fn new(throwable_klass: &'a Klass, throwable_root: &'a Klass) -> Self {
        FrameFilter {
            throwable_klass,
            throwable_root,
            skip_fill_in: true,
            skip_throwable_init: true,
        }
    }

    /// Whether the frame of `method` is left out of the trace.
    pub fn should_skip(&mut self, method: &Method) -> bool {
        self.check_fill_in(method) || self.check_throwable_init(method)
    }

    fn check_fill_in(&mut self, method: &Method) -> bool {
        if !self.skip_fill_in {
            return false;
        }
        if method.name() != FILL_IN_STACK_TRACE && method.name() != FILL_IN_STACK_TRACE0 {
            self.skip_fill_in = false;
        }
        self.skip_fill_in
    }

    fn check_throwable_init(&mut self, method: &Method) -> bool {
        if !self.skip_throwable_init {
            return false;
        }
        let declaring = method.declaring_klass();
        let hierarchy_constructor = method.is_constructor()
            && declaring.is_assignable_from(self.throwable_klass)
            && self.throwable_root.is_assignable_from(declaring);
        if !hierarchy_constructor {
            self.skip_throwable_init = false;
        }
        self.skip_throwable_init
    }
}
