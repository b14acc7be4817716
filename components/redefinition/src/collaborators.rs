//! Collaborators the orchestrator delegates to.
//!
//! Class-file parsing, change detection and the per-class swap live outside
//! this crate; the orchestrator only sequences them.

use std::sync::Arc;

use object_model::{KlassRef, KlassTable};

use crate::error::RedefinitionError;
use crate::info::{ChangePacket, HotSwapClassInfo, RedefineInfo};

/// Matches anonymous inner classes of a request against the loaded ones.
pub trait InnerClassMatcher: Send + Sync {
    /// Resolves every request entry to the loaded class it redefines.
    ///
    /// Loaded anonymous classes that no longer exist in the new bytes are
    /// appended to `removed`.
    fn match_anonymous_inner_classes(
        &self,
        infos: &[RedefineInfo],
        removed: &mut Vec<KlassRef>,
    ) -> Result<Vec<HotSwapClassInfo>, RedefinitionError>;

    /// Records the matches of a successful redefinition.
    fn commit(&self, infos: &[HotSwapClassInfo]);
}

/// Turns matched request entries into change packets.
pub trait ChangeDetector: Send + Sync {
    /// Detects the changes of every entry.
    ///
    /// # Errors
    ///
    /// Fails on the first entry whose change is not supported. Nothing has
    /// been modified when this fails.
    fn detect_class_changes(
        &self,
        infos: &[HotSwapClassInfo],
    ) -> Result<Vec<ChangePacket>, RedefinitionError>;
}

/// Applies one change packet.
pub trait ClassRedefiner: Send + Sync {
    /// Redefines the packet's class. Subclasses whose layout or vtable
    /// depends on the redefined class are appended to `refresh_subclasses`.
    fn redefine_class(
        &self,
        packet: &ChangePacket,
        refresh_subclasses: &mut Vec<KlassRef>,
    ) -> Result<(), RedefinitionError>;
}

/// Debugger identifier registry.
pub trait IdRegistry: Send + Sync {
    /// Refreshes the identifier exposed for a renamed class.
    fn update_id(&self, klass: &KlassRef);
}

/// Matcher that resolves entries by name in the class table and never
/// remaps or removes anonymous classes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use object_model::{ClassDefinition, KlassTable};
/// use redefinition::{InnerClassMatcher, RedefineInfo, TableMatcher};
///
/// let table = Arc::new(KlassTable::new());
/// table.define(ClassDefinition::new("app/Main")).unwrap();
/// let matcher = TableMatcher::new(table);
///
/// let mut removed = Vec::new();
/// let infos = [RedefineInfo::new("app/Main", vec![]), RedefineInfo::new("app/New", vec![])];
/// let matched = matcher.match_anonymous_inner_classes(&infos, &mut removed).unwrap();
/// assert!(matched[0].klass().is_some());
/// assert!(matched[1].klass().is_none());
/// assert!(removed.is_empty());
/// ```
pub struct TableMatcher {
    klasses: Arc<KlassTable>,
}

impl TableMatcher {
    /// Creates a matcher over `klasses`.
    pub fn new(klasses: Arc<KlassTable>) -> Self {
        TableMatcher { klasses }
    }
}

impl InnerClassMatcher for TableMatcher {
    fn match_anonymous_inner_classes(
        &self,
        infos: &[RedefineInfo],
        _removed: &mut Vec<KlassRef>,
    ) -> Result<Vec<HotSwapClassInfo>, RedefinitionError> {
        Ok(infos
            .iter()
            .map(|info| {
                HotSwapClassInfo::new(
                    self.klasses.lookup(info.name()),
                    info.name(),
                    info.class_bytes().to_vec(),
                )
            })
            .collect())
    }

    fn commit(&self, _infos: &[HotSwapClassInfo]) {}
}
