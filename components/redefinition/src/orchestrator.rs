//! The redefinition pipeline.
//!
//! ```text
//! match inner classes -> detect changes -> order -> begin
//!     -> apply packets -> refresh subclasses -> update ids
//!     -> commit matches -> remove classes -> end
//! ```
//!
//! Matching and detection run before the transaction opens; a failure
//! there changes nothing. The transaction closes on every exit path.
//! Packets applied before a failing one stay applied.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::barrier::RedefinitionBarrier;
use crate::collaborators::{ChangeDetector, ClassRedefiner, IdRegistry, InnerClassMatcher};
use crate::error::{error_codes, RedefinitionError};
use crate::info::RedefineInfo;
use crate::ordering::{hierarchy_order, subclass_order};

/// The external collaborators of a redefinition.
#[derive(Clone)]
pub struct Collaborators {
    /// Anonymous inner class matcher
    pub matcher: Arc<dyn InnerClassMatcher>,
    /// Change detector
    pub detector: Arc<dyn ChangeDetector>,
    /// Per-class redefiner
    pub redefiner: Arc<dyn ClassRedefiner>,
}

/// Outcome of one redefinition request.
#[derive(Debug, Clone, PartialEq)]
pub struct RedefinitionReport {
    /// New names of the classes applied, in application order
    pub applied: Vec<String>,
    /// The failure that stopped the request
    pub error: Option<RedefinitionError>,
}

impl RedefinitionReport {
    /// JDWP result code; 0 on success.
    pub fn error_code(&self) -> i32 {
        self.error
            .as_ref()
            .map_or(error_codes::NONE, RedefinitionError::error_code)
    }

    /// The request completed.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sequences redefinition requests.
pub struct RedefinitionOrchestrator {
    collaborators: Collaborators,
    ids: Arc<dyn IdRegistry>,
    barrier: Arc<RedefinitionBarrier>,
    serial: Mutex<()>,
}

impl RedefinitionOrchestrator {
    /// Creates an orchestrator with its own barrier.
    pub fn new(collaborators: Collaborators, ids: Arc<dyn IdRegistry>) -> Self {
        RedefinitionOrchestrator {
            collaborators,
            ids,
            barrier: Arc::new(RedefinitionBarrier::new()),
            serial: Mutex::new(()),
        }
    }

    /// The barrier interpreter threads check at safe points.
    pub fn barrier(&self) -> &Arc<RedefinitionBarrier> {
        &self.barrier
    }

    /// Redefines a batch of classes; returns 0 or the JDWP error code of
    /// the failure.
    pub fn redefine_classes(&self, infos: &[RedefineInfo]) -> i32 {
        self.redefine_classes_detailed(infos).error_code()
    }

    /// Redefines a batch of classes and reports which were applied.
    pub fn redefine_classes_detailed(&self, infos: &[RedefineInfo]) -> RedefinitionReport {
        let _serial = self.serial.lock();
        let mut applied = Vec::new();
        let result = self.run(infos, &mut applied);
        if let Err(error) = &result {
            if applied.is_empty() {
                log::debug!("redefinition rejected: {}", error);
            } else {
                log::warn!(
                    "redefinition failed after applying {:?}; they are not rolled back: {}",
                    applied,
                    error
                );
            }
        }
        RedefinitionReport {
            applied,
            error: result.err(),
        }
    }

    fn run(&self, infos: &[RedefineInfo], applied: &mut Vec<String>) -> Result<(), RedefinitionError> {
        log::debug!("Redefining {} classes", infos.len());
        let mut removed = Vec::new();
        let matched = self
            .collaborators
            .matcher
            .match_anonymous_inner_classes(infos, &mut removed)?;
        let packets = self.collaborators.detector.detect_class_changes(&matched)?;
        let packets = hierarchy_order(packets);

        let _transaction = self.barrier.begin();
        let mut refresh = Vec::new();
        for packet in &packets {
            log::debug!("Redefining class {}", packet.info.new_name());
            self.collaborators
                .redefiner
                .redefine_class(packet, &mut refresh)?;
            applied.push(packet.info.new_name().to_string());
        }

        for subclass in subclass_order(refresh) {
            log::debug!(
                "Updating sub class {} for redefined super class",
                subclass.name()
            );
            subclass.on_super_klass_update();
        }

        for packet in packets.iter().filter(|p| p.info.is_renamed()) {
            if let Some(klass) = packet.klass() {
                self.ids.update_id(klass);
            }
        }

        self.collaborators.matcher.commit(&matched);

        for klass in &removed {
            log::debug!("Removing class {}", klass.name());
            klass.remove_by_redefinition();
        }
        Ok(())
    }
}
