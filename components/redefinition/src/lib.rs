//! Redefinition - transactional hot swapping of loaded classes
//!
//! This component provides:
//! - The redefinition pipeline ([`RedefinitionOrchestrator`])
//! - The global barrier serializing transactions and parking interpreter
//!   threads ([`RedefinitionBarrier`])
//! - Deterministic supertype-first ordering of change packets
//!   ([`hierarchy_order`], [`subclass_order`])
//! - The collaborator seams: [`InnerClassMatcher`], [`ChangeDetector`],
//!   [`ClassRedefiner`] and [`IdRegistry`]
//! - JDWP-coded failures ([`RedefinitionError`])
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use object_model::{ClassDefinition, KlassRef, KlassTable};
//! use redefinition::{
//!     ChangeDetector, ChangePacket, ClassChange, ClassRedefiner, Collaborators,
//!     HotSwapClassInfo, IdRegistry, RedefineInfo, RedefinitionError,
//!     RedefinitionOrchestrator, TableMatcher,
//! };
//!
//! struct Rejecting;
//!
//! impl ChangeDetector for Rejecting {
//!     fn detect_class_changes(
//!         &self,
//!         infos: &[HotSwapClassInfo],
//!     ) -> Result<Vec<ChangePacket>, RedefinitionError> {
//!         Err(RedefinitionError::SchemaChange(infos[0].name().to_string()))
//!     }
//! }
//!
//! impl ClassRedefiner for Rejecting {
//!     fn redefine_class(&self, _: &ChangePacket, _: &mut Vec<KlassRef>) -> Result<(), RedefinitionError> {
//!         unreachable!()
//!     }
//! }
//!
//! impl IdRegistry for Rejecting {
//!     fn update_id(&self, _: &KlassRef) {}
//! }
//!
//! let table = Arc::new(KlassTable::new());
//! table.define(ClassDefinition::new("app/Point")).unwrap();
//! let orchestrator = RedefinitionOrchestrator::new(
//!     Collaborators {
//!         matcher: Arc::new(TableMatcher::new(table)),
//!         detector: Arc::new(Rejecting),
//!         redefiner: Arc::new(Rejecting),
//!     },
//!     Arc::new(Rejecting),
//! );
//! assert_eq!(orchestrator.redefine_classes(&[RedefineInfo::new("app/Point", vec![])]), 64);
//! assert!(!orchestrator.barrier().is_active());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod collaborators;
pub mod error;
pub mod info;
pub mod orchestrator;
pub mod ordering;

// Re-export main types
pub use barrier::{RedefinitionBarrier, TransactionGuard};
pub use collaborators::{ChangeDetector, ClassRedefiner, IdRegistry, InnerClassMatcher, TableMatcher};
pub use error::{error_codes, RedefinitionError};
pub use info::{ChangePacket, ClassChange, HotSwapClassInfo, RedefineInfo};
pub use orchestrator::{Collaborators, RedefinitionOrchestrator, RedefinitionReport};
pub use ordering::{hierarchy_order, is_anonymous_inner_class, subclass_order, ANONYMOUS_INNER_CLASS_PATTERN};
