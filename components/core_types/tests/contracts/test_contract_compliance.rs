//! Contract tests for the core_types public API
//!
//! These tests verify that the exported types exist with the expected shape.

use core_types::{ImplicitExceptionProfile, JavaKind, RuntimeConfig, VmError, VmResult};

/// VmResult is a plain Result over VmError
#[test]
fn contract_vm_result_alias() {
    let ok: VmResult<i32> = Ok(1);
    let err: VmResult<i32> = Err(VmError::Interrupted);
    assert!(ok.is_ok());
    assert!(err.is_err());
}

/// RuntimeConfig implements Default and Clone
#[test]
fn contract_runtime_config_default_clone() {
    let config = RuntimeConfig::default();
    let copy = config.clone();
    assert_eq!(config, copy);
}

/// ImplicitExceptionProfile is shareable across threads
#[test]
fn contract_profile_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ImplicitExceptionProfile>();
}

/// JavaKind is Copy and hashable
#[test]
fn contract_java_kind_copy_hash() {
    use std::collections::HashSet;
    let kinds: HashSet<JavaKind> = JavaKind::STORABLE.iter().copied().collect();
    assert_eq!(kinds.len(), 9);
}
