//! Unit tests for the VmError fault taxonomy

use core_types::VmError;

#[test]
fn test_class_cast_message_names_both_types() {
    let error = VmError::ClassCast {
        object_type: "java/lang/String".to_string(),
        target_type: "java/lang/Integer".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("java/lang/String"));
    assert!(message.contains("java/lang/Integer"));
    assert_eq!(error.guest_class_name(), "java/lang/ClassCastException");
}

#[test]
fn test_instantiation_flavours_map_to_distinct_classes() {
    let error = VmError::InstantiationError {
        class: "Shape".to_string(),
    };
    let exception = VmError::InstantiationException {
        class: "Shape".to_string(),
    };
    assert_ne!(error.guest_class_name(), exception.guest_class_name());
    assert_eq!(error.to_string(), "Shape");
}

#[test]
fn test_negative_size_message_is_the_size() {
    assert_eq!(VmError::NegativeArraySize { size: -3 }.to_string(), "-3");
}

#[test]
fn test_errors_compare_by_value() {
    assert_eq!(
        VmError::ArrayIndexOutOfBounds { index: 1, length: 1 },
        VmError::ArrayIndexOutOfBounds { index: 1, length: 1 }
    );
    assert_ne!(VmError::Interrupted, VmError::IllegalMonitorState);
}
