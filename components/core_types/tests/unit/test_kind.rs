//! Unit tests for JavaKind

use core_types::{tag, JavaKind};

#[test]
fn test_every_storable_kind_has_a_name() {
    for kind in JavaKind::STORABLE {
        assert!(!kind.java_name().is_empty());
        assert_ne!(kind, JavaKind::Void);
    }
}

#[test]
fn test_display_uses_source_name() {
    assert_eq!(JavaKind::Double.to_string(), "double");
    assert_eq!(JavaKind::Char.to_string(), "char");
}

#[test]
fn test_reference_tags_are_distinct_from_primitive_tags() {
    let reference_tags = [
        tag::ARRAY,
        tag::STRING,
        tag::THREAD,
        tag::THREAD_GROUP,
        tag::CLASS_LOADER,
        tag::CLASS_OBJECT,
    ];
    for kind in JavaKind::STORABLE {
        if kind.is_primitive() {
            assert!(!reference_tags.contains(&kind.tag()));
        }
    }
}
