use super::*;

#[test]
fn test_key_identity_includes_version() {
    let a = PackageKey::new("serde", "1.0");
    let b = PackageKey::new("serde", "^1.0");
    assert_ne!(a, b);
    assert_eq!(a, PackageKey::new("serde", "1.0"));
}

#[test]
fn test_key_display() {
    assert_eq!(PackageKey::new("tokio", "1.38.0").to_string(), "tokio@1.38.0");
}

#[test]
fn test_key_validate_rejects_blank_parts() {
    assert!(PackageKey::new("A", "1.0").validate().is_ok());
    assert!(matches!(
        PackageKey::new("  ", "1.0").validate(),
        Err(TraversalError::InvalidRoot { .. })
    ));
    assert!(matches!(
        PackageKey::new("A", "").validate(),
        Err(TraversalError::InvalidRoot { .. })
    ));
}

#[test]
fn test_descriptor_defaults_to_normal_kind() {
    let descriptor = DependencyDescriptor::new("serde", "^1");
    assert_eq!(descriptor.kind, "normal");
    assert_eq!(descriptor.with_kind("dev").kind, "dev");
}

#[test]
fn test_edge_from_descriptor() {
    let from = PackageKey::new("A", "1.0");
    let edge = DependencyEdge::from_descriptor(&from, &DependencyDescriptor::new("B", "1.0").with_kind("build"));
    assert_eq!(edge.from, from);
    assert_eq!(edge.to, PackageKey::new("B", "1.0"));
    assert_eq!(edge.kind, "build");
}

#[test]
fn test_max_depth_allows() {
    assert!(MaxDepth::Bounded(0).allows(0));
    assert!(!MaxDepth::Bounded(0).allows(1));
    assert!(MaxDepth::Bounded(3).allows(3));
    assert!(MaxDepth::Unbounded.allows(u32::MAX));
}

#[test]
fn test_max_depth_rejects_negative() {
    assert_eq!(MaxDepth::try_from(2).unwrap(), MaxDepth::Bounded(2));
    assert!(matches!(
        MaxDepth::try_from(-1),
        Err(TraversalError::InvalidDepth { depth: -1 })
    ));
}

#[test]
fn test_max_depth_parse() {
    assert_eq!("unbounded".parse::<MaxDepth>().unwrap(), MaxDepth::Unbounded);
    assert_eq!("Unbounded".parse::<MaxDepth>().unwrap(), MaxDepth::Unbounded);
    assert_eq!(" 4 ".parse::<MaxDepth>().unwrap(), MaxDepth::Bounded(4));
    assert!("-3".parse::<MaxDepth>().is_err());
    assert!("deep".parse::<MaxDepth>().is_err());
}

#[test]
fn test_max_depth_serializes_as_number_or_word() {
    assert_eq!(serde_json::to_string(&MaxDepth::Bounded(5)).unwrap(), "5");
    assert_eq!(
        serde_json::to_string(&MaxDepth::Unbounded).unwrap(),
        "\"unbounded\""
    );
}
