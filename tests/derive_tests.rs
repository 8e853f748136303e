//! Integration tests for derive macros.
//!
//! These tests verify that the `#[derive(NodeParams)]` and `#[derive(ParamEnum)]`
//! macros generate correct code by actually using the derived implementations.

use pointsbuilder::params::{NodeParams, ParamEnum, ParamKind, ParamValue};
use pointsbuilder::{DVec3, ParamError};

// ============================================================================
// ParamEnum Derive Tests
// ============================================================================

#[derive(pointsbuilder::ParamEnum, Clone, Copy, PartialEq, Debug)]
enum Falloff {
    Linear,
    InverseSquare,
    Constant,
}

#[test]
fn test_param_enum_strings() {
    assert_eq!(Falloff::VARIANTS, &["linear", "inverse_square", "constant"]);
    assert_eq!(Falloff::InverseSquare.as_str(), "inverse_square");
}

#[test]
fn test_param_enum_parse() {
    assert_eq!(Falloff::parse("linear"), Some(Falloff::Linear));
    assert_eq!(Falloff::parse("constant"), Some(Falloff::Constant));
    assert_eq!(Falloff::parse("Linear"), None);
}

#[derive(pointsbuilder::ParamEnum, Clone, Copy, PartialEq, Debug)]
enum Single {
    Only,
}

#[test]
fn test_single_variant_param_enum() {
    assert_eq!(Single::VARIANTS.len(), 1);
    assert_eq!(Single::Only.as_str(), "only");
}

// ============================================================================
// NodeParams Derive Tests
// ============================================================================

#[derive(pointsbuilder::NodeParams, Clone, Debug, PartialEq)]
struct Sample {
    radius: f64,
    edge_count: i32,
    seed_enabled: bool,
    label: String,
    center: DVec3,
    falloff: Falloff,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            radius: 1.0,
            edge_count: 4,
            seed_enabled: false,
            label: "a".into(),
            center: DVec3::ZERO,
            falloff: Falloff::Linear,
        }
    }
}

#[test]
fn test_fields_use_camel_case_keys() {
    let keys: Vec<&str> = Sample::FIELDS.iter().map(|f| f.key).collect();
    assert_eq!(keys, ["radius", "edgeCount", "seedEnabled", "label", "center", "falloff"]);
}

#[test]
fn test_field_kinds() {
    let kinds: Vec<ParamKind> = Sample::FIELDS.iter().map(|f| f.kind).collect();
    assert_eq!(kinds[0], ParamKind::Number);
    assert_eq!(kinds[1], ParamKind::Integer);
    assert_eq!(kinds[2], ParamKind::Bool);
    assert_eq!(kinds[3], ParamKind::Text);
    assert_eq!(kinds[4], ParamKind::Vec3);
    assert_eq!(kinds[5], ParamKind::Choice(&["linear", "inverse_square", "constant"]));
}

#[test]
fn test_get() {
    let sample = Sample::default();
    assert_eq!(sample.get("radius"), Some(ParamValue::Number(1.0)));
    assert_eq!(sample.get("edgeCount"), Some(ParamValue::Integer(4)));
    assert_eq!(sample.get("falloff"), Some(ParamValue::Text("linear".into())));
    assert_eq!(sample.get("edge_count"), None);
}

#[test]
fn test_set_and_reject() {
    let mut sample = Sample::default();
    sample.set("center", &DVec3::new(1.0, 2.0, 3.0).into()).unwrap();
    sample.set("edgeCount", &ParamValue::Number(6.0)).unwrap();
    sample.set("radius", &ParamValue::Integer(2)).unwrap();
    sample.set("falloff", &"inverse_square".into()).unwrap();
    assert_eq!(sample.center, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(sample.edge_count, 6);
    assert_eq!(sample.radius, 2.0);
    assert_eq!(sample.falloff, Falloff::InverseSquare);

    let before = sample.clone();
    assert!(matches!(
        sample.set("edgeCount", &ParamValue::Number(2.5)),
        Err(ParamError::TypeMismatch { .. })
    ));
    assert!(matches!(sample.set("falloff", &"cubic".into()), Err(ParamError::TypeMismatch { .. })));
    assert!(matches!(sample.set("mystery", &true.into()), Err(ParamError::UnknownKey(_))));
    assert_eq!(sample, before);
}

#[test]
fn test_overlay_reports_rejected_keys() {
    let mut sample = Sample::default();
    let map = [
        ("radius".to_string(), ParamValue::Number(3.0)),
        ("label".to_string(), ParamValue::Bool(true)),
        ("extra".to_string(), ParamValue::Integer(1)),
    ]
    .into_iter()
    .collect();
    let rejected = sample.overlay(&map);
    assert_eq!(rejected, ["extra", "label"]);
    assert_eq!(sample.radius, 3.0);
    assert_eq!(sample.to_map().len(), Sample::FIELDS.len());
}
