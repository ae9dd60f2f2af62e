// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Value semantics through the public API: construction by tag, coercion,
// vivifying access and kind enforcement.

#![allow(clippy::float_cmp)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

mod common;

use knowledge_any::{
    AccessError, Any, AnyError, FloatWidth, IntWidth, Kind, TypeRegistry, Value, MAX_SEQUENCE_LEN,
};

fn registry() -> TypeRegistry {
    TypeRegistry::with_builtins()
}

#[test]
fn strvec_sparse_assignment() {
    common::init_logging();
    let mut a = Any::with_registry(&registry(), "strvec").unwrap();
    a.at(5).unwrap().assign("fifth").unwrap();
    a.at(2).unwrap().assign("second").unwrap();

    assert_eq!(a.at(2).unwrap().to_string_value().unwrap(), "second");
    assert!(a.at(0).unwrap().is_empty());
    assert_eq!(a.at(5).unwrap().to_string_value().unwrap(), "fifth");
    assert_eq!(a.to_string(), "[, , second, , , fifth]");
}

#[test]
fn dblvec_truncates_toward_zero() {
    let mut d = Any::with_registry(&registry(), "dblvec").unwrap();
    d.at(3).unwrap().assign(3.1415).unwrap();
    d.at(4).unwrap().assign(-3.99).unwrap();

    assert_eq!(d.at(3).unwrap().to_integer().unwrap(), 3);
    assert!((d.at(3).unwrap().to_double().unwrap() - 3.1415).abs() < 1e-12);
    assert_eq!(d.at(4).unwrap().to_integer().unwrap(), -3);
}

#[test]
fn sparse_gap_after_low_index() {
    let mut v = Any::default();
    v.at(1).unwrap().assign(10i32).unwrap();
    v.at(100).unwrap().assign(20i32).unwrap();

    for i in 2..100 {
        assert!(v.at(i).unwrap().is_empty());
    }
    assert_eq!(v.at(1).unwrap().to_integer().unwrap(), 10);
    assert_eq!(v.len(), Some(101));
}

#[test]
fn huge_sparse_indices_fail_cleanly() {
    let mut v = Any::with_registry(&registry(), "strvec").unwrap();
    v.at(3).unwrap().assign("three").unwrap();

    for index in [usize::MAX, 1 << 40, MAX_SEQUENCE_LEN] {
        assert!(v.at(index).unwrap().is_empty());
        let err = v.at(index).unwrap().assign("far").unwrap_err();
        assert!(
            matches!(err, AnyError::BadAnyAccess(AccessError::IndexOutOfRange { .. })),
            "index {}",
            index
        );
    }
    assert_eq!(v.len(), Some(4));
    assert_eq!(v.at(3).unwrap().to_string_value().unwrap(), "three");

    let mut empty = Any::default();
    assert!(empty.at(usize::MAX).unwrap().assign(1i32).is_err());
    assert_eq!(empty.len(), Some(0));
}

#[test]
fn reads_never_vivify() {
    let mut m = Any::with_registry(&registry(), "smap").unwrap();
    assert!(m.at_key("missing").unwrap().is_empty());
    assert!(m.at_key("missing").unwrap().to_string_value().is_err());
    assert_eq!(m.len(), Some(0));
    assert!(m.get_key("missing").is_none());
}

#[test]
fn container_reads_are_bad_access() {
    let v = Any::with_registry(&registry(), "anyvec").unwrap();
    for err in [
        v.to_integer().unwrap_err(),
        v.to_double().map(|_| ()).unwrap_err(),
        v.to_string_value().map(|_| ()).unwrap_err(),
    ] {
        assert!(matches!(
            err,
            AnyError::BadAnyAccess(AccessError::NotScalar { .. })
        ));
    }
}

#[test]
fn indexing_a_scalar_is_bad_access() {
    let mut s = Any::with_registry(&registry(), "string").unwrap();
    s.assign("abc").unwrap();
    assert!(s.at(0).unwrap_err().is_bad_access());
    assert!(s.at_key("k").unwrap_err().is_bad_access());
    assert_eq!(s.to_string_value().unwrap(), "abc");
}

#[test]
fn unknown_tag() {
    let err = Any::with_registry(&registry(), "not_a_real_type").unwrap_err();
    assert!(err.is_unknown_type());
}

#[test]
fn typed_container_keeps_element_kind() {
    let mut v = Any::with_registry(&registry(), "u8vec").unwrap();
    v.at(0).unwrap().assign(258i32).unwrap();
    assert_eq!(v.get(0), Some(&Value::UInt(2, IntWidth::W8)));

    v.at(1).unwrap().assign(300.0f64).unwrap();
    assert_eq!(
        v.value().as_sequence().unwrap().items(),
        &[Value::UInt(2, IntWidth::W8), Value::UInt(255, IntWidth::W8)]
    );
    assert_eq!(v.kind(), Some(Kind::seq_of(Kind::UInt(IntWidth::W8))));
}

#[test]
fn assign_over_container_replaces_payload() {
    let mut names = Any::with_registry(&registry(), "strvec").unwrap();
    names.at(3).unwrap().assign("x").unwrap();
    names.assign(5i32).unwrap();
    assert_eq!(names.to_integer().unwrap(), 5);
    assert!(names.at(0).unwrap_err().is_bad_access());

    let mut labels = Any::with_registry(&registry(), "smap").unwrap();
    labels.assign(vec![1.5f64, 2.5]).unwrap();
    assert_eq!(labels.kind(), Some(Kind::Sequence(None)));
    assert_eq!(labels.len(), Some(2));
}

#[test]
fn untyped_container_is_replaced() {
    let mut v = Any::with_registry(&registry(), "anyvec").unwrap();
    v.assign(7i32).unwrap();
    assert_eq!(v.to_integer().unwrap(), 7);
    assert_eq!(v.tag_name(), Some("anyvec"));
}

#[test]
fn float_to_int_saturates_and_rejects_nan() {
    let mut i = Any::with_registry(&registry(), "int8").unwrap();
    i.assign(1.0e6f64).unwrap();
    assert_eq!(i.to_integer().unwrap(), i64::from(i8::MAX));
    i.assign(-1.0e6f64).unwrap();
    assert_eq!(i.to_integer().unwrap(), i64::from(i8::MIN));

    let err = i.assign(f64::NAN).unwrap_err();
    assert!(err.is_bad_access());
    assert_eq!(i.to_integer().unwrap(), i64::from(i8::MIN));
}

#[test]
fn randomized_integer_truncation_matches_casts() {
    let reg = registry();
    let mut rng = fastrand::Rng::with_seed(0x5eed_cafe);
    let mut i8s = Any::with_registry(&reg, "int8").unwrap();
    let mut i16s = Any::with_registry(&reg, "int16").unwrap();
    let mut i32s = Any::with_registry(&reg, "int32").unwrap();
    let mut u8s = Any::with_registry(&reg, "uint8").unwrap();
    let mut u16s = Any::with_registry(&reg, "uint16").unwrap();
    let mut u32s = Any::with_registry(&reg, "uint32").unwrap();

    for _ in 0..1_000 {
        let v = rng.i64(..);
        i8s.assign(v).unwrap();
        i16s.assign(v).unwrap();
        i32s.assign(v).unwrap();
        assert_eq!(i8s.to_integer().unwrap(), i64::from(v as i8));
        assert_eq!(i16s.to_integer().unwrap(), i64::from(v as i16));
        assert_eq!(i32s.to_integer().unwrap(), i64::from(v as i32));

        let u = rng.u64(..);
        u8s.assign(u).unwrap();
        u16s.assign(u).unwrap();
        u32s.assign(u).unwrap();
        assert_eq!(u8s.to_unsigned().unwrap(), u64::from(u as u8));
        assert_eq!(u16s.to_unsigned().unwrap(), u64::from(u as u16));
        assert_eq!(u32s.to_unsigned().unwrap(), u64::from(u as u32));
    }
}

#[test]
fn randomized_scalar_round_trip() {
    let reg = registry();
    let mut rng = fastrand::Rng::with_seed(42);
    let mut long = Any::with_registry(&reg, "long").unwrap();
    let mut double = Any::with_registry(&reg, "double").unwrap();
    let mut text = Any::with_registry(&reg, "string").unwrap();

    for _ in 0..500 {
        let v = rng.i64(..);
        long.assign(v).unwrap();
        assert_eq!(long.to_integer().unwrap(), v);
        assert_eq!(long.to_string_value().unwrap(), v.to_string());

        text.assign(v).unwrap();
        assert_eq!(text.to_integer().unwrap(), v);

        let f = rng.f64() * 1.0e9 - 5.0e8;
        double.assign(f).unwrap();
        assert_eq!(double.to_double().unwrap(), f);
        text.assign(f).unwrap();
        assert_eq!(text.to_double().unwrap(), f);
    }
}

#[test]
fn float32_declared_width() {
    let mut f = Any::with_registry(&registry(), "float").unwrap();
    f.assign(16_777_217i32).unwrap();
    assert_eq!(f.value(), &Value::Float(16_777_216.0, FloatWidth::F32));
}

#[test]
fn char_conversions() {
    let mut c = Any::with_registry(&registry(), "char").unwrap();
    c.assign(65u8).unwrap();
    assert_eq!(c.to_string_value().unwrap(), "A");
    assert!(c.assign("too long").unwrap_err().is_bad_access());
    assert!(c.assign(-1i32).unwrap_err().is_bad_access());
    assert_eq!(c.to_integer().unwrap(), 65);
}

#[test]
fn nested_maps_vivify_with_element_kinds() {
    let mut reg = registry();
    reg.register_spec("roster", "map<map<string>>").unwrap();
    let mut roster = Any::with_registry(&reg, "roster").unwrap();
    roster
        .at_key("team-a")
        .and_then(|mut team| team.at_key("lead").and_then(|mut s| s.assign(12i32)))
        .unwrap();

    let team = roster.get_key("team-a").unwrap();
    assert_eq!(team.kind(), Some(Kind::map_of(Kind::String)));
    assert_eq!(team.get_key("lead").and_then(Value::as_str), Some("12"));

    let mut team_ref = roster.at_key("team-a").unwrap();
    assert!(team_ref.at(0).is_err());
}
