use relval_types::{ErrorKind, TypeId, Value, type_for};

fn incompatible<T: std::fmt::Debug>(r: Result<T, relval_types::ValueError>) {
    assert_eq!(r.unwrap_err().kind(), ErrorKind::IncompatibleType);
}

#[test]
fn invalid_value_has_no_behavior() {
    let v = Value::default();
    assert_eq!(v.type_id(), TypeId::Invalid);
    incompatible(v.compare_equals(&Value::integer(1)));
    incompatible(v.add(&Value::integer(1)));
    incompatible(v.hash());
    incompatible(v.copy());
    incompatible(v.cast_as(TypeId::Varchar));
    assert_eq!(v.to_string(), "invalid");
    assert!(type_for(TypeId::Invalid).is_err());
}

#[test]
fn comparability_is_checked_before_nulls() {
    let null_int = Value::null(TypeId::Integer).unwrap();
    incompatible(null_int.compare_equals(&Value::varchar("1").unwrap()));
    incompatible(Value::null(TypeId::Varchar).unwrap().compare_less_than(&Value::integer(1)));

    let r = null_int.compare_equals(&Value::integer(1)).unwrap();
    assert_eq!(r.type_id(), TypeId::Boolean);
    assert!(r.is_null());
}

#[test]
fn all_six_comparisons() {
    let (a, b) = (Value::integer(1), Value::integer(2));
    assert!(a.compare_equals(&b).unwrap().is_false());
    assert!(a.compare_not_equals(&b).unwrap().is_true());
    assert!(a.compare_less_than(&b).unwrap().is_true());
    assert!(a.compare_less_than_equals(&b).unwrap().is_true());
    assert!(a.compare_greater_than(&b).unwrap().is_false());
    assert!(a.compare_greater_than_equals(&b).unwrap().is_false());
}

#[test]
fn unsupported_operations_per_kind() {
    let text = Value::varchar("x").unwrap();
    incompatible(text.add(&Value::varchar("y").unwrap()));
    incompatible(text.sqrt());
    incompatible(text.element_at(0));
    incompatible(Value::timestamp(1).subtract(&Value::timestamp(1)));
    incompatible(Value::boolean(true).min(&Value::boolean(false)));
    incompatible(Value::integer(1).element_type());
    incompatible(Value::integer(1).in_list(&Value::integer(1)));
    incompatible(Value::decimal(1.0).length());
}

#[test]
fn operate_null_uses_promotion() {
    let v = Value::smallint(1).operate_null(&Value::decimal(2.0)).unwrap();
    assert_eq!(v.type_id(), TypeId::Decimal);
    assert!(v.is_null());
    incompatible(Value::smallint(1).operate_null(&Value::varchar("2").unwrap()));
}

#[test]
fn hash_combine_folds_in_order() {
    let values = [Value::integer(1), Value::varchar("two").unwrap(), Value::boolean(true)];
    let mut forward = 0u64;
    for v in &values {
        v.hash_combine(&mut forward).unwrap();
    }
    let mut again = 0u64;
    for v in &values {
        v.hash_combine(&mut again).unwrap();
    }
    let mut reverse = 0u64;
    for v in values.iter().rev() {
        v.hash_combine(&mut reverse).unwrap();
    }
    assert_eq!(forward, again);
    assert_ne!(forward, reverse);
}

#[test]
fn inlined_kinds() {
    assert!(Value::bigint(1).is_inlined().unwrap());
    assert!(Value::timestamp(1).is_inlined().unwrap());
    assert!(!Value::varchar("").unwrap().is_inlined().unwrap());
    assert!(!Value::array(TypeId::Integer, vec![]).unwrap().is_inlined().unwrap());
}

#[test]
fn copy_detaches_and_preserves_value() {
    let bytes = vec![7u8; 3];
    let view = Value::varlen_view(TypeId::Varbinary, Some(bytes.as_slice())).unwrap();
    let copy = view.copy().unwrap();
    assert_eq!(copy, view);
    assert!(!copy.is_view());
}

#[test]
fn copy_of_owned_varchar_has_its_own_buffer() {
    let v = Value::varchar("hello").unwrap();
    let copy = v.copy().unwrap();
    let (a, b) = (v.data().unwrap().unwrap(), copy.data().unwrap().unwrap());
    assert_ne!(a.as_ptr(), b.as_ptr());
    assert_eq!(a, b);
    assert_eq!(copy.to_string(), v.to_string());
    assert_eq!(copy.hash().unwrap(), v.hash().unwrap());
}

#[test]
fn comparable_equal_values_share_a_hash() {
    let pairs = [
        (Value::integer(5), Value::bigint(5)),
        (Value::smallint(-3), Value::decimal(-3.0)),
        (Value::decimal(0.0), Value::decimal(-0.0)),
        (Value::boolean(true), Value::new(TypeId::Boolean, 2i32).unwrap()),
    ];
    for (a, b) in pairs {
        assert!(a.compare_equals(&b).unwrap().is_true(), "{} vs {}", a.info(), b.info());
        assert_eq!(a.hash().unwrap(), b.hash().unwrap(), "{} vs {}", a.info(), b.info());
    }
}

#[test]
fn cast_identity_for_every_scalar_kind() {
    let samples = [
        Value::boolean(false),
        Value::tinyint(1),
        Value::smallint(2),
        Value::integer(3),
        Value::bigint(4),
        Value::decimal(5.5),
        Value::timestamp(6),
        Value::varchar("7").unwrap(),
        Value::varbinary(b"8").unwrap(),
    ];
    for v in samples {
        assert_eq!(v.cast_as(v.type_id()).unwrap(), v);
        let text = v.cast_as(TypeId::Varchar);
        if v.type_id() != TypeId::Varbinary {
            assert_eq!(text.unwrap().to_string(), v.to_string());
        }
    }
}
