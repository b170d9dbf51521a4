use std::borrow::Cow;

use pool_memory::MemoryVarlenPool;
use relval_api::VarlenPool;
use relval_api::limits::VALUE_NULL;
use relval_types::{ErrorKind, TypeId, Value};

fn fixed_samples() -> Vec<Value<'static>> {
    vec![
        Value::boolean(true),
        Value::tinyint(-5),
        Value::smallint(1234),
        Value::integer(-70_000),
        Value::parameter_offset(3),
        Value::bigint(1 << 40),
        Value::decimal(-0.125),
        Value::timestamp(1_614_834_367_089_000),
    ]
}

#[test]
fn fixed_width_round_trip_including_nulls() {
    let mut values = fixed_samples();
    for t in [
        TypeId::Boolean,
        TypeId::TinyInt,
        TypeId::SmallInt,
        TypeId::Integer,
        TypeId::ParameterOffset,
        TypeId::BigInt,
        TypeId::Decimal,
        TypeId::Timestamp,
    ] {
        values.push(Value::null(t).unwrap());
    }

    for v in values {
        let t = v.type_id();
        let mut slot = vec![0u8; t.slot_size()];
        v.serialize_to(&mut slot, true, None).unwrap();
        let back = Value::deserialize_from(&slot, t, true, None).unwrap();
        assert_eq!(back, v, "{}", v.info());
        assert_eq!(back.is_null(), v.is_null());
    }
}

#[test]
fn inlined_varlen_is_a_view_into_storage() {
    let v = Value::varchar("row bytes").unwrap();
    let mut slot = vec![0u8; v.serialized_size(true).unwrap()];
    v.serialize_to(&mut slot, true, None).unwrap();

    let view = Value::deserialize_from(&slot, TypeId::Varchar, true, None).unwrap();
    assert!(view.is_view());
    assert_eq!(view.data().unwrap(), Some(&b"row bytes"[..]));

    let owned = view.into_owned();
    slot.fill(0);
    assert_eq!(owned, v);
}

#[test]
fn pooled_varlen_round_trip() {
    let pool = MemoryVarlenPool::default();
    let v = Value::varbinary(&[1, 2, 3, 4]).unwrap();
    let mut slot = [0u8; 8];
    v.serialize_to(&mut slot, false, Some(&pool)).unwrap();
    assert_eq!(pool.allocated_bytes(), 4);

    let back = Value::deserialize_from(&slot, TypeId::Varbinary, false, Some(&pool)).unwrap();
    assert!(!back.is_view());
    assert_eq!(back, v);
}

#[test]
fn pooled_null_does_not_touch_the_pool() {
    let pool = MemoryVarlenPool::default();
    let mut slot = [0u8; 8];
    Value::null(TypeId::Varchar)
        .unwrap()
        .serialize_to(&mut slot, false, Some(&pool))
        .unwrap();
    assert_eq!(pool.live(), 0);

    let back = Value::deserialize_from(&slot, TypeId::Varchar, false, Some(&pool)).unwrap();
    assert!(back.is_null());
    assert_eq!(back.len_field(), VALUE_NULL);
}

#[test]
fn pool_exhaustion_surfaces_as_pool_error() {
    let pool = MemoryVarlenPool::new(3);
    let mut slot = [0u8; 8];
    let err = Value::varchar("four")
        .unwrap()
        .serialize_to(&mut slot, false, Some(&pool))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Pool);
}

#[test]
fn shallow_copy_shares_the_pooled_payload() {
    let pool = MemoryVarlenPool::default();
    let mut src = [0u8; 8];
    Value::varchar("shared").unwrap().serialize_to(&mut src, false, Some(&pool)).unwrap();

    let mut dest = [0u8; 8];
    Value::shallow_copy_to(&mut dest, &src, TypeId::Varchar, false).unwrap();
    assert_eq!(dest, src);
    assert_eq!(pool.live(), 1);

    let back = Value::deserialize_from(&dest, TypeId::Varchar, false, Some(&pool)).unwrap();
    assert_eq!(back.to_string(), "shared");
}

#[test]
fn data_from_storage() {
    let mut inlined = [0u8; 16];
    Value::varchar("abc").unwrap().serialize_to(&mut inlined, true, None).unwrap();
    let data = Value::data_from_storage(TypeId::Varchar, &inlined, true, None).unwrap();
    assert!(matches!(data, Some(Cow::Borrowed(b"abc"))));

    let pool = MemoryVarlenPool::default();
    let mut pooled = [0u8; 8];
    Value::varbinary(b"xyz").unwrap().serialize_to(&mut pooled, false, Some(&pool)).unwrap();
    let data = Value::data_from_storage(TypeId::Varbinary, &pooled, false, Some(&pool)).unwrap();
    assert_eq!(data.as_deref(), Some(&b"xyz"[..]));

    let err = Value::data_from_storage(TypeId::Integer, &pooled, false, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleType);
}

#[test]
fn arrays_in_both_layouts() {
    let array = Value::array(
        TypeId::Varchar,
        vec![Value::varchar("a").unwrap(), Value::null(TypeId::Varchar).unwrap()],
    )
    .unwrap();

    let mut inlined = vec![0u8; array.serialized_size(true).unwrap()];
    array.serialize_to(&mut inlined, true, None).unwrap();
    let back = Value::deserialize_from(&inlined, TypeId::Array, true, None).unwrap();
    assert_eq!(back, array);

    let pool = MemoryVarlenPool::default();
    let mut pooled = [0u8; 8];
    array.serialize_to(&mut pooled, false, Some(&pool)).unwrap();
    let back = Value::deserialize_from(&pooled, TypeId::Array, false, Some(&pool)).unwrap();
    assert_eq!(back.to_string(), "[a, varlen_null]");
}

#[test]
fn deserializing_invalid_tag_fails() {
    let err = Value::deserialize_from(&[0u8; 8], TypeId::Invalid, true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleType);
}
