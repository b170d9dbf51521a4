use codec_binary::{BinaryCodec, BinaryInput, BinaryOutput};
use proptest::prelude::*;
use relval_api::{ByteOrder, ByteReader, SerializeInput};
use relval_types::{ErrorKind, TypeId, Value};

fn scalar_value() -> impl Strategy<Value = Value<'static>> {
    prop_oneof![
        any::<bool>().prop_map(Value::boolean),
        any::<i8>().prop_map(Value::tinyint),
        any::<i16>().prop_map(Value::smallint),
        any::<i32>().prop_map(Value::integer),
        any::<i32>().prop_map(Value::parameter_offset),
        any::<i64>().prop_map(Value::bigint),
        (-1e300f64..1e300).prop_map(Value::decimal),
        any::<u64>().prop_map(Value::timestamp),
        ".{0,24}".prop_map(|s| Value::varchar(&s).unwrap()),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(|b| Value::varbinary(&b).unwrap()),
    ]
}

fn int_array() -> impl Strategy<Value = Value<'static>> {
    proptest::collection::vec(any::<i64>(), 0..8).prop_map(|items| {
        Value::array(TypeId::BigInt, items.into_iter().map(Value::bigint).collect()).unwrap()
    })
}

/// Small values across kinds, so equal pairs come up often.
fn small_scalar() -> impl Strategy<Value = Value<'static>> {
    prop_oneof![
        (0i8..4).prop_map(Value::tinyint),
        (0i16..4).prop_map(Value::smallint),
        (0i32..4).prop_map(Value::integer),
        (0i64..4).prop_map(Value::bigint),
        (0i8..4).prop_map(|d| Value::decimal(f64::from(d))),
        Just(Value::decimal(-0.0)),
        (-2i32..3).prop_map(|b| Value::new(TypeId::Boolean, b).unwrap()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn stream_round_trip_big_endian(v in prop_oneof![scalar_value(), int_array()]) {
        let mut out = Vec::new();
        v.serialize_to_stream(&mut out).unwrap();
        let mut input = ByteReader::new(&out);
        let back = Value::deserialize_from_stream(&mut input, v.type_id()).unwrap();
        prop_assert_eq!(back, v);
        prop_assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn stream_round_trip_little_endian(v in scalar_value()) {
        let mut out = BinaryOutput::new(ByteOrder::Little);
        v.serialize_to_stream(&mut out).unwrap();
        let mut input = BinaryInput::new(out.as_bytes(), ByteOrder::Little);
        let back = Value::deserialize_from_stream(&mut input, v.type_id()).unwrap();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn equal_values_hash_equal(v in scalar_value()) {
        let copy = v.copy().unwrap();
        prop_assert_eq!(v.hash().unwrap(), copy.hash().unwrap());
    }

    #[test]
    fn equality_implies_equal_hash(a in small_scalar(), b in small_scalar()) {
        if a.check_comparable(&b) && a.compare_equals(&b).unwrap().is_true() {
            prop_assert_eq!(a.hash().unwrap(), b.hash().unwrap());
        }
    }

    #[test]
    fn comparison_is_antisymmetric(a in any::<i32>(), b in any::<i64>()) {
        let (a, b) = (Value::integer(a), Value::bigint(b));
        let lt = a.compare_less_than(&b).unwrap();
        let gt = b.compare_greater_than(&a).unwrap();
        prop_assert_eq!(lt.as_bool(), gt.as_bool());
    }
}

#[test]
fn declared_type_must_match_tag() {
    let mut out = Vec::new();
    Value::integer(5).serialize_to_stream(&mut out).unwrap();
    let mut input = ByteReader::new(&out);
    let err = Value::deserialize_from_stream(&mut input, TypeId::BigInt).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SerializationError);
}

#[test]
fn truncated_varlen_fails() {
    let mut out = Vec::new();
    Value::varchar("truncate me").unwrap().serialize_to_stream(&mut out).unwrap();
    out.truncate(out.len() - 3);
    let mut input = ByteReader::new(&out);
    let err = Value::deserialize_from_stream(&mut input, TypeId::Varchar).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SerializationError);
}

#[test]
fn nulls_survive_the_stream() {
    for t in TypeId::ALL.into_iter().filter(|t| !matches!(t, TypeId::Invalid | TypeId::Array)) {
        let null = Value::null(t).unwrap();
        let mut out = Vec::new();
        null.serialize_to_stream(&mut out).unwrap();
        let back = Value::deserialize_from_stream(&mut ByteReader::new(&out), t).unwrap();
        assert!(back.is_null(), "{t}");
        assert_eq!(back.type_id(), t);
    }
    let null = Value::null_array(TypeId::Boolean).unwrap();
    let mut out = Vec::new();
    null.serialize_to_stream(&mut out).unwrap();
    let back = Value::deserialize_from_stream(&mut ByteReader::new(&out), TypeId::Array).unwrap();
    assert!(back.is_null());
    assert_eq!(back.element_type().unwrap(), TypeId::Boolean);
}

#[test]
fn framed_sequence_of_values() {
    let codec = BinaryCodec::from_config_json(r#"{"byte_order": "little", "length_bytes": 2}"#).unwrap();
    let values = vec![
        Value::varchar("first").unwrap(),
        Value::smallint(-9),
        Value::null(TypeId::Timestamp).unwrap(),
    ];

    let mut stream = Vec::new();
    for v in &values {
        let mut out = codec.output();
        v.serialize_to_stream(&mut out).unwrap();
        codec.frame(&out, &mut stream).unwrap();
    }

    let mut decoded = Vec::new();
    let mut rest = &stream[..];
    while let Some((mut input, used)) = codec.next_frame(rest).unwrap() {
        // Peek the tag; the value decoder consumes it again.
        let tag = TypeId::try_from(input.clone().read_u8().unwrap()).unwrap();
        decoded.push(Value::deserialize_from_stream(&mut input, tag).unwrap());
        rest = &rest[used..];
    }
    assert_eq!(decoded, values);
}
