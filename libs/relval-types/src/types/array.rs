//! ARRAY of one scalar element kind.
//!
//! Stream form: `[tag][u8 element tag][u32 count][elements...]`, each
//! element in its own stream form; `count == VALUE_NULL` for a NULL array.
//! In row storage the stream form is the payload of a varlen slot, so the
//! element kind survives a NULL.

use relval_api::limits::VALUE_NULL;
use relval_api::{
    ByteReader, SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool,
};

use super::numeric::cast_error;
use super::varlen::{read_varlen_slot, write_varlen_slot};
use super::{ValueType, expect_kind, expect_tag, hash_parts, type_for};
use crate::value::{Payload, Value};

#[derive(Debug)]
pub struct ArrayType;

fn parts<'v, 'a>(v: &'v Value<'a>) -> Result<(TypeId, Option<&'v [Value<'a>]>), ValueError> {
    v.array_parts().ok_or_else(|| {
        ValueError::incompatible_type(format!("{} value handed to ARRAY strategy", v.type_id()))
    })
}

impl ValueType for ArrayType {
    fn type_id(&self) -> TypeId {
        TypeId::Array
    }

    fn is_inlined(&self, _v: &Value<'_>) -> bool {
        false
    }

    fn render(&self, v: &Value<'_>) -> String {
        match v.array_parts() {
            Some((_, Some(items))) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                format!("[{}]", rendered.join(", "))
            }
            _ => "array_null".to_string(),
        }
    }

    fn hash(&self, v: &Value<'_>) -> u64 {
        let Some((element, items)) = v.array_parts() else {
            return hash_parts(TypeId::Array, VALUE_NULL, &[]);
        };
        let mut seed = hash_parts(TypeId::Array, v.len, &[element.as_u8()]);
        if let (Some(items), Ok(strategy)) = (items, type_for(element)) {
            for item in items {
                strategy.hash_combine(item, &mut seed);
            }
        }
        seed
    }

    fn serialize_to(
        &self,
        v: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        expect_kind(TypeId::Array, v)?;
        let mut encoded = Vec::new();
        self.serialize_to_stream(v, &mut encoded)?;
        write_varlen_slot(TypeId::Array, Some(encoded.as_slice()), storage, inlined, pool)
    }

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        let Some(encoded) = read_varlen_slot(TypeId::Array, storage, inlined, pool)? else {
            return Err(ValueError::serialization("ARRAY slot holds no element type"));
        };
        let mut input = ByteReader::new(&encoded);
        let value = self.deserialize_from_stream(&mut input)?;
        if input.remaining() != 0 {
            return Err(ValueError::serialization(format!(
                "{} trailing bytes after ARRAY",
                input.remaining()
            )));
        }
        Ok(value)
    }

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError> {
        let (element, items) = parts(v)?;
        let count = match items {
            None => VALUE_NULL,
            Some(items) => u32::try_from(items.len())
                .ok()
                .filter(|n| *n != VALUE_NULL)
                .ok_or_else(|| {
                    ValueError::size_limit(format!("ARRAY of {} elements", items.len()))
                })?,
        };
        let strategy = type_for(element)?;
        out.write_u8(TypeId::Array.as_u8());
        out.write_u8(element.as_u8());
        out.write_u32(count);
        for item in items.unwrap_or_default() {
            strategy.serialize_to_stream(item, out)?;
        }
        Ok(())
    }

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError> {
        expect_tag(input, TypeId::Array)?;
        let element = TypeId::try_from(input.read_u8()?)?;
        if !element.is_scalar() {
            return Err(ValueError::serialization(format!(
                "{element} cannot be an array element"
            )));
        }
        let count = input.read_u32()?;
        if count == VALUE_NULL {
            return Value::null_array(element);
        }
        let strategy = type_for(element)?;
        // Every element takes at least its tag byte.
        let mut items = Vec::with_capacity((count as usize).min(input.remaining()));
        for _ in 0..count {
            items.push(strategy.deserialize_from_stream(input)?);
        }
        Value::array(element, items)
    }

    fn copy(&self, v: &Value<'_>) -> Value<'static> {
        let Some((element, items)) = v.array_parts() else {
            return Value::default();
        };
        let Ok(strategy) = type_for(element) else {
            return v.clone().into_owned();
        };
        let items = items.map(|items| items.iter().map(|item| strategy.copy(item)).collect());
        Value { payload: Payload::Array(element, items), len: v.len }
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
        match target {
            TypeId::Array => Ok(self.copy(v)),
            _ => Err(cast_error(TypeId::Array, target)),
        }
    }

    /// Element at zero-based `index`. Indexing a NULL array gives a NULL element.
    fn element_at(&self, v: &Value<'_>, index: u64) -> Result<Value<'static>, ValueError> {
        let (element, items) = parts(v)?;
        let Some(items) = items else {
            return Value::null(element);
        };
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .map(|item| item.clone().into_owned())
            .ok_or_else(|| {
                ValueError::out_of_range(format!(
                    "index {index} out of bounds for ARRAY of {} elements",
                    items.len()
                ))
            })
    }

    fn element_type(&self, v: &Value<'_>) -> Result<TypeId, ValueError> {
        Ok(parts(v)?.0)
    }

    fn in_list(&self, list: &Value<'_>, object: &Value<'_>) -> Result<Value<'static>, ValueError> {
        let (element, items) = parts(list)?;
        if !element.comparable_with(object.type_id()) {
            return Err(ValueError::incompatible_type(format!(
                "cannot search {element} array for {}",
                object.type_id()
            )));
        }
        let Some(items) = items else {
            return Ok(Value::null_boolean());
        };
        if object.is_null() {
            return Ok(Value::null_boolean());
        }
        for item in items {
            if item.compare_equals(object)?.is_true() {
                return Ok(Value::boolean(true));
            }
        }
        Ok(Value::boolean(false))
    }
}

#[cfg(test)]
mod tests {
    use relval_api::ErrorKind;

    use super::*;

    fn ints(values: &[i32]) -> Value<'static> {
        Value::array(TypeId::Integer, values.iter().copied().map(Value::integer).collect()).unwrap()
    }

    #[test]
    fn render() {
        assert_eq!(ints(&[1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(ints(&[]).to_string(), "[]");
        assert_eq!(Value::null_array(TypeId::Integer).unwrap().to_string(), "array_null");
    }

    #[test]
    fn element_access() {
        let a = ints(&[10, 20]);
        assert_eq!(a.element_type().unwrap(), TypeId::Integer);
        assert_eq!(a.element_at(1).unwrap(), Value::integer(20));
        let err = a.element_at(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert!(Value::null_array(TypeId::Integer).unwrap().element_at(0).unwrap().is_null());
    }

    #[test]
    fn in_list() {
        let a = ints(&[10, 20]);
        assert!(a.in_list(&Value::integer(20)).unwrap().is_true());
        assert!(a.in_list(&Value::bigint(10)).unwrap().is_true());
        assert!(a.in_list(&Value::integer(30)).unwrap().is_false());
        assert!(a.in_list(&Value::null(TypeId::Integer).unwrap()).unwrap().is_null());

        let err = a.in_list(&Value::varchar("10").unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleType);
    }

    #[test]
    fn no_comparison() {
        let err = ints(&[1]).compare_equals(&ints(&[1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleType);
    }

    #[test]
    fn stream_layout() {
        let mut out = Vec::new();
        ints(&[7]).serialize_to_stream(&mut out).unwrap();
        assert_eq!(
            out,
            vec![
                TypeId::Array.as_u8(),
                TypeId::Integer.as_u8(),
                0, 0, 0, 1,
                TypeId::Integer.as_u8(),
                0, 0, 0, 7,
            ]
        );
    }

    #[test]
    fn null_array_keeps_element_kind_in_row_storage() {
        let null = Value::null_array(TypeId::Varchar).unwrap();
        let mut slot = vec![0u8; null.serialized_size(true).unwrap()];
        null.serialize_to(&mut slot, true, None).unwrap();
        let back = Value::deserialize_from(&slot, TypeId::Array, true, None).unwrap();
        assert!(back.is_null());
        assert_eq!(back.element_type().unwrap(), TypeId::Varchar);
    }

    #[test]
    fn mismatched_element_tag_is_rejected() {
        let mut out = Vec::new();
        ints(&[7]).serialize_to_stream(&mut out).unwrap();
        out[1] = TypeId::BigInt.as_u8();
        let mut input = ByteReader::new(&out);
        let err = Value::deserialize_from_stream(&mut input, TypeId::Array).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerializationError);
    }

    #[test]
    fn copy_is_deep() {
        let storage = b"view".to_vec();
        let item = Value::varlen_view(TypeId::Varchar, Some(storage.as_slice())).unwrap();
        let a = Value::array(TypeId::Varchar, vec![item]).unwrap();
        assert!(a.is_view());
        let owned = a.copy().unwrap();
        drop(a);
        drop(storage);
        assert!(!owned.is_view());
        assert_eq!(owned.to_string(), "[view]");
    }
}
