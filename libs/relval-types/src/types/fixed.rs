//! Row and stream encoding shared by the fixed-width kinds.
//!
//! A fixed-width slot holds the native payload little-endian, sentinel
//! included, so a NULL reads back as NULL without any side flag.

use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError};

use super::{expect_tag, hash_null, hash_parts};
use crate::value::{Payload, Value};

/// Slot image of a fixed-width value and its width.
fn slot_image(v: &Value<'_>) -> Result<([u8; 8], usize), ValueError> {
    let mut image = [0u8; 8];
    let width = match v.payload {
        Payload::Boolean(b) | Payload::TinyInt(b) => {
            image[..1].copy_from_slice(&b.to_le_bytes());
            1
        }
        Payload::SmallInt(i) => {
            image[..2].copy_from_slice(&i.to_le_bytes());
            2
        }
        Payload::Integer(i) | Payload::ParameterOffset(i) => {
            image[..4].copy_from_slice(&i.to_le_bytes());
            4
        }
        Payload::BigInt(i) => {
            image = i.to_le_bytes();
            8
        }
        Payload::Decimal(d) => {
            image = d.to_bits().to_le_bytes();
            8
        }
        Payload::Timestamp(t) => {
            image = t.to_le_bytes();
            8
        }
        _ => {
            return Err(ValueError::incompatible_type(format!(
                "{} is not a fixed-width kind",
                v.type_id()
            )));
        }
    };
    Ok((image, width))
}

pub(super) fn write(v: &Value<'_>, storage: &mut [u8]) -> Result<(), ValueError> {
    let (image, width) = slot_image(v)?;
    let have = storage.len();
    let slot = storage.get_mut(..width).ok_or_else(|| {
        ValueError::serialization(format!(
            "{} needs a {width}-byte slot, got {have}",
            v.type_id()
        ))
    })?;
    slot.copy_from_slice(&image[..width]);
    Ok(())
}

fn slot<const N: usize>(storage: &[u8], type_id: TypeId) -> Result<[u8; N], ValueError> {
    storage
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            ValueError::serialization(format!(
                "{type_id} needs a {N}-byte slot, got {}",
                storage.len()
            ))
        })
}

pub(super) fn read(type_id: TypeId, storage: &[u8]) -> Result<Value<'static>, ValueError> {
    let payload = match type_id {
        TypeId::Boolean => Payload::Boolean(i8::from_le_bytes(slot(storage, type_id)?)),
        TypeId::TinyInt => Payload::TinyInt(i8::from_le_bytes(slot(storage, type_id)?)),
        TypeId::SmallInt => Payload::SmallInt(i16::from_le_bytes(slot(storage, type_id)?)),
        TypeId::Integer => Payload::Integer(i32::from_le_bytes(slot(storage, type_id)?)),
        TypeId::ParameterOffset => {
            Payload::ParameterOffset(i32::from_le_bytes(slot(storage, type_id)?))
        }
        TypeId::BigInt => Payload::BigInt(i64::from_le_bytes(slot(storage, type_id)?)),
        TypeId::Decimal => {
            Payload::Decimal(f64::from_bits(u64::from_le_bytes(slot(storage, type_id)?)))
        }
        TypeId::Timestamp => Payload::Timestamp(u64::from_le_bytes(slot(storage, type_id)?)),
        _ => {
            return Err(ValueError::incompatible_type(format!(
                "{type_id} is not a fixed-width kind"
            )));
        }
    };
    Ok(Value::fixed(payload))
}

pub(super) fn write_stream(v: &Value<'_>, out: &mut dyn SerializeOutput) -> Result<(), ValueError> {
    // Validate before the tag goes out.
    slot_image(v)?;
    out.write_u8(v.type_id().as_u8());
    match v.payload {
        Payload::Boolean(b) | Payload::TinyInt(b) => out.write_i8(b),
        Payload::SmallInt(i) => out.write_i16(i),
        Payload::Integer(i) | Payload::ParameterOffset(i) => out.write_i32(i),
        Payload::BigInt(i) => out.write_i64(i),
        Payload::Decimal(d) => out.write_f64(d),
        Payload::Timestamp(t) => out.write_u64(t),
        _ => {}
    }
    Ok(())
}

pub(super) fn read_stream(
    type_id: TypeId,
    input: &mut dyn SerializeInput,
) -> Result<Value<'static>, ValueError> {
    expect_tag(input, type_id)?;
    let payload = match type_id {
        TypeId::Boolean => Payload::Boolean(input.read_i8()?),
        TypeId::TinyInt => Payload::TinyInt(input.read_i8()?),
        TypeId::SmallInt => Payload::SmallInt(input.read_i16()?),
        TypeId::Integer => Payload::Integer(input.read_i32()?),
        TypeId::ParameterOffset => Payload::ParameterOffset(input.read_i32()?),
        TypeId::BigInt => Payload::BigInt(input.read_i64()?),
        TypeId::Decimal => Payload::Decimal(input.read_f64()?),
        TypeId::Timestamp => Payload::Timestamp(input.read_u64()?),
        _ => {
            return Err(ValueError::incompatible_type(format!(
                "{type_id} is not a fixed-width kind"
            )));
        }
    };
    Ok(Value::fixed(payload))
}

/// Agrees with `compare_equals`: every numeric kind hashes its value widened
/// to `f64` under one shared tag, and booleans hash as 0 or 1.
pub(super) fn hash(v: &Value<'_>) -> u64 {
    if v.is_null() {
        return hash_null(v.type_id());
    }
    if v.type_id().is_numeric() {
        if let Some(d) = v.as_f64() {
            // -0.0 == 0.0
            let d = if d == 0.0 { 0.0 } else { d };
            return hash_parts(TypeId::Decimal, 0, &d.to_bits().to_le_bytes());
        }
    }
    if let Some(b) = v.as_bool() {
        return hash_parts(TypeId::Boolean, 0, &[u8::from(b)]);
    }
    match slot_image(v) {
        Ok((image, width)) => hash_parts(v.type_id(), v.len, &image[..width]),
        Err(_) => hash_null(v.type_id()),
    }
}
