//! VARCHAR and VARBINARY.
//!
//! Row slot layouts:
//!
//! ```text
//! inlined:  [u32 len LE][len bytes]      len == VALUE_NULL for NULL
//! pooled:   [u64 VarlenRef LE]           VarlenRef::NULL for NULL
//! ```
//!
//! Stream form: `[tag][u32 len][len bytes]`, `len == VALUE_NULL` for NULL.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::num::IntErrorKind;

use relval_api::limits::{self, LENGTH_PREFIX_SIZE, REFERENCE_SIZE, VALUE_NULL};
use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool, VarlenRef};

use super::numeric::{cast_error, decimal_value, integer_value};
use super::{ValueType, check_comparable, expect_kind, expect_tag, hash_parts, timestamp};
use crate::value::Value;

#[derive(Debug)]
pub struct VarlenType(pub(crate) TypeId);

fn short_slot(type_id: TypeId, need: usize, have: usize) -> ValueError {
    ValueError::serialization(format!("{type_id} needs a {need}-byte slot, got {have}"))
}

fn missing_pool(type_id: TypeId) -> ValueError {
    ValueError::serialization(format!("non-inlined {type_id} requires a varlen pool"))
}

fn length_prefix(type_id: TypeId, storage: &[u8]) -> Result<u32, ValueError> {
    storage
        .get(..LENGTH_PREFIX_SIZE)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| short_slot(type_id, LENGTH_PREFIX_SIZE, storage.len()))
}

/// Write a variable-length payload (`None` for NULL) into a row slot.
pub(super) fn write_varlen_slot(
    type_id: TypeId,
    bytes: Option<&[u8]>,
    storage: &mut [u8],
    inlined: bool,
    pool: Option<&dyn VarlenPool>,
) -> Result<(), ValueError> {
    if inlined {
        let len = match bytes {
            Some(b) => limits::check_varlen_len(b.len())?,
            None => VALUE_NULL,
        };
        let body = bytes.unwrap_or_default();
        let need = LENGTH_PREFIX_SIZE + body.len();
        if storage.len() < need {
            return Err(short_slot(type_id, need, storage.len()));
        }
        storage[..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_le_bytes());
        storage[LENGTH_PREFIX_SIZE..need].copy_from_slice(body);
        return Ok(());
    }

    if storage.len() < REFERENCE_SIZE {
        return Err(short_slot(type_id, REFERENCE_SIZE, storage.len()));
    }
    let reference = match bytes {
        None => VarlenRef::NULL,
        Some(b) => {
            limits::check_varlen_len(b.len())?;
            pool.ok_or_else(|| missing_pool(type_id))?.allocate(b)?
        }
    };
    storage[..REFERENCE_SIZE].copy_from_slice(&reference.to_bytes());
    Ok(())
}

/// Read a variable-length payload from a row slot.
///
/// Inlined payloads borrow `storage`; pooled payloads are copied out.
pub(super) fn read_varlen_slot<'a>(
    type_id: TypeId,
    storage: &'a [u8],
    inlined: bool,
    pool: Option<&dyn VarlenPool>,
) -> Result<Option<Cow<'a, [u8]>>, ValueError> {
    if inlined {
        let len = length_prefix(type_id, storage)?;
        if len == VALUE_NULL {
            return Ok(None);
        }
        let end = LENGTH_PREFIX_SIZE + len as usize;
        let body = storage.get(LENGTH_PREFIX_SIZE..end).ok_or_else(|| {
            ValueError::serialization(format!(
                "inlined {type_id} of {len} bytes overruns a {}-byte slot",
                storage.len()
            ))
        })?;
        return Ok(Some(Cow::Borrowed(body)));
    }

    let reference = VarlenRef::from_slot(storage)?;
    if reference.is_null() {
        return Ok(None);
    }
    let bytes = pool.ok_or_else(|| missing_pool(type_id))?.fetch(reference)?;
    Ok(Some(Cow::Owned(bytes.to_vec())))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// VARCHAR text into a scalar kind.
fn parse_text(text: &str, target: TypeId) -> Result<Value<'static>, ValueError> {
    let s = text.trim();
    match target {
        TypeId::Boolean => parse_bool(s)
            .map(Value::boolean)
            .ok_or_else(|| ValueError::cast(format!("invalid boolean {text:?}"))),
        TypeId::TinyInt | TypeId::SmallInt | TypeId::Integer | TypeId::BigInt => {
            let i: i64 = s.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ValueError::out_of_range(format!("{text:?} is out of range for {target}"))
                }
                _ => ValueError::cast(format!("invalid {target} {text:?}")),
            })?;
            integer_value(target, i)
        }
        TypeId::Decimal => {
            let d: f64 = s
                .parse()
                .map_err(|_| ValueError::cast(format!("invalid DECIMAL {text:?}")))?;
            decimal_value(d)
        }
        TypeId::Timestamp => timestamp::parse(s),
        _ => Err(cast_error(TypeId::Varchar, target)),
    }
}

impl ValueType for VarlenType {
    fn type_id(&self) -> TypeId {
        self.0
    }

    /// Bytewise.
    fn compare(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Option<Ordering>, ValueError> {
        check_comparable(left, right, "compare")?;
        Ok(match (left.varlen_bytes(), right.varlen_bytes()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        })
    }

    fn is_inlined(&self, _v: &Value<'_>) -> bool {
        false
    }

    fn render(&self, v: &Value<'_>) -> String {
        match v.varlen_bytes() {
            None => "varlen_null".to_string(),
            Some(b) if self.0 == TypeId::Varchar => String::from_utf8_lossy(b).into_owned(),
            Some(b) => format!("\\x{}", hex::encode(b)),
        }
    }

    fn hash(&self, v: &Value<'_>) -> u64 {
        hash_parts(self.0, v.len, v.varlen_bytes().unwrap_or_default())
    }

    fn serialize_to(
        &self,
        v: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        expect_kind(self.0, v)?;
        write_varlen_slot(self.0, v.varlen_bytes(), storage, inlined, pool)
    }

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        match read_varlen_slot(self.0, storage, inlined, pool)? {
            None => Ok(Value::varlen_null(self.0)),
            Some(bytes) => {
                let len = limits::check_varlen_len(bytes.len())?;
                Ok(Value::varlen_payload(self.0, bytes, len))
            }
        }
    }

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError> {
        expect_kind(self.0, v)?;
        let bytes = v.varlen_bytes();
        let len = match bytes {
            Some(b) => limits::check_varlen_len(b.len())?,
            None => VALUE_NULL,
        };
        out.write_u8(self.0.as_u8());
        out.write_u32(len);
        if let Some(b) = bytes {
            out.write_bytes(b);
        }
        Ok(())
    }

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError> {
        expect_tag(input, self.0)?;
        let len = input.read_u32()?;
        if len == VALUE_NULL {
            return Ok(Value::varlen_null(self.0));
        }
        let bytes = input.read_bytes(len as usize)?;
        Ok(Value::varlen_payload(self.0, Cow::Owned(bytes.to_vec()), len))
    }

    fn shallow_copy(&self, dest: &mut [u8], src: &[u8], inlined: bool) -> Result<(), ValueError> {
        let n = if inlined {
            match length_prefix(self.0, src)? {
                VALUE_NULL => LENGTH_PREFIX_SIZE,
                len => LENGTH_PREFIX_SIZE + len as usize,
            }
        } else {
            REFERENCE_SIZE
        };
        let image = src.get(..n).ok_or_else(|| short_slot(self.0, n, src.len()))?;
        let dest_len = dest.len();
        let target = dest
            .get_mut(..n)
            .ok_or_else(|| short_slot(self.0, n, dest_len))?;
        target.copy_from_slice(image);
        Ok(())
    }

    fn data_from_storage<'a>(
        &self,
        storage: &'a [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Option<Cow<'a, [u8]>>, ValueError> {
        read_varlen_slot(self.0, storage, inlined, pool)
    }

    fn copy(&self, v: &Value<'_>) -> Value<'static> {
        match v.varlen_bytes() {
            Some(b) => Value::varlen_payload(self.0, Cow::Owned(b.to_vec()), v.len),
            None => Value::varlen_null(self.0),
        }
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
        if target == self.0 {
            return Ok(self.copy(v));
        }
        let bytes = v.varlen_bytes();
        match (self.0, target) {
            (TypeId::Varchar, TypeId::Varbinary) => Value::varlen(TypeId::Varbinary, bytes),
            (TypeId::Varbinary, TypeId::Varchar) => match bytes {
                None => Value::null(TypeId::Varchar),
                Some(b) => {
                    let text = std::str::from_utf8(b).map_err(|e| {
                        ValueError::cast(format!("VARBINARY is not valid UTF-8: {e}"))
                    })?;
                    Value::varchar(text)
                }
            },
            (TypeId::Varchar, t) if t.is_scalar() && !t.is_varlen() => match bytes {
                None => Value::null(t),
                Some(b) => {
                    let text = std::str::from_utf8(b).map_err(|e| {
                        ValueError::cast(format!("VARCHAR is not valid UTF-8: {e}"))
                    })?;
                    parse_text(text, t)
                }
            },
            (source, t) => Err(cast_error(source, t)),
        }
    }

    fn data<'v>(&self, v: &'v Value<'_>) -> Result<Option<&'v [u8]>, ValueError> {
        Ok(v.varlen_bytes())
    }

    fn length(&self, v: &Value<'_>) -> Result<u32, ValueError> {
        Ok(v.len)
    }
}
