//! Per-type behavior, selected by type tag.
//!
//! Every operation on a [`Value`] is forwarded to the strategy of its tag
//! (the left operand's tag for binary operations). Strategies are
//! stateless statics; [`type_for`] maps a tag to one.

use std::borrow::Cow;
use std::cmp::Ordering;

use relval_api::limits::VALUE_NULL;
use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool};

use crate::value::Value;

mod array;
mod boolean;
mod decimal;
mod fixed;
mod integer;
mod numeric;
mod timestamp;
mod varlen;

pub use array::ArrayType;
pub use boolean::BooleanType;
pub use decimal::DecimalType;
pub use integer::IntegerType;
pub use timestamp::TimestampType;
pub use varlen::VarlenType;

/// Behavior contract for one type tag.
///
/// Operations a kind does not support keep the default, which fails with
/// `IncompatibleType`.
pub trait ValueType: Send + Sync {
    fn type_id(&self) -> TypeId;

    /// Ordering of two comparable values; `None` when either is NULL.
    fn compare(
        &self,
        left: &Value<'_>,
        _right: &Value<'_>,
    ) -> Result<Option<Ordering>, ValueError> {
        Err(unsupported(left, "compare"))
    }

    fn compare_equals(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_eq))
    }

    fn compare_not_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_ne))
    }

    fn compare_less_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_lt))
    }

    fn compare_less_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_le))
    }

    fn compare_greater_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_gt))
    }

    fn compare_greater_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Ok(comparison(self.compare(left, right)?, Ordering::is_ge))
    }

    fn add(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "add"))
    }

    fn subtract(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "subtract"))
    }

    fn multiply(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "multiply"))
    }

    fn divide(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "divide"))
    }

    fn modulo(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "modulo"))
    }

    fn min(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "min"))
    }

    fn max(&self, left: &Value<'_>, _right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "max"))
    }

    fn sqrt(&self, v: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(v, "sqrt"))
    }

    fn operate_null(
        &self,
        left: &Value<'_>,
        _right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(unsupported(left, "operate on null"))
    }

    fn is_zero(&self, v: &Value<'_>) -> Result<bool, ValueError> {
        Err(unsupported(v, "test for zero"))
    }

    fn is_inlined(&self, v: &Value<'_>) -> bool;

    /// Human-readable text.
    fn render(&self, v: &Value<'_>) -> String;

    fn hash(&self, v: &Value<'_>) -> u64;

    fn hash_combine(&self, v: &Value<'_>, seed: &mut u64) {
        combine(seed, self.hash(v));
    }

    fn serialize_to(
        &self,
        v: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError>;

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError>;

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError>;

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError>;

    fn shallow_copy(&self, _dest: &mut [u8], _src: &[u8], _inlined: bool) -> Result<(), ValueError> {
        Err(ValueError::incompatible_type(format!(
            "cannot shallow-copy a {} slot",
            self.type_id()
        )))
    }

    fn data_from_storage<'a>(
        &self,
        _storage: &'a [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<Option<Cow<'a, [u8]>>, ValueError> {
        Err(ValueError::incompatible_type(format!(
            "{} slot carries no raw data",
            self.type_id()
        )))
    }

    fn copy(&self, v: &Value<'_>) -> Value<'static> {
        v.clone().into_owned()
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError>;

    fn data<'v>(&self, v: &'v Value<'_>) -> Result<Option<&'v [u8]>, ValueError> {
        Err(unsupported(v, "get data of"))
    }

    fn length(&self, v: &Value<'_>) -> Result<u32, ValueError> {
        Err(unsupported(v, "get length of"))
    }

    fn element_at(&self, v: &Value<'_>, _index: u64) -> Result<Value<'static>, ValueError> {
        Err(unsupported(v, "index"))
    }

    fn element_type(&self, v: &Value<'_>) -> Result<TypeId, ValueError> {
        Err(unsupported(v, "get element type of"))
    }

    fn in_list(&self, list: &Value<'_>, _object: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(unsupported(list, "search"))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════

static PARAMETER_OFFSET: IntegerType = IntegerType(TypeId::ParameterOffset);
static BOOLEAN: BooleanType = BooleanType;
static TINYINT: IntegerType = IntegerType(TypeId::TinyInt);
static SMALLINT: IntegerType = IntegerType(TypeId::SmallInt);
static INTEGER: IntegerType = IntegerType(TypeId::Integer);
static BIGINT: IntegerType = IntegerType(TypeId::BigInt);
static DECIMAL: DecimalType = DecimalType;
static TIMESTAMP: TimestampType = TimestampType;
static VARCHAR: VarlenType = VarlenType(TypeId::Varchar);
static VARBINARY: VarlenType = VarlenType(TypeId::Varbinary);
static ARRAY: ArrayType = ArrayType;

/// Strategy for a type tag. `Invalid` has none.
pub fn type_for(type_id: TypeId) -> Result<&'static dyn ValueType, ValueError> {
    let strategy: &'static dyn ValueType = match type_id {
        TypeId::Invalid => {
            return Err(ValueError::incompatible_type("INVALID has no type strategy"));
        }
        TypeId::ParameterOffset => &PARAMETER_OFFSET,
        TypeId::Boolean => &BOOLEAN,
        TypeId::TinyInt => &TINYINT,
        TypeId::SmallInt => &SMALLINT,
        TypeId::Integer => &INTEGER,
        TypeId::BigInt => &BIGINT,
        TypeId::Decimal => &DECIMAL,
        TypeId::Timestamp => &TIMESTAMP,
        TypeId::Varchar => &VARCHAR,
        TypeId::Varbinary => &VARBINARY,
        TypeId::Array => &ARRAY,
    };
    Ok(strategy)
}

// ═══════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════

fn unsupported(v: &Value<'_>, op: &str) -> ValueError {
    ValueError::incompatible_type(format!("cannot {op} {}", v.type_id()))
}

fn comparison(ordering: Option<Ordering>, test: fn(Ordering) -> bool) -> Value<'static> {
    match ordering {
        Some(o) => Value::boolean(test(o)),
        None => Value::null_boolean(),
    }
}

/// Operands must pass the comparability rule.
pub(crate) fn check_comparable(
    left: &Value<'_>,
    right: &Value<'_>,
    op: &str,
) -> Result<(), ValueError> {
    if left.check_comparable(right) {
        Ok(())
    } else {
        Err(ValueError::incompatible_type(format!(
            "cannot {op} {} and {}",
            left.type_id(),
            right.type_id()
        )))
    }
}

/// A strategy was handed a value of another tag.
pub(crate) fn expect_kind(type_id: TypeId, v: &Value<'_>) -> Result<(), ValueError> {
    if v.type_id() == type_id {
        Ok(())
    } else {
        Err(ValueError::incompatible_type(format!(
            "{} value handed to {type_id} strategy",
            v.type_id()
        )))
    }
}

/// Consume the leading tag of a stream value and check it.
pub(crate) fn expect_tag(input: &mut dyn SerializeInput, type_id: TypeId) -> Result<(), ValueError> {
    let tag = input.read_u8()?;
    if tag == type_id.as_u8() {
        return Ok(());
    }
    tracing::debug!(expected = %type_id, found = tag, "stream tag mismatch");
    let found = TypeId::try_from(tag).map_or_else(|_| format!("unknown tag {tag}"), |t| t.to_string());
    Err(ValueError::serialization(format!("expected {type_id}, found {found}")))
}

const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Hash of a tag, length field and payload bytes. Stable within a build.
pub(crate) fn hash_parts(type_id: TypeId, len: u32, bytes: &[u8]) -> u64 {
    let state = ahash::RandomState::with_seeds(HASH_SEEDS[0], HASH_SEEDS[1], HASH_SEEDS[2], HASH_SEEDS[3]);
    state.hash_one((type_id.as_u8(), len, bytes))
}

/// Hash of a NULL of `type_id`.
pub(crate) fn hash_null(type_id: TypeId) -> u64 {
    hash_parts(type_id, VALUE_NULL, &[])
}

/// Boost-style hash combiner.
pub(crate) fn combine(seed: &mut u64, hash: u64) {
    *seed ^= hash
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}
