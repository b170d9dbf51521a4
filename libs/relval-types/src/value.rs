//! The runtime value: a type tag, a payload slot and a length field.
//!
//! Null is carried in-band. Fixed-width kinds store their type's sentinel
//! in the payload slot; every kind stores `VALUE_NULL` in the length field,
//! which is what `is_null()` reads.

use std::borrow::Cow;
use std::fmt;

use relval_api::limits::{
    self, BOOLEAN_NULL, DECIMAL_NULL, INT8_NULL, INT16_NULL, INT32_NULL, INT64_NULL,
    TIMESTAMP_NULL, VALUE_NULL,
};
use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool};

use crate::types::{self, ValueType};

/// Payload slot. One arm per type tag.
///
/// Variable-length payloads are `None` when null. `Cow::Borrowed` is a view
/// into storage the value does not own; `Cow::Owned` is an owned copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) enum Payload<'a> {
    #[default]
    Invalid,
    Boolean(i8),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    ParameterOffset(i32),
    BigInt(i64),
    Decimal(f64),
    Timestamp(u64),
    Varchar(Option<Cow<'a, [u8]>>),
    Varbinary(Option<Cow<'a, [u8]>>),
    Array(TypeId, Option<Vec<Value<'a>>>),
}

impl Payload<'_> {
    fn is_sentinel(&self) -> bool {
        match *self {
            Payload::Boolean(b) => b == BOOLEAN_NULL,
            Payload::TinyInt(i) => i == INT8_NULL,
            Payload::SmallInt(i) => i == INT16_NULL,
            Payload::Integer(i) | Payload::ParameterOffset(i) => i == INT32_NULL,
            Payload::BigInt(i) => i == INT64_NULL,
            Payload::Decimal(d) => d == DECIMAL_NULL,
            Payload::Timestamp(t) => t == TIMESTAMP_NULL,
            _ => false,
        }
    }
}

/// A type-tagged SQL scalar.
///
/// `Value<'static>` owns everything it refers to. A shorter lifetime means
/// the value is (or contains) a read-only view into row storage, produced
/// by [`Value::deserialize_from`] on an inlined slot or by
/// [`Value::varlen_view`]. Use [`Value::into_owned`] to detach a view.
///
/// `Clone` duplicates owned payloads and keeps views as views.
/// `Value::default()` is the empty `Invalid` value; [`Value::take`] leaves
/// one behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Value<'a> {
    pub(crate) payload: Payload<'a>,
    /// Payload length for varlen kinds, 0 for the rest; `VALUE_NULL` when null.
    pub(crate) len: u32,
}

impl Default for Value<'_> {
    fn default() -> Self {
        Value { payload: Payload::Invalid, len: VALUE_NULL }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Native constructors
// ═══════════════════════════════════════════════════════════════

mod sealed {
    pub trait Sealed {}
}

/// Native numbers accepted by [`Value::new`].
///
/// | native            | accepted tags                                        |
/// |-------------------|------------------------------------------------------|
/// | `i8` `i16` `i32`  | BOOLEAN TINYINT SMALLINT INTEGER PARAMETER_OFFSET BIGINT |
/// | `i64`             | the above and TIMESTAMP                              |
/// | `u64`             | BOOLEAN TIMESTAMP                                    |
/// | `f32` `f64`       | DECIMAL                                              |
///
/// The number is narrowed to the slot width with two's-complement
/// truncation. A result equal to the tag's sentinel is NULL.
pub trait NativeScalar: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn into_value(self, type_id: TypeId) -> Result<Value<'static>, ValueError>;
}

macro_rules! signed_native {
    ($($ty:ty => $timestamp:expr),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl NativeScalar for $ty {
            fn into_value(self, type_id: TypeId) -> Result<Value<'static>, ValueError> {
                from_signed(type_id, i64::from(self), stringify!($ty), $timestamp)
            }
        }
    )*};
}

signed_native!(i8 => false, i16 => false, i32 => false, i64 => true);

impl sealed::Sealed for u64 {}

impl NativeScalar for u64 {
    fn into_value(self, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Boolean => Ok(Value::fixed(Payload::Boolean(self as i8))),
            TypeId::Timestamp => Ok(Value::timestamp(self)),
            _ => Err(invalid_constructor(type_id, "u64")),
        }
    }
}

impl sealed::Sealed for f64 {}

impl NativeScalar for f64 {
    fn into_value(self, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Decimal => Ok(Value::decimal(self)),
            _ => Err(invalid_constructor(type_id, "f64")),
        }
    }
}

impl sealed::Sealed for f32 {}

impl NativeScalar for f32 {
    fn into_value(self, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Decimal => Ok(Value::decimal(f64::from(self))),
            _ => Err(invalid_constructor(type_id, "f32")),
        }
    }
}

fn from_signed(
    type_id: TypeId,
    v: i64,
    native: &str,
    allow_timestamp: bool,
) -> Result<Value<'static>, ValueError> {
    let value = match type_id {
        TypeId::Boolean => Value::fixed(Payload::Boolean(v as i8)),
        TypeId::TinyInt => Value::tinyint(v as i8),
        TypeId::SmallInt => Value::smallint(v as i16),
        TypeId::Integer => Value::integer(v as i32),
        TypeId::ParameterOffset => Value::parameter_offset(v as i32),
        TypeId::BigInt => Value::bigint(v),
        TypeId::Timestamp if allow_timestamp => Value::timestamp(v as u64),
        _ => return Err(invalid_constructor(type_id, native)),
    };
    Ok(value)
}

fn invalid_constructor(type_id: TypeId, native: &str) -> ValueError {
    ValueError::incompatible_type(format!("invalid type {type_id} for {native} constructor"))
}

fn check_varlen_kind(type_id: TypeId) -> Result<(), ValueError> {
    if type_id.is_varlen() {
        Ok(())
    } else {
        Err(invalid_constructor(type_id, "variable-length"))
    }
}

fn check_element_kind(element: TypeId) -> Result<(), ValueError> {
    if element.is_scalar() {
        Ok(())
    } else {
        Err(ValueError::incompatible_type(format!(
            "{element} cannot be an array element"
        )))
    }
}

impl Value<'static> {
    /// Build a value of `type_id` from a native number.
    ///
    /// ```
    /// use relval_types::{TypeId, Value};
    ///
    /// let v = Value::new(TypeId::SmallInt, 300i32).unwrap();
    /// assert_eq!(v.as_i64(), Some(300));
    /// assert!(Value::new(TypeId::Integer, i32::MIN).unwrap().is_null());
    /// assert!(Value::new(TypeId::Varchar, 1i32).is_err());
    /// ```
    pub fn new<T: NativeScalar>(type_id: TypeId, v: T) -> Result<Self, ValueError> {
        v.into_value(type_id)
    }

    pub(crate) fn fixed(payload: Payload<'static>) -> Self {
        let len = if payload.is_sentinel() { VALUE_NULL } else { 0 };
        Value { payload, len }
    }

    pub fn boolean(b: bool) -> Self {
        Value::fixed(Payload::Boolean(i8::from(b)))
    }

    pub fn tinyint(v: i8) -> Self {
        Value::fixed(Payload::TinyInt(v))
    }

    pub fn smallint(v: i16) -> Self {
        Value::fixed(Payload::SmallInt(v))
    }

    pub fn integer(v: i32) -> Self {
        Value::fixed(Payload::Integer(v))
    }

    pub fn parameter_offset(v: i32) -> Self {
        Value::fixed(Payload::ParameterOffset(v))
    }

    pub fn bigint(v: i64) -> Self {
        Value::fixed(Payload::BigInt(v))
    }

    pub fn decimal(v: f64) -> Self {
        Value::fixed(Payload::Decimal(v))
    }

    /// Microseconds since the Unix epoch.
    pub fn timestamp(micros: u64) -> Self {
        Value::fixed(Payload::Timestamp(micros))
    }

    /// Typed NULL of a scalar kind. Arrays need [`Value::null_array`].
    pub fn null(type_id: TypeId) -> Result<Self, ValueError> {
        let value = match type_id {
            TypeId::Boolean => Value::fixed(Payload::Boolean(BOOLEAN_NULL)),
            TypeId::TinyInt => Value::tinyint(INT8_NULL),
            TypeId::SmallInt => Value::smallint(INT16_NULL),
            TypeId::Integer => Value::integer(INT32_NULL),
            TypeId::ParameterOffset => Value::parameter_offset(INT32_NULL),
            TypeId::BigInt => Value::bigint(INT64_NULL),
            TypeId::Decimal => Value::decimal(DECIMAL_NULL),
            TypeId::Timestamp => Value::timestamp(TIMESTAMP_NULL),
            TypeId::Varchar | TypeId::Varbinary => Value::varlen_null(type_id),
            TypeId::Invalid | TypeId::Array => {
                return Err(ValueError::incompatible_type(format!(
                    "{type_id} has no standalone NULL"
                )));
            }
        };
        Ok(value)
    }

    pub(crate) fn null_boolean() -> Self {
        Value::fixed(Payload::Boolean(BOOLEAN_NULL))
    }

    pub(crate) fn varlen_null(type_id: TypeId) -> Self {
        let payload = if type_id == TypeId::Varchar {
            Payload::Varchar(None)
        } else {
            Payload::Varbinary(None)
        };
        Value { payload, len: VALUE_NULL }
    }

    /// Variable-length value owning a copy of `data`; `None` is NULL.
    pub fn varlen(type_id: TypeId, data: Option<&[u8]>) -> Result<Self, ValueError> {
        check_varlen_kind(type_id)?;
        match data {
            None => Ok(Value::varlen_null(type_id)),
            Some(bytes) => {
                let len = limits::check_varlen_len(bytes.len())?;
                Ok(Value::varlen_payload(type_id, Cow::Owned(bytes.to_vec()), len))
            }
        }
    }

    /// Variable-length value holding exactly the bytes of `text`.
    ///
    /// Text is never NULL here, and no terminator is stored. Use
    /// [`Value::null`] for a NULL string.
    pub fn from_text(type_id: TypeId, text: &str) -> Result<Self, ValueError> {
        Value::varlen(type_id, Some(text.as_bytes()))
    }

    pub fn varchar(text: &str) -> Result<Self, ValueError> {
        Value::from_text(TypeId::Varchar, text)
    }

    pub fn varbinary(bytes: &[u8]) -> Result<Self, ValueError> {
        Value::varlen(TypeId::Varbinary, Some(bytes))
    }

    pub fn null_array(element: TypeId) -> Result<Self, ValueError> {
        check_element_kind(element)?;
        Ok(Value { payload: Payload::Array(element, None), len: VALUE_NULL })
    }
}

impl<'a> Value<'a> {
    /// Variable-length value viewing `data` without copying it.
    pub fn varlen_view(type_id: TypeId, data: Option<&'a [u8]>) -> Result<Self, ValueError> {
        check_varlen_kind(type_id)?;
        match data {
            None => Ok(Value::varlen_null(type_id)),
            Some(bytes) => {
                let len = limits::check_varlen_len(bytes.len())?;
                Ok(Value::varlen_payload(type_id, Cow::Borrowed(bytes), len))
            }
        }
    }

    pub(crate) fn varlen_payload(type_id: TypeId, bytes: Cow<'a, [u8]>, len: u32) -> Self {
        let payload = if type_id == TypeId::Varchar {
            Payload::Varchar(Some(bytes))
        } else {
            Payload::Varbinary(Some(bytes))
        };
        Value { payload, len }
    }

    /// Array of `element` values. Every item must carry the element tag.
    pub fn array(element: TypeId, items: Vec<Value<'a>>) -> Result<Self, ValueError> {
        check_element_kind(element)?;
        if let Some(bad) = items.iter().find(|item| item.type_id() != element) {
            return Err(ValueError::incompatible_type(format!(
                "{} element in {element} array",
                bad.type_id()
            )));
        }
        Ok(Value { payload: Payload::Array(element, Some(items)), len: 0 })
    }

    // ═══════════════════════════════════════════════════════════════
    //  Accessors
    // ═══════════════════════════════════════════════════════════════

    pub fn type_id(&self) -> TypeId {
        match &self.payload {
            Payload::Invalid => TypeId::Invalid,
            Payload::Boolean(_) => TypeId::Boolean,
            Payload::TinyInt(_) => TypeId::TinyInt,
            Payload::SmallInt(_) => TypeId::SmallInt,
            Payload::Integer(_) => TypeId::Integer,
            Payload::ParameterOffset(_) => TypeId::ParameterOffset,
            Payload::BigInt(_) => TypeId::BigInt,
            Payload::Decimal(_) => TypeId::Decimal,
            Payload::Timestamp(_) => TypeId::Timestamp,
            Payload::Varchar(_) => TypeId::Varchar,
            Payload::Varbinary(_) => TypeId::Varbinary,
            Payload::Array(..) => TypeId::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        self.len == VALUE_NULL
    }

    /// Raw length field: byte count for varlen kinds, 0 for fixed-width
    /// kinds and arrays, `VALUE_NULL` for NULL.
    pub fn len_field(&self) -> u32 {
        self.len
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Boolean(b) if !self.is_null() => Some(b != 0),
            _ => None,
        }
    }

    /// Any non-null integer kind, widened.
    pub fn as_i64(&self) -> Option<i64> {
        if self.is_null() {
            return None;
        }
        match self.payload {
            Payload::TinyInt(i) => Some(i64::from(i)),
            Payload::SmallInt(i) => Some(i64::from(i)),
            Payload::Integer(i) | Payload::ParameterOffset(i) => Some(i64::from(i)),
            Payload::BigInt(i) => Some(i),
            _ => None,
        }
    }

    /// Any non-null numeric kind as a double.
    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            Payload::Decimal(d) if !self.is_null() => Some(d),
            Payload::ParameterOffset(_) => None,
            _ => self.as_i64().map(|i| i as f64),
        }
    }

    pub fn as_timestamp(&self) -> Option<u64> {
        match self.payload {
            Payload::Timestamp(t) if !self.is_null() => Some(t),
            _ => None,
        }
    }

    /// Non-null BOOLEAN holding true.
    pub fn is_true(&self) -> bool {
        self.as_bool() == Some(true)
    }

    /// Non-null BOOLEAN holding false.
    pub fn is_false(&self) -> bool {
        self.as_bool() == Some(false)
    }

    /// True when the payload is a view into storage the value does not own.
    pub fn is_view(&self) -> bool {
        match &self.payload {
            Payload::Varchar(Some(b)) | Payload::Varbinary(Some(b)) => {
                matches!(b, Cow::Borrowed(_))
            }
            Payload::Array(_, Some(items)) => items.iter().any(Value::is_view),
            _ => false,
        }
    }

    pub(crate) fn varlen_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Varchar(Some(b)) | Payload::Varbinary(Some(b)) => Some(b.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn array_parts(&self) -> Option<(TypeId, Option<&[Value<'a>]>)> {
        match &self.payload {
            Payload::Array(element, items) => Some((*element, items.as_deref())),
            _ => None,
        }
    }

    /// Debug rendering: `Value::TYPE[text]`.
    pub fn info(&self) -> String {
        format!("Value::{}[{}]", self.type_id(), self)
    }

    /// True when both tags pass the comparability rule.
    pub fn check_comparable(&self, other: &Value<'_>) -> bool {
        self.type_id().comparable_with(other.type_id())
    }

    /// True for integer kinds, PARAMETER_OFFSET included.
    pub fn check_integer(&self) -> bool {
        self.type_id().is_integer()
    }

    /// Move the value out, leaving an empty `Invalid` value behind.
    pub fn take(&mut self) -> Value<'a> {
        std::mem::take(self)
    }

    /// Detach from any storage this value views.
    pub fn into_owned(self) -> Value<'static> {
        let payload = match self.payload {
            Payload::Invalid => Payload::Invalid,
            Payload::Boolean(b) => Payload::Boolean(b),
            Payload::TinyInt(i) => Payload::TinyInt(i),
            Payload::SmallInt(i) => Payload::SmallInt(i),
            Payload::Integer(i) => Payload::Integer(i),
            Payload::ParameterOffset(i) => Payload::ParameterOffset(i),
            Payload::BigInt(i) => Payload::BigInt(i),
            Payload::Decimal(d) => Payload::Decimal(d),
            Payload::Timestamp(t) => Payload::Timestamp(t),
            Payload::Varchar(b) => Payload::Varchar(b.map(|b| Cow::Owned(b.into_owned()))),
            Payload::Varbinary(b) => Payload::Varbinary(b.map(|b| Cow::Owned(b.into_owned()))),
            Payload::Array(element, items) => Payload::Array(
                element,
                items.map(|items| items.into_iter().map(Value::into_owned).collect()),
            ),
        };
        Value { payload, len: self.len }
    }

    fn strategy(&self) -> Result<&'static dyn ValueType, ValueError> {
        types::type_for(self.type_id())
    }

    // ═══════════════════════════════════════════════════════════════
    //  Comparison
    // ═══════════════════════════════════════════════════════════════

    /// BOOLEAN result; NULL when either operand is NULL.
    pub fn compare_equals(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_equals(self, other)
    }

    pub fn compare_not_equals(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_not_equals(self, other)
    }

    pub fn compare_less_than(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_less_than(self, other)
    }

    pub fn compare_less_than_equals(
        &self,
        other: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_less_than_equals(self, other)
    }

    pub fn compare_greater_than(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_greater_than(self, other)
    }

    pub fn compare_greater_than_equals(
        &self,
        other: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        self.strategy()?.compare_greater_than_equals(self, other)
    }

    // ═══════════════════════════════════════════════════════════════
    //  Arithmetic
    // ═══════════════════════════════════════════════════════════════

    pub fn add(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.add(self, other)
    }

    pub fn subtract(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.subtract(self, other)
    }

    pub fn multiply(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.multiply(self, other)
    }

    pub fn divide(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.divide(self, other)
    }

    pub fn modulo(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.modulo(self, other)
    }

    pub fn min(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.min(self, other)
    }

    pub fn max(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.max(self, other)
    }

    pub fn sqrt(&self) -> Result<Value<'static>, ValueError> {
        self.strategy()?.sqrt(self)
    }

    /// NULL of the type `self` combined with `other` would produce.
    pub fn operate_null(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.operate_null(self, other)
    }

    pub fn is_zero(&self) -> Result<bool, ValueError> {
        self.strategy()?.is_zero(self)
    }

    // ═══════════════════════════════════════════════════════════════
    //  Introspection, hashing, copying
    // ═══════════════════════════════════════════════════════════════

    /// Whether the value is stored inside the row (fixed-width kinds).
    pub fn is_inlined(&self) -> Result<bool, ValueError> {
        Ok(self.strategy()?.is_inlined(self))
    }

    pub fn hash(&self) -> Result<u64, ValueError> {
        Ok(self.strategy()?.hash(self))
    }

    /// Fold this value's hash into `seed`.
    pub fn hash_combine(&self, seed: &mut u64) -> Result<(), ValueError> {
        self.strategy()?.hash_combine(self, seed);
        Ok(())
    }

    /// Value-semantic duplicate, independent of any storage.
    pub fn copy(&self) -> Result<Value<'static>, ValueError> {
        Ok(self.strategy()?.copy(self))
    }

    pub fn cast_as(&self, target: TypeId) -> Result<Value<'static>, ValueError> {
        self.strategy()?.cast_as(self, target)
    }

    /// Payload bytes of a variable-length value; `None` when NULL.
    pub fn data(&self) -> Result<Option<&[u8]>, ValueError> {
        self.strategy()?.data(self)
    }

    /// Length field of a variable-length value.
    pub fn length(&self) -> Result<u32, ValueError> {
        self.strategy()?.length(self)
    }

    pub fn element_at(&self, index: u64) -> Result<Value<'static>, ValueError> {
        self.strategy()?.element_at(self, index)
    }

    pub fn element_type(&self) -> Result<TypeId, ValueError> {
        self.strategy()?.element_type(self)
    }

    /// BOOLEAN: whether `object` equals any element of this array.
    pub fn in_list(&self, object: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.strategy()?.in_list(self, object)
    }

    // ═══════════════════════════════════════════════════════════════
    //  Serialization
    // ═══════════════════════════════════════════════════════════════

    /// Write into a row slot.
    ///
    /// Fixed-width kinds fill `type_id.slot_size()` bytes. Variable-length
    /// kinds write `[u32 len][bytes]` when `inlined`, otherwise allocate
    /// from `pool` and write the 8-byte reference.
    pub fn serialize_to(
        &self,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        self.strategy()?.serialize_to(self, storage, inlined, pool)
    }

    /// Read a value of `type_id` from a row slot.
    ///
    /// An inlined variable-length slot yields a view borrowing `storage`;
    /// a pooled one yields an owned copy.
    pub fn deserialize_from(
        storage: &'a [u8],
        type_id: TypeId,
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        tracing::trace!(%type_id, inlined, slot = storage.len(), "deserialize row slot");
        types::type_for(type_id)?.deserialize_from(storage, inlined, pool)
    }

    /// Append the self-describing stream form: tag byte, then payload.
    pub fn serialize_to_stream(&self, out: &mut dyn SerializeOutput) -> Result<(), ValueError> {
        self.strategy()?.serialize_to_stream(self, out)
    }

    pub fn deserialize_from_stream(
        input: &mut dyn SerializeInput,
        type_id: TypeId,
    ) -> Result<Value<'static>, ValueError> {
        types::type_for(type_id)?.deserialize_from_stream(input)
    }

    /// Copy a variable-length slot image from `src` to `dest` without
    /// touching the payload: the reference when pooled, the length-prefixed
    /// bytes when inlined.
    pub fn shallow_copy_to(
        dest: &mut [u8],
        src: &[u8],
        type_id: TypeId,
        inlined: bool,
    ) -> Result<(), ValueError> {
        types::type_for(type_id)?.shallow_copy(dest, src, inlined)
    }

    /// Raw payload bytes of a variable-length slot; `None` when NULL.
    pub fn data_from_storage(
        type_id: TypeId,
        storage: &'a [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<Option<Cow<'a, [u8]>>, ValueError> {
        types::type_for(type_id)?.data_from_storage(storage, inlined, pool)
    }

    /// Bytes `serialize_to` needs for this value.
    pub fn serialized_size(&self, inlined: bool) -> Result<usize, ValueError> {
        let type_id = self.type_id();
        if let Some(n) = type_id.fixed_size() {
            return Ok(n);
        }
        if !inlined {
            self.strategy()?;
            return Ok(type_id.slot_size());
        }
        match type_id {
            TypeId::Varchar | TypeId::Varbinary => Ok(limits::LENGTH_PREFIX_SIZE
                + self.varlen_bytes().map_or(0, <[u8]>::len)),
            TypeId::Array => {
                let mut encoded = Vec::new();
                self.serialize_to_stream(&mut encoded)?;
                Ok(limits::LENGTH_PREFIX_SIZE + encoded.len())
            }
            _ => Err(ValueError::incompatible_type(format!("{type_id} has no storage size"))),
        }
    }
}

/// ToString. `Invalid` renders as `invalid`.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match types::type_for(self.type_id()) {
            Ok(strategy) => f.write_str(&strategy.render(self)),
            Err(_) => f.write_str("invalid"),
        }
    }
}
