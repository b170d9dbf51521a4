use std::cmp::Ordering;

use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool};

use super::numeric::{self, ArithOp};
use super::{ValueType, expect_kind, fixed};
use crate::value::Value;

/// DECIMAL, an IEEE double. `f64::MIN` is NULL.
#[derive(Debug)]
pub struct DecimalType;

impl ValueType for DecimalType {
    fn type_id(&self) -> TypeId {
        TypeId::Decimal
    }

    fn compare(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Option<Ordering>, ValueError> {
        numeric::compare(left, right)
    }

    fn add(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::arithmetic(ArithOp::Add, left, right)
    }

    fn subtract(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::arithmetic(ArithOp::Subtract, left, right)
    }

    fn multiply(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::arithmetic(ArithOp::Multiply, left, right)
    }

    fn divide(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::arithmetic(ArithOp::Divide, left, right)
    }

    fn modulo(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::arithmetic(ArithOp::Modulo, left, right)
    }

    fn min(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::min(left, right)
    }

    fn max(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::max(left, right)
    }

    fn sqrt(&self, v: &Value<'_>) -> Result<Value<'static>, ValueError> {
        numeric::sqrt(v)
    }

    fn operate_null(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        numeric::operate_null(left, right)
    }

    fn is_zero(&self, v: &Value<'_>) -> Result<bool, ValueError> {
        numeric::is_zero(v)
    }

    fn is_inlined(&self, _v: &Value<'_>) -> bool {
        true
    }

    fn render(&self, v: &Value<'_>) -> String {
        match v.as_f64() {
            Some(d) => d.to_string(),
            None => "decimal_null".to_string(),
        }
    }

    fn hash(&self, v: &Value<'_>) -> u64 {
        fixed::hash(v)
    }

    fn serialize_to(
        &self,
        v: &Value<'_>,
        storage: &mut [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        expect_kind(TypeId::Decimal, v)?;
        fixed::write(v, storage)
    }

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        fixed::read(TypeId::Decimal, storage)
    }

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError> {
        expect_kind(TypeId::Decimal, v)?;
        fixed::write_stream(v, out)
    }

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError> {
        fixed::read_stream(TypeId::Decimal, input)
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
        numeric::cast(v, target)
    }
}
