use std::cmp::Ordering;

use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool};

use super::numeric::cast_error;
use super::{ValueType, check_comparable, expect_kind, fixed};
use crate::value::Value;

/// BOOLEAN: one signed byte, 1 for true, 0 for false.
#[derive(Debug)]
pub struct BooleanType;

impl ValueType for BooleanType {
    fn type_id(&self) -> TypeId {
        TypeId::Boolean
    }

    fn compare(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Option<Ordering>, ValueError> {
        check_comparable(left, right, "compare")?;
        Ok(match (left.as_bool(), right.as_bool()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        })
    }

    fn is_inlined(&self, _v: &Value<'_>) -> bool {
        true
    }

    fn render(&self, v: &Value<'_>) -> String {
        match v.as_bool() {
            Some(true) => "true".to_string(),
            Some(false) => "false".to_string(),
            None => "boolean_null".to_string(),
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
        expect_kind(TypeId::Boolean, v)?;
        fixed::write(v, storage)
    }

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        fixed::read(TypeId::Boolean, storage)
    }

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError> {
        expect_kind(TypeId::Boolean, v)?;
        fixed::write_stream(v, out)
    }

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError> {
        fixed::read_stream(TypeId::Boolean, input)
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
        match target {
            TypeId::Boolean => Ok(self.copy(v)),
            TypeId::Varchar if v.is_null() => Value::null(TypeId::Varchar),
            TypeId::Varchar => Value::varchar(&self.render(v)),
            _ => Err(cast_error(TypeId::Boolean, target)),
        }
    }
}
