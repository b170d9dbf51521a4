//! Arithmetic, comparison and casts over the numeric set
//! (TINYINT, SMALLINT, INTEGER, BIGINT, DECIMAL).
//!
//! Mixed operands promote to the wider integer kind, or to DECIMAL when
//! either side is DECIMAL. Results that do not fit the promoted kind,
//! including results that would land on its NULL sentinel, are `OutOfRange`.

use std::cmp::Ordering;
use std::fmt;

use relval_api::limits::{
    DECIMAL_NULL, INT8_MAX, INT8_MIN, INT16_MAX, INT16_MIN, INT32_MAX, INT32_MIN, INT64_MAX,
    INT64_MIN,
};
use relval_api::{TypeId, ValueError};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "add",
            ArithOp::Subtract => "subtract",
            ArithOp::Multiply => "multiply",
            ArithOp::Divide => "divide",
            ArithOp::Modulo => "modulo",
        })
    }
}

fn check_numeric(left: &Value<'_>, right: &Value<'_>, op: &str) -> Result<(), ValueError> {
    if left.type_id().is_numeric() && left.check_comparable(right) {
        Ok(())
    } else {
        Err(ValueError::incompatible_type(format!(
            "cannot {op} {} and {}",
            left.type_id(),
            right.type_id()
        )))
    }
}

/// Result kind of a binary numeric operation.
pub(super) fn promote(left: TypeId, right: TypeId) -> TypeId {
    // Numeric tags are declared narrowest first, DECIMAL last.
    left.max(right)
}

/// Checked narrowing of an integer result into `type_id`.
pub(crate) fn integer_value(type_id: TypeId, v: i64) -> Result<Value<'static>, ValueError> {
    let (min, max) = match type_id {
        TypeId::TinyInt => (i64::from(INT8_MIN), i64::from(INT8_MAX)),
        TypeId::SmallInt => (i64::from(INT16_MIN), i64::from(INT16_MAX)),
        TypeId::Integer | TypeId::ParameterOffset => (i64::from(INT32_MIN), i64::from(INT32_MAX)),
        TypeId::BigInt => (INT64_MIN, INT64_MAX),
        _ => {
            return Err(ValueError::incompatible_type(format!(
                "{type_id} is not an integer kind"
            )));
        }
    };
    if v < min || v > max {
        return Err(ValueError::out_of_range(format!(
            "{v} is out of range for {type_id}"
        )));
    }
    Ok(match type_id {
        TypeId::TinyInt => Value::tinyint(v as i8),
        TypeId::SmallInt => Value::smallint(v as i16),
        TypeId::Integer => Value::integer(v as i32),
        TypeId::ParameterOffset => Value::parameter_offset(v as i32),
        _ => Value::bigint(v),
    })
}

/// Finite, non-sentinel DECIMAL.
pub(crate) fn decimal_value(v: f64) -> Result<Value<'static>, ValueError> {
    if !v.is_finite() || v == DECIMAL_NULL {
        return Err(ValueError::out_of_range(format!("{v} is out of range for DECIMAL")));
    }
    Ok(Value::decimal(v))
}

pub(super) fn arithmetic(
    op: ArithOp,
    left: &Value<'_>,
    right: &Value<'_>,
) -> Result<Value<'static>, ValueError> {
    check_numeric(left, right, &op.to_string())?;
    if left.is_null() || right.is_null() {
        return operate_null(left, right);
    }
    let result_type = promote(left.type_id(), right.type_id());
    if result_type == TypeId::Decimal {
        let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
            return Err(ValueError::incompatible_type(format!("cannot {op} {left} and {right}")));
        };
        return decimal_arithmetic(op, a, b);
    }
    let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) else {
        return Err(ValueError::incompatible_type(format!("cannot {op} {left} and {right}")));
    };
    integer_arithmetic(op, a, b, result_type)
}

fn integer_arithmetic(
    op: ArithOp,
    a: i64,
    b: i64,
    result_type: TypeId,
) -> Result<Value<'static>, ValueError> {
    if b == 0 && matches!(op, ArithOp::Divide | ArithOp::Modulo) {
        return Err(ValueError::divide_by_zero(format!("{a} {op} 0")));
    }
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Subtract => a.checked_sub(b),
        ArithOp::Multiply => a.checked_mul(b),
        ArithOp::Divide => a.checked_div(b),
        ArithOp::Modulo => a.checked_rem(b),
    };
    match result {
        Some(v) => integer_value(result_type, v),
        None => Err(ValueError::out_of_range(format!(
            "{result_type} overflow: {a} {op} {b}"
        ))),
    }
}

fn decimal_arithmetic(op: ArithOp, a: f64, b: f64) -> Result<Value<'static>, ValueError> {
    if b == 0.0 && matches!(op, ArithOp::Divide | ArithOp::Modulo) {
        return Err(ValueError::divide_by_zero(format!("{a} {op} 0")));
    }
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Subtract => a - b,
        ArithOp::Multiply => a * b,
        ArithOp::Divide => a / b,
        ArithOp::Modulo => a % b,
    };
    decimal_value(result)
}

pub(super) fn compare(
    left: &Value<'_>,
    right: &Value<'_>,
) -> Result<Option<Ordering>, ValueError> {
    check_numeric(left, right, "compare")?;
    if left.is_null() || right.is_null() {
        return Ok(None);
    }
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return Ok(Some(a.cmp(&b)));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Some(a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b)))),
        _ => Err(ValueError::incompatible_type(format!(
            "cannot compare {} and {}",
            left.type_id(),
            right.type_id()
        ))),
    }
}

pub(super) fn min(left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
    check_numeric(left, right, "min")?;
    if left.is_null() || right.is_null() {
        return operate_null(left, right);
    }
    match compare(left, right)? {
        Some(Ordering::Greater) => right.copy(),
        _ => left.copy(),
    }
}

pub(super) fn max(left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
    check_numeric(left, right, "max")?;
    if left.is_null() || right.is_null() {
        return operate_null(left, right);
    }
    match compare(left, right)? {
        Some(Ordering::Less) => right.copy(),
        _ => left.copy(),
    }
}

pub(super) fn sqrt(v: &Value<'_>) -> Result<Value<'static>, ValueError> {
    if !v.type_id().is_numeric() {
        return Err(ValueError::incompatible_type(format!("cannot sqrt {}", v.type_id())));
    }
    if v.is_null() {
        return Value::null(TypeId::Decimal);
    }
    let Some(x) = v.as_f64() else {
        return Err(ValueError::incompatible_type(format!("cannot sqrt {}", v.type_id())));
    };
    if x < 0.0 {
        return Err(ValueError::out_of_range(format!("square root of negative value {x}")));
    }
    decimal_value(x.sqrt())
}

/// NULL of the promoted kind.
pub(super) fn operate_null(
    left: &Value<'_>,
    right: &Value<'_>,
) -> Result<Value<'static>, ValueError> {
    check_numeric(left, right, "combine")?;
    Value::null(promote(left.type_id(), right.type_id()))
}

pub(super) fn is_zero(v: &Value<'_>) -> Result<bool, ValueError> {
    if !v.type_id().is_numeric() {
        return Err(ValueError::incompatible_type(format!(
            "cannot test {} for zero",
            v.type_id()
        )));
    }
    Ok(v.as_f64() == Some(0.0))
}

pub(super) fn cast(v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
    let source = v.type_id();
    if source == target {
        return v.copy();
    }
    match target {
        TypeId::TinyInt | TypeId::SmallInt | TypeId::Integer | TypeId::BigInt => {
            if v.is_null() {
                return Value::null(target);
            }
            if let Some(i) = v.as_i64() {
                return integer_value(target, i);
            }
            let Some(d) = v.as_f64() else {
                return Err(cast_error(source, target));
            };
            let truncated = d.trunc();
            // Bounds of i64 as doubles; the narrower check follows.
            if !(truncated > i64::MIN as f64 && truncated < i64::MAX as f64) {
                return Err(ValueError::out_of_range(format!(
                    "{d} is out of range for {target}"
                )));
            }
            integer_value(target, truncated as i64)
        }
        TypeId::Decimal => {
            if v.is_null() {
                return Value::null(TypeId::Decimal);
            }
            match v.as_f64() {
                Some(d) => decimal_value(d),
                None => Err(cast_error(source, target)),
            }
        }
        TypeId::Varchar if source.is_numeric() => {
            if v.is_null() {
                return Value::null(TypeId::Varchar);
            }
            Value::varchar(&v.to_string())
        }
        _ => Err(cast_error(source, target)),
    }
}

pub(super) fn cast_error(source: TypeId, target: TypeId) -> ValueError {
    ValueError::cast(format!("cannot cast {source} to {target}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relval_api::ErrorKind;

    #[test]
    fn promotion() {
        assert_eq!(promote(TypeId::TinyInt, TypeId::BigInt), TypeId::BigInt);
        assert_eq!(promote(TypeId::Integer, TypeId::SmallInt), TypeId::Integer);
        assert_eq!(promote(TypeId::TinyInt, TypeId::Decimal), TypeId::Decimal);
    }

    #[test]
    fn narrowing_refuses_sentinel() {
        assert!(integer_value(TypeId::TinyInt, -127).is_ok());
        let err = integer_value(TypeId::TinyInt, -128).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = integer_value(TypeId::SmallInt, 40_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn integer_overflow() {
        let err = arithmetic(ArithOp::Add, &Value::tinyint(100), &Value::tinyint(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        let err = arithmetic(ArithOp::Multiply, &Value::bigint(i64::MAX), &Value::bigint(2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn division_by_zero() {
        let err = arithmetic(ArithOp::Divide, &Value::integer(1), &Value::integer(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivideByZero);
        let err = arithmetic(ArithOp::Modulo, &Value::decimal(1.0), &Value::tinyint(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DivideByZero);
    }

    #[test]
    fn mixed_operands_promote() {
        let v = arithmetic(ArithOp::Add, &Value::tinyint(1), &Value::integer(2)).unwrap();
        assert_eq!(v, Value::integer(3));
        let v = arithmetic(ArithOp::Multiply, &Value::smallint(3), &Value::decimal(0.5)).unwrap();
        assert_eq!(v, Value::decimal(1.5));
    }

    #[test]
    fn decimal_to_integer_truncates() {
        assert_eq!(cast(&Value::decimal(-2.9), TypeId::Integer).unwrap(), Value::integer(-2));
        let err = cast(&Value::decimal(1e20), TypeId::BigInt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        let err = cast(&Value::decimal(300.0), TypeId::TinyInt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn sqrt_of_negative() {
        assert_eq!(sqrt(&Value::integer(9)).unwrap(), Value::decimal(3.0));
        let err = sqrt(&Value::decimal(-1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }
}
