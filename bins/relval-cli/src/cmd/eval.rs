use relval_api::ValueError;
use relval_types::Value;

use super::{error::CliError, literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    /// `lhs` is the probe, `rhs` the array
    In,
}

pub fn apply(lhs: &Value<'_>, op: Op, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
    match op {
        Op::Eq => lhs.compare_equals(rhs),
        Op::Ne => lhs.compare_not_equals(rhs),
        Op::Lt => lhs.compare_less_than(rhs),
        Op::Le => lhs.compare_less_than_equals(rhs),
        Op::Gt => lhs.compare_greater_than(rhs),
        Op::Ge => lhs.compare_greater_than_equals(rhs),
        Op::Add => lhs.add(rhs),
        Op::Sub => lhs.subtract(rhs),
        Op::Mul => lhs.multiply(rhs),
        Op::Div => lhs.divide(rhs),
        Op::Mod => lhs.modulo(rhs),
        Op::Min => lhs.min(rhs),
        Op::Max => lhs.max(rhs),
        Op::In => rhs.in_list(lhs),
    }
}

pub fn run(lhs: &str, op: Op, rhs: &str) -> Result<String, CliError> {
    let lhs = literal::parse(lhs)?;
    let rhs = literal::parse(rhs)?;
    let result = apply(&lhs, op, &rhs)?;
    tracing::debug!(lhs = %lhs.info(), ?op, rhs = %rhs.info(), result = %result.info(), "evaluated");
    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relval_api::ErrorKind;

    fn kind_of(r: Result<String, CliError>) -> ErrorKind {
        match r {
            Err(CliError::Value(e)) => e.kind(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arithmetic_promotes() {
        assert_eq!(run("integer:2", Op::Add, "bigint:40").unwrap(), "42");
        assert_eq!(run("smallint:7", Op::Mod, "tinyint:4").unwrap(), "3");
        assert_eq!(run("integer:3", Op::Mul, "decimal:0.5").unwrap(), "1.5");
        assert_eq!(run("bigint:9", Op::Min, "integer:4").unwrap(), "4");
    }

    #[test]
    fn comparisons() {
        assert_eq!(run("integer:1", Op::Lt, "decimal:1.5").unwrap(), "true");
        assert_eq!(run("varchar:abc", Op::Ge, "varchar:abd").unwrap(), "false");
        assert_eq!(run("null:integer", Op::Eq, "integer:1").unwrap(), "boolean_null");
    }

    #[test]
    fn membership() {
        assert_eq!(run("integer:2", Op::In, "array:integer:1,2,3").unwrap(), "true");
        assert_eq!(run("integer:5", Op::In, "array:integer:1,2,3").unwrap(), "false");
        assert_eq!(run("integer:5", Op::In, "null:array:integer").unwrap(), "boolean_null");
    }

    #[test]
    fn errors_surface_with_their_kind() {
        assert_eq!(kind_of(run("integer:1", Op::Div, "integer:0")), ErrorKind::DivideByZero);
        assert_eq!(kind_of(run("integer:1", Op::Eq, "varchar:1")), ErrorKind::IncompatibleType);
        assert_eq!(kind_of(run("tinyint:100", Op::Add, "tinyint:100")), ErrorKind::OutOfRange);
    }
}
