use relval_types::{TypeId, Value};

use super::error::CliError;

/// Parse a command-line literal.
///
/// `kind:text` builds a VARCHAR from `text` and casts it to `kind`;
/// `varbinary:` takes hex. `null:kind` and `null:array:kind` build NULLs,
/// `array:kind:a,b,c` builds an array of `kind` elements.
pub fn parse(literal: &str) -> Result<Value<'static>, CliError> {
    let (head, rest) = literal
        .split_once(':')
        .ok_or_else(|| CliError::Literal(format!("expected kind:text, got {literal:?}")))?;

    if head.eq_ignore_ascii_case("null") {
        return parse_null(rest);
    }

    let kind: TypeId = head.parse()?;
    if kind != TypeId::Array {
        return scalar(kind, rest);
    }

    let (element, items) = rest
        .split_once(':')
        .ok_or_else(|| CliError::Literal(format!("expected array:kind:items, got {literal:?}")))?;
    let element: TypeId = element.parse()?;
    let items = if items.is_empty() {
        Vec::new()
    } else {
        items
            .split(',')
            .map(|item| scalar(element, item))
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(Value::array(element, items)?)
}

fn parse_null(kind: &str) -> Result<Value<'static>, CliError> {
    match kind.split_once(':') {
        Some((array, element)) if array.eq_ignore_ascii_case("array") => {
            Ok(Value::null_array(element.parse()?)?)
        }
        _ => Ok(Value::null(kind.parse()?)?),
    }
}

fn scalar(kind: TypeId, text: &str) -> Result<Value<'static>, CliError> {
    match kind {
        TypeId::Varchar => Ok(Value::varchar(text)?),
        TypeId::Varbinary => {
            let bytes = hex::decode(text.trim_start_matches("\\x"))
                .map_err(|e| CliError::Literal(format!("invalid hex {text:?}: {e}")))?;
            Ok(Value::varbinary(&bytes)?)
        }
        TypeId::ParameterOffset => {
            let offset: i32 = text
                .parse()
                .map_err(|e| CliError::Literal(format!("invalid parameter offset {text:?}: {e}")))?;
            Ok(Value::new(TypeId::ParameterOffset, offset)?)
        }
        TypeId::Array | TypeId::Invalid => {
            Err(CliError::Literal(format!("{kind} cannot be written as a scalar literal")))
        }
        _ => Ok(Value::varchar(text)?.cast_as(kind)?),
    }
}
