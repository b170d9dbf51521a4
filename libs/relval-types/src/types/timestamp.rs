use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime};
use relval_api::limits::TIMESTAMP_MAX;
use relval_api::{SerializeInput, SerializeOutput, TypeId, ValueError, VarlenPool};

use super::numeric::cast_error;
use super::{ValueType, check_comparable, expect_kind, fixed};
use crate::value::Value;

const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
/// Only UTC is rendered or accepted.
const UTC_SUFFIX: &str = "+00";

/// TIMESTAMP: microseconds since the Unix epoch, UTC. `u64::MAX` is NULL.
#[derive(Debug)]
pub struct TimestampType;

/// `YYYY-MM-DD HH:MM:SS.ffffff+00`. Instants beyond what the calendar
/// can represent render as the raw microsecond count.
pub(crate) fn render_micros(micros: u64) -> String {
    let secs = i64::try_from(micros / 1_000_000).ok();
    let nanos = (micros % 1_000_000) as u32 * 1_000;
    secs.and_then(|s| DateTime::from_timestamp(s, nanos))
        .map(|dt| format!("{}{UTC_SUFFIX}", dt.format(FORMAT)))
        .unwrap_or_else(|| micros.to_string())
}

/// Parse the rendered form. The `+00` suffix and the fraction are optional;
/// a bare microsecond count is accepted too.
pub(crate) fn parse(text: &str) -> Result<Value<'static>, ValueError> {
    let body = text.trim();
    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        return match body.parse::<u64>() {
            Ok(m) if m <= TIMESTAMP_MAX => Ok(Value::timestamp(m)),
            _ => Err(ValueError::out_of_range(format!(
                "timestamp {text:?} is past the last instant"
            ))),
        };
    }
    let body = body.strip_suffix(UTC_SUFFIX).unwrap_or(body);
    let parsed = NaiveDateTime::parse_from_str(body, PARSE_FORMAT)
        .map_err(|e| ValueError::cast(format!("invalid timestamp {text:?}: {e}")))?;
    let micros = parsed.and_utc().timestamp_micros();
    match u64::try_from(micros) {
        Ok(m) if m <= TIMESTAMP_MAX => Ok(Value::timestamp(m)),
        _ => Err(ValueError::out_of_range(format!(
            "timestamp {text:?} is before the epoch"
        ))),
    }
}

impl ValueType for TimestampType {
    fn type_id(&self) -> TypeId {
        TypeId::Timestamp
    }

    fn compare(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Option<Ordering>, ValueError> {
        check_comparable(left, right, "compare")?;
        Ok(match (left.as_timestamp(), right.as_timestamp()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        })
    }

    fn is_inlined(&self, _v: &Value<'_>) -> bool {
        true
    }

    fn render(&self, v: &Value<'_>) -> String {
        match v.as_timestamp() {
            Some(micros) => render_micros(micros),
            None => "timestamp_null".to_string(),
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
        expect_kind(TypeId::Timestamp, v)?;
        fixed::write(v, storage)
    }

    fn deserialize_from<'a>(
        &self,
        storage: &'a [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<Value<'a>, ValueError> {
        fixed::read(TypeId::Timestamp, storage)
    }

    fn serialize_to_stream(
        &self,
        v: &Value<'_>,
        out: &mut dyn SerializeOutput,
    ) -> Result<(), ValueError> {
        expect_kind(TypeId::Timestamp, v)?;
        fixed::write_stream(v, out)
    }

    fn deserialize_from_stream(
        &self,
        input: &mut dyn SerializeInput,
    ) -> Result<Value<'static>, ValueError> {
        fixed::read_stream(TypeId::Timestamp, input)
    }

    fn cast_as(&self, v: &Value<'_>, target: TypeId) -> Result<Value<'static>, ValueError> {
        match target {
            TypeId::Timestamp => Ok(self.copy(v)),
            TypeId::Varchar if v.is_null() => Value::null(TypeId::Varchar),
            TypeId::Varchar => Value::varchar(&self.render(v)),
            _ => Err(cast_error(TypeId::Timestamp, target)),
        }
    }
}
