use relval_api::ValueError;
use relval_types::Value;

use super::{config::Effective, error::CliError, literal};

/// Where an encoded value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// Tagged stream form, one length-prefixed frame per value
    Stream,
    /// Row slot with variable-length payloads stored in place
    Inlined,
    /// Row slot with variable-length payloads in the pool
    Pooled,
}

/// One line per literal: the encoded bytes as hex, then the value decoded
/// back from them.
pub fn run(eff: &Effective, layout: Layout, literals: &[String]) -> Result<Vec<String>, CliError> {
    literals
        .iter()
        .map(|text| -> Result<String, CliError> {
            let value = literal::parse(text)?;
            let (bytes, decoded) = match layout {
                Layout::Stream => stream(eff, &value)?,
                Layout::Inlined => row(eff, &value, true)?,
                Layout::Pooled => row(eff, &value, false)?,
            };
            Ok(format!("{}  {}", hex::encode(bytes), decoded.info()))
        })
        .collect()
}

fn stream(eff: &Effective, value: &Value<'_>) -> Result<(Vec<u8>, Value<'static>), ValueError> {
    let mut out = eff.codec.output();
    value.serialize_to_stream(&mut out)?;
    let mut frame = Vec::new();
    eff.codec.frame(&out, &mut frame)?;

    let Some((mut input, _)) = eff.codec.next_frame(&frame)? else {
        return Err(ValueError::serialization("frame did not decode"));
    };
    let decoded = Value::deserialize_from_stream(&mut input, value.type_id())?;
    Ok((frame, decoded))
}

fn row(
    eff: &Effective,
    value: &Value<'_>,
    inlined: bool,
) -> Result<(Vec<u8>, Value<'static>), ValueError> {
    let pool = Some(eff.pool.as_ref());
    let mut slot = vec![0u8; value.serialized_size(inlined)?];
    value.serialize_to(&mut slot, inlined, pool)?;
    let decoded = Value::deserialize_from(&slot, value.type_id(), inlined, pool)?.into_owned();
    tracing::debug!(kind = %value.type_id(), inlined, slot = slot.len(), "row slot written");
    Ok((slot, decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::config::Config;

    fn defaults() -> Effective {
        Effective::from_config(&Config::default()).unwrap()
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stream_frames_are_tagged() {
        let eff = defaults();
        let lines = run(&eff, Layout::Stream, &args(&["integer:1"])).unwrap();
        // 4-byte big-endian length, INTEGER tag, then the payload
        assert_eq!(lines, vec!["000000050500000001  Value::INTEGER[1]".to_string()]);
    }

    #[test]
    fn inlined_slot_round_trips() {
        let eff = defaults();
        let lines = run(&eff, Layout::Inlined, &args(&["varchar:hi", "smallint:-1"])).unwrap();
        assert_eq!(lines[0], "020000006869  Value::VARCHAR[hi]");
        assert_eq!(lines[1], "ffff  Value::SMALLINT[-1]");
        assert_eq!(eff.pool.allocated_bytes(), 0);
    }

    #[test]
    fn pooled_slot_uses_the_pool() {
        let eff = defaults();
        let lines = run(&eff, Layout::Pooled, &args(&["varbinary:0102", "null:varchar"])).unwrap();
        assert!(lines[0].ends_with("Value::VARBINARY[\\x0102]"));
        assert!(lines[1].ends_with("Value::VARCHAR[varlen_null]"));
        assert_eq!(eff.pool.allocated_bytes(), 2);
    }

    #[test]
    fn bad_literal_stops_the_batch() {
        let eff = defaults();
        assert!(run(&eff, Layout::Stream, &args(&["integer:1", "oops"])).is_err());
    }
}
