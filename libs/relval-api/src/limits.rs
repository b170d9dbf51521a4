//! In-band null sentinels and value ranges.
//!
//! Null is never an out-of-band flag: every fixed-width kind reserves one
//! value of its native slot, and the length field reserves `u32::MAX`.
//! Row storage written by other components depends on these exact values.

use crate::error::ValueError;

/// Length-field value meaning "this value is NULL", for every kind.
pub const VALUE_NULL: u32 = u32::MAX;

pub const BOOLEAN_NULL: i8 = i8::MIN;
pub const INT8_NULL: i8 = i8::MIN;
pub const INT16_NULL: i16 = i16::MIN;
pub const INT32_NULL: i32 = i32::MIN;
pub const INT64_NULL: i64 = i64::MIN;
/// Lowest finite double.
pub const DECIMAL_NULL: f64 = f64::MIN;
pub const TIMESTAMP_NULL: u64 = u64::MAX;

// Non-null ranges: the sentinel is carved off the bottom (top for timestamps).
pub const INT8_MIN: i8 = i8::MIN + 1;
pub const INT8_MAX: i8 = i8::MAX;
pub const INT16_MIN: i16 = i16::MIN + 1;
pub const INT16_MAX: i16 = i16::MAX;
pub const INT32_MIN: i32 = i32::MIN + 1;
pub const INT32_MAX: i32 = i32::MAX;
pub const INT64_MIN: i64 = i64::MIN + 1;
pub const INT64_MAX: i64 = i64::MAX;
pub const TIMESTAMP_MAX: u64 = u64::MAX - 1;

/// Variable-length payloads must be strictly shorter than this.
pub const VARLEN_MAX_LEN: u32 = u32::MAX;

/// Size of a pooled varlen reference inside a row slot.
pub const REFERENCE_SIZE: usize = 8;

/// Size of the length prefix of an inlined varlen slot.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Validate a requested variable-length payload size.
///
/// Returns the length as it is stored in the length field.
pub fn check_varlen_len(len: usize) -> Result<u32, ValueError> {
    match u32::try_from(len) {
        Ok(l) if l < VARLEN_MAX_LEN => Ok(l),
        _ => Err(ValueError::size_limit(format!(
            "variable-length payload of {len} bytes (max {})",
            VARLEN_MAX_LEN - 1
        ))),
    }
}
