use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::limits::REFERENCE_SIZE;

/// Type tag of a value. Closed set.
///
/// `Invalid` marks only the default/empty value and has no strategy.
/// The discriminants are the on-wire tag bytes of the stream form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TypeId {
    #[default]
    Invalid = 0,
    ParameterOffset = 1,
    Boolean = 2,
    TinyInt = 3,
    SmallInt = 4,
    Integer = 5,
    BigInt = 6,
    Decimal = 7,
    Timestamp = 8,
    Varchar = 9,
    Varbinary = 10,
    Array = 11,
}

impl TypeId {
    /// Every tag, `Invalid` included.
    pub const ALL: [TypeId; 12] = [
        TypeId::Invalid,
        TypeId::ParameterOffset,
        TypeId::Boolean,
        TypeId::TinyInt,
        TypeId::SmallInt,
        TypeId::Integer,
        TypeId::BigInt,
        TypeId::Decimal,
        TypeId::Timestamp,
        TypeId::Varchar,
        TypeId::Varbinary,
        TypeId::Array,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case SQL-ish name, as used in `Value::info()`.
    pub fn name(self) -> &'static str {
        match self {
            TypeId::Invalid => "INVALID",
            TypeId::ParameterOffset => "PARAMETER_OFFSET",
            TypeId::Boolean => "BOOLEAN",
            TypeId::TinyInt => "TINYINT",
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::Decimal => "DECIMAL",
            TypeId::Timestamp => "TIMESTAMP",
            TypeId::Varchar => "VARCHAR",
            TypeId::Varbinary => "VARBINARY",
            TypeId::Array => "ARRAY",
        }
    }

    /// Integer kinds: usable as array indexes and parameter positions.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeId::TinyInt
                | TypeId::SmallInt
                | TypeId::Integer
                | TypeId::BigInt
                | TypeId::ParameterOffset
        )
    }

    /// Members of the mutually comparable numeric set.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeId::TinyInt | TypeId::SmallInt | TypeId::Integer | TypeId::BigInt | TypeId::Decimal
        )
    }

    pub fn is_varlen(self) -> bool {
        matches!(self, TypeId::Varchar | TypeId::Varbinary)
    }

    /// Kinds that may appear as array elements.
    pub fn is_scalar(self) -> bool {
        !matches!(self, TypeId::Invalid | TypeId::ParameterOffset | TypeId::Array)
    }

    /// Slot width of a fixed-width kind in row storage.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            TypeId::Boolean | TypeId::TinyInt => Some(1),
            TypeId::SmallInt => Some(2),
            TypeId::Integer | TypeId::ParameterOffset => Some(4),
            TypeId::BigInt | TypeId::Decimal | TypeId::Timestamp => Some(8),
            TypeId::Invalid | TypeId::Varchar | TypeId::Varbinary | TypeId::Array => None,
        }
    }

    /// Slot width in row storage when the payload lives in a pool.
    pub fn slot_size(self) -> usize {
        self.fixed_size().unwrap_or(REFERENCE_SIZE)
    }

    /// Comparability rule. Symmetric by construction.
    pub fn comparable_with(self, other: TypeId) -> bool {
        match self {
            TypeId::Boolean
            | TypeId::Varchar
            | TypeId::Varbinary
            | TypeId::Timestamp => self == other,
            t if t.is_numeric() => other.is_numeric(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for TypeId {
    type Error = ValueError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        TypeId::ALL
            .get(tag as usize)
            .copied()
            .ok_or_else(|| ValueError::serialization(format!("unknown type tag {tag}")))
    }
}

impl FromStr for TypeId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parameter_offset" => Ok(TypeId::ParameterOffset),
            "boolean" | "bool" => Ok(TypeId::Boolean),
            "tinyint" => Ok(TypeId::TinyInt),
            "smallint" => Ok(TypeId::SmallInt),
            "integer" | "int" => Ok(TypeId::Integer),
            "bigint" => Ok(TypeId::BigInt),
            "decimal" => Ok(TypeId::Decimal),
            "timestamp" => Ok(TypeId::Timestamp),
            "varchar" => Ok(TypeId::Varchar),
            "varbinary" => Ok(TypeId::Varbinary),
            "array" => Ok(TypeId::Array),
            other => Err(ValueError::incompatible_type(format!("unknown type name {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparability_is_symmetric() {
        for a in TypeId::ALL {
            for b in TypeId::ALL {
                assert_eq!(
                    a.comparable_with(b),
                    b.comparable_with(a),
                    "{a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn comparability_rule() {
        assert!(TypeId::Boolean.comparable_with(TypeId::Boolean));
        assert!(!TypeId::Boolean.comparable_with(TypeId::TinyInt));
        assert!(TypeId::TinyInt.comparable_with(TypeId::Decimal));
        assert!(TypeId::BigInt.comparable_with(TypeId::SmallInt));
        assert!(!TypeId::Integer.comparable_with(TypeId::Varchar));
        assert!(!TypeId::Integer.comparable_with(TypeId::Timestamp));
        assert!(TypeId::Timestamp.comparable_with(TypeId::Timestamp));
        assert!(!TypeId::Varchar.comparable_with(TypeId::Varbinary));
        assert!(!TypeId::Array.comparable_with(TypeId::Array));
        assert!(!TypeId::ParameterOffset.comparable_with(TypeId::Integer));
        assert!(!TypeId::Invalid.comparable_with(TypeId::Invalid));
    }

    #[test]
    fn integer_kinds() {
        let ints: Vec<_> = TypeId::ALL.into_iter().filter(|t| t.is_integer()).collect();
        assert_eq!(
            ints,
            vec![
                TypeId::ParameterOffset,
                TypeId::TinyInt,
                TypeId::SmallInt,
                TypeId::Integer,
                TypeId::BigInt
            ]
        );
    }

    #[test]
    fn tag_bytes_round_trip() {
        for t in TypeId::ALL {
            assert_eq!(TypeId::try_from(t.as_u8()).unwrap(), t);
        }
        assert!(TypeId::try_from(12).is_err());
    }

    #[test]
    fn parse_names() {
        assert_eq!("INTEGER".parse::<TypeId>().unwrap(), TypeId::Integer);
        assert_eq!("varbinary".parse::<TypeId>().unwrap(), TypeId::Varbinary);
        assert!("date".parse::<TypeId>().is_err());
    }

    #[test]
    fn slot_sizes() {
        assert_eq!(TypeId::Boolean.slot_size(), 1);
        assert_eq!(TypeId::SmallInt.slot_size(), 2);
        assert_eq!(TypeId::ParameterOffset.slot_size(), 4);
        assert_eq!(TypeId::Timestamp.slot_size(), 8);
        assert_eq!(TypeId::Varchar.slot_size(), REFERENCE_SIZE);
    }
}
