use std::fmt;

/// Error kind for value operations.
///
/// The kind is what callers branch on; the message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong tag for a constructor, unsupported operation for a kind,
    /// or operands that fail the comparability rule.
    IncompatibleType,
    /// Variable-length payload at or above `VARLEN_MAX_LEN`.
    SizeLimitExceeded,
    /// No conversion defined, or unparsable text.
    CastError,
    /// Encoded bytes disagree with the declared type.
    SerializationError,
    /// Result or cast target cannot hold the value.
    OutOfRange,
    DivideByZero,
    /// The pooled allocator refused the request.
    Pool,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::IncompatibleType => f.write_str("incompatible type"),
            ErrorKind::SizeLimitExceeded => f.write_str("size limit exceeded"),
            ErrorKind::CastError => f.write_str("cast error"),
            ErrorKind::SerializationError => f.write_str("serialization error"),
            ErrorKind::OutOfRange => f.write_str("out of range"),
            ErrorKind::DivideByZero => f.write_str("divide by zero"),
            ErrorKind::Pool => f.write_str("pool"),
        }
    }
}

/// Error returned by every fallible value operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    kind: ErrorKind,
    message: String,
}

impl ValueError {
    pub fn incompatible_type(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::IncompatibleType, message: msg.into() }
    }

    pub fn size_limit(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::SizeLimitExceeded, message: msg.into() }
    }

    pub fn cast(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::CastError, message: msg.into() }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::SerializationError, message: msg.into() }
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::OutOfRange, message: msg.into() }
    }

    pub fn divide_by_zero(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::DivideByZero, message: msg.into() }
    }

    pub fn pool(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Pool, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, keeping its ErrorKind.
    ///
    /// Produces: `"context: message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ValueError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → ValueError with correct ErrorKind
// ---------------------------------------------------------------------------

/// Plugin config that fails to parse.
impl From<serde_json::Error> for ValueError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization(format!("config: {e}"))
    }
}
