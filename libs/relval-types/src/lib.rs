pub mod types;
pub mod value;

pub use relval_api::{ErrorKind, TypeId, ValueError};
pub use types::{ValueType, type_for};
pub use value::{NativeScalar, Value};
