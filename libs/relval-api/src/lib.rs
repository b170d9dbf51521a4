pub mod error;
pub mod limits;
pub mod pool;
pub mod serialize;
pub mod type_id;

pub use error::{ErrorKind, ValueError};
pub use pool::{PoolFactory, VarlenPool, VarlenRef};
pub use serialize::{ByteOrder, ByteReader, SerializeInput, SerializeOutput};
pub use type_id::TypeId;
