use std::sync::Arc;

use crate::error::ValueError;
use crate::limits::REFERENCE_SIZE;

/// Handle to a payload held by a `VarlenPool`.
///
/// This is what a non-inlined varlen slot in row storage contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarlenRef(u64);

impl VarlenRef {
    /// Reference stored in a slot whose value is NULL. Never handed out by a pool.
    pub const NULL: VarlenRef = VarlenRef(u64::MAX);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub fn to_bytes(self) -> [u8; REFERENCE_SIZE] {
        self.0.to_le_bytes()
    }

    /// Read a reference from the head of a row slot.
    pub fn from_slot(slot: &[u8]) -> Result<Self, ValueError> {
        let bytes: [u8; REFERENCE_SIZE] = slot
            .get(..REFERENCE_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                ValueError::serialization(format!(
                    "slot of {} bytes cannot hold a varlen reference",
                    slot.len()
                ))
            })?;
        Ok(Self(u64::from_le_bytes(bytes)))
    }
}

/// Pooled allocator for variable-length payloads referenced from row storage.
///
/// The value layer only allocates, fetches and frees. Eviction and arena
/// policy belong to the implementation, which must be safe to share.
pub trait VarlenPool: Send + Sync {
    /// Copy `data` into the pool and return a reference for later retrieval.
    fn allocate(&self, data: &[u8]) -> Result<VarlenRef, ValueError>;

    /// Retrieve the bytes behind a reference.
    fn fetch(&self, reference: VarlenRef) -> Result<Arc<[u8]>, ValueError>;

    /// Release a reference. Fetching it afterwards fails.
    fn free(&self, reference: VarlenRef) -> Result<(), ValueError>;

    /// Bytes currently held.
    fn allocated_bytes(&self) -> usize;
}

/// Pool plugin factory.
///
/// The caller doesn't enumerate or know concrete implementations;
/// a pool is built from its JSON config (`"{}"` means defaults).
pub trait PoolFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn VarlenPool>, ValueError>;
}
