use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use relval_api::{PoolFactory, ValueError, VarlenPool, VarlenRef};

// ═══════════════════════════════════════════════════════════════
//  MemoryPoolConfig
// ═══════════════════════════════════════════════════════════════

fn default_max_bytes() -> usize {
    64 * 1024 * 1024
}

#[derive(Debug, serde::Deserialize)]
pub struct MemoryPoolConfig {
    /// Upper bound on live payload bytes (0 = unbounded).
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for MemoryPoolConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryVarlenPool
// ═══════════════════════════════════════════════════════════════

#[derive(Default)]
struct Slab {
    slots: Vec<Option<Arc<[u8]>>>,
    free: Vec<usize>,
}

/// Heap-backed varlen pool. References are slab indexes; freed slots are
/// reused, so a stale reference may later resolve to another payload.
pub struct MemoryVarlenPool {
    slab: RwLock<Slab>,
    used: AtomicUsize,
    max_bytes: usize,
}

impl MemoryVarlenPool {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            slab: RwLock::new(Slab::default()),
            used: AtomicUsize::new(0),
            max_bytes,
        }
    }

    /// Live references.
    pub fn live(&self) -> usize {
        let slab = self.slab.read();
        slab.slots.len() - slab.free.len()
    }

    fn reserve(&self, n: usize) -> Result<(), ValueError> {
        if self.max_bytes == 0 {
            self.used.fetch_add(n, Ordering::Relaxed);
            return Ok(());
        }
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(n).filter(|total| *total <= self.max_bytes)
            })
            .map(|_| ())
            .map_err(|used| {
                tracing::warn!(requested = n, used, max = self.max_bytes, "varlen pool exhausted");
                ValueError::pool(format!(
                    "cannot allocate {n} bytes: {used} of {} in use",
                    self.max_bytes
                ))
            })
    }

    fn index(reference: VarlenRef) -> Result<usize, ValueError> {
        usize::try_from(reference.raw())
            .map_err(|_| ValueError::pool(format!("invalid reference {}", reference.raw())))
    }
}

impl Default for MemoryVarlenPool {
    fn default() -> Self {
        Self::new(default_max_bytes())
    }
}

impl VarlenPool for MemoryVarlenPool {
    fn allocate(&self, data: &[u8]) -> Result<VarlenRef, ValueError> {
        self.reserve(data.len())?;
        let payload: Arc<[u8]> = Arc::from(data);

        let mut slab = self.slab.write();
        let index = match slab.free.pop() {
            Some(i) => {
                slab.slots[i] = Some(payload);
                i
            }
            None => {
                slab.slots.push(Some(payload));
                slab.slots.len() - 1
            }
        };
        tracing::debug!(reference = index, bytes = data.len(), "varlen allocated");
        Ok(VarlenRef::new(index as u64))
    }

    fn fetch(&self, reference: VarlenRef) -> Result<Arc<[u8]>, ValueError> {
        let index = Self::index(reference)?;
        let slab = self.slab.read();
        slab.slots
            .get(index)
            .and_then(Option::clone)
            .ok_or_else(|| ValueError::pool(format!("dangling reference {index}")))
    }

    fn free(&self, reference: VarlenRef) -> Result<(), ValueError> {
        let index = Self::index(reference)?;
        let mut slab = self.slab.write();
        let payload = slab
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| ValueError::pool(format!("reference {index} is not live")))?;
        slab.free.push(index);
        self.used.fetch_sub(payload.len(), Ordering::AcqRel);
        tracing::debug!(reference = index, bytes = payload.len(), "varlen freed");
        Ok(())
    }

    fn allocated_bytes(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════
//  MemoryPoolFactory
// ═══════════════════════════════════════════════════════════════

pub struct MemoryPoolFactory;

impl PoolFactory for MemoryPoolFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn VarlenPool>, ValueError> {
        let config: MemoryPoolConfig = if config_json == "{}" {
            MemoryPoolConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| ValueError::from(e).with_context("pool"))?
        };
        Ok(Arc::new(MemoryVarlenPool::new(config.max_bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relval_api::ErrorKind;

    #[test]
    fn allocate_fetch_free() {
        let pool = MemoryVarlenPool::new(0);
        let r = pool.allocate(b"payload").unwrap();
        assert_eq!(&*pool.fetch(r).unwrap(), b"payload");
        assert_eq!(pool.allocated_bytes(), 7);

        pool.free(r).unwrap();
        assert_eq!(pool.allocated_bytes(), 0);
        assert_eq!(pool.fetch(r).unwrap_err().kind(), ErrorKind::Pool);
        assert_eq!(pool.free(r).unwrap_err().kind(), ErrorKind::Pool);
    }

    #[test]
    fn freed_slots_are_reused() {
        let pool = MemoryVarlenPool::default();
        let a = pool.allocate(b"a").unwrap();
        let _b = pool.allocate(b"b").unwrap();
        pool.free(a).unwrap();
        let c = pool.allocate(b"c").unwrap();
        assert_eq!(c, a);
        assert_eq!(pool.live(), 2);
    }

    #[test]
    fn budget_is_enforced() {
        let pool = MemoryVarlenPool::new(8);
        pool.allocate(&[0; 5]).unwrap();
        let err = pool.allocate(&[0; 4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Pool);
        // A failed allocation reserves nothing.
        assert_eq!(pool.allocated_bytes(), 5);
        pool.allocate(&[0; 3]).unwrap();
    }

    #[test]
    fn null_reference_never_resolves() {
        let pool = MemoryVarlenPool::default();
        pool.allocate(b"x").unwrap();
        assert!(pool.fetch(VarlenRef::NULL).is_err());
    }

    #[test]
    fn factory_config() {
        let pool = MemoryPoolFactory.create("{}").unwrap();
        assert_eq!(pool.allocated_bytes(), 0);

        let pool = MemoryPoolFactory.create(r#"{"max_bytes": 2}"#).unwrap();
        assert!(pool.allocate(b"abc").is_err());

        let err = MemoryPoolFactory.create("not json").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::SerializationError);
        assert!(err.message().starts_with("pool: config: "));
    }

    #[test]
    fn shared_across_threads() {
        let pool: Arc<dyn VarlenPool> = Arc::new(MemoryVarlenPool::new(0));
        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    (0..100u8)
                        .map(|i| pool.allocate(&[t, i]).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for h in handles {
            for r in h.join().unwrap() {
                assert_eq!(pool.fetch(r).unwrap().len(), 2);
            }
        }
        assert_eq!(pool.allocated_bytes(), 800);
    }
}
