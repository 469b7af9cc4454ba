//! Interning pool for grammeme tag sets.
//!
//! A lexicon holds on the order of 10^5..10^6 wordforms but only a few
//! thousand distinct tag combinations, so every record construction goes
//! through this pool and structurally-equal tag sets collapse to one shared
//! allocation. After the build the pool itself is dropped; the canonical
//! `Arc`s live on inside the frozen records, and reference equality
//! (`Arc::ptr_eq`) keeps holding for equal tags from the same load.

use std::sync::Arc;

use ahash::AHashSet;

use crate::gramset::GramSet;

/// Deduplicating pool of canonical [`GramSet`] instances.
#[derive(Debug, Default)]
pub struct GramSetPool {
    pool: AHashSet<Arc<GramSet>>,
}

impl GramSetPool {
    pub fn new() -> Self {
        Self {
            pool: AHashSet::new(),
        }
    }

    /// Return the canonical instance for `set`, inserting it if absent.
    pub fn intern(&mut self, set: GramSet) -> Arc<GramSet> {
        if let Some(existing) = self.pool.get(&set) {
            return Arc::clone(existing);
        }
        let canonical = Arc::new(set);
        self.pool.insert(Arc::clone(&canonical));
        canonical
    }

    /// Number of distinct tag sets interned so far.
    pub fn distinct(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_interns_to_same_allocation() {
        let mut pool = GramSetPool::new();
        let a = pool.intern(GramSet::from_indices([1, 5, 64]));
        let b = pool.intern(GramSet::from_indices([1, 5, 64]));
        let c = pool.intern(GramSet::from_indices([1, 5]));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(pool.distinct(), 2);
    }

    #[test]
    fn identity_survives_pool_drop() {
        let mut pool = GramSetPool::new();
        let a = pool.intern(GramSet::from_indices([3]));
        let b = pool.intern(GramSet::from_indices([3]));
        drop(pool);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
