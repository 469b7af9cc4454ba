//! Process-wide dictionary cache.
//!
//! Callers loading the same source (identified by a URL-like string) share
//! one dictionary instance per process. The table holds weak references:
//! the returned `Arc` is both the cache key and the pin — the instance
//! stays cached exactly as long as some caller still holds an `Arc` to
//! it, and becomes loadable afresh once the last one is dropped.
//!
//! Lookup-or-insert is a single critical section, which also guarantees
//! at most one live instance per source id even under concurrent first
//! loads. The dictionary itself is never touched inside the lock beyond
//! construction.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use ahash::AHashMap;
use once_cell::sync::Lazy;

use crate::dictionary::MorphDictionary;
use crate::errors::Result;

static REGISTRY: Lazy<Mutex<AHashMap<String, Weak<MorphDictionary>>>> =
    Lazy::new(|| Mutex::new(AHashMap::new()));

fn registry() -> MutexGuard<'static, AHashMap<String, Weak<MorphDictionary>>> {
    match REGISTRY.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Return the shared dictionary for `source_id`, calling `load` only if
/// no live instance exists.
pub fn load_or_share<F>(source_id: &str, load: F) -> Result<Arc<MorphDictionary>>
where
    F: FnOnce() -> Result<MorphDictionary>,
{
    let mut reg = registry();
    if let Some(dict) = reg.get(source_id).and_then(Weak::upgrade) {
        return Ok(dict);
    }
    let dict = Arc::new(load()?);
    reg.insert(source_id.to_string(), Arc::downgrade(&dict));
    Ok(dict)
}

/// The live instance for `source_id`, if some caller still pins one.
pub fn cached(source_id: &str) -> Option<Arc<MorphDictionary>> {
    registry().get(source_id).and_then(Weak::upgrade)
}

/// Drop the registry slot for `source_id`. Callers already holding the
/// `Arc` keep their instance; the next `load_or_share` loads fresh.
pub fn evict(source_id: &str) -> bool {
    registry().remove(source_id).is_some()
}

/// Remove slots whose dictionary has already been dropped. Returns how
/// many were swept.
pub fn purge_dead() -> usize {
    let mut reg = registry();
    let before = reg.len();
    reg.retain(|_, weak| weak.strong_count() > 0);
    before - reg.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DictionaryBuilder;

    fn tiny() -> Result<MorphDictionary> {
        let mut b = DictionaryBuilder::new();
        b.add_grammeme("POST", None, "POS", "")?;
        b.freeze()
    }

    #[test]
    fn same_source_shares_one_instance() {
        let mut loads = 0;
        let a = load_or_share("test://share", || {
            loads += 1;
            tiny()
        })
        .unwrap();
        let b = load_or_share("test://share", || {
            loads += 1;
            tiny()
        })
        .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loads, 1);
        evict("test://share");
    }

    #[test]
    fn dropping_all_pins_allows_reload() {
        let a = load_or_share("test://reload", tiny).unwrap();
        drop(a);
        assert!(cached("test://reload").is_none());
        let mut loads = 0;
        let _b = load_or_share("test://reload", || {
            loads += 1;
            tiny()
        })
        .unwrap();
        assert_eq!(loads, 1);
        evict("test://reload");
    }

    #[test]
    fn evict_detaches_but_does_not_invalidate() {
        let a = load_or_share("test://evict", tiny).unwrap();
        assert!(evict("test://evict"));
        assert!(!evict("test://evict"));
        // The held instance keeps working after eviction.
        assert_eq!(a.stats().lemma_count, 0);
        let b = load_or_share("test://evict", tiny).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        evict("test://evict");
    }

    #[test]
    fn purge_sweeps_only_dead_slots() {
        let _a = load_or_share("test://purge-live", tiny).unwrap();
        {
            let _b = load_or_share("test://purge-dead", tiny).unwrap();
        }
        let swept = purge_dead();
        assert!(swept >= 1);
        assert!(cached("test://purge-live").is_some());
        assert!(cached("test://purge-dead").is_none());
        evict("test://purge-live");
    }
}
