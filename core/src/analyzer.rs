//! Per-caller query session over a shared frozen dictionary.
//!
//! The dictionary itself is lock-free and shared; an [`Analyzer`] adds a
//! small per-session LRU of resolved lookups, which pays off on the
//! Zipf-shaped word distributions of real text. Analyzers are cheap:
//! create one per worker thread rather than sharing one.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::dictionary::{Entry, MorphDictionary};
use crate::Config;

/// A query session with an LRU result cache and hit/miss counters.
pub struct Analyzer {
    dict: Arc<MorphDictionary>,
    cache: RefCell<lru::LruCache<String, Vec<Entry>>>,
    hits: RefCell<usize>,
    misses: RefCell<usize>,
}

impl Analyzer {
    /// Create a session with the given cache capacity.
    pub fn new(dict: Arc<MorphDictionary>, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1000).expect("nonzero literal"));
        Self {
            dict,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            hits: RefCell::new(0),
            misses: RefCell::new(0),
        }
    }

    /// Create a session sized from a [`Config`].
    pub fn with_config(dict: Arc<MorphDictionary>, cfg: &Config) -> Self {
        Self::new(dict, cfg.analyzer_cache_size)
    }

    /// All interpretations of `word`, cached per session.
    ///
    /// The caller normalizes `word` first; this layer treats it as opaque.
    pub fn entries(&self, word: &str) -> Vec<Entry> {
        if let Some(cached) = self.cache.borrow_mut().get(word) {
            *self.hits.borrow_mut() += 1;
            return cached.clone();
        }
        *self.misses.borrow_mut() += 1;
        let entries = self.dict.entries(word);
        self.cache
            .borrow_mut()
            .put(word.to_string(), entries.clone());
        entries
    }

    /// The shared dictionary behind this session.
    pub fn dictionary(&self) -> &Arc<MorphDictionary> {
        &self.dict
    }

    /// `(hits, misses)` of the session cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.hits.borrow(), *self.misses.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DictionaryBuilder;

    fn dict() -> Arc<MorphDictionary> {
        let mut b = DictionaryBuilder::new();
        b.add_grammeme("POST", None, "POS", "").unwrap();
        b.add_grammeme("NOUN", Some("POST"), "noun", "").unwrap();
        b.add_lemma(1, "KOT", &["NOUN"]).unwrap();
        b.add_wordform(1, "KOT", &[]).unwrap();
        Arc::new(b.freeze().unwrap())
    }

    #[test]
    fn repeat_lookups_hit_the_cache() {
        let a = Analyzer::new(dict(), 16);
        let first = a.entries("KOT");
        let second = a.entries("KOT");
        assert_eq!(first, second);
        assert_eq!(a.cache_stats(), (1, 1));
    }

    #[test]
    fn zero_capacity_falls_back_to_default() {
        let a = Analyzer::new(dict(), 0);
        assert_eq!(a.entries("KOT").len(), 1);
    }
}
