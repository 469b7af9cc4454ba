//! Out-of-vocabulary prediction.
//!
//! When a query has no exact entry, the read facade hands the predictor
//! the longest-prefix match result. The default strategy treats the
//! wordforms filed at that prefix as exemplars of an inflectional class
//! and proposes the query inflects the same way, reusing the exemplars'
//! lemma and tag data. Predictors are pluggable; a dictionary without one
//! simply returns no entries for unknown words.

use crate::dictionary::MorphDictionary;
use crate::records::Wordform;
use crate::tst::PrefixMatch;

/// A strategy for synthesizing interpretations of unknown words.
///
/// `predict` is only ever called with a non-exact match; a zero-length
/// match never reaches the predictor (there is no analogy to draw from an
/// empty shared prefix).
pub trait Predictor: Send + Sync {
    fn predict(&self, word: &str, m: &PrefixMatch, dict: &MorphDictionary) -> Vec<Wordform>;
}

/// Analogy by matched prefix: propose the exemplar wordforms of the
/// deepest known prefix, deduplicated by lemma and tag.
#[derive(Debug, Clone)]
pub struct SuffixAnalogyPredictor {
    /// Matches shorter than this yield no prediction. The default of 1
    /// only excludes the no-shared-prefix case.
    pub min_prefix_len: usize,
    /// Cap on proposed interpretations per query.
    pub max_results: usize,
}

impl SuffixAnalogyPredictor {
    pub fn new(min_prefix_len: usize, max_results: usize) -> Self {
        Self {
            min_prefix_len,
            max_results,
        }
    }
}

impl Default for SuffixAnalogyPredictor {
    fn default() -> Self {
        Self {
            min_prefix_len: 1,
            max_results: 8,
        }
    }
}

impl Predictor for SuffixAnalogyPredictor {
    fn predict(&self, _word: &str, m: &PrefixMatch, dict: &MorphDictionary) -> Vec<Wordform> {
        if m.matched_len < self.min_prefix_len.max(1) {
            return Vec::new();
        }
        let mut seen: Vec<(u32, *const ())> = Vec::new();
        let mut out = Vec::new();
        for &idx in m.postings {
            let wf = match dict.wordform(idx) {
                Some(wf) => wf,
                None => continue,
            };
            // Tags are interned, so a raw pointer comparison is an exact
            // same-tag test here.
            let key = (wf.lemma_id, std::sync::Arc::as_ptr(&wf.tag) as *const ());
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            out.push(wf.clone());
            if out.len() >= self.max_results {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DictionaryBuilder;

    fn small_dict() -> MorphDictionary {
        let mut b = DictionaryBuilder::new();
        b.add_grammeme("POST", None, "POS", "").unwrap();
        b.add_grammeme("NOUN", Some("POST"), "noun", "").unwrap();
        b.add_grammeme("sing", None, "singular", "").unwrap();
        b.add_lemma(1, "KOT", &["NOUN"]).unwrap();
        b.add_wordform(1, "KOT", &["sing"]).unwrap();
        b.add_wordform(1, "KOTA", &["sing"]).unwrap();
        b.freeze().unwrap()
    }

    #[test]
    fn analogy_reuses_exemplar_interpretations() {
        let dict = small_dict();
        let p = SuffixAnalogyPredictor::default();
        let m = dict.longest_prefix_match("KOTU");
        assert_eq!(m.matched_len, 3);
        let predicted = p.predict("KOTU", &m, &dict);
        assert_eq!(predicted.len(), 1);
        assert_eq!(predicted[0].lemma_id, 1);
    }

    #[test]
    fn threshold_gates_short_matches() {
        let dict = small_dict();
        let p = SuffixAnalogyPredictor::new(4, 8);
        let m = dict.longest_prefix_match("KOTU");
        assert!(p.predict("KOTU", &m, &dict).is_empty());
    }

    #[test]
    fn zero_length_match_never_predicts() {
        let dict = small_dict();
        let p = SuffixAnalogyPredictor::new(0, 8);
        let m = dict.longest_prefix_match("XYZ");
        assert_eq!(m.matched_len, 0);
        assert!(p.predict("XYZ", &m, &dict).is_empty());
    }
}
