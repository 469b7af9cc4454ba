//! libmorph-core
//!
//! In-memory morphological lexicon engine: maps inflected surface forms
//! to interpretations (base form + grammeme tag set) over a model of the
//! grammatical tag universe, with a prefix index for longest-match
//! queries and an analogy predictor for out-of-vocabulary words.
//!
//! Public API:
//! - `GramModel` / `GramModelBuilder` - grammeme hierarchy, indices, POS mask
//! - `GramSet` - tag bit-vectors with set algebra
//! - `GramSetPool` - tag interning (structural equality → shared instance)
//! - `Lemma` / `Wordform` - immutable lexicon records
//! - `Tst` - ternary search tree: exact and longest-prefix lookup
//! - `LinkGraph` - sparse typed lemma-to-lemma relations
//! - `Predictor` / `SuffixAnalogyPredictor` - out-of-vocabulary analogy
//! - `DictionaryBuilder` / `PostPass` - loading, post-processing, freeze
//! - `loader` - streaming parser for the text source format
//! - `MorphDictionary` / `Entry` - the frozen read facade
//! - `cache` - process-wide weak sharing of loaded dictionaries
//! - `Analyzer` - per-session query cache over a shared dictionary
//! - `Config` - engine configuration, TOML-backed
//!
//! Loading is single-threaded; a frozen dictionary is immutable and may
//! be queried from any number of threads without locking.

use serde::{Deserialize, Serialize};

pub mod errors;
pub use errors::{MorphError, Result};

pub mod gramset;
pub use gramset::GramSet;

pub mod grammeme;
pub use grammeme::{GramModel, GramModelBuilder, Grammeme};

pub mod intern;
pub use intern::GramSetPool;

pub mod records;
pub use records::{Lemma, Wordform};

pub mod tst;
pub use tst::{PrefixMatch, Tst};

pub mod links;
pub use links::{LinkGraph, LinkType};

pub mod predictor;
pub use predictor::{Predictor, SuffixAnalogyPredictor};

pub mod builder;
pub use builder::{DictionaryBuilder, PostPass};

pub mod loader;
pub use loader::{load_from_path, load_from_reader, load_from_str, load_with_passes};

pub mod dictionary;
pub use dictionary::{DictStats, Entry, LinkNeighbors, MorphDictionary};

pub mod cache;

pub mod analyzer;
pub use analyzer::Analyzer;

/// Engine configuration.
///
/// Covers the knobs that vary between deployments: whether and how the
/// predictor fires, and session cache sizing. Deserializable from TOML.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Attach the suffix-analogy predictor when loading a dictionary.
    pub predict: bool,

    /// Minimum matched-prefix length (in characters) for the predictor to
    /// propose anything. 1 excludes only the no-shared-prefix case.
    pub min_prediction_prefix: usize,

    /// Cap on predicted interpretations per query.
    pub max_predictions: usize,

    /// Capacity of the per-`Analyzer` lookup cache.
    pub analyzer_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predict: true,
            min_prediction_prefix: 1,
            max_predictions: 8,
            analyzer_cache_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = self
            .to_toml_string()
            .map_err(|e| MorphError::IllegalState(format!("config serialization: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MorphError::IllegalState(format!("config deserialization: {}", e)))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
