//! Frozen morphological dictionary and its read facade.
//!
//! A [`MorphDictionary`] is produced by
//! [`DictionaryBuilder::freeze`](crate::builder::DictionaryBuilder::freeze)
//! and is immutable from then on: it may be queried concurrently by any
//! number of threads with no locking. Every query is a pure, bounded-time
//! lookup (prefix-tree descent, bit-vector ops, hash/table probes).
//!
//! This is the only interface collaborators consume: lookup by surface
//! string (with predictor fallback), lookup by lemma id, link traversal,
//! and tag-set membership. Collaborators normalize their query text
//! before calling in; the core does no case or diacritic folding.
//!
//! Compiled dictionaries can be cached to disk as bincode snapshots.
//! Loading a snapshot replays it through a fresh builder, so interning
//! identity and all freeze-time validation hold for snapshot-loaded
//! instances exactly as for source-loaded ones.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::builder::DictionaryBuilder;
use crate::errors::{MorphError, Result};
use crate::grammeme::GramModel;
use crate::gramset::GramSet;
use crate::links::{LinkGraph, LinkType};
use crate::predictor::Predictor;
use crate::records::{Lemma, Wordform};
use crate::tst::{PrefixMatch, Tst};

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// One interpretation of a surface string: the lemma it realizes plus the
/// full (lemma ∪ wordform) tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub lemma_id: u32,
    pub lemma: String,
    pub tag: GramSet,
}

/// Load-time and size counters of a frozen dictionary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DictStats {
    pub lemma_count: usize,
    pub wordform_count: usize,
    /// Distinct surface strings in the prefix index.
    pub surface_count: usize,
    /// Distinct interned tag sets (lemma and wordform tags pooled).
    pub distinct_tag_sets: usize,
    /// Distinct full (lemma ∪ wordform) tags observed at freeze.
    pub distinct_full_tags: usize,
    pub link_count: usize,
    /// Links dropped for referencing a nonexistent lemma.
    pub dropped_links: u64,
    /// Later links between an already-linked ordered pair.
    pub redundant_links: u64,
}

/// Link neighborhoods of one lemma: target/source lemma id → link type id.
#[derive(Debug, Clone, Default)]
pub struct LinkNeighbors {
    pub outgoing: BTreeMap<u32, u16>,
    pub incoming: BTreeMap<u32, u16>,
}

/// Immutable, concurrently-readable morphological lexicon.
pub struct MorphDictionary {
    model: GramModel,
    lemmas: Vec<Lemma>,
    lemma_index: AHashMap<u32, u32>,
    wordforms: Vec<Wordform>,
    index: Tst,
    link_types: Vec<LinkType>,
    links: LinkGraph,
    known_tags: AHashSet<Arc<GramSet>>,
    stats: DictStats,
    version: String,
    revision: String,
    predictor: Option<Box<dyn Predictor>>,
}

impl std::fmt::Debug for MorphDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MorphDictionary")
            .field("version", &self.version)
            .field("revision", &self.revision)
            .field("stats", &self.stats)
            .field("predictor", &self.predictor.is_some())
            .finish()
    }
}

impl MorphDictionary {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        model: GramModel,
        lemmas: Vec<Lemma>,
        lemma_index: AHashMap<u32, u32>,
        wordforms: Vec<Wordform>,
        index: Tst,
        link_types: Vec<LinkType>,
        links: LinkGraph,
        known_tags: AHashSet<Arc<GramSet>>,
        stats: DictStats,
        version: String,
        revision: String,
    ) -> Self {
        Self {
            model,
            lemmas,
            lemma_index,
            wordforms,
            index,
            link_types,
            links,
            known_tags,
            stats,
            version,
            revision,
            predictor: None,
        }
    }

    /// Attach an out-of-vocabulary predictor. Without one, unknown words
    /// resolve to no entries.
    pub fn with_predictor(mut self, predictor: Box<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn has_predictor(&self) -> bool {
        self.predictor.is_some()
    }

    /// All interpretations of `word`.
    ///
    /// An exact hit returns exactly the stored wordforms, in insertion
    /// order, and never consults the predictor. Otherwise the predictor,
    /// if any, is invoked with the longest-prefix match — except when the
    /// match length is zero, which can support no analogy at all.
    pub fn entries(&self, word: &str) -> Vec<Entry> {
        let exact = self.index.exact_lookup(word);
        if !exact.is_empty() {
            return exact.iter().filter_map(|&i| self.entry_of(i)).collect();
        }
        let predictor = match &self.predictor {
            Some(p) => p,
            None => return Vec::new(),
        };
        let m = self.index.longest_prefix_match(word);
        if m.matched_len == 0 {
            return Vec::new();
        }
        predictor
            .predict(word, &m, self)
            .iter()
            .filter_map(|wf| self.entry_of_form(wf))
            .collect()
    }

    /// Wordform ids filed under exactly `word` (insertion order).
    pub fn wordform_ids(&self, word: &str) -> &[u32] {
        self.index.exact_lookup(word)
    }

    /// Wordform record by arena id.
    pub fn wordform(&self, idx: u32) -> Option<&Wordform> {
        self.wordforms.get(idx as usize)
    }

    /// Deepest key-prefix of `word` present in the index.
    pub fn longest_prefix_match(&self, word: &str) -> PrefixMatch<'_> {
        self.index.longest_prefix_match(word)
    }

    /// Lemma by external id. A miss is a hard failure: wordform lemma ids
    /// are guaranteed valid at freeze time, so an unknown id means the
    /// caller is holding a stale id from another dictionary instance.
    pub fn lemma_by_id(&self, id: u32) -> Result<&Lemma> {
        self.lemma_index
            .get(&id)
            .map(|&slot| &self.lemmas[slot as usize])
            .ok_or(MorphError::UnknownLemma(id))
    }

    /// Full tag of a wordform: its own tag OR-ed with its lemma's.
    pub fn full_tag(&self, wf: &Wordform) -> Result<GramSet> {
        let lemma = self.lemma_by_id(wf.lemma_id)?;
        Ok(wf.tag.union(&lemma.tag))
    }

    /// Outgoing and incoming links of a lemma.
    pub fn links_of(&self, lemma_id: u32) -> LinkNeighbors {
        LinkNeighbors {
            outgoing: self.links.outlinks(lemma_id),
            incoming: self.links.inlinks(lemma_id),
        }
    }

    /// Whether `tag` equals one of the distinct full tags observed during
    /// load. Used to sanity-check synthesized or externally-supplied tags.
    pub fn is_known_tag(&self, tag: &GramSet) -> bool {
        self.known_tags.contains(tag)
    }

    pub fn model(&self) -> &GramModel {
        &self.model
    }

    pub fn links(&self) -> &LinkGraph {
        &self.links
    }

    pub fn link_types(&self) -> &[LinkType] {
        &self.link_types
    }

    pub fn link_type_name(&self, id: u16) -> Option<&str> {
        self.link_types
            .iter()
            .find(|lt| lt.id == id)
            .map(|lt| lt.name.as_str())
    }

    /// Iterate lemmata in declaration order.
    pub fn lemmas(&self) -> impl Iterator<Item = &Lemma> {
        self.lemmas.iter()
    }

    pub fn stats(&self) -> &DictStats {
        &self.stats
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Visit every surface string with its wordform ids, in key order.
    pub fn for_each_surface<F: FnMut(&str, &[u32])>(&self, f: F) {
        self.index.for_each_key(f)
    }

    fn entry_of(&self, idx: u32) -> Option<Entry> {
        self.wordforms
            .get(idx as usize)
            .and_then(|wf| self.entry_of_form(wf))
    }

    fn entry_of_form(&self, wf: &Wordform) -> Option<Entry> {
        let slot = *self.lemma_index.get(&wf.lemma_id)?;
        let lemma = &self.lemmas[slot as usize];
        Some(Entry {
            lemma_id: lemma.id,
            lemma: lemma.text.clone(),
            tag: wf.tag.union(&lemma.tag),
        })
    }

    /// Write a compiled snapshot with bincode.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, &self.snapshot())?;
        Ok(())
    }

    /// Load a compiled snapshot produced by `save_bincode`.
    ///
    /// The snapshot is replayed through a fresh builder, so the result has
    /// the same interning identity and invariants as a source-format load.
    /// No predictor is attached; use
    /// [`with_predictor`](Self::with_predictor).
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let snap: Snapshot = bincode::deserialize_from(reader)?;
        Self::from_snapshot(snap)
    }

    fn snapshot(&self) -> Snapshot {
        let grammemes = self
            .model
            .iter()
            .map(|g| SnapGrammeme {
                id: g.id.clone(),
                parent: g
                    .parent
                    .and_then(|p| self.model.grammeme(p))
                    .map(|p| p.id.clone()),
                name: g.name.clone(),
                description: g.description.clone(),
            })
            .collect();
        let lemmata = self
            .lemmas
            .iter()
            .map(|l| SnapLemma {
                id: l.id,
                text: l.text.clone(),
                tags: to_owned_ids(&self.model, &l.tag),
            })
            .collect();

        // Recover each arena entry's surface from the index, then emit the
        // arena in order so a replay reproduces identical posting lists.
        let mut surface_of: Vec<Option<String>> = vec![None; self.wordforms.len()];
        self.index.for_each_key(|key, postings| {
            for &idx in postings {
                surface_of[idx as usize] = Some(key.to_string());
            }
        });
        let wordforms = self
            .wordforms
            .iter()
            .zip(surface_of)
            .map(|(wf, surface)| SnapForm {
                lemma_id: wf.lemma_id,
                surface: surface.unwrap_or_default(),
                tags: to_owned_ids(&self.model, &wf.tag),
            })
            .collect();

        Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            version: self.version.clone(),
            revision: self.revision.clone(),
            pos_root: self.model.pos_root().to_string(),
            grammemes,
            lemmata,
            wordforms,
            link_types: self
                .link_types
                .iter()
                .map(|lt| (lt.id, lt.name.clone()))
                .collect(),
            links: self.links.iter().collect(),
            dropped_links: self.stats.dropped_links,
            redundant_links: self.stats.redundant_links,
        }
    }

    fn from_snapshot(snap: Snapshot) -> Result<Self> {
        if snap.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(MorphError::SnapshotVersion {
                found: snap.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        let mut b = DictionaryBuilder::new();
        b.set_source_meta(&snap.version, &snap.revision);
        b.set_pos_root(&snap.pos_root);
        for g in &snap.grammemes {
            b.add_grammeme(&g.id, g.parent.as_deref(), &g.name, &g.description)?;
        }
        for l in &snap.lemmata {
            let tags: Vec<&str> = l.tags.iter().map(String::as_str).collect();
            b.add_lemma(l.id, &l.text, &tags)?;
        }
        for wf in &snap.wordforms {
            if wf.surface.is_empty() {
                return Err(MorphError::IllegalState(
                    "snapshot wordform without a surface".to_string(),
                ));
            }
            let tags: Vec<&str> = wf.tags.iter().map(String::as_str).collect();
            b.add_wordform(wf.lemma_id, &wf.surface, &tags)?;
        }
        for (id, name) in &snap.link_types {
            b.add_link_type(*id, name)?;
        }
        for (from, to, ty) in &snap.links {
            b.add_link(*from, *to, *ty)?;
        }
        let mut dict = b.freeze()?;
        dict.stats.dropped_links = snap.dropped_links;
        dict.stats.redundant_links = snap.redundant_links;
        Ok(dict)
    }
}

fn to_owned_ids(model: &GramModel, tag: &GramSet) -> Vec<String> {
    model.tag_to_ids(tag).into_iter().map(String::from).collect()
}

#[derive(Serialize, Deserialize)]
struct SnapGrammeme {
    id: String,
    parent: Option<String>,
    name: String,
    description: String,
}

#[derive(Serialize, Deserialize)]
struct SnapLemma {
    id: u32,
    text: String,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct SnapForm {
    lemma_id: u32,
    surface: String,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    format_version: u32,
    version: String,
    revision: String,
    pos_root: String,
    grammemes: Vec<SnapGrammeme>,
    lemmata: Vec<SnapLemma>,
    wordforms: Vec<SnapForm>,
    link_types: Vec<(u16, String)>,
    links: Vec<(u32, u32, u16)>,
    dropped_links: u64,
    redundant_links: u64,
}
