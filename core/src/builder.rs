//! Mutable dictionary builder.
//!
//! All mutation happens here, on a single loading thread; `freeze`
//! consumes the builder and produces the immutable
//! [`MorphDictionary`](crate::dictionary::MorphDictionary), so the frozen
//! hot path never carries an "is it still mutable" check. Freezing runs
//! the registered post-processing passes in order, then finalizes the
//! grammeme model (pass-injected synthetic grammemes land before the
//! subtree masks are computed), validates the part-of-speech invariant
//! over every tag, and collects the distinct full tags.
//!
//! Soft load conditions follow the dangling-reference policy of the load
//! format: a link whose endpoint lemma does not exist is dropped with a
//! counter bump and a warning, never an error.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

use crate::dictionary::{DictStats, MorphDictionary};
use crate::errors::{MorphError, Result};
use crate::grammeme::GramModelBuilder;
use crate::gramset::GramSet;
use crate::intern::GramSetPool;
use crate::links::{LinkGraph, LinkType};
use crate::records::{Lemma, Wordform};
use crate::tst::Tst;

/// One post-processing pass over the fully-parsed, not-yet-frozen lexicon.
///
/// Passes run in registration order inside `freeze`. A pass may rewrite
/// lemma tag sets, add synthetic lemmata and wordforms, or declare
/// synthetic grammemes; an error from any pass aborts the whole load.
pub trait PostPass {
    fn name(&self) -> &str;
    fn run(&self, builder: &mut DictionaryBuilder) -> Result<()>;
}

/// Accumulates records 2–5 of the engine (grammemes, lemmata, wordforms,
/// links) before freezing them into a dictionary.
#[derive(Default)]
pub struct DictionaryBuilder {
    grammemes: GramModelBuilder,
    pool: GramSetPool,
    lemmas: Vec<Lemma>,
    lemma_index: AHashMap<u32, u32>,
    wordforms: Vec<Wordform>,
    index: Tst,
    link_types: Vec<LinkType>,
    link_type_ids: AHashSet<u16>,
    links: LinkGraph,
    version: String,
    revision: String,
    dropped_links: u64,
    redundant_links: u64,
    passes: Vec<Box<dyn PostPass>>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the source's version/revision attributes.
    pub fn set_source_meta(&mut self, version: &str, revision: &str) {
        self.version = version.to_string();
        self.revision = revision.to_string();
    }

    /// Override the part-of-speech root grammeme id (default `POST`).
    pub fn set_pos_root(&mut self, id: &str) {
        self.grammemes.set_pos_root(id);
    }

    /// Declare a grammeme; the parent, if given, must already exist.
    pub fn add_grammeme(
        &mut self,
        id: &str,
        parent: Option<&str>,
        name: &str,
        description: &str,
    ) -> Result<u16> {
        self.grammemes.add(id, parent, name, description)
    }

    pub fn has_grammeme(&self, id: &str) -> bool {
        self.grammemes.contains(id)
    }

    /// Numeric index of a declared grammeme.
    pub fn grammeme_index(&self, id: &str) -> Result<u16> {
        self.grammemes.index_of(id)
    }

    /// Intern a tag set built from grammeme ids.
    pub fn intern_tag(&mut self, ids: &[&str]) -> Result<Arc<GramSet>> {
        let tag = self.grammemes.tag_from_ids(ids.iter().copied())?;
        Ok(self.pool.intern(tag))
    }

    /// Intern an already-built tag set (for passes that compute bits).
    pub fn intern_set(&mut self, set: GramSet) -> Arc<GramSet> {
        self.pool.intern(set)
    }

    /// Declare a lemma. Ids are externally assigned and must be unique.
    pub fn add_lemma(&mut self, id: u32, text: &str, tag_ids: &[&str]) -> Result<()> {
        if self.lemma_index.contains_key(&id) {
            return Err(MorphError::DuplicateLemma(id));
        }
        let tag = self.intern_tag(tag_ids)?;
        let slot = self.lemmas.len() as u32;
        self.lemmas.push(Lemma {
            id,
            text: text.to_string(),
            tag,
        });
        self.lemma_index.insert(id, slot);
        Ok(())
    }

    /// Replace a lemma's tag set (post-processing passes rewrite tags
    /// through here so the replacement is interned too).
    pub fn set_lemma_tag(&mut self, id: u32, tag: GramSet) -> Result<()> {
        let slot = *self
            .lemma_index
            .get(&id)
            .ok_or(MorphError::UnknownLemma(id))?;
        let tag = self.pool.intern(tag);
        self.lemmas[slot as usize].tag = tag;
        Ok(())
    }

    /// File a wordform under its surface string. The lemma must exist.
    pub fn add_wordform(&mut self, lemma_id: u32, surface: &str, tag_ids: &[&str]) -> Result<()> {
        if !self.lemma_index.contains_key(&lemma_id) {
            return Err(MorphError::UnknownLemma(lemma_id));
        }
        if surface.is_empty() {
            return Err(MorphError::IllegalState(
                "wordform with empty surface".to_string(),
            ));
        }
        let tag = self.intern_tag(tag_ids)?;
        let idx = self.wordforms.len() as u32;
        self.wordforms.push(Wordform { lemma_id, tag });
        self.index.insert(surface, idx);
        Ok(())
    }

    /// Declare a link type.
    pub fn add_link_type(&mut self, id: u16, name: &str) -> Result<()> {
        if !self.link_type_ids.insert(id) {
            return Err(MorphError::DuplicateLinkType(id));
        }
        self.link_types.push(LinkType {
            id,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Add a typed link between lemma ids.
    ///
    /// An undeclared link type is fatal. A dangling lemma endpoint or a
    /// repeated `(from, to)` pair is a soft condition: counted, logged,
    /// and the load proceeds.
    pub fn add_link(&mut self, from: u32, to: u32, type_id: u16) -> Result<()> {
        if !self.link_type_ids.contains(&type_id) {
            return Err(MorphError::UnknownLinkType(type_id));
        }
        if !self.lemma_index.contains_key(&from) || !self.lemma_index.contains_key(&to) {
            self.dropped_links += 1;
            warn!(from, to, type_id, "dropping link with nonexistent lemma endpoint");
            return Ok(());
        }
        if !self.links.insert(from, to, type_id) {
            self.redundant_links += 1;
            warn!(from, to, type_id, "redundant link between already-linked pair");
        }
        Ok(())
    }

    /// Register a post-processing pass; passes run in registration order
    /// during `freeze`.
    pub fn add_pass(&mut self, pass: Box<dyn PostPass>) {
        self.passes.push(pass);
    }

    /// Lemma by external id, if declared.
    pub fn lemma(&self, id: u32) -> Option<&Lemma> {
        self.lemma_index
            .get(&id)
            .map(|&slot| &self.lemmas[slot as usize])
    }

    /// Iterate declared lemmata in declaration order.
    pub fn lemmas(&self) -> impl Iterator<Item = &Lemma> {
        self.lemmas.iter()
    }

    /// Smallest lemma id not yet taken, for passes that synthesize lemmata.
    pub fn next_free_lemma_id(&self) -> u32 {
        self.lemmas.iter().map(|l| l.id).max().map_or(0, |m| m + 1)
    }

    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    pub fn wordform_count(&self) -> usize {
        self.wordforms.len()
    }

    /// Run passes, finalize the grammeme model, validate, and freeze.
    pub fn freeze(mut self) -> Result<MorphDictionary> {
        let passes = std::mem::take(&mut self.passes);
        for pass in &passes {
            debug!(pass = pass.name(), "running post-processing pass");
            pass.run(&mut self)?;
        }

        let model = std::mem::take(&mut self.grammemes).finalize();

        // POS invariant: at most one part-of-speech bit per lemma tag and
        // per full (lemma ∪ wordform) tag. More than one is a fatal
        // data-integrity failure of the source or of a pass.
        let mut pool = self.pool;
        let mut known_tags: AHashSet<Arc<GramSet>> = AHashSet::new();
        for lemma in &self.lemmas {
            model.pos_of(&lemma.tag)?;
        }
        for wf in &self.wordforms {
            let slot = self.lemma_index[&wf.lemma_id] as usize;
            let full = wf.tag.union(&self.lemmas[slot].tag);
            model.pos_of(&full)?;
            known_tags.insert(pool.intern(full));
        }

        let stats = DictStats {
            lemma_count: self.lemmas.len(),
            wordform_count: self.wordforms.len(),
            surface_count: self.index.len(),
            distinct_tag_sets: pool.distinct(),
            distinct_full_tags: known_tags.len(),
            link_count: self.links.len(),
            dropped_links: self.dropped_links,
            redundant_links: self.redundant_links,
        };
        debug!(?stats, "dictionary frozen");

        Ok(MorphDictionary::assemble(
            model,
            self.lemmas,
            self.lemma_index,
            self.wordforms,
            self.index,
            self.link_types,
            self.links,
            known_tags,
            stats,
            self.version,
            self.revision,
        ))
    }
}
