//! Grammeme hierarchy model.
//!
//! Grammemes are the closed set of grammatical category values (part of
//! speech, case, gender, number, ...). Each grammeme gets a dense numeric
//! index at declaration time; indices are stable for the lifetime of the
//! model and are what [`GramSet`] bit positions mean. Parent/child links
//! form a forest: every grammeme except top-level categories has exactly
//! one parent, and a parent must be declared before its children.
//!
//! The model is built with [`GramModelBuilder`] and frozen into an
//! immutable [`GramModel`]. Freezing precomputes, per grammeme, the mask of
//! its whole subtree (the grammeme's own bit OR-ed with every descendant's),
//! because tag containment checks against those masks run per-token in hot
//! paths. The subtree mask of the distinguished part-of-speech root is kept
//! separately as the global POS mask.

use ahash::AHashMap;

use crate::errors::{MorphError, Result};
use crate::gramset::GramSet;

/// Default id of the part-of-speech root category.
pub const DEFAULT_POS_ROOT: &str = "POST";

/// One grammatical category value.
#[derive(Debug, Clone)]
pub struct Grammeme {
    /// Stable textual id, unique within the model (e.g. "NOUN", "gent").
    pub id: String,
    /// Dense numeric index, assigned at declaration.
    pub index: u16,
    /// Index of the parent grammeme; `None` for top-level categories.
    pub parent: Option<u16>,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

/// Mutable grammeme registry used while a dictionary is loading.
#[derive(Debug)]
pub struct GramModelBuilder {
    nodes: Vec<Grammeme>,
    by_id: AHashMap<String, u16>,
    children: Vec<Vec<u16>>,
    pos_root: String,
}

impl Default for GramModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GramModelBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_id: AHashMap::new(),
            children: Vec::new(),
            pos_root: DEFAULT_POS_ROOT.to_string(),
        }
    }

    /// Override the id of the part-of-speech root category.
    pub fn set_pos_root<S: Into<String>>(&mut self, id: S) {
        self.pos_root = id.into();
    }

    /// Declare a grammeme. The parent, if any, must already be declared.
    ///
    /// Returns the assigned numeric index. Fails with `DuplicateGrammeme` on
    /// a redeclared id and `UnknownGrammeme` on an undeclared parent.
    pub fn add(
        &mut self,
        id: &str,
        parent: Option<&str>,
        name: &str,
        description: &str,
    ) -> Result<u16> {
        if self.by_id.contains_key(id) {
            return Err(MorphError::DuplicateGrammeme(id.to_string()));
        }
        let parent_idx = match parent {
            Some(p) => Some(
                *self
                    .by_id
                    .get(p)
                    .ok_or_else(|| MorphError::UnknownGrammeme(p.to_string()))?,
            ),
            None => None,
        };
        let index = self.nodes.len() as u16;
        self.nodes.push(Grammeme {
            id: id.to_string(),
            index,
            parent: parent_idx,
            name: name.to_string(),
            description: description.to_string(),
        });
        self.children.push(Vec::new());
        if let Some(p) = parent_idx {
            self.children[p as usize].push(index);
        }
        self.by_id.insert(id.to_string(), index);
        Ok(index)
    }

    /// Numeric index of a declared grammeme.
    pub fn index_of(&self, id: &str) -> Result<u16> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| MorphError::UnknownGrammeme(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build a tag set from grammeme ids. Any undeclared id is an error.
    pub fn tag_from_ids<'a, I>(&self, ids: I) -> Result<GramSet>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tag = GramSet::new();
        for id in ids {
            tag.set(self.index_of(id)? as usize);
        }
        Ok(tag)
    }

    /// Freeze into an immutable model, precomputing all subtree masks.
    pub fn finalize(self) -> GramModel {
        // Children always carry a larger index than their parent, so one
        // high-to-low sweep sees every child mask before its parent needs it.
        let n = self.nodes.len();
        let mut masks = vec![GramSet::new(); n];
        for i in (0..n).rev() {
            let mut mask = GramSet::from_indices([i]);
            for &c in &self.children[i] {
                let child_mask = masks[c as usize].clone();
                mask.union_with(&child_mask);
            }
            masks[i] = mask;
        }
        let pos_mask = self
            .by_id
            .get(&self.pos_root)
            .map(|&i| masks[i as usize].clone())
            .unwrap_or_default();
        GramModel {
            nodes: self.nodes,
            by_id: self.by_id,
            children: self.children,
            masks,
            pos_mask,
            pos_root: self.pos_root,
        }
    }
}

/// Frozen grammeme model: id ↔ index mapping, hierarchy, subtree masks.
#[derive(Debug)]
pub struct GramModel {
    nodes: Vec<Grammeme>,
    by_id: AHashMap<String, u16>,
    children: Vec<Vec<u16>>,
    masks: Vec<GramSet>,
    pos_mask: GramSet,
    pos_root: String,
}

impl GramModel {
    /// Numeric index of a grammeme id.
    pub fn index(&self, id: &str) -> Result<u16> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| MorphError::UnknownGrammeme(id.to_string()))
    }

    /// Grammeme record at a numeric index.
    pub fn grammeme(&self, index: u16) -> Option<&Grammeme> {
        self.nodes.get(index as usize)
    }

    /// Indices of the direct children of a grammeme.
    pub fn children_of(&self, index: u16) -> &[u16] {
        &self.children[index as usize]
    }

    /// Number of grammemes in the model.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate all grammemes in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Grammeme> {
        self.nodes.iter()
    }

    /// Subtree mask of a grammeme: its own bit OR-ed with every descendant.
    ///
    /// With `include_self == false` the grammeme's own bit is cleared, which
    /// is the mask of strict descendants only.
    pub fn descendant_mask(&self, id: &str, include_self: bool) -> Result<GramSet> {
        let idx = self.index(id)?;
        let mut mask = self.masks[idx as usize].clone();
        if !include_self {
            mask.clear(idx as usize);
        }
        Ok(mask)
    }

    /// Precomputed mask of the part-of-speech category and all its
    /// descendants. Empty if the model has no POS root.
    pub fn pos_mask(&self) -> &GramSet {
        &self.pos_mask
    }

    /// Id of the part-of-speech root category this model was built with.
    pub fn pos_root(&self) -> &str {
        &self.pos_root
    }

    /// The part-of-speech grammeme of a tag, if any.
    ///
    /// Intersects `tag` with the POS mask. Zero surviving bits yields
    /// `Ok(None)`; exactly one yields its index; more than one is the
    /// caller-side integrity failure `AmbiguousPos`.
    pub fn pos_of(&self, tag: &GramSet) -> Result<Option<u16>> {
        let hit = tag.intersect(&self.pos_mask);
        let mut ones = hit.iter_ones();
        match (ones.next(), ones.next()) {
            (None, _) => Ok(None),
            (Some(first), None) => Ok(Some(first as u16)),
            (Some(_), Some(_)) => {
                let ids: Vec<&str> = hit
                    .iter_ones()
                    .filter_map(|i| self.nodes.get(i).map(|g| g.id.as_str()))
                    .collect();
                Err(MorphError::AmbiguousPos(ids.join(", ")))
            }
        }
    }

    /// Build a tag set from grammeme ids. Any undeclared id is an error.
    pub fn tag_from_ids<'a, I>(&self, ids: I) -> Result<GramSet>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tag = GramSet::new();
        for id in ids {
            tag.set(self.index(id)? as usize);
        }
        Ok(tag)
    }

    /// Render a tag set as its sorted grammeme ids (diagnostics, tools).
    pub fn tag_to_ids(&self, tag: &GramSet) -> Vec<&str> {
        tag.iter_ones()
            .filter_map(|i| self.nodes.get(i).map(|g| g.id.as_str()))
            .collect()
    }
}
