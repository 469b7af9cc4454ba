//! Lexicon record types.
//!
//! A [`Lemma`] is the base form of a word; a [`Wordform`] is one inflected
//! surface realization of a lemma. Both carry interned tag sets. A
//! wordform's *full* tag is the union of its own tag and its lemma's tag;
//! the union is computed on demand (see `MorphDictionary::full_tag`) rather
//! than stored, since the distinct unions are combinatorially fewer than
//! the wordforms.

use std::sync::Arc;

use crate::gramset::GramSet;

/// Base form of a word, immutable after load.
#[derive(Debug, Clone)]
pub struct Lemma {
    /// Externally assigned id, unique within a dictionary instance.
    pub id: u32,
    /// The lemma text itself.
    pub text: String,
    /// Interned tag set of the lemma.
    pub tag: Arc<GramSet>,
}

/// One inflected realization of a lemma.
///
/// The surface string is not stored here; it is the key under which the
/// wordform is filed in the prefix index.
#[derive(Debug, Clone)]
pub struct Wordform {
    /// Id of the lemma this form realizes. Guaranteed resolvable in the
    /// dictionary instance that produced the wordform.
    pub lemma_id: u32,
    /// Interned tag set of this form alone, without the lemma's share.
    pub tag: Arc<GramSet>,
}
