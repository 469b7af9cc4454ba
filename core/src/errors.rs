//! Error types for libmorph-core.
//!
//! Load-time fatal errors abort the whole load and carry the source line
//! where that makes sense (`Parse`). Query-time errors (`UnknownGrammeme`,
//! `UnknownLemma`, `AmbiguousPos`) always propagate to the caller; the core
//! never logs or swallows them. Soft load conditions (dangling or redundant
//! links) are not errors at all — they are counted and logged by the loader.

/// Crate-local result type defaulting to [`MorphError`].
pub type Result<T, E = MorphError> = std::result::Result<T, E>;

/// All failures produced by the lexicon engine.
#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    /// Malformed source at a specific line. Fatal; no partial dictionary
    /// is ever published after this.
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// A grammeme id was referenced but never declared.
    #[error("unknown grammeme '{0}'")]
    UnknownGrammeme(String),

    /// The same grammeme id was declared twice.
    #[error("duplicate grammeme '{0}'")]
    DuplicateGrammeme(String),

    /// Two lemmata were declared with the same external id.
    #[error("duplicate lemma id {0}")]
    DuplicateLemma(u32),

    /// A lemma id that does not exist in this dictionary instance. This is
    /// a hard failure: wordform lemma ids are guaranteed valid at freeze
    /// time, so a miss means the caller mixed up dictionary instances.
    #[error("unknown lemma id {0}")]
    UnknownLemma(u32),

    /// The same link type id was declared twice.
    #[error("duplicate link type id {0}")]
    DuplicateLinkType(u16),

    /// A link referenced a link type id that was never declared.
    #[error("unknown link type id {0}")]
    UnknownLinkType(u16),

    /// A tag bit-vector with more than one part-of-speech bit set. Always a
    /// data-integrity bug upstream of the query.
    #[error("ambiguous part of speech: {0}")]
    AmbiguousPos(String),

    /// A lifecycle violation, e.g. a snapshot whose record arrays are
    /// mutually inconsistent.
    #[error("illegal lifecycle state: {0}")]
    IllegalState(String),

    /// A compiled snapshot written by an incompatible version of this crate.
    #[error("snapshot format version {found}, expected {expected}")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl MorphError {
    /// Fatal parse error at a 1-based source line.
    pub(crate) fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Parse {
            line,
            msg: msg.into(),
        }
    }
}
