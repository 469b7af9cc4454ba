//! Streaming loader for the dictionary source format.
//!
//! The source is line-oriented UTF-8 text with tab-separated fields and
//! bracketed section headers:
//!
//! ```text
//! dictionary<TAB>0.92<TAB>417127
//! [grammemes]
//! POST<TAB>-<TAB>POS<TAB>part of speech
//! NOUN<TAB>POST<TAB>noun<TAB>
//! [lemmata]
//! 1<TAB>KOT<TAB>NOUN,masc
//! <TAB>KOT<TAB>sing,nomn
//! <TAB>KOTA<TAB>sing,gent
//! [link_types]
//! 0<TAB>derivation
//! [links]
//! 1<TAB>2<TAB>0
//! ```
//!
//! One line is one element. Lines starting with a TAB are wordforms of
//! the lemma opened by the closest preceding lemma line. Blank lines and
//! `#` comment lines are skipped. Sections must appear in schema order;
//! `[restrictions]` is consumed but ignored (it belongs to a different
//! component). Every element that is illegal for the current state is a
//! fatal parse error carrying the 1-based line number — no partial
//! dictionary is ever published.
//!
//! The parse drives [`DictionaryBuilder`]; post-processing and freezing
//! (the `PostProcessing` and `Frozen` stages) happen inside
//! [`DictionaryBuilder::freeze`] once the stream is exhausted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::builder::{DictionaryBuilder, PostPass};
use crate::dictionary::MorphDictionary;
use crate::errors::{MorphError, Result};
use crate::predictor::SuffixAnalogyPredictor;
use crate::Config;

/// Parse states, in the only order the schema permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LoadState {
    /// Nothing consumed; the only legal element is the header line.
    Empty,
    /// Header consumed; a section header must follow.
    Header,
    Grammemes,
    Restrictions,
    Lemmata,
    LinkTypes,
    Links,
}

/// Load a dictionary from a source file.
pub fn load_from_path<P: AsRef<Path>>(path: P, cfg: &Config) -> Result<MorphDictionary> {
    let file = File::open(path)?;
    load_from_reader(BufReader::new(file), cfg)
}

/// Load a dictionary from an in-memory source (tests, embedded data).
pub fn load_from_str(source: &str, cfg: &Config) -> Result<MorphDictionary> {
    load_from_reader(source.as_bytes(), cfg)
}

/// Load a dictionary from any buffered reader, with no extra passes.
pub fn load_from_reader<R: BufRead>(reader: R, cfg: &Config) -> Result<MorphDictionary> {
    load_with_passes(reader, Vec::new(), cfg)
}

/// Load a dictionary, running `passes` after parsing and before freeze.
pub fn load_with_passes<R: BufRead>(
    reader: R,
    passes: Vec<Box<dyn PostPass>>,
    cfg: &Config,
) -> Result<MorphDictionary> {
    let mut builder = DictionaryBuilder::new();
    for pass in passes {
        builder.add_pass(pass);
    }

    let mut state = LoadState::Empty;
    let mut current_lemma: Option<u32> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = i + 1;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            state = transition(state, section, lineno)?;
            current_lemma = None;
            debug!(section, line = lineno, "entering section");
            continue;
        }
        match state {
            LoadState::Empty => {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 3 || parts[0] != "dictionary" {
                    return Err(MorphError::parse(
                        lineno,
                        "expected header 'dictionary<TAB>version<TAB>revision'",
                    ));
                }
                builder.set_source_meta(parts[1], parts[2]);
                state = LoadState::Header;
            }
            LoadState::Header => {
                return Err(MorphError::parse(lineno, "expected a section header"));
            }
            LoadState::Grammemes => {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 3 {
                    return Err(MorphError::parse(
                        lineno,
                        "grammeme line needs id, parent and name fields",
                    ));
                }
                let parent = if parts[1] == "-" { None } else { Some(parts[1]) };
                let description = parts.get(3).copied().unwrap_or("");
                builder
                    .add_grammeme(parts[0], parent, parts[2], description)
                    .map_err(|e| at_line(lineno, e))?;
            }
            LoadState::Restrictions => {
                // Consumed elsewhere in the pipeline; skipped here.
            }
            LoadState::Lemmata => {
                if let Some(rest) = line.strip_prefix('\t') {
                    let lemma_id = current_lemma.ok_or_else(|| {
                        MorphError::parse(lineno, "wordform line outside a lemma block")
                    })?;
                    let mut fields = rest.splitn(2, '\t');
                    let surface = fields.next().unwrap_or("");
                    let tags = parse_tags(fields.next().unwrap_or(""));
                    builder
                        .add_wordform(lemma_id, surface, &tags)
                        .map_err(|e| at_line(lineno, e))?;
                } else {
                    let parts: Vec<&str> = line.split('\t').collect();
                    if parts.len() < 2 {
                        return Err(MorphError::parse(
                            lineno,
                            "lemma line needs id and text fields",
                        ));
                    }
                    let id: u32 = parts[0].parse().map_err(|_| {
                        MorphError::parse(lineno, format!("invalid lemma id '{}'", parts[0]))
                    })?;
                    let tags = parse_tags(parts.get(2).copied().unwrap_or(""));
                    builder
                        .add_lemma(id, parts[1], &tags)
                        .map_err(|e| at_line(lineno, e))?;
                    current_lemma = Some(id);
                }
            }
            LoadState::LinkTypes => {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 2 {
                    return Err(MorphError::parse(
                        lineno,
                        "link type line needs id and name fields",
                    ));
                }
                let id: u16 = parts[0].parse().map_err(|_| {
                    MorphError::parse(lineno, format!("invalid link type id '{}'", parts[0]))
                })?;
                builder
                    .add_link_type(id, parts[1])
                    .map_err(|e| at_line(lineno, e))?;
            }
            LoadState::Links => {
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 3 {
                    return Err(MorphError::parse(
                        lineno,
                        "link line needs from, to and type fields",
                    ));
                }
                let from: u32 = parts[0].parse().map_err(|_| {
                    MorphError::parse(lineno, format!("invalid lemma id '{}'", parts[0]))
                })?;
                let to: u32 = parts[1].parse().map_err(|_| {
                    MorphError::parse(lineno, format!("invalid lemma id '{}'", parts[1]))
                })?;
                let ty: u16 = parts[2].parse().map_err(|_| {
                    MorphError::parse(lineno, format!("invalid link type id '{}'", parts[2]))
                })?;
                builder.add_link(from, to, ty).map_err(|e| at_line(lineno, e))?;
            }
        }
    }

    if state == LoadState::Empty {
        return Err(MorphError::parse(1, "source contains no header"));
    }

    let dict = builder.freeze()?;
    Ok(if cfg.predict {
        dict.with_predictor(Box::new(SuffixAnalogyPredictor::new(
            cfg.min_prediction_prefix,
            cfg.max_predictions,
        )))
    } else {
        dict
    })
}

fn transition(state: LoadState, section: &str, lineno: usize) -> Result<LoadState> {
    let next = match section {
        "grammemes" => LoadState::Grammemes,
        "restrictions" => LoadState::Restrictions,
        "lemmata" => LoadState::Lemmata,
        "link_types" => LoadState::LinkTypes,
        "links" => LoadState::Links,
        other => {
            return Err(MorphError::parse(
                lineno,
                format!("unknown section '[{}]'", other),
            ))
        }
    };
    if state == LoadState::Empty {
        return Err(MorphError::parse(
            lineno,
            format!("section '[{}]' before the dictionary header", section),
        ));
    }
    if next <= state {
        return Err(MorphError::parse(
            lineno,
            format!("section '[{}]' out of schema order", section),
        ));
    }
    Ok(next)
}

fn parse_tags(s: &str) -> Vec<&str> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn at_line(lineno: usize, err: MorphError) -> MorphError {
    match err {
        e @ MorphError::Parse { .. } => e,
        other => MorphError::parse(lineno, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "dictionary\t0.92\t417127\n\
[grammemes]\n\
POST\t-\tPOS\tpart of speech\n\
NOUN\tPOST\tnoun\t\n\
ADJF\tPOST\tadjective\t\n\
gndr\t-\tgender\t\n\
masc\tgndr\tmasculine\t\n\
nmbr\t-\tnumber\t\n\
sing\tnmbr\tsingular\t\n\
CAse\t-\tcase\t\n\
nomn\tCAse\tnominative\t\n\
gent\tCAse\tgenitive\t\n\
[restrictions]\n\
whatever this says is not ours to parse\n\
[lemmata]\n\
1\tKOT\tNOUN,masc\n\
\tKOT\tsing,nomn\n\
\tKOTA\tsing,gent\n\
2\tKOTORYJ\tADJF\n\
\tKOTORYJ\tsing,nomn\n\
\tKOTOROGO\tsing,gent\n\
[link_types]\n\
0\tderivation\n\
[links]\n\
1\t2\t0\n\
2\t99\t0\n";

    #[test]
    fn loads_well_formed_source() {
        let dict = load_from_str(SRC, &Config::default()).unwrap();
        assert_eq!(dict.version(), "0.92");
        assert_eq!(dict.revision(), "417127");
        assert_eq!(dict.stats().lemma_count, 2);
        assert_eq!(dict.stats().wordform_count, 4);
        assert_eq!(dict.stats().link_count, 1);
        assert_eq!(dict.stats().dropped_links, 1);
        assert!(dict.has_predictor());
    }

    #[test]
    fn predictor_respects_config() {
        let cfg = Config {
            predict: false,
            ..Config::default()
        };
        let dict = load_from_str(SRC, &cfg).unwrap();
        assert!(!dict.has_predictor());
        assert!(dict.entries("KOTU").is_empty());
    }

    #[test]
    fn missing_header_is_fatal() {
        let err = load_from_str("[grammemes]\n", &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 1, .. }));
    }

    #[test]
    fn unexpected_element_after_header_is_fatal() {
        let src = "dictionary\t1\t2\nPOST\t-\tPOS\t\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 2, .. }));
    }

    #[test]
    fn unknown_section_is_fatal() {
        let src = "dictionary\t1\t2\n[phonemes]\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 2, .. }));
    }

    #[test]
    fn out_of_order_section_is_fatal() {
        let src = "dictionary\t1\t2\n[lemmata]\n[grammemes]\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 3, .. }));
    }

    #[test]
    fn wordform_outside_lemma_block_is_fatal() {
        let src = "dictionary\t1\t2\n[grammemes]\nPOST\t-\tPOS\t\n[lemmata]\n\tKOT\t\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 5, .. }));
    }

    #[test]
    fn undeclared_grammeme_reference_is_fatal_with_line() {
        let src = "dictionary\t1\t2\n[grammemes]\nPOST\t-\tPOS\t\n[lemmata]\n1\tKOT\tNOUN\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        match err {
            MorphError::Parse { line, msg } => {
                assert_eq!(line, 5);
                assert!(msg.contains("NOUN"), "message should name the grammeme: {}", msg);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_lemma_id_is_fatal_with_line() {
        let src = "dictionary\t1\t2\n[grammemes]\nPOST\t-\tPOS\t\n[lemmata]\n\
1\tKOT\t\n1\tDOM\t\n";
        let err = load_from_str(src, &Config::default()).unwrap_err();
        assert!(matches!(err, MorphError::Parse { line: 6, .. }));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let src = "# compiled from the morphology db\n\ndictionary\t1\t2\n\n[grammemes]\n\
# parts of speech\nPOST\t-\tPOS\t\n";
        let dict = load_from_str(src, &Config::default()).unwrap();
        assert_eq!(dict.model().len(), 1);
    }
}
