// Post-processing passes run between parse and freeze: they may rewrite
// tags, synthesize records, and inject grammemes before index masks are
// finalized.

use libmorph_core::{
    load_with_passes, Config, DictionaryBuilder, GramSet, MorphError, PostPass, Result,
};

const SRC: &str = "dictionary\t0.92\t3\n\
[grammemes]\n\
POST\t-\tPOS\tpart of speech\n\
ADJF\tPOST\tadjective\t\n\
NPRO\tPOST\tpronoun\t\n\
[lemmata]\n\
1\tKOTORYJ\tADJF\n\
\tKOTORYJ\t\n\
\tKOTOROGO\t\n";

/// Derives a pronoun reading for every adjective lemma, the way relative
/// pronouns piggyback on adjectival inflection.
struct PronounReading;

impl PostPass for PronounReading {
    fn name(&self) -> &str {
        "pronoun-reading"
    }

    fn run(&self, b: &mut DictionaryBuilder) -> Result<()> {
        let adjf = b.grammeme_index("ADJF")? as usize;
        let adjectives: Vec<String> = b
            .lemmas()
            .filter(|l| l.tag.contains(adjf))
            .map(|l| l.text.clone())
            .collect();
        for text in adjectives {
            let new_id = b.next_free_lemma_id();
            b.add_lemma(new_id, &text, &["NPRO"])?;
            b.add_wordform(new_id, &text, &[])?;
        }
        Ok(())
    }
}

#[test]
fn pass_synthesizes_analogy_lemmata() {
    let dict = load_with_passes(
        SRC.as_bytes(),
        vec![Box::new(PronounReading)],
        &Config::default(),
    )
    .unwrap();
    assert_eq!(dict.stats().lemma_count, 2);
    let entries = dict.entries("KOTORYJ");
    assert_eq!(entries.len(), 2, "adjective and synthesized pronoun reading");
}

/// Injects a marker grammeme and stamps it onto every lemma tag.
struct MarkSynthetic;

impl PostPass for MarkSynthetic {
    fn name(&self) -> &str {
        "mark-synthetic"
    }

    fn run(&self, b: &mut DictionaryBuilder) -> Result<()> {
        let idx = b.add_grammeme("Fixd", None, "fixed", "injected by a pass")?;
        let ids: Vec<u32> = b.lemmas().map(|l| l.id).collect();
        for id in ids {
            let mut tag: GramSet = {
                let lemma = b.lemma(id).expect("iterated lemma");
                (*lemma.tag).clone()
            };
            tag.set(idx as usize);
            b.set_lemma_tag(id, tag)?;
        }
        Ok(())
    }
}

#[test]
fn injected_grammeme_lands_before_mask_finalization() {
    let dict = load_with_passes(
        SRC.as_bytes(),
        vec![Box::new(MarkSynthetic)],
        &Config::default(),
    )
    .unwrap();
    let fixd = dict.model().index("Fixd").unwrap();
    let lemma = dict.lemma_by_id(1).unwrap();
    assert!(lemma.tag.contains(fixd as usize));
    // The injected grammeme is a full member of the model.
    let mask = dict.model().descendant_mask("Fixd", true).unwrap();
    assert_eq!(mask.count_ones(), 1);
}

#[test]
fn passes_run_in_registration_order() {
    struct Append(&'static str, u32);
    impl PostPass for Append {
        fn name(&self) -> &str {
            self.0
        }
        fn run(&self, b: &mut DictionaryBuilder) -> Result<()> {
            // Each pass claims the next free id; order shows in the ids.
            let id = b.next_free_lemma_id();
            assert_eq!(id, self.1);
            b.add_lemma(id, self.0, &[])
        }
    }

    let dict = load_with_passes(
        SRC.as_bytes(),
        vec![Box::new(Append("first", 2)), Box::new(Append("second", 3))],
        &Config::default(),
    )
    .unwrap();
    assert_eq!(dict.lemma_by_id(2).unwrap().text, "first");
    assert_eq!(dict.lemma_by_id(3).unwrap().text, "second");
}

#[test]
fn pass_error_aborts_whole_load() {
    struct Broken;
    impl PostPass for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn run(&self, _b: &mut DictionaryBuilder) -> Result<()> {
            Err(MorphError::IllegalState("tag-path wiring mismatch".into()))
        }
    }

    let err = load_with_passes(
        SRC.as_bytes(),
        vec![Box::new(Broken)],
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MorphError::IllegalState(_)));
}
