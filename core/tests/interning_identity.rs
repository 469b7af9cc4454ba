// Interning properties over a full load: structurally-equal tag sets are
// reference-identical, for source loads and snapshot reloads alike.

use std::sync::Arc;

use libmorph_core::{load_from_str, Config, MorphDictionary};

const SRC: &str = "dictionary\t0.92\t1\n\
[grammemes]\n\
POST\t-\tPOS\tpart of speech\n\
NOUN\tPOST\tnoun\t\n\
gndr\t-\tgender\t\n\
masc\tgndr\tmasculine\t\n\
nmbr\t-\tnumber\t\n\
sing\tnmbr\tsingular\t\n\
[lemmata]\n\
1\tKOT\tNOUN,masc,sing\n\
\tKOT\tsing\n\
2\tDOM\tNOUN,masc,sing\n\
\tDOM\tsing\n\
3\tSTOL\tNOUN\n\
\tSTOL\tsing\n";

fn load() -> MorphDictionary {
    load_from_str(SRC, &Config::default()).unwrap()
}

#[test]
fn equal_lemma_tags_share_one_allocation() {
    let dict = load();
    let a = &dict.lemma_by_id(1).unwrap().tag;
    let b = &dict.lemma_by_id(2).unwrap().tag;
    let c = &dict.lemma_by_id(3).unwrap().tag;
    assert!(Arc::ptr_eq(a, b), "identical tags must be interned");
    assert!(!Arc::ptr_eq(a, c), "distinct tags must stay distinct");
    assert_eq!(**a, **b);
}

#[test]
fn equal_wordform_tags_share_one_allocation() {
    let dict = load();
    let kot = dict.wordform(dict.wordform_ids("KOT")[0]).unwrap();
    let dom = dict.wordform(dict.wordform_ids("DOM")[0]).unwrap();
    let stol = dict.wordform(dict.wordform_ids("STOL")[0]).unwrap();
    assert!(Arc::ptr_eq(&kot.tag, &dom.tag));
    assert!(Arc::ptr_eq(&kot.tag, &stol.tag));
}

#[test]
fn distinct_tag_sets_counted_once() {
    let dict = load();
    // Full tags: {NOUN,masc,sing} for KOT and DOM, {NOUN,sing} for STOL.
    assert_eq!(dict.stats().distinct_full_tags, 2);
    assert!(dict.stats().distinct_tag_sets >= 3);
}

#[test]
fn snapshot_reload_reinterns() {
    let tmp = std::env::temp_dir().join("libmorph_interning_snapshot.bin");
    let dict = load();
    dict.save_bincode(&tmp).unwrap();
    let loaded = MorphDictionary::load_bincode(&tmp).unwrap();

    let a = &loaded.lemma_by_id(1).unwrap().tag;
    let b = &loaded.lemma_by_id(2).unwrap().tag;
    assert!(Arc::ptr_eq(a, b));

    let _ = std::fs::remove_file(tmp);
}

#[test]
fn pos_invariant_holds_for_every_full_tag() {
    let dict = load();
    let mut checked = 0usize;
    dict.for_each_surface(|_, ids| {
        for &i in ids {
            let wf = dict.wordform(i).unwrap();
            let full = dict.full_tag(wf).unwrap();
            // At most one POS bit; pos_of errors on violations.
            dict.model().pos_of(&full).unwrap();
            checked += 1;
        }
    });
    assert_eq!(checked, dict.stats().wordform_count);
}
