// Inspect a dictionary source or compiled snapshot: sizes, interning
// ratios, soft-failure counters, optionally the full key list.

use anyhow::Result;
use clap::Parser;
use libmorph_core::{load_from_path, Config, MorphDictionary};

#[derive(Parser, Debug)]
#[command(about = "Print statistics for a morphological dictionary")]
struct Args {
    /// Dictionary source file (text format) or compiled snapshot
    path: String,

    /// Treat the input as a bincode snapshot instead of text source
    #[arg(long)]
    snapshot: bool,

    /// Emit the stats as JSON
    #[arg(long)]
    json: bool,

    /// Also list every surface key with its wordform count
    #[arg(long)]
    keys: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let dict = if args.snapshot {
        MorphDictionary::load_bincode(&args.path)?
    } else {
        load_from_path(&args.path, &Config::default())?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(dict.stats())?);
    } else {
        let s = dict.stats();
        println!("dictionary {} rev {}", dict.version(), dict.revision());
        println!("grammemes:         {}", dict.model().len());
        println!("lemmata:           {}", s.lemma_count);
        println!("wordforms:         {}", s.wordform_count);
        println!("surface keys:      {}", s.surface_count);
        println!("interned tag sets: {}", s.distinct_tag_sets);
        println!("distinct full tags:{}", s.distinct_full_tags);
        println!("links:             {}", s.link_count);
        println!("dropped links:     {}", s.dropped_links);
        println!("redundant links:   {}", s.redundant_links);
        if s.wordform_count > 0 {
            let ratio = s.wordform_count as f64 / s.distinct_tag_sets.max(1) as f64;
            println!("forms per tag set: {:.1}", ratio);
        }
    }

    if args.keys {
        dict.for_each_surface(|key, ids| {
            println!("{}\t{}", key, ids.len());
        });
    }

    Ok(())
}
