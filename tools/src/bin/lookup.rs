// Interactive-ish lookup against a dictionary: normalizes query words the
// way a pipeline collaborator would (NFC + lowercasing happens here, not
// in the engine), then prints every interpretation.

use anyhow::Result;
use clap::Parser;
use libmorph_core::{load_from_path, Config};
use unicode_normalization::UnicodeNormalization;

#[derive(Parser, Debug)]
#[command(about = "Look up words in a morphological dictionary")]
struct Args {
    /// Dictionary source file (text format)
    dict: String,

    /// Words to look up
    words: Vec<String>,

    /// Engine configuration (TOML); defaults apply when absent
    #[arg(long)]
    config: Option<String>,

    /// Keep query case instead of lowercasing
    #[arg(long)]
    keep_case: bool,

    /// Also print link neighborhoods of each matched lemma
    #[arg(long)]
    links: bool,
}

fn normalize(word: &str, keep_case: bool) -> String {
    let nfc: String = word.nfc().collect();
    if keep_case {
        nfc
    } else {
        nfc.to_lowercase()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::load_toml(path)?,
        None => Config::default(),
    };
    let dict = load_from_path(&args.dict, &cfg)?;

    for word in &args.words {
        let query = normalize(word, args.keep_case);
        let entries = dict.entries(&query);
        if entries.is_empty() {
            println!("{}: no interpretation", word);
            continue;
        }
        for e in &entries {
            let tags = dict.model().tag_to_ids(&e.tag).join(",");
            println!("{}: lemma {} ({}) [{}]", word, e.lemma, e.lemma_id, tags);
            if args.links {
                let n = dict.links_of(e.lemma_id);
                for (to, ty) in &n.outgoing {
                    let name = dict.link_type_name(*ty).unwrap_or("?");
                    println!("  -> {} ({})", to, name);
                }
                for (from, ty) in &n.incoming {
                    let name = dict.link_type_name(*ty).unwrap_or("?");
                    println!("  <- {} ({})", from, name);
                }
            }
        }
    }

    Ok(())
}
