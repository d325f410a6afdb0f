use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use cspar_lexicon::{compile_source, read_archive, to_archive_bytes, Lexicon, LexiconSource};

#[derive(Parser)]
#[command(author, version, about = "Compiles a JSON lexicon source to an rkyv archive")]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Also write the flattened node arena as JSON (for inspection)
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("📖 Reading lexicon source from {:?}...", cli.input);
    let input_data = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    // 1. Parse and check the source builds a usable lexicon
    let source = LexiconSource::from_json(&input_data)?;
    Lexicon::from_source(&source)?;

    // 2. Flatten templates into the node arena
    let data = compile_source(&source)?;
    println!(
        "⚙️  Compiling lexicon '{}' with {} entries, {} rules, {} nodes...",
        data.id,
        data.entries.len(),
        data.rules.len(),
        data.nodes.len()
    );

    if let Some(dump) = &cli.dump {
        fs::write(dump, serde_json::to_string_pretty(&data)?)
            .with_context(|| format!("writing {}", dump.display()))?;
    }

    // 3. Serialize to RKYV and make sure it reads back
    let bytes = to_archive_bytes(&data)?;
    read_archive(&bytes)?;

    // 4. Write Binary
    fs::write(&cli.output, &bytes).with_context(|| format!("writing {}", cli.output.display()))?;

    println!("✅ Success! Binary written to {:?}", cli.output);
    Ok(())
}
