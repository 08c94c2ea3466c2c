use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use folio_cli::{init_logging, Runtime};
use folio_vector::Indexer;

/// Build the retrieval artifacts from a directory of `.txt` files.
#[derive(Debug, Parser)]
#[command(name = "folio-indexer")]
struct Args {
    /// Directory holding the `.txt` sources (defaults to `data.content_dir`)
    content_dir: Option<PathBuf>,

    /// Where to write the artifacts (defaults to `artifacts.dir`)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = Runtime::load().context("Error loading config")?;
    let content_dir = args.content_dir.unwrap_or_else(|| runtime.content_dir());
    let out_dir = args.out.unwrap_or_else(|| runtime.artifacts_dir());
    tracing::info!("Indexing {} into {}", content_dir.display(), out_dir.display());

    let embedder = runtime.embedder()?;
    let summary = Indexer::new(embedder.as_ref()).with_progress(true).run(&content_dir, &out_dir)?;

    println!("Indexed {} text chunks from '{}'", summary.chunks, content_dir.display());
    tracing::info!("{} files, embedding dim {}", summary.files, summary.dim);
    Ok(())
}
