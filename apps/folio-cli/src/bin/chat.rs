use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;

use folio_answer::{chat, AnswerSelector, ChatError, ChatResponse};
use folio_cli::{init_logging, Runtime};
use folio_vector::RetrievalContext;

/// Ask the FAQ bot a question, or start an interactive session when none is given.
#[derive(Debug, Parser)]
#[command(name = "folio-chat")]
struct Args {
    question: Option<String>,

    /// Number of chunks to retrieve (defaults to `retrieval.top_k`)
    #[arg(long)]
    top_k: Option<usize>,

    /// Print the full reply, retrieved chunks included, as JSON
    #[arg(long)]
    json: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = Runtime::load().context("Error loading config")?;
    let top_k = args.top_k.unwrap_or(runtime.settings.retrieval.top_k);
    let selector = AnswerSelector::new(runtime.settings.answer.min_ratio);
    let ctx = RetrievalContext::initialize(&runtime.artifacts_dir(), runtime.embedder()?);

    if let Some(question) = args.question {
        return match chat(&ctx, &selector, &question, top_k) {
            Ok(reply) => print_reply(&reply, args.json),
            Err(e @ ChatError::EmptyQuestion) => anyhow::bail!(e),
        };
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else { break };
        if matches!(line.trim(), "exit" | "quit") { break; }
        match chat(&ctx, &selector, &line, top_k) {
            Ok(reply) => print_reply(&reply, args.json)?,
            Err(ChatError::EmptyQuestion) => continue,
        }
    }
    Ok(())
}

fn print_reply(reply: &ChatResponse, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
    } else {
        println!("{}", reply.response);
    }
    Ok(())
}
