//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Token IDs separated by commas or whitespace ("-" reads stdin)
    #[arg(long)]
    pub tokens: String,
}

use super::read_input;
use anyhow::{Context, Result as AnyhowResult};
use bytebpe_tokenizer::Tokenizer;
use std::io::Write;
use std::path::Path;

/// Parse a list like `1, 2 3`.
pub fn parse_ids(input: &str) -> AnyhowResult<Vec<u32>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", s))
        })
        .collect()
}

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(Path::new(&cmd.tokenizer))?;
    let ids = parse_ids(&read_input(cmd.tokens)?)?;

    let text = tokenizer.decode(&ids);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
