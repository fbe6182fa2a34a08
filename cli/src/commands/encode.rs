//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Encode stdin line by line as a stream instead of reading it whole.
    /// Requires `--input -`.
    #[arg(long, default_value_t = false)]
    pub stream: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::{format_ids, read_input};
use anyhow::{ensure, Result as AnyhowResult};
use bytebpe_tokenizer::Tokenizer;
use std::io::BufRead;
use std::path::Path;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    ensure!(
        !cmd.stream || cmd.input == "-",
        "--stream reads from stdin; pass --input -"
    );
    let tokenizer = Tokenizer::load(Path::new(&cmd.tokenizer))?;

    let ids = if cmd.stream {
        let mut reader = std::io::stdin().lock();
        let mut read_err = None;
        let lines = std::iter::from_fn(|| {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => None,
                Ok(_) => Some(line),
                Err(err) => {
                    read_err = Some(err);
                    None
                }
            }
        });

        let mut ids = Vec::new();
        for id in tokenizer.encode_iterable(lines) {
            ids.push(id?);
        }
        if let Some(err) = read_err {
            return Err(err.into());
        }
        ids
    } else {
        tokenizer.encode(&read_input(cmd.input)?)?
    };

    let output = format_ids(&ids);
    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", ids.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
