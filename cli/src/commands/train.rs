//! Train command implementation.

use clap::{Parser, ValueEnum};

/// Pair statistics engine, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Recount all pairs after every merge
    Recount,
    /// Update only the words a merge touched
    Incremental,
}

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training data file
    #[arg(short, long)]
    pub input: String,

    /// Output directory for the trained model
    #[arg(short, long)]
    pub output: String,

    /// Target vocabulary size, including bytes and special tokens
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Special token (may be repeated)
    #[arg(short = 's', long = "special-token")]
    pub special_tokens: Vec<String>,

    /// Pair statistics engine
    #[arg(long, value_enum, default_value_t = Strategy::Incremental)]
    pub strategy: Strategy,
}

use anyhow::{Context, Result as AnyhowResult};
use bytebpe_tokenizer::Tokenizer;
use bytebpe_training::{BpeTrainer, StatsStrategy, TrainingConfig};
use log::info;
use std::path::Path;
use std::time::Instant;

impl From<Strategy> for StatsStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Recount => StatsStrategy::Recount,
            Strategy::Incremental => StatsStrategy::Incremental,
        }
    }
}

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let config = TrainingConfig::default()
        .with_vocab_size(cmd.vocab_size)
        .with_special_tokens(&cmd.special_tokens)
        .with_strategy(cmd.strategy.into());

    info!(
        "Training on {} (vocab size {}, {} special tokens)",
        cmd.input,
        cmd.vocab_size,
        config.special_tokens.len()
    );

    let start = Instant::now();
    let model = BpeTrainer::new(config)
        .train_file(&cmd.input)
        .with_context(|| format!("training on {}", cmd.input))?;
    info!("Training completed in {:.2}s", start.elapsed().as_secs_f64());

    let tokenizer = Tokenizer::from_model(model)?;
    tokenizer
        .save(Path::new(&cmd.output))
        .with_context(|| format!("saving model to {}", cmd.output))?;

    println!(
        "Saved {} tokens ({} merges) to {}",
        tokenizer.vocab_size(),
        tokenizer.merges().len(),
        cmd.output
    );

    Ok(())
}
