//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Path to the trained tokenizer model
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: usize,
}

use anyhow::{ensure, Context, Result as AnyhowResult};
use bytebpe_tokenizer::Tokenizer;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Timing of one encoding mode.
struct Measurement {
    tokens: usize,
    elapsed: Duration,
}

impl Measurement {
    fn report(&self, label: &str, bytes: usize, iterations: usize) {
        let secs = self.elapsed.as_secs_f64().max(f64::EPSILON);
        let total_bytes = (bytes * iterations) as f64;
        let total_tokens = (self.tokens * iterations) as f64;

        println!("{}:", label);
        println!("  Average time: {:.3}ms", secs * 1000.0 / iterations as f64);
        println!("  Throughput: {:.2} MB/s", total_bytes / secs / 1_000_000.0);
        println!("  Throughput: {:.0} tokens/s", total_tokens / secs);
    }
}

fn measure<F>(iterations: usize, mut encode: F) -> AnyhowResult<Measurement>
where
    F: FnMut() -> AnyhowResult<usize>,
{
    // Warmup
    let tokens = encode()?;

    let start = Instant::now();
    for _ in 0..iterations {
        encode()?;
    }

    Ok(Measurement {
        tokens,
        elapsed: start.elapsed(),
    })
}

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    ensure!(cmd.iterations > 0, "iterations must be at least 1");

    let tokenizer = Tokenizer::load(Path::new(&cmd.tokenizer))?;
    let text =
        fs::read_to_string(&cmd.input).with_context(|| format!("reading {}", cmd.input))?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    println!("Benchmarking encoding...");
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", cmd.iterations);
    println!();

    let whole = measure(cmd.iterations, || Ok(tokenizer.encode(&text)?.len()))?;
    whole.report("encode", text.len(), cmd.iterations);

    let streamed = measure(cmd.iterations, || {
        let mut count = 0;
        for id in tokenizer.encode_iterable(lines.iter().copied()) {
            id?;
            count += 1;
        }
        Ok(count)
    })?;
    ensure!(
        streamed.tokens == whole.tokens,
        "streaming produced {} tokens, expected {}",
        streamed.tokens,
        whole.tokens
    );
    streamed.report("encode_iterable (by line)", text.len(), cmd.iterations);

    let batch = measure(cmd.iterations, || {
        Ok(tokenizer.encode_batch(&lines)?.iter().map(Vec::len).sum())
    })?;
    batch.report("encode_batch (by line, parallel)", text.len(), cmd.iterations);

    let ids = tokenizer.encode(&text)?;
    ensure!(tokenizer.decode(&ids) == text, "decode did not reproduce the input");
    println!();
    println!("Round trip OK: {} tokens", ids.len());

    Ok(())
}
