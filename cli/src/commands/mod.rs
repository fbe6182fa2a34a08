//! CLI commands for the bytebpe tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod train;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use train::TrainCommand;

use std::io::Read;

/// Read `input` as literal text, or all of stdin when it is `-`.
pub(crate) fn read_input(input: String) -> std::io::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}

/// Render IDs the way `decode --tokens` accepts them.
pub(crate) fn format_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
