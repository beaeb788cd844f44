use golfbench_core::{GolfBenchError, Result};
use tiktoken_rs::CoreBPE;

/// Name of the BPE encoding used for all counts.
pub const ENCODING: &str = "cl100k_base";

/// Counts tokens with a fixed BPE encoding. Loading the encoding is the
/// expensive part, so build one counter per run and share it.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            GolfBenchError::Tokenizer(format!("failed to load {}: {}", ENCODING, e))
        })?;
        tracing::debug!("Loaded {} encoding", ENCODING);
        Ok(Self { bpe })
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}
