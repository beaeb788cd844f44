// Domain modules
pub mod config;
pub mod error;
pub mod golf;

pub use config::{E2bConfig, GolfBenchConfig, NodeConfig, SandboxKind};
pub use error::{GolfBenchError, Result};
pub use golf::{
    nqueens, CandidateSet, CaseResult, GolfBenchmarkResult, GolfBenchmarkSummary, HarnessReport,
    RankedEntry, RunSummary, ScriptLanguage,
};
