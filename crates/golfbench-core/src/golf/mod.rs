mod candidate_set;
mod language;
pub mod nqueens;
mod types;

pub use candidate_set::CandidateSet;
pub use language::ScriptLanguage;
pub use types::{
    CaseResult, GolfBenchmarkResult, GolfBenchmarkSummary, HarnessReport, RankedEntry, RunSummary,
};
