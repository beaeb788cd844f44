pub mod candidate_loader;
pub mod golf_runner;
pub mod harness;
pub mod sandbox;
pub mod tokens;

pub use candidate_loader::{load_all_candidate_sets, load_candidate_set};
pub use golf_runner::{calculate_summary, rank, GolfBenchmarkEvent, GolfBenchmarkRunner};
pub use harness::{build_harness, escape_js_string};
pub use sandbox::{
    build_sandbox, E2bSandbox, Execution, ExecutionError, NodeSandbox, Sandbox, SandboxError,
    SandboxSession,
};
pub use tokens::TokenCounter;
