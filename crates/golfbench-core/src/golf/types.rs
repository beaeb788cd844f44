use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Harness output
// =============================================================================

/// One input/expected pair as judged inside the sandbox.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub index: usize,
    #[serde(default)]
    pub pass: bool,
    #[serde(default)]
    pub expected: Value,
    /// Absent when the call threw or returned `undefined`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The JSON object the harness program prints on stdout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessReport {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub pass: bool,
    #[serde(default)]
    pub results: Vec<CaseResult>,
}

impl HarnessReport {
    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.pass)
    }
}

// =============================================================================
// Per-candidate records
// =============================================================================

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub token_count: usize,
    pub all_passed: bool,
    #[serde(default)]
    pub test_results: Option<HarnessReport>,
    #[serde(default)]
    pub execution_output: Option<String>,
    #[serde(default)]
    pub execution_error: Option<String>,
    /// Whatever the program wrote to stderr, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_stderr: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Position of the candidate in the input list.
    pub index: usize,
    pub function_def: String,
    pub token_count: usize,
    pub all_passed: bool,
    #[serde(default)]
    pub test_results: Option<HarnessReport>,
    #[serde(default)]
    pub execution_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_stderr: Option<String>,
}

impl RankedEntry {
    pub fn from_summary(index: usize, function_def: &str, summary: RunSummary) -> Self {
        Self {
            index,
            function_def: function_def.to_string(),
            token_count: summary.token_count,
            all_passed: summary.all_passed,
            test_results: summary.test_results,
            execution_error: summary.execution_error,
            execution_stderr: summary.execution_stderr,
        }
    }
}

// =============================================================================
// Whole-run results
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GolfBenchmarkSummary {
    pub candidates_total: u32,
    pub candidates_passed: u32,
    pub pass_rate: f64,
    #[serde(default)]
    pub best_token_count: Option<usize>,
    pub avg_token_count: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GolfBenchmarkResult {
    pub set_name: String,
    pub function_name: String,
    /// Best first.
    pub ranking: Vec<RankedEntry>,
    pub summary: GolfBenchmarkSummary,
}
