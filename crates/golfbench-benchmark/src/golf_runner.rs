use golfbench_core::{
    CandidateSet, GolfBenchmarkResult, GolfBenchmarkSummary, HarnessReport, RankedEntry, Result,
    RunSummary, ScriptLanguage,
};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::harness::build_harness;
use crate::sandbox::{Execution, Result as SandboxResult, Sandbox, SandboxError};
use crate::tokens::TokenCounter;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GolfBenchmarkEvent {
    Candidate {
        current: u32,
        total: u32,
        function_def: String,
    },
    CandidateComplete {
        current: u32,
        total: u32,
        entry: RankedEntry,
    },
    Done {
        summary: GolfBenchmarkSummary,
    },
}

/// Runs every candidate of a set through a sandbox, one at a time.
pub struct GolfBenchmarkRunner {
    sandbox: Box<dyn Sandbox>,
    tokens: TokenCounter,
}

impl GolfBenchmarkRunner {
    pub fn new(sandbox: Box<dyn Sandbox>) -> Result<Self> {
        Ok(Self::with_token_counter(sandbox, TokenCounter::cl100k()?))
    }

    pub fn with_token_counter(sandbox: Box<dyn Sandbox>, tokens: TokenCounter) -> Self {
        Self { sandbox, tokens }
    }

    pub async fn run(&self, set: &CandidateSet) -> Result<GolfBenchmarkResult> {
        let (tx, _) = mpsc::channel(1);
        self.run_streaming(set, tx).await
    }

    pub async fn run_streaming(
        &self,
        set: &CandidateSet,
        tx: mpsc::Sender<GolfBenchmarkEvent>,
    ) -> Result<GolfBenchmarkResult> {
        set.validate()?;
        tracing::info!(
            "Starting '{}': {} candidates x {} cases on the {} sandbox",
            set.name,
            set.candidates.len(),
            set.case_count(),
            self.sandbox.name()
        );

        let total = set.candidates.len() as u32;
        let mut entries = Vec::with_capacity(set.candidates.len());

        for (idx, function_def) in set.candidates.iter().enumerate() {
            let current = idx as u32 + 1;
            let _ = tx
                .send(GolfBenchmarkEvent::Candidate {
                    current,
                    total,
                    function_def: function_def.clone(),
                })
                .await;

            let summary = self.evaluate(set, function_def).await?;
            let entry = RankedEntry::from_summary(idx, function_def, summary);

            let _ = tx
                .send(GolfBenchmarkEvent::CandidateComplete {
                    current,
                    total,
                    entry: entry.clone(),
                })
                .await;
            entries.push(entry);
        }

        let ranking = rank(entries);
        let summary = calculate_summary(&ranking);
        let _ = tx
            .send(GolfBenchmarkEvent::Done {
                summary: summary.clone(),
            })
            .await;

        Ok(GolfBenchmarkResult {
            set_name: set.name.clone(),
            function_name: set.function_name.clone(),
            ranking,
            summary,
        })
    }

    /// Count tokens for one candidate and judge it in a fresh sandbox session.
    ///
    /// Sandbox failures mark the candidate as failed; only a malformed set
    /// is returned as an error.
    pub async fn evaluate(&self, set: &CandidateSet, function_def: &str) -> Result<RunSummary> {
        let token_count = self.tokens.count(function_def);
        let code = build_harness(
            function_def,
            &set.function_name,
            &set.inputs,
            &set.expected_outputs,
        )?;

        let (judged, execution_stderr) = match self.execute(&code, set.language).await {
            Ok(execution) => {
                let stderr = execution.stderr_text();
                (judge(execution), stderr)
            }
            Err(e) => (Err(e), None),
        };

        let summary = match judged {
            Ok((report, output)) => RunSummary {
                token_count,
                all_passed: report.pass,
                test_results: Some(report),
                execution_output: Some(output),
                execution_error: None,
                execution_stderr,
            },
            Err(e) => {
                tracing::debug!("Candidate failed in sandbox: {}", e);
                RunSummary {
                    token_count,
                    all_passed: false,
                    test_results: None,
                    execution_output: None,
                    execution_error: Some(e.to_string()),
                    execution_stderr,
                }
            }
        };

        tracing::debug!(
            "{} tokens, passed: {} ({})",
            summary.token_count,
            summary.all_passed,
            function_def
        );
        Ok(summary)
    }

    /// Run one program in a fresh session and release the session before
    /// handing back the outcome.
    async fn execute(&self, code: &str, language: ScriptLanguage) -> SandboxResult<Execution> {
        let mut session = self.sandbox.create().await?;
        let outcome = session.run_code(code, language).await;

        if let Err(e) = session.kill().await {
            tracing::warn!("Failed to kill sandbox session {}: {}", session.id(), e);
        }
        outcome
    }
}

/// Read the harness verdict out of a finished program.
fn judge(execution: Execution) -> SandboxResult<(HarnessReport, String)> {
    let execution = execution.into_result()?;
    let output = execution.stdout_text();
    let report: HarnessReport = serde_json::from_str(output.trim())
        .map_err(|e| SandboxError::MalformedOutput(format!("{} in {:?}", e, output)))?;

    Ok((report, output))
}

/// Passing entries first, each group by ascending token count. The sort is
/// stable, so ties keep their input order.
pub fn rank(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    entries.sort_by_key(|e| (!e.all_passed, e.token_count));
    entries
}

pub fn calculate_summary(entries: &[RankedEntry]) -> GolfBenchmarkSummary {
    let candidates_total = entries.len() as u32;
    let candidates_passed = entries.iter().filter(|e| e.all_passed).count() as u32;

    let pass_rate = match candidates_total {
        0 => 0.0,
        _ => candidates_passed as f64 / candidates_total as f64,
    };

    let avg_token_count = match entries.is_empty() {
        true => 0.0,
        false => {
            entries.iter().map(|e| e.token_count as f64).sum::<f64>() / entries.len() as f64
        }
    };

    let best_token_count = entries
        .iter()
        .filter(|e| e.all_passed)
        .map(|e| e.token_count)
        .min();

    GolfBenchmarkSummary {
        candidates_total,
        candidates_passed,
        pass_rate,
        best_token_count,
        avg_token_count,
    }
}
