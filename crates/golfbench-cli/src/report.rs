use golfbench_benchmark::GolfBenchmarkEvent;
use golfbench_core::{GolfBenchmarkResult, HarnessReport, RankedEntry};

fn status(passed: bool) -> &'static str {
    match passed {
        true => "✅ PASS",
        false => "❌ FAIL",
    }
}

/// Live progress line(s) for one runner event.
pub fn format_event(event: &GolfBenchmarkEvent) -> Option<String> {
    match event {
        GolfBenchmarkEvent::Candidate {
            current,
            total,
            function_def,
        } => Some(format!("Testing {}/{}: {}", current, total, function_def)),
        GolfBenchmarkEvent::CandidateComplete { entry, .. } => Some(format_outcome(entry)),
        GolfBenchmarkEvent::Done { .. } => None,
    }
}

fn format_outcome(entry: &RankedEntry) -> String {
    let mut out = format!("  {} - {} tokens", status(entry.all_passed), entry.token_count);
    if entry.all_passed {
        return out;
    }

    if let Some(report) = &entry.test_results {
        let pretty = serde_json::to_string_pretty(report).unwrap_or_default();
        out.push_str(&format!("\n  Test Results: {}", pretty));
    }
    if let Some(error) = &entry.execution_error {
        out.push_str(&format!("\n  Exec Error: {}", error));
    }
    if let Some(stderr) = &entry.execution_stderr {
        out.push_str(&format!("\n  Stderr: {}", stderr));
    }
    out
}

/// `Failed tests: #3 (no board), #5` style summary of the failing cases.
fn failed_tests(report: &HarnessReport) -> String {
    let cases: Vec<String> = report
        .failed_cases()
        .map(|case| match &case.error {
            Some(error) => format!("#{} ({})", case.index, error),
            None => format!("#{}", case.index),
        })
        .collect();

    match cases.is_empty() {
        true => "Failed tests".to_string(),
        false => format!("Failed tests: {}", cases.join(", ")),
    }
}

pub fn format_ranking(result: &GolfBenchmarkResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{:=<50}\n", ""));
    out.push_str(&format!(
        "Final Results for '{}' (best first):\n",
        result.set_name
    ));

    for (rank, entry) in result.ranking.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} - {} tokens\n",
            rank + 1,
            status(entry.all_passed),
            entry.token_count
        ));
        out.push_str(&format!("   Function: {}\n", entry.function_def));
        if !entry.all_passed {
            let reason = match (&entry.execution_error, &entry.test_results) {
                (Some(error), _) => error.clone(),
                (None, Some(report)) => failed_tests(report),
                (None, None) => "Failed tests".to_string(),
            };
            out.push_str(&format!("   Error: {}\n", reason));
        }
    }

    let summary = &result.summary;
    out.push_str(&format!("\n{:-<50}\n", ""));
    out.push_str(&format!(
        "  Passed:        {}/{} ({:.0}%)\n",
        summary.candidates_passed,
        summary.candidates_total,
        summary.pass_rate * 100.0
    ));
    match summary.best_token_count {
        Some(best) => out.push_str(&format!("  Best:          {} tokens\n", best)),
        None => out.push_str("  Best:          -\n"),
    }
    out.push_str(&format!("  Avg Tokens:    {:.2}\n", summary.avg_token_count));
    out
}

fn csv_field(value: &str) -> String {
    match value.contains([',', '"', '\n', '\r']) {
        true => format!("\"{}\"", value.replace('"', "\"\"")),
        false => value.to_string(),
    }
}

/// One CSV table covering every set that was run.
pub fn format_csv(results: &[GolfBenchmarkResult]) -> String {
    let mut out = String::from("set,rank,index,passed,token_count,function_def,error\n");
    for result in results {
        out.push_str(&format_csv_rows(result));
    }
    out
}

fn format_csv_rows(result: &GolfBenchmarkResult) -> String {
    let mut out = String::new();
    for (rank, entry) in result.ranking.iter().enumerate() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_field(&result.set_name),
            rank + 1,
            entry.index,
            entry.all_passed,
            entry.token_count,
            csv_field(&entry.function_def),
            csv_field(entry.execution_error.as_deref().unwrap_or_default())
        ));
    }
    out
}
