mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use golfbench_benchmark::{
    build_sandbox, load_all_candidate_sets, load_candidate_set, GolfBenchmarkRunner,
};
use golfbench_core::{nqueens, CandidateSet, GolfBenchConfig, GolfBenchmarkResult, SandboxKind};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "golfbench")]
#[command(about = "Rank code-golf candidates by correctness, then token count", long_about = None)]
struct Cli {
    /// Candidate set JSON file, or a directory of them (defaults to the
    /// built-in N-Queens set)
    #[arg(short, long)]
    candidates: Option<PathBuf>,

    /// Sandbox backend (node, e2b)
    #[arg(short, long)]
    sandbox: Option<SandboxKind>,

    /// Node binary used by the node sandbox
    #[arg(long)]
    node_bin: Option<String>,

    /// Per-candidate execution timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl Cli {
    /// Environment first, then flags on top.
    fn resolve_config(&self) -> Result<GolfBenchConfig> {
        let mut config = GolfBenchConfig::from_env()?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut GolfBenchConfig) {
        if let Some(kind) = self.sandbox {
            config.sandbox = kind;
        }
        if let Some(bin) = &self.node_bin {
            config.node.node_bin = bin.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.node.timeout_ms = timeout_ms;
            config.e2b.request_timeout_ms = timeout_ms;
        }
    }

    fn candidate_sets(&self) -> Result<Vec<CandidateSet>> {
        match &self.candidates {
            Some(path) if path.is_dir() => {
                let sets = load_all_candidate_sets(path)?;
                if sets.is_empty() {
                    anyhow::bail!("no candidate sets (*.json) in {}", path.display());
                }
                Ok(sets)
            }
            Some(path) => Ok(vec![load_candidate_set(path)?]),
            None => Ok(vec![nqueens::candidate_set()]),
        }
    }
}

async fn run_set(
    runner: &GolfBenchmarkRunner,
    set: &CandidateSet,
    live: bool,
) -> Result<GolfBenchmarkResult> {
    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !live {
                continue;
            }
            if let Some(line) = report::format_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = runner.run_streaming(set, tx).await?;
    printer.await?;
    Ok(result)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let sets = cli.candidate_sets()?;

    let runner = GolfBenchmarkRunner::new(build_sandbox(&config)?)?;
    let live = cli.output == OutputFormat::Table;

    let mut results = Vec::with_capacity(sets.len());
    for set in &sets {
        let result = run_set(&runner, set, live).await?;
        if live {
            print!("{}", report::format_ranking(&result));
        }
        results.push(result);
    }

    match cli.output {
        OutputFormat::Table => {}
        OutputFormat::Json => match results.as_slice() {
            [single] => println!("{}", serde_json::to_string_pretty(single)?),
            all => println!("{}", serde_json::to_string_pretty(all)?),
        },
        OutputFormat::Csv => print!("{}", report::format_csv(&results)),
    }

    Ok(())
}
