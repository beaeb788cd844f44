//! Isolated execution contexts for harness programs.
//!
//! A [`Sandbox`] hands out one [`SandboxSession`] per candidate. Callers must
//! call [`SandboxSession::kill`] once they are done with a session, whether
//! or not the run succeeded; remote backends bill for live sessions.

mod e2b;
mod node;

pub use e2b::E2bSandbox;
pub use node::NodeSandbox;

use async_trait::async_trait;
use golfbench_core::{GolfBenchConfig, Result as CoreResult, SandboxKind, ScriptLanguage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Sandbox creation failed: {0}")]
    Create(String),
    #[error("{0}")]
    Execution(ExecutionError),
    #[error("Timeout after {0}ms")]
    Timeout(u64),
    #[error("Malformed output: {0}")]
    MalformedOutput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Error raised by the program itself (uncaught exception, non-zero exit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub name: String,
    pub value: String,
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Captured output of one program run.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub error: Option<ExecutionError>,
}

impl Execution {
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    /// Captured stderr, or `None` when the program wrote nothing there.
    pub fn stderr_text(&self) -> Option<String> {
        let text = self.stderr.join("\n");
        match text.trim().is_empty() {
            true => None,
            false => Some(text),
        }
    }

    /// Turn a program-level error into a [`SandboxError::Execution`].
    pub fn into_result(self) -> Result<Self> {
        match self.error {
            Some(error) => Err(SandboxError::Execution(error)),
            None => Ok(self),
        }
    }
}

#[async_trait]
pub trait Sandbox: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create(&self) -> Result<Box<dyn SandboxSession>>;
}

#[async_trait]
pub trait SandboxSession: Send {
    fn id(&self) -> &str;

    async fn run_code(&mut self, code: &str, language: ScriptLanguage) -> Result<Execution>;

    /// Release the session. Further `run_code` calls fail after this.
    async fn kill(&mut self) -> Result<()>;
}

pub fn build_sandbox(config: &GolfBenchConfig) -> CoreResult<Box<dyn Sandbox>> {
    config.validate()?;
    let sandbox: Box<dyn Sandbox> = match config.sandbox {
        SandboxKind::Node => Box::new(NodeSandbox::new(config.node.clone())),
        SandboxKind::E2b => Box::new(E2bSandbox::new(config.e2b.clone())?),
    };
    tracing::info!("Using {} sandbox", sandbox.name());
    Ok(sandbox)
}
