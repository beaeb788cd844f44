use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use golfbench_core::{NodeConfig, ScriptLanguage};
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::{Execution, ExecutionError, Result, Sandbox, SandboxError, SandboxSession};

/// Runs each program in a fresh `node` process inside its own temporary
/// directory, with a scrubbed environment and node's permission model on.
///
/// The only filesystem grant is read access to the harness script itself.
/// Writes, child processes, workers and native addons are all denied.
pub struct NodeSandbox {
    config: NodeConfig,
    next_id: AtomicU64,
    permission: Arc<OnceCell<&'static str>>,
}

impl NodeSandbox {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            permission: Arc::new(OnceCell::new()),
        }
    }
}

#[async_trait]
impl Sandbox for NodeSandbox {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn create(&self) -> Result<Box<dyn SandboxSession>> {
        let temp_dir = tempfile::Builder::new()
            .prefix("golfbench-")
            .tempdir()
            .map_err(|e| SandboxError::Create(format!("temp dir: {}", e)))?;
        let id = format!("node-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!("Created session {} in {}", id, temp_dir.path().display());

        Ok(Box::new(NodeSession {
            id,
            node_bin: self.config.node_bin.clone(),
            timeout_ms: self.config.timeout_ms,
            permission: self.permission.clone(),
            temp_dir: Some(temp_dir),
        }))
    }
}

/// The permission-model flag understood by the node that printed `version`.
/// `None` for releases without a permission model.
fn permission_flag(version: &str) -> Option<&'static str> {
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    match (major, minor) {
        (0..=19, _) => None,
        (20..=21, _) | (22, 0..=12) | (23, 0..=4) => Some("--experimental-permission"),
        _ => Some("--permission"),
    }
}

/// Ask the node binary for its version and pick the flag from it.
async fn detect_permission_flag(node_bin: &str) -> Result<&'static str> {
    let output = Command::new(node_bin)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| SandboxError::Create(format!("failed to start {}: {}", node_bin, e)))?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match permission_flag(&version) {
        Some(flag) => {
            tracing::debug!("node {} isolates candidates with {}", version, flag);
            Ok(flag)
        }
        None => {
            tracing::warn!(
                "node {:?} has no permission model, refusing to run untrusted code",
                version
            );
            Err(SandboxError::Create(format!(
                "node {:?} cannot isolate candidates (v20 or newer required)",
                version
            )))
        }
    }
}

struct NodeSession {
    id: String,
    node_bin: String,
    timeout_ms: u64,
    permission: Arc<OnceCell<&'static str>>,
    temp_dir: Option<TempDir>,
}

#[async_trait]
impl SandboxSession for NodeSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run_code(&mut self, code: &str, language: ScriptLanguage) -> Result<Execution> {
        let dir = self
            .temp_dir
            .as_ref()
            .ok_or_else(|| SandboxError::Create(format!("session {} was already killed", self.id)))?
            .path()
            .to_path_buf();

        let permission = *self
            .permission
            .get_or_try_init(|| detect_permission_flag(&self.node_bin))
            .await?;

        let script_path = dir.join(format!("harness.{}", language.file_extension()));
        fs::write(&script_path, code).await?;

        let mut cmd = Command::new(&self.node_bin);
        cmd.arg(permission)
            .arg(format!("--allow-fs-read={}", script_path.display()))
            .arg("--no-warnings")
            .arg(&script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .current_dir(&dir)
            .env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }

        let child = cmd
            .spawn()
            .map_err(|e| SandboxError::Create(format!("failed to start {}: {}", self.node_bin, e)))?;

        let start = Instant::now();
        let timeout = Duration::from_millis(self.timeout_ms);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(SandboxError::Timeout(self.timeout_ms)),
        };
        tracing::debug!(
            "Session {} exited with {} after {:.1}ms",
            self.id,
            output.status,
            start.elapsed().as_secs_f64() * 1000.0
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let error = match output.status.success() {
            true => None,
            false => Some(parse_node_error(&stderr, output.status.code())),
        };

        Ok(Execution {
            stdout: stdout.lines().map(str::to_string).collect(),
            stderr: stderr.lines().map(str::to_string).collect(),
            error,
        })
    }

    async fn kill(&mut self) -> Result<()> {
        if let Some(dir) = self.temp_dir.take() {
            dir.close()?;
            tracing::debug!("Killed session {}", self.id);
        }
        Ok(())
    }
}

/// Pull `Name: message` out of node's uncaught-exception dump.
fn parse_node_error(stderr: &str, code: Option<i32>) -> ExecutionError {
    let thrown = stderr.lines().map(str::trim).find_map(|line| {
        let (name, value) = line.split_once(": ")?;
        let is_error_name =
            name.ends_with("Error") && name.chars().all(|c| c.is_ascii_alphanumeric());
        is_error_name.then(|| ExecutionError {
            name: name.to_string(),
            value: value.to_string(),
        })
    });

    thrown.unwrap_or_else(|| ExecutionError {
        name: "ExitStatus".to_string(),
        value: match code {
            Some(code) => format!("node exited with code {}: {}", code, stderr.trim()),
            None => format!("node was terminated by a signal: {}", stderr.trim()),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::build_harness;
    use golfbench_core::HarnessReport;
    use serde_json::json;

    // Needs `node` (v20+) on PATH; these fail rather than skip without it.
    fn node_sandbox() -> NodeSandbox {
        NodeSandbox::new(NodeConfig::default())
    }

    fn nqueens_cases() -> ([serde_json::Value; 6], [serde_json::Value; 6]) {
        (
            [4, 1, 2, 3, 5, 8].map(|n| json!(n)),
            [2, 1, 0, 0, 10, 92].map(|n| json!(n)),
        )
    }

    async fn run_harness(candidate: &str) -> HarnessReport {
        let (inputs, expected) = nqueens_cases();
        let code = build_harness(candidate, "nqueens", &inputs, &expected).unwrap();
        let execution = run_program(&node_sandbox(), &code).await.unwrap();
        serde_json::from_str(execution.stdout_text().trim()).unwrap()
    }

    async fn run_program(sandbox: &NodeSandbox, code: &str) -> Result<Execution> {
        let mut session = sandbox.create().await?;
        let result = session.run_code(code, ScriptLanguage::JavaScript).await;
        session.kill().await?;
        result
    }

    #[test]
    fn test_parse_node_error_finds_thrown_error() {
        let stderr = "/tmp/harness.js:3\n    eval(functionDefinition);\n    ^\n\nReferenceError: window is not defined\n    at eval (eval at runTests)\n";
        let err = parse_node_error(stderr, Some(1));
        assert_eq!(err.name, "ReferenceError");
        assert_eq!(err.value, "window is not defined");
    }

    #[test]
    fn test_parse_node_error_falls_back_to_exit_code() {
        let err = parse_node_error("something odd", Some(7));
        assert_eq!(err.name, "ExitStatus");
        assert!(err.value.contains("code 7"));
    }

    #[test]
    fn test_permission_flag_by_release() {
        assert_eq!(permission_flag("v18.19.0"), None);
        assert_eq!(permission_flag("v20.20.2"), Some("--experimental-permission"));
        assert_eq!(permission_flag("v22.12.0"), Some("--experimental-permission"));
        assert_eq!(permission_flag("v22.13.0\n"), Some("--permission"));
        assert_eq!(permission_flag("v24.1.0"), Some("--permission"));
        assert_eq!(permission_flag("not a version"), None);
    }

    #[tokio::test]
    async fn test_missing_node_refuses_to_run() {
        let sandbox = NodeSandbox::new(NodeConfig {
            node_bin: "/nonexistent/golfbench-node".to_string(),
            ..Default::default()
        });
        let result = run_program(&sandbox, "1").await;
        assert!(matches!(result, Err(SandboxError::Create(_))));
    }

    #[tokio::test]
    async fn test_kill_removes_workspace() {
        let sandbox = NodeSandbox::new(NodeConfig::default());
        let mut session = sandbox.create().await.unwrap();
        session.kill().await.unwrap();
        let result = session.run_code("1", ScriptLanguage::JavaScript).await;
        assert!(matches!(result, Err(SandboxError::Create(_))));
        // Second kill is a no-op.
        assert!(session.kill().await.is_ok());
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let sandbox = NodeSandbox::new(NodeConfig::default());
        let mut a = sandbox.create().await.unwrap();
        let mut b = sandbox.create().await.unwrap();
        assert_ne!(a.id(), b.id());
        a.kill().await.unwrap();
        b.kill().await.unwrap();
    }

    #[tokio::test]
    async fn test_captures_stdout_lines() {
        let sandbox = node_sandbox();
        let execution = run_program(&sandbox, "console.log('one');\nconsole.log('two');")
            .await
            .unwrap();
        assert_eq!(execution.stdout, vec!["one", "two"]);
        assert!(execution.error.is_none());
    }

    #[tokio::test]
    async fn test_uncaught_error_reported() {
        let sandbox = node_sandbox();
        let execution = run_program(&sandbox, "window.a = 1;").await.unwrap();
        let error = execution.error.unwrap();
        assert_eq!(error.name, "ReferenceError");
        assert!(error.value.contains("window"));
    }

    #[tokio::test]
    async fn test_timeout_kills_program() {
        let mut sandbox = node_sandbox();
        sandbox.config.timeout_ms = 200;
        let result = run_program(&sandbox, "while (true) {}").await;
        assert!(matches!(result, Err(SandboxError::Timeout(200))));
    }

    #[tokio::test]
    async fn test_escaped_candidate_round_trips_through_eval() {
        let sandbox = node_sandbox();
        let original = "s=\"q\\\\\"\n\tt\r";
        let code = format!(
            "process.stdout.write(JSON.stringify(\"{}\"));",
            crate::harness::escape_js_string(original)
        );
        let execution = run_program(&sandbox, &code).await.unwrap();
        let decoded: String = serde_json::from_str(&execution.stdout_text()).unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn test_harness_passes_literal_answers() {
        let report = run_harness("a=[2,1,0,0,10,92];nqueens=_=>a.shift()").await;
        assert!(report.ok);
        assert!(report.pass);
        assert_eq!(report.results.len(), 6);
        assert!(report.results.iter().all(|r| r.pass));
    }

    #[tokio::test]
    async fn test_harness_records_thrown_error_per_case() {
        let report = run_harness(
            "a={4:2,1:1,2:0,5:10,8:92};nqueens=n=>{if(n==3)throw new Error('no board');return a[n]}",
        )
        .await;
        assert!(!report.pass);

        let failed = &report.results[3];
        assert_eq!(failed.index, 3);
        assert!(!failed.pass);
        assert_eq!(failed.actual, None);
        assert_eq!(failed.error.as_deref(), Some("no board"));
        assert!(report
            .results
            .iter()
            .filter(|r| r.index != 3)
            .all(|r| r.pass));
    }

    #[tokio::test]
    async fn test_candidate_cannot_write_outside_session() {
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("escaped.txt");
        let candidate = format!(
            "a=[2,1,0,0,10,92];nqueens=_=>(require('fs').writeFileSync('{}','pwned'),a.shift())",
            target.display()
        );

        let report = run_harness(&candidate).await;
        assert!(!report.pass);
        assert!(report.results.iter().all(|r| r.error.is_some()));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_candidate_cannot_read_host_files() {
        let outside = tempfile::tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, "2").unwrap();
        let candidate = format!(
            "a=[2,1,0,0,10,92];nqueens=_=>(require('fs').readFileSync('{}','utf8'),a.shift())",
            secret.display()
        );

        let report = run_harness(&candidate).await;
        assert!(!report.pass);
        assert!(report.results.iter().all(|r| r.error.is_some()));
    }

    #[tokio::test]
    async fn test_candidate_cannot_spawn_processes() {
        let report = run_harness(
            "a=[2,1,0,0,10,92];nqueens=_=>(require('child_process').execSync('true'),a.shift())",
        )
        .await;
        assert!(!report.pass);
        assert!(report.results.iter().all(|r| r.error.is_some()));
    }
}
