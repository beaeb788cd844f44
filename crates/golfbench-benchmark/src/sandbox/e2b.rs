use std::time::Duration;

use async_trait::async_trait;
use golfbench_core::{E2bConfig, GolfBenchError, ScriptLanguage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Execution, ExecutionError, Result, Sandbox, SandboxError, SandboxSession};

/// Port the code interpreter listens on inside an E2B sandbox.
const INTERPRETER_PORT: u16 = 49999;

/// Hosted code-interpreter sandboxes from e2b.dev.
pub struct E2bSandbox {
    config: E2bConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateSandboxRequest<'a> {
    #[serde(rename = "templateID")]
    template_id: &'a str,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct CreateSandboxResponse {
    #[serde(rename = "sandboxID")]
    sandbox_id: String,
    #[serde(rename = "envdAccessToken", default)]
    envd_access_token: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
    language: &'a str,
}

impl E2bSandbox {
    pub fn new(config: E2bConfig) -> golfbench_core::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GolfBenchError::Config("missing E2B API key".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| GolfBenchError::Sandbox(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Sandbox for E2bSandbox {
    fn name(&self) -> &'static str {
        "e2b"
    }

    async fn create(&self) -> Result<Box<dyn SandboxSession>> {
        let url = format!("{}/sandboxes", self.config.api_url);
        let request = CreateSandboxRequest {
            template_id: &self.config.template,
            timeout: self.config.sandbox_timeout_sec,
        };

        let resp = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SandboxError::Create(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SandboxError::Create(format!("{} - {}", status, body)));
        }

        let created: CreateSandboxResponse = resp
            .json()
            .await
            .map_err(|e| SandboxError::Create(format!("unexpected response: {}", e)))?;

        let domain = created
            .domain
            .unwrap_or_else(|| self.config.domain.clone());
        let exec_url = format!(
            "https://{}-{}.{}/execute",
            INTERPRETER_PORT, created.sandbox_id, domain
        );
        tracing::info!("Created e2b sandbox {}", created.sandbox_id);

        Ok(Box::new(E2bSession {
            client: self.client.clone(),
            api_url: self.config.api_url.clone(),
            api_key: self.api_key.clone(),
            sandbox_id: created.sandbox_id,
            exec_url,
            access_token: created.envd_access_token,
            timeout_ms: self.config.request_timeout_ms,
            killed: false,
        }))
    }
}

struct E2bSession {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sandbox_id: String,
    exec_url: String,
    access_token: Option<String>,
    timeout_ms: u64,
    killed: bool,
}

impl E2bSession {
    fn request_error(&self, e: reqwest::Error) -> SandboxError {
        match e.is_timeout() {
            true => SandboxError::Timeout(self.timeout_ms),
            false => SandboxError::Http(e.to_string()),
        }
    }
}

#[async_trait]
impl SandboxSession for E2bSession {
    fn id(&self) -> &str {
        &self.sandbox_id
    }

    async fn run_code(&mut self, code: &str, language: ScriptLanguage) -> Result<Execution> {
        if self.killed {
            return Err(SandboxError::Create(format!(
                "sandbox {} was already killed",
                self.sandbox_id
            )));
        }

        let request = ExecuteRequest {
            code,
            language: language.tag(),
        };

        let mut builder = self.client.post(&self.exec_url).json(&request);
        if let Some(token) = &self.access_token {
            builder = builder.header("X-Access-Token", token);
        }

        let resp = builder.send().await.map_err(|e| self.request_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SandboxError::Http(format!(
                "execute failed: {} - {}",
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let body = resp.text().await.map_err(|e| self.request_error(e))?;

        parse_execution_stream(&body)
    }

    async fn kill(&mut self) -> Result<()> {
        if self.killed {
            return Ok(());
        }
        self.killed = true;

        let url = format!("{}/sandboxes/{}", self.api_url, self.sandbox_id);
        let resp = self
            .client
            .delete(&url)
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| SandboxError::Http(e.to_string()))?;

        // 404 means the sandbox already expired on its own.
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(SandboxError::Http(format!(
                "kill {} failed: {}",
                self.sandbox_id,
                resp.status()
            )));
        }

        tracing::info!("Killed e2b sandbox {}", self.sandbox_id);
        Ok(())
    }
}

/// Fold the interpreter's newline-delimited JSON event stream into an
/// [`Execution`].
fn parse_execution_stream(body: &str) -> Result<Execution> {
    let mut execution = Execution::default();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let event: Value = serde_json::from_str(line)
            .map_err(|e| SandboxError::MalformedOutput(format!("{}: {}", e, line)))?;

        let text = || event.get("text").and_then(Value::as_str).unwrap_or_default();

        match event.get("type").and_then(Value::as_str) {
            Some("stdout") => execution.stdout.extend(text().lines().map(str::to_string)),
            Some("stderr") => execution.stderr.extend(text().lines().map(str::to_string)),
            Some("error") => {
                let field = |key: &str| {
                    event
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                execution.error = Some(ExecutionError {
                    name: field("name"),
                    value: field("value"),
                });
            }
            _ => {}
        }
    }

    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_collects_stdout() {
        let body = r#"{"type":"number_of_executions","execution_count":1}
{"type":"stdout","text":"{\n  \"ok\": true,\n","timestamp":1}
{"type":"stdout","text":"  \"pass\": true\n}\n","timestamp":2}
{"type":"end_of_execution"}
"#;
        let execution = parse_execution_stream(body).unwrap();
        assert_eq!(
            execution.stdout,
            vec!["{", "  \"ok\": true,", "  \"pass\": true", "}"]
        );
        assert!(execution.error.is_none());

        let json: Value = serde_json::from_str(&execution.stdout_text()).unwrap();
        assert_eq!(json["pass"], Value::Bool(true));
    }

    #[test]
    fn test_parse_stream_captures_error() {
        let body = r#"{"type":"stderr","text":"warn\n"}
{"type":"error","name":"ReferenceError","value":"window is not defined","traceback":"..."}
"#;
        let execution = parse_execution_stream(body).unwrap();
        assert_eq!(execution.stderr, vec!["warn"]);
        assert_eq!(
            execution.error,
            Some(ExecutionError {
                name: "ReferenceError".to_string(),
                value: "window is not defined".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_stream_rejects_garbage() {
        let result = parse_execution_stream("<html>bad gateway</html>");
        assert!(matches!(result, Err(SandboxError::MalformedOutput(_))));
    }

    #[test]
    fn test_new_requires_api_key() {
        assert!(E2bSandbox::new(E2bConfig::default()).is_err());

        let config = E2bConfig {
            api_key: Some("e2b_test".to_string()),
            ..Default::default()
        };
        let sandbox = E2bSandbox::new(config).unwrap();
        assert_eq!(sandbox.name(), "e2b");
    }

    #[tokio::test]
    async fn test_execute_timeout_maps_to_timeout() {
        // Accepted by the backlog but never answered.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut session = E2bSession {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(100))
                .build()
                .unwrap(),
            api_url: format!("http://{}", addr),
            api_key: "e2b_test".to_string(),
            sandbox_id: "sbx-silent".to_string(),
            exec_url: format!("http://{}/execute", addr),
            access_token: None,
            timeout_ms: 100,
            killed: false,
        };

        let result = session.run_code("1", ScriptLanguage::JavaScript).await;
        assert!(matches!(result, Err(SandboxError::Timeout(100))));
        drop(listener);
    }
}
