use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GolfBenchError, Result};

// Well-known environment keys
pub mod keys {
    pub const SANDBOX: &str = "GOLFBENCH_SANDBOX";
    pub const NODE_BIN: &str = "GOLFBENCH_NODE_BIN";
    pub const TIMEOUT_MS: &str = "GOLFBENCH_TIMEOUT_MS";
    pub const E2B_API_KEY: &str = "E2B_API_KEY";
    pub const E2B_API_URL: &str = "E2B_API_URL";
    pub const E2B_DOMAIN: &str = "E2B_DOMAIN";
    pub const E2B_TEMPLATE: &str = "E2B_TEMPLATE";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxKind {
    #[default]
    Node,
    E2b,
}

impl FromStr for SandboxKind {
    type Err = GolfBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "node" | "local" => Ok(SandboxKind::Node),
            "e2b" | "remote" => Ok(SandboxKind::E2b),
            other => Err(GolfBenchError::Config(format!(
                "unknown sandbox '{}', expected 'node' or 'e2b'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GolfBenchConfig {
    #[serde(default)]
    pub sandbox: SandboxKind,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub e2b: E2bConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_bin: String,
    pub timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_bin: "node".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct E2bConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_url: String,
    pub domain: String,
    pub template: String,
    /// Sandbox lifetime requested at creation, in seconds.
    pub sandbox_timeout_sec: u64,
    pub request_timeout_ms: u64,
}

impl Default for E2bConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.e2b.dev".to_string(),
            domain: "e2b.app".to_string(),
            template: "code-interpreter-v1".to_string(),
            sandbox_timeout_sec: 300,
            request_timeout_ms: 30_000,
        }
    }
}

impl GolfBenchConfig {
    /// Build from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(kind) = lookup(keys::SANDBOX) {
            config.sandbox = kind.parse()?;
        }
        if let Some(bin) = lookup(keys::NODE_BIN) {
            config.node.node_bin = bin;
        }
        if let Some(raw) = lookup(keys::TIMEOUT_MS) {
            let timeout_ms = raw.trim().parse::<u64>().map_err(|e| {
                GolfBenchError::Config(format!("{} must be an integer: {}", keys::TIMEOUT_MS, e))
            })?;
            config.node.timeout_ms = timeout_ms;
            config.e2b.request_timeout_ms = timeout_ms;
        }

        config.e2b.api_key = lookup(keys::E2B_API_KEY).filter(|k| !k.trim().is_empty());
        if let Some(url) = lookup(keys::E2B_API_URL) {
            config.e2b.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(domain) = lookup(keys::E2B_DOMAIN) {
            config.e2b.domain = domain;
        }
        if let Some(template) = lookup(keys::E2B_TEMPLATE) {
            config.e2b.template = template;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.sandbox {
            SandboxKind::Node if self.node.node_bin.trim().is_empty() => Err(
                GolfBenchError::Config("node binary path is empty".to_string()),
            ),
            SandboxKind::E2b if self.e2b.api_key.is_none() => Err(GolfBenchError::Config(
                format!("{} is required for the e2b sandbox", keys::E2B_API_KEY),
            )),
            _ => Ok(()),
        }
    }
}
