use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::ProviderKind;
use crate::errors::PlannerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub root: String,
    pub provider: ProviderKind,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub openai_url: String,
    pub anthropic_url: String,
    pub anthropic_version: String,
    pub ollama_url: String,
    pub save_request: bool,
    pub save_response: bool,
    pub auto_approve: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-10-01".into(),
            root: ".".into(),
            provider: ProviderKind::OpenAI,
            model: "gpt-4.1-mini".into(),
            timeout_secs: 240,
            max_tokens: 8192,
            openai_url: "https://api.openai.com".into(),
            anthropic_url: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            ollama_url: "http://localhost:11434".into(),
            save_request: true,
            save_response: true,
            auto_approve: false,
        }
    }
}

impl Config {
    /// Read a TOML config file. Keys that are absent keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&text)
            .map_err(|e| PlannerError::Config(e.to_string()))
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    /// Defaults, then the optional file. Environment and flags are layered
    /// on by `cli::Args::apply` and `cli::PlanArgs::apply`.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mvp_planner.toml");
        fs::write(&path, "provider = \"anthropic\"\nmodel = \"claude-sonnet-4\"\ntimeout_secs = 30\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert!(matches!(cfg.provider, ProviderKind::Anthropic));
        assert_eq!(cfg.model, "claude-sonnet-4");
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.ollama_url, "http://localhost:11434");
        assert!(cfg.save_request);
    }

    #[test]
    fn bad_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.chain().any(|e| e.to_string().starts_with("config error")));
    }
}
