//! Client configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rest::RestLearningApi;

/// Top-level proctor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProctorConfig {
    /// Base URL of the learning backend's REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; supports `${ENV_VAR}` references.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Default student id for CLI commands.
    #[serde(default)]
    pub student_id: Option<String>,
    /// Where per-assessment draft state is kept.
    #[serde(default = "default_draft_dir")]
    pub draft_dir: PathBuf,
    /// HTTP request timeout.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_draft_dir() -> PathBuf {
    PathBuf::from("./proctor-drafts")
}

fn default_timeout() -> u64 {
    30
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            student_id: None,
            draft_dir: default_draft_dir(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `proctor.toml` in the current directory
/// 2. `~/.config/proctor/config.toml`
///
/// Environment variable overrides: `PROCTOR_BASE_URL`, `PROCTOR_API_TOKEN`.
pub fn load_config() -> Result<ProctorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ProctorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("proctor.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ProctorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ProctorConfig::default(),
    };

    if let Ok(url) = std::env::var("PROCTOR_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(token) = std::env::var("PROCTOR_API_TOKEN") {
        config.api_token = Some(token);
    }

    config.api_token = config.api_token.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("proctor"))
}

/// Build the REST client from a loaded configuration.
pub fn create_api(config: &ProctorConfig) -> RestLearningApi {
    RestLearningApi::with_timeout(
        &config.base_url,
        config.api_token.clone(),
        config.request_timeout_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_PROCTOR_TEST_VAR", "sekrit");
        assert_eq!(resolve_env_vars("${_PROCTOR_TEST_VAR}"), "sekrit");
        assert_eq!(
            resolve_env_vars("Bearer ${_PROCTOR_TEST_VAR}!"),
            "Bearer sekrit!"
        );
        std::env::remove_var("_PROCTOR_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = ProctorConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
base_url = "https://lms.example.edu/api"
api_token = "${LMS_TOKEN}"
student_id = "s-1024"
draft_dir = "/var/lib/proctor/drafts"
"#;
        let config: ProctorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://lms.example.edu/api");
        assert_eq!(config.student_id.as_deref(), Some("s-1024"));
        assert_eq!(config.draft_dir, PathBuf::from("/var/lib/proctor/drafts"));
        // Unset fields keep their defaults.
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn explicit_missing_path_errors() {
        let err = load_config_from(Some(Path::new("/nonexistent/proctor.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn explicit_path_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proctor.toml");
        std::fs::write(&path, "base_url = \"http://backend:4000/api\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.base_url, "http://backend:4000/api");
    }
}
