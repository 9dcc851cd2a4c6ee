//! Configuration loading for `shipline.json`.
//!
//! Every value has a default, so a missing config file yields a fully
//! usable configuration. Loaded once and passed explicitly into the
//! workflow entry points.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::deploy::Environment;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "shipline.json";

const DEFAULT_ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

/// Root configuration structure for shipline.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiplineConfig {
    /// Local working copy. Supports `~` expansion.
    #[serde(default = "default_repo_path")]
    pub repo_path: String,

    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,

    /// Test runner argv (program + args); no test step when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_command: Option<Vec<String>>,

    /// Deployment targets, deployed strictly in this order.
    #[serde(default = "default_environments")]
    pub environments: Vec<Environment>,
}

impl Default for ShiplineConfig {
    fn default() -> Self {
        Self {
            repo_path: default_repo_path(),
            main_branch: default_main_branch(),
            remote: default_remote(),
            branch_prefix: default_branch_prefix(),
            test_command: None,
            environments: default_environments(),
        }
    }
}

impl ShiplineConfig {
    /// Repo path with `~` expanded.
    pub fn resolve_repo_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.repo_path).into_owned())
    }

    /// Select configured environments by name, preserving the requested
    /// order. Unknown names are a configuration error.
    pub fn select_environments(&self, names: &[String]) -> Result<Vec<Environment>> {
        names
            .iter()
            .map(|name| {
                self.environments
                    .iter()
                    .find(|env| &env.name == name)
                    .cloned()
                    .ok_or_else(|| {
                        Error::Config(format!(
                            "Unknown environment '{}' (configured: {})",
                            name,
                            self.environment_names().join(", ")
                        ))
                    })
            })
            .collect()
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.name.clone()).collect()
    }
}

fn default_repo_path() -> String {
    ".".to_string()
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch_prefix() -> String {
    "feature/".to_string()
}

fn default_environments() -> Vec<Environment> {
    DEFAULT_ENVIRONMENTS
        .iter()
        .map(|name| {
            Environment::new(
                name.to_string(),
                vec![format!("deploy-script --env {}", name)],
            )
        })
        .collect()
}

/// Load configuration from an explicit path, or from `shipline.json` in the
/// current directory when present, or fall back to defaults.
pub fn load(explicit_path: Option<&Path>) -> Result<ShiplineConfig> {
    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => {
            let candidate = PathBuf::from(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(ShiplineConfig::default());
            }
            candidate
        }
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_fields() {
        let config = ShiplineConfig::default();
        assert_eq!(config.main_branch, "main");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.branch_prefix, "feature/");
        assert_eq!(
            config.environment_names(),
            vec!["development", "staging", "production"]
        );
        assert_eq!(
            config.environments[1].steps,
            vec!["deploy-script --env staging"]
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ShiplineConfig =
            serde_json::from_str(r#"{"mainBranch": "trunk"}"#).unwrap();
        assert_eq!(config.main_branch, "trunk");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.environments.len(), 3);
    }

    #[test]
    fn environments_parse_with_steps() {
        let config: ShiplineConfig = serde_json::from_str(
            r#"{"environments": [{"name": "staging", "steps": ["make deploy"]}]}"#,
        )
        .unwrap();
        assert_eq!(config.environment_names(), vec!["staging"]);
        assert_eq!(config.environments[0].steps, vec!["make deploy"]);
    }

    #[test]
    fn select_environments_preserves_requested_order() {
        let config = ShiplineConfig::default();
        let selected = config
            .select_environments(&["staging".to_string(), "development".to_string()])
            .unwrap();
        let names: Vec<&str> = selected.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["staging", "development"]);
    }

    #[test]
    fn select_environments_rejects_unknown_name() {
        let config = ShiplineConfig::default();
        let err = config
            .select_environments(&["qa".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("Unknown environment 'qa'"));
    }

    #[test]
    fn load_with_missing_explicit_path_errors() {
        let missing = Path::new("/nonexistent/shipline.json");
        match load(Some(missing)) {
            Err(Error::Config(msg)) => assert!(msg.contains("Failed to read")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"repoPath": "~/src/app", "remote": "upstream"}"#).unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.remote, "upstream");
        assert!(!config.resolve_repo_path().to_string_lossy().contains('~'));
    }
}
