//! Deployment workflow controller.
//!
//! Brings a working copy up to date, then runs a fixed ordered list of
//! per-environment shell steps. Strictly sequential and fail-fast: the
//! first failing step aborts its environment and every environment after
//! it. No rollback, no retries.

use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::git;
use crate::log_status;
use crate::utils::command;

/// One deployment target and its ordered shell steps.
///
/// The steps are a pluggable external collaborator: this crate never
/// invents concrete deployment logic, it only executes what is configured
/// (e.g. `deploy-script --env staging`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Environment {
    pub fn new(name: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

/// Configuration for one deployment run, passed in explicitly.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub repo_path: PathBuf,
    pub main_branch: String,
    pub remote: String,
    /// Deployed strictly in this order.
    pub environments: Vec<Environment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentResult {
    pub environment: String,
    pub success: bool,
    pub steps_run: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnvironmentResult {
    fn success(environment: String, steps_run: usize) -> Self {
        Self {
            environment,
            success: true,
            steps_run,
            error: None,
        }
    }

    fn failure(environment: String, steps_run: usize, error: String) -> Self {
        Self {
            environment,
            success: false,
            steps_run,
            error: Some(error),
        }
    }
}

/// Final report for one `run_deployment` invocation. Environments after the
/// first failure are absent from `results` (never attempted).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub results: Vec<EnvironmentResult>,
    pub success: bool,
}

impl DeployReport {
    /// Process exit status contract: zero only when every environment
    /// deployed successfully.
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

/// Verify the location is a git working copy and sync main from the remote.
///
/// Failure here is fatal to the whole deployment run.
pub fn update_repository(plan: &DeployPlan) -> Result<()> {
    let path = &plan.repo_path;

    if !git::is_git_repo(path) {
        return Err(Error::Config(format!(
            "{} is not a git working copy",
            path.display()
        )));
    }

    log_status!("deploy", "Updating repository in {}...", path.display());
    git::checkout(path, &plan.main_branch)?;
    git::pull(path, &plan.remote, &plan.main_branch)?;
    Ok(())
}

/// Run one environment's shell steps strictly in order via `sh -c`.
///
/// The first failing step aborts the remaining steps; the failure is
/// recorded in the returned result, not raised. `Err` is reserved for the
/// process not being spawnable at all.
pub fn deploy_environment(plan: &DeployPlan, env: &Environment) -> Result<EnvironmentResult> {
    log_status!("deploy", "Deploying to {}...", env.name);

    let mut steps_run = 0;
    for step in &env.steps {
        log_status!("deploy", "[{}] {}", env.name, step);
        let output = Command::new("sh")
            .args(["-c", step])
            .current_dir(&plan.repo_path)
            .output()?;

        if !output.status.success() {
            return Ok(EnvironmentResult::failure(
                env.name.clone(),
                steps_run,
                format!(
                    "Step '{}' failed (exit {}): {}",
                    step,
                    output.status.code().unwrap_or(1),
                    command::error_text(&output)
                ),
            ));
        }
        steps_run += 1;
    }

    log_status!("deploy", "Successfully deployed to {}", env.name);
    Ok(EnvironmentResult::success(env.name.clone(), steps_run))
}

/// Update the repository once, then deploy each environment in list order,
/// stopping the entire run at the first environment failure.
pub fn run_deployment(plan: &DeployPlan) -> Result<DeployReport> {
    update_repository(plan)?;

    let mut results = Vec::with_capacity(plan.environments.len());
    for env in &plan.environments {
        let result = deploy_environment(plan, env)?;
        let failed = !result.success;
        results.push(result);
        if failed {
            break;
        }
    }

    let success = results.len() == plan.environments.len() && results.iter().all(|r| r.success);
    Ok(DeployReport { results, success })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan_in(dir: &TempDir, environments: Vec<Environment>) -> DeployPlan {
        DeployPlan {
            repo_path: dir.path().to_path_buf(),
            main_branch: "main".to_string(),
            remote: "origin".to_string(),
            environments,
        }
    }

    #[test]
    fn deploy_environment_runs_steps_in_order() {
        let dir = TempDir::new().unwrap();
        let env = Environment::new(
            "development",
            vec![
                "echo one >> order.log".to_string(),
                "echo two >> order.log".to_string(),
            ],
        );
        let plan = plan_in(&dir, Vec::new());

        let result = deploy_environment(&plan, &env).unwrap();
        assert!(result.success);
        assert_eq!(result.steps_run, 2);

        let log = std::fs::read_to_string(dir.path().join("order.log")).unwrap();
        assert_eq!(log, "one\ntwo\n");
    }

    #[test]
    fn failing_step_aborts_remaining_steps() {
        let dir = TempDir::new().unwrap();
        let env = Environment::new(
            "staging",
            vec![
                "echo before >> order.log".to_string(),
                "exit 3".to_string(),
                "echo after >> order.log".to_string(),
            ],
        );
        let plan = plan_in(&dir, Vec::new());

        let result = deploy_environment(&plan, &env).unwrap();
        assert!(!result.success);
        assert_eq!(result.steps_run, 1);
        assert!(result.error.as_deref().unwrap().contains("exit 3"));

        let log = std::fs::read_to_string(dir.path().join("order.log")).unwrap();
        assert_eq!(log, "before\n");
    }

    #[test]
    fn update_repository_rejects_non_repo() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir, Vec::new());
        match update_repository(&plan) {
            Err(Error::Config(msg)) => assert!(msg.contains("not a git working copy")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn exit_code_follows_success() {
        let ok = DeployReport {
            results: Vec::new(),
            success: true,
        };
        let failed = DeployReport {
            results: Vec::new(),
            success: false,
        };
        assert_eq!(ok.exit_code(), 0);
        assert_eq!(failed.exit_code(), 1);
    }
}
