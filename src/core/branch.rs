//! Branch workflow controller.
//!
//! Drives a feature branch from creation through merge into the main line:
//! create → commit → push → test → merge → push main, short-circuiting at
//! the first failure. Every mutating step is a blocking `git` call; there is
//! no rollback, so a failure midway leaves the repository in whatever state
//! the partial sequence produced.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::git;
use crate::log_status;
use crate::utils::command::CapturedOutput;
use crate::utils::shell;

/// Configuration for one branch workflow invocation. Always passed in
/// explicitly; nothing here is module-level state.
#[derive(Debug, Clone)]
pub struct BranchWorkflowConfig {
    pub repo_path: PathBuf,
    pub main_branch: String,
    pub remote: String,
    pub branch_prefix: String,
    /// Test runner argv (program + args). `None` skips the test step.
    pub test_command: Option<Vec<String>>,
    /// Delete the local feature branch after a successful merge.
    pub delete_branch_after_merge: bool,
}

impl BranchWorkflowConfig {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            main_branch: "main".to_string(),
            remote: "origin".to_string(),
            branch_prefix: "feature/".to_string(),
            test_command: None,
            delete_branch_after_merge: true,
        }
    }

    /// Branch name derived from a feature name, e.g. "xyz" -> "feature/xyz".
    pub fn feature_branch_name(&self, feature_name: &str) -> String {
        format!("{}{}", self.branch_prefix, feature_name)
    }
}

/// Linear workflow progression. `Aborted` is reachable from any
/// non-terminal state; there is no other branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Created,
    Committed,
    Tested,
    Merged,
    Done,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Clean working tree: nothing staged, committed, or pushed.
    NoChanges,
}

/// Outcome of the test step. Captured output is surfaced on failure only.
#[derive(Debug, Clone)]
pub enum TestOutcome {
    Passed,
    /// No test command configured.
    Skipped,
    Failed(TestFailure),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFailure {
    pub exit_code: i32,
    #[serde(flatten)]
    pub output: CapturedOutput,
}

/// Final report for one `run_workflow` invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub feature_branch: String,
    /// Terminal state: `Done` on success, `Aborted` otherwise.
    pub state: WorkflowState,
    /// Furthest non-terminal state completed before stopping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<WorkflowState>,
    /// True when a clean tree short-circuited the run without failure.
    pub no_changes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_failure: Option<TestFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowReport {
    fn done(feature_branch: String, last_completed: WorkflowState) -> Self {
        Self {
            feature_branch,
            state: WorkflowState::Done,
            last_completed: Some(last_completed),
            no_changes: false,
            test_failure: None,
            error: None,
        }
    }

    fn aborted(
        feature_branch: String,
        last_completed: Option<WorkflowState>,
        error: Error,
    ) -> Self {
        Self {
            feature_branch,
            state: WorkflowState::Aborted,
            last_completed,
            no_changes: false,
            test_failure: None,
            error: Some(error.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.state == WorkflowState::Done
    }
}

/// Check out the main branch, sync it from the remote, then create (or
/// resume on) the feature branch.
///
/// An already-existing branch is not an error: it is checked out as-is
/// instead of being recreated.
pub fn create_feature_branch(config: &BranchWorkflowConfig, feature_name: &str) -> Result<String> {
    let path = &config.repo_path;
    let branch = config.feature_branch_name(feature_name);

    git::checkout(path, &config.main_branch)?;
    git::pull(path, &config.remote, &config.main_branch)?;

    if git::branch_exists(path, &branch) {
        log_status!("feature", "Checking out existing branch: {}", branch);
        git::checkout(path, &branch)?;
    } else {
        log_status!("feature", "Creating new branch: {}", branch);
        git::checkout_new_branch(path, &branch)?;
    }

    Ok(branch)
}

/// Stage, commit, and push pending changes on the feature branch.
///
/// The only precondition-gated operation in the workflow: a clean tree
/// (tracked and untracked) returns `NoChanges` and performs no action.
pub fn commit_and_push(
    config: &BranchWorkflowConfig,
    message: &str,
    branch: &str,
) -> Result<CommitOutcome> {
    let path = &config.repo_path;

    if git::is_workdir_clean(path) {
        log_status!("feature", "No changes to commit.");
        return Ok(CommitOutcome::NoChanges);
    }

    git::stage_all(path)?;
    git::commit(path, message)?;
    git::push_set_upstream(path, &config.remote, branch)?;
    log_status!("feature", "Feature branch '{}' pushed successfully", branch);

    Ok(CommitOutcome::Committed)
}

/// Invoke the configured test runner in the working copy.
///
/// Pass/fail is determined solely by the process exit status; stdout and
/// stderr are captured and returned only on failure.
pub fn run_tests(config: &BranchWorkflowConfig) -> Result<TestOutcome> {
    let Some(argv) = config.test_command.as_deref() else {
        return Ok(TestOutcome::Skipped);
    };
    let (program, args) = argv.split_first().ok_or_else(|| {
        Error::Config("Test command must name a program to run".to_string())
    })?;

    log_status!("feature", "Running tests: {}", shell::quote_args(argv));
    let output = Command::new(program)
        .args(args)
        .current_dir(&config.repo_path)
        .output()?;

    if output.status.success() {
        return Ok(TestOutcome::Passed);
    }

    Ok(TestOutcome::Failed(TestFailure {
        exit_code: output.status.code().unwrap_or(1),
        output: CapturedOutput::from_output(&output),
    }))
}

/// Merge the feature branch into main and push the updated main branch.
///
/// A merge conflict surfaces as a failure with git's diagnostic; the remedy
/// is manual intervention.
pub fn merge_feature_branch(config: &BranchWorkflowConfig, branch: &str) -> Result<()> {
    let path = &config.repo_path;

    git::checkout(path, &config.main_branch)?;
    git::pull(path, &config.remote, &config.main_branch)?;

    log_status!("feature", "Merging '{}' into '{}'...", branch, config.main_branch);
    git::merge(path, branch)?;
    git::push(path, &config.remote, &config.main_branch)?;
    log_status!("feature", "Main branch '{}' updated successfully", config.main_branch);

    if config.delete_branch_after_merge {
        git::delete_branch(path, branch)?;
        log_status!("feature", "Deleted local branch '{}'", branch);
    }

    Ok(())
}

/// Run the full workflow in strict order: create → commit/push → test →
/// merge. Short-circuits at the first failure or test fail; a clean tree
/// short-circuits as a non-failure (nothing to test or merge).
pub fn run_workflow(
    config: &BranchWorkflowConfig,
    feature_name: &str,
    message: &str,
) -> WorkflowReport {
    let branch = config.feature_branch_name(feature_name);

    if let Err(e) = require_git_repo(&config.repo_path) {
        return WorkflowReport::aborted(branch, None, e);
    }

    if let Err(e) = create_feature_branch(config, feature_name) {
        return WorkflowReport::aborted(branch, None, e);
    }

    match commit_and_push(config, message, &branch) {
        Ok(CommitOutcome::Committed) => {}
        Ok(CommitOutcome::NoChanges) => {
            let mut report = WorkflowReport::done(branch, WorkflowState::Created);
            report.no_changes = true;
            return report;
        }
        Err(e) => return WorkflowReport::aborted(branch, Some(WorkflowState::Created), e),
    }

    match run_tests(config) {
        Ok(TestOutcome::Passed) | Ok(TestOutcome::Skipped) => {}
        Ok(TestOutcome::Failed(failure)) => {
            let error = Error::CommandFailed(format!(
                "Tests failed (exit {})",
                failure.exit_code
            ));
            let mut report =
                WorkflowReport::aborted(branch, Some(WorkflowState::Committed), error);
            report.test_failure = Some(failure);
            return report;
        }
        Err(e) => return WorkflowReport::aborted(branch, Some(WorkflowState::Committed), e),
    }

    if let Err(e) = merge_feature_branch(config, &branch) {
        return WorkflowReport::aborted(branch, Some(WorkflowState::Tested), e);
    }

    WorkflowReport::done(branch, WorkflowState::Merged)
}

fn require_git_repo(path: &Path) -> Result<()> {
    if git::is_git_repo(path) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} is not a git working copy",
            path.display()
        )))
    }
}
