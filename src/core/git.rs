//! Thin typed wrappers over the `git` CLI.
//!
//! Every function runs `git` as a blocking subprocess in the given working
//! copy. Failures carry git's own diagnostic text.

use std::path::Path;
use std::process::Command;

use crate::error::Result;
use crate::utils::command;

pub(crate) fn is_git_repo(path: &Path) -> bool {
    command::succeeded_in(path, "git", &["rev-parse", "--git-dir"])
}

/// Name of the currently checked-out branch.
pub fn current_branch(path: &Path) -> Result<String> {
    command::run_in(path, "git", &["rev-parse", "--abbrev-ref", "HEAD"], "git branch")
}

/// Check if a git working directory has no uncommitted changes.
///
/// `git status --porcelain` lists staged, unstaged, and untracked entries;
/// an empty listing means a clean tree. A failed command is treated as not
/// clean (conservative).
pub fn is_workdir_clean(path: &Path) -> bool {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(path)
        .output();

    match output {
        Ok(o) if o.status.success() => o.stdout.is_empty(),
        _ => false,
    }
}

/// Check whether a local branch with this name exists.
pub fn branch_exists(path: &Path, branch: &str) -> bool {
    let git_ref = format!("refs/heads/{}", branch);
    command::succeeded_in(path, "git", &["show-ref", "--verify", "--quiet", &git_ref])
}

pub fn checkout(path: &Path, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["checkout", branch], "git checkout")?;
    Ok(())
}

/// Create a branch at HEAD and switch to it.
pub fn checkout_new_branch(path: &Path, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["checkout", "-b", branch], "git checkout -b")?;
    Ok(())
}

pub fn pull(path: &Path, remote: &str, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["pull", remote, branch], "git pull")?;
    Ok(())
}

pub fn push(path: &Path, remote: &str, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["push", remote, branch], "git push")?;
    Ok(())
}

/// Push a branch and set its upstream, for branches that may not exist on
/// the remote yet.
pub fn push_set_upstream(path: &Path, remote: &str, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["push", "-u", remote, branch], "git push")?;
    Ok(())
}

/// Merge a branch into the currently checked-out branch.
///
/// A merge conflict surfaces as a command failure carrying git's conflict
/// report; resolution is manual.
pub fn merge(path: &Path, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["merge", branch], "git merge")?;
    Ok(())
}

/// Stage all changes, tracked and untracked.
pub fn stage_all(path: &Path) -> Result<()> {
    command::run_in(path, "git", &["add", "-A"], "git add")?;
    Ok(())
}

pub fn commit(path: &Path, message: &str) -> Result<()> {
    command::run_in(path, "git", &["commit", "-m", message], "git commit")?;
    Ok(())
}

/// Delete a local branch. Uses `-d`, so git refuses if the branch is not
/// fully merged.
pub fn delete_branch(path: &Path, branch: &str) -> Result<()> {
    command::run_in(path, "git", &["branch", "-d", branch], "git branch -d")?;
    Ok(())
}
