use std::path::PathBuf;

use clap::Args;

use shipline::branch::{self, BranchWorkflowConfig, WorkflowReport};
use shipline::config;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct FeatureArgs {
    /// Feature name; the branch becomes <prefix><name> (e.g. feature/xyz)
    pub name: String,

    /// Commit message for the pending changes
    #[arg(short, long)]
    pub message: String,

    /// Repository path (overrides config)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Test command run before merging, executed via `sh -c` (overrides config)
    #[arg(long, value_name = "CMD")]
    pub test_command: Option<String>,

    /// Skip the test step even if a test command is configured
    #[arg(long)]
    pub no_tests: bool,

    /// Keep the local feature branch after merging
    #[arg(long)]
    pub keep_branch: bool,
}

pub fn run(args: FeatureArgs, global: &GlobalArgs) -> CmdResult<WorkflowReport> {
    let cfg = config::load(global.config.as_deref())?;

    let mut workflow = BranchWorkflowConfig::new(
        args.repo.unwrap_or_else(|| cfg.resolve_repo_path()),
    );
    workflow.main_branch = cfg.main_branch;
    workflow.remote = cfg.remote;
    workflow.branch_prefix = cfg.branch_prefix;
    workflow.delete_branch_after_merge = !args.keep_branch;
    workflow.test_command = if args.no_tests {
        None
    } else if let Some(cmd) = args.test_command {
        Some(vec!["sh".to_string(), "-c".to_string(), cmd])
    } else {
        cfg.test_command
    };

    let report = branch::run_workflow(&workflow, &args.name, &args.message);
    let exit_code = if report.success() { 0 } else { 1 };

    if !global.json {
        print_summary(&report);
    }

    Ok((report, exit_code))
}

fn print_summary(report: &WorkflowReport) {
    if report.success() {
        if report.no_changes {
            println!("No changes to commit on '{}'.", report.feature_branch);
        } else {
            println!("Feature branch '{}' merged into main.", report.feature_branch);
        }
        return;
    }

    if let Some(error) = &report.error {
        eprintln!("Workflow aborted: {}", error);
    }
    if let Some(failure) = &report.test_failure {
        if !failure.output.stdout.is_empty() {
            eprintln!("--- test stdout ---\n{}", failure.output.stdout);
        }
        if !failure.output.stderr.is_empty() {
            eprintln!("--- test stderr ---\n{}", failure.output.stderr);
        }
    }
}
