use std::path::PathBuf;

use clap::Args;

use shipline::config;
use shipline::deploy::{self, DeployPlan, DeployReport};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct DeployArgs {
    /// Environments to deploy, in order (defaults to the configured list)
    pub environments: Vec<String>,

    /// Repository path (overrides config)
    #[arg(long)]
    pub repo: Option<PathBuf>,
}

pub fn run(args: DeployArgs, global: &GlobalArgs) -> CmdResult<DeployReport> {
    let cfg = config::load(global.config.as_deref())?;

    let environments = if args.environments.is_empty() {
        cfg.environments.clone()
    } else {
        cfg.select_environments(&args.environments)?
    };

    let plan = DeployPlan {
        repo_path: args.repo.unwrap_or_else(|| cfg.resolve_repo_path()),
        main_branch: cfg.main_branch,
        remote: cfg.remote,
        environments,
    };

    let report = deploy::run_deployment(&plan)?;
    let exit_code = report.exit_code();

    if !global.json {
        print_summary(&report);
    }

    Ok((report, exit_code))
}

fn print_summary(report: &DeployReport) {
    for result in &report.results {
        if result.success {
            println!(
                "{}: deployed ({} step{})",
                result.environment,
                result.steps_run,
                if result.steps_run == 1 { "" } else { "s" }
            );
        } else {
            eprintln!(
                "{}: failed after {} step{}: {}",
                result.environment,
                result.steps_run,
                if result.steps_run == 1 { "" } else { "s" },
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if report.success {
        println!("All environments deployed.");
    } else {
        eprintln!("Deployment halted; remaining environments were not attempted.");
    }
}
