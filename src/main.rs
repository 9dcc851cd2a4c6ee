use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod commands;

use commands::{deploy, feature, CmdResult, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shipline")]
#[command(version = VERSION)]
#[command(about = "CLI for git branch workflow and multi-environment deployment automation")]
struct Cli {
    /// Config file path (defaults to ./shipline.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit the final report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a feature branch from creation through merge into main
    Feature(feature::FeatureArgs),
    /// Update the repository and deploy each environment in order
    Deploy(deploy::DeployArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {
        config: cli.config,
        json: cli.json,
    };

    let exit_code = match cli.command {
        Commands::Feature(args) => emit(feature::run(args, &global), &global),
        Commands::Deploy(args) => emit(deploy::run(args, &global), &global),
    };

    ExitCode::from(exit_code_to_u8(exit_code))
}

fn emit<T: Serialize>(result: CmdResult<T>, global: &GlobalArgs) -> i32 {
    match result {
        Ok((output, exit_code)) => {
            if global.json {
                match serde_json::to_string_pretty(&output) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("error[JSON_ERROR]: {}", e);
                        return 1;
                    }
                }
            }
            exit_code
        }
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            1
        }
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
