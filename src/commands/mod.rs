use std::path::PathBuf;

pub mod deploy;
pub mod feature;

/// Command result: output payload plus the process exit code to report.
pub type CmdResult<T> = shipline::Result<(T, i32)>;

/// Arguments shared across subcommands.
pub struct GlobalArgs {
    /// Explicit config file path (`--config`).
    pub config: Option<PathBuf>,
    /// Emit the final report as JSON instead of summary lines.
    pub json: bool,
}
