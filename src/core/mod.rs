// Public modules
pub mod branch;
pub mod config;
pub mod deploy;
pub mod error;
pub mod git;

// Re-export common types for convenience
pub use branch::{BranchWorkflowConfig, CommitOutcome, TestOutcome, WorkflowReport, WorkflowState};
pub use config::ShiplineConfig;
pub use deploy::{DeployPlan, DeployReport, Environment, EnvironmentResult};
pub use error::{Error, Result};
