// Driver - one invocation from flags to exit status
// Resolve, then either export to a file or supervise a child

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use super::exit_code::*;
use super::export::write_env_file;
use super::resolver::Resolver;
use crate::domain::{DeploymentContext, ResolutionConfig, SubprocessResult};
use crate::error::{AppError, Result};
use crate::port::ProcessSupervisor;

/// What to do with the resolved mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Write `NAME="value"` lines to the file; no child is started
    WriteEnvFile(PathBuf),
    /// Run the command with the merged environment
    Exec(Vec<String>),
}

impl Invocation {
    /// Decide the invocation from the export flag and trailing arguments
    ///
    /// Runs before anything touches the store.
    ///
    /// # Errors
    /// - AppError::MissingCommand if neither an export path nor a command was given
    pub fn plan(write_env: Option<PathBuf>, command: Vec<String>) -> Result<Self> {
        match write_env {
            Some(path) => {
                if !command.is_empty() {
                    warn!(
                        command = ?command,
                        "command not executed when --write-env is used"
                    );
                }
                Ok(Invocation::WriteEnvFile(path))
            }
            None if command.is_empty() => Err(AppError::MissingCommand),
            None => Ok(Invocation::Exec(command)),
        }
    }
}

/// Result of a whole run
#[derive(Debug)]
pub enum RunOutcome {
    Success,
    /// The child ran and did not exit 0; its code is forwarded as-is
    ChildFailed(SubprocessResult),
    Failed(AppError),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success => EXIT_OK,
            RunOutcome::ChildFailed(result) => result.exit_code,
            RunOutcome::Failed(err) => exit_code_for(err),
        }
    }
}

/// Reserved exit code for a fatal error
pub fn exit_code_for(err: &AppError) -> i32 {
    match err {
        AppError::MissingCommand | AppError::Domain(_) | AppError::Validation(_) => {
            EXIT_PARSE_FLAGS_ERROR
        }
        AppError::PeerConfiguration { .. } | AppError::StoreUnavailable { .. } => {
            EXIT_RESOLUTION_ERROR
        }
        AppError::Launch(_) => EXIT_RUNNER_ERROR,
        AppError::Export { .. } => EXIT_ERROR,
    }
}

/// Wires the resolver to the export path or the supervisor
pub struct Driver {
    resolver: Resolver,
    supervisor: Arc<dyn ProcessSupervisor>,
    deployment: DeploymentContext,
}

impl Driver {
    pub fn new(
        resolver: Resolver,
        supervisor: Arc<dyn ProcessSupervisor>,
        deployment: DeploymentContext,
    ) -> Self {
        Self {
            resolver,
            supervisor,
            deployment,
        }
    }

    /// Plan the invocation, then run it
    pub async fn run(
        &self,
        cfg: &ResolutionConfig,
        write_env: Option<PathBuf>,
        command: Vec<String>,
    ) -> RunOutcome {
        match Invocation::plan(write_env, command) {
            Ok(invocation) => self.run_invocation(cfg, invocation).await,
            Err(err) => RunOutcome::Failed(err),
        }
    }

    /// Run an already planned invocation
    pub async fn run_invocation(&self, cfg: &ResolutionConfig, invocation: Invocation) -> RunOutcome {
        let span = info_span!(
            "envetcd",
            environment = %self.deployment.environment,
            cluster_id = %self.deployment.cluster_id,
            system = %cfg.system(),
            hostname = %cfg.hostname(),
        );

        match self.execute(cfg, invocation).instrument(span).await {
            Ok(outcome) => outcome,
            Err(err) => RunOutcome::Failed(err),
        }
    }

    async fn execute(&self, cfg: &ResolutionConfig, invocation: Invocation) -> Result<RunOutcome> {
        info!("Resolving configuration");
        let env = self.resolver.resolve(cfg).await?;

        let command = match invocation {
            Invocation::WriteEnvFile(path) => {
                write_env_file(&path, &env).await?;
                return Ok(RunOutcome::Success);
            }
            Invocation::Exec(command) => command,
        };

        info!(command = ?command, keys = env.len(), "Starting subprocess");
        let child = self.supervisor.start(&command, &env)?;

        let result = child.wait().await;
        info!(exit_code = result.exit_code, signal = ?result.signal, "Subprocess exited");

        if result.success() {
            Ok(RunOutcome::Success)
        } else {
            if let Some(error) = &result.error {
                warn!(error = %error, "Could not observe subprocess status");
            }
            Ok(RunOutcome::ChildFailed(result))
        }
    }
}
