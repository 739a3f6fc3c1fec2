// Process supervisor implementation
// reason: tokio::process so the waiter runs on the runtime instead of a blocked thread
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{info, warn};

use envetcd_core::domain::{MergedEnvironment, SubprocessResult, SIGNALED_EXIT_CODE};
use envetcd_core::port::process_supervisor::{LaunchError, ProcessSupervisor, SupervisedChild};

/// Spawns the child with inherited stdio and reports through a oneshot channel
///
/// The child's environment is the inherited one with the merged entries
/// applied on top, or only the merged entries when `clean_env` is set.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessSupervisor {
    clean_env: bool,
}

impl TokioProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start children from an empty environment instead of the inherited one
    pub fn with_clean_env(clean_env: bool) -> Self {
        Self { clean_env }
    }

    fn build_command(&self, program: &str, args: &[String], env: &MergedEnvironment) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if self.clean_env {
            cmd.env_clear();
        }
        // Merged entries win over inherited ones with the same name
        cmd.envs(env.iter());

        cmd
    }
}

impl ProcessSupervisor for TokioProcessSupervisor {
    fn start(
        &self,
        command: &[String],
        env: &MergedEnvironment,
    ) -> Result<SupervisedChild, LaunchError> {
        let (program, args) = command.split_first().ok_or(LaunchError::EmptyCommand)?;

        let mut child = self
            .build_command(program, args, env)
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed {
                command: program.clone(),
                reason: e.to_string(),
            })?;

        let pid = child.id();
        info!(
            pid = ?pid,
            command = %program,
            args = ?args,
            clean_env = self.clean_env,
            "Spawned subprocess"
        );

        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = match child.wait().await {
                Ok(status) => result_from_status(status),
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "Failed to wait for subprocess");
                    SubprocessResult::wait_failed(e.to_string())
                }
            };
            // Receiver gone means nobody is waiting; nothing left to report to
            let _ = tx.send(result);
        });

        Ok(SupervisedChild::new(pid, rx))
    }
}

/// Map an OS exit status onto a result: the exit code if there is one,
/// otherwise the signal sentinel
fn result_from_status(status: ExitStatus) -> SubprocessResult {
    if let Some(code) = status.code() {
        return SubprocessResult::exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            let name = nix::sys::signal::Signal::try_from(signal)
                .map(|s| s.as_str())
                .unwrap_or("unknown");
            warn!(signal = signal, name = name, "Subprocess terminated by signal");
            return SubprocessResult::signaled(signal);
        }
    }

    SubprocessResult {
        exit_code: SIGNALED_EXIT_CODE,
        signal: None,
        error: None,
    }
}
