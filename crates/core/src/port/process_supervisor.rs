// Process Supervisor Port
// Launch a child with the merged environment; completion arrives on a one-shot channel

use crate::domain::{MergedEnvironment, SubprocessResult};
use thiserror::Error;
use tokio::sync::oneshot;

/// Launch errors (no process was created)
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no command given")]
    EmptyCommand,

    #[error("failed to spawn '{command}': {reason}")]
    SpawnFailed { command: String, reason: String },
}

/// Handle to a running child
///
/// Holds the receiving half of the single-slot completion channel. The
/// waiter on the other side writes exactly one result.
#[derive(Debug)]
pub struct SupervisedChild {
    pid: Option<u32>,
    completion: oneshot::Receiver<SubprocessResult>,
}

impl SupervisedChild {
    pub fn new(pid: Option<u32>, completion: oneshot::Receiver<SubprocessResult>) -> Self {
        Self { pid, completion }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Block (asynchronously) until the child terminates
    pub async fn wait(self) -> SubprocessResult {
        match self.completion.await {
            Ok(result) => result,
            Err(_) => SubprocessResult::wait_failed(
                "completion channel closed before the child reported",
            ),
        }
    }
}

/// Process supervisor trait
///
/// Implementations:
/// - TokioProcessSupervisor (infra-system): spawns a real OS process
/// - mocks::ScriptedSupervisor: reports a fixed exit code without spawning
pub trait ProcessSupervisor: Send + Sync {
    /// Start `command[0]` with `command[1..]` as arguments
    ///
    /// Returns immediately; the caller awaits [`SupervisedChild::wait`].
    ///
    /// # Errors
    /// - LaunchError::EmptyCommand if `command` is empty
    /// - LaunchError::SpawnFailed if the executable cannot be found or spawned
    fn start(
        &self,
        command: &[String],
        env: &MergedEnvironment,
    ) -> Result<SupervisedChild, LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A recorded `start` call
    #[derive(Debug, Clone)]
    pub struct Launch {
        pub command: Vec<String>,
        pub env: MergedEnvironment,
    }

    /// Supervisor that completes every child with a scripted result
    #[derive(Clone)]
    pub struct ScriptedSupervisor {
        result: Option<SubprocessResult>,
        launches: Arc<Mutex<Vec<Launch>>>,
    }

    impl ScriptedSupervisor {
        pub fn exiting_with(exit_code: i32) -> Self {
            Self::new(Some(SubprocessResult::exited(exit_code)))
        }

        pub fn signaled(signal: i32) -> Self {
            Self::new(Some(SubprocessResult::signaled(signal)))
        }

        /// Every `start` fails with `SpawnFailed`
        pub fn failing_to_launch() -> Self {
            Self::new(None)
        }

        fn new(result: Option<SubprocessResult>) -> Self {
            Self {
                result,
                launches: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn launches(&self) -> Vec<Launch> {
            self.launches.lock().unwrap().clone()
        }
    }

    impl ProcessSupervisor for ScriptedSupervisor {
        fn start(
            &self,
            command: &[String],
            env: &MergedEnvironment,
        ) -> Result<SupervisedChild, LaunchError> {
            let program = command.first().ok_or(LaunchError::EmptyCommand)?;

            let Some(result) = self.result.clone() else {
                return Err(LaunchError::SpawnFailed {
                    command: program.clone(),
                    reason: "scripted launch failure".to_string(),
                });
            };

            self.launches.lock().unwrap().push(Launch {
                command: command.to_vec(),
                env: env.clone(),
            });

            let (tx, rx) = oneshot::channel();
            let _ = tx.send(result);
            Ok(SupervisedChild::new(None, rx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_sent_result() {
        let (tx, rx) = oneshot::channel();
        let child = SupervisedChild::new(Some(42), rx);
        assert_eq!(child.pid(), Some(42));

        tx.send(SubprocessResult::exited(3)).unwrap();
        assert_eq!(child.wait().await, SubprocessResult::exited(3));
    }

    #[tokio::test]
    async fn test_wait_reports_dropped_waiter() {
        let (tx, rx) = oneshot::channel::<SubprocessResult>();
        drop(tx);

        let result = SupervisedChild::new(None, rx).wait().await;
        assert!(!result.success());
        assert!(result.error.is_some());
        assert_eq!(result.signal, None);
    }
}
