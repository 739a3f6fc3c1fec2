// Subprocess outcome

/// Exit code reported when the child did not exit normally (killed by a
/// signal, or its status could not be observed)
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Outcome of one supervised run, delivered exactly once on the completion channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprocessResult {
    /// 0 on success, the child's own code otherwise, or [`SIGNALED_EXIT_CODE`]
    pub exit_code: i32,
    /// Terminating signal number (Unix only)
    pub signal: Option<i32>,
    /// Set only when the waiter could not observe the child's status
    pub error: Option<String>,
}

impl SubprocessResult {
    pub fn exited(exit_code: i32) -> Self {
        Self {
            exit_code,
            signal: None,
            error: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            exit_code: SIGNALED_EXIT_CODE,
            signal: Some(signal),
            error: None,
        }
    }

    pub fn wait_failed(error: impl Into<String>) -> Self {
        Self {
            exit_code: SIGNALED_EXIT_CODE,
            signal: None,
            error: Some(error.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
