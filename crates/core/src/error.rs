// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// A child exiting nonzero is not represented here: that outcome is
/// forwarded through `RunOutcome` as the process exit status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Invalid peer '{peer}': {reason}")]
    PeerConfiguration { peer: String, reason: String },

    #[error("Store unavailable while fetching {tier} tier ({path}): {source}")]
    StoreUnavailable {
        tier: &'static str,
        path: String,
        #[source]
        source: crate::port::StoreError,
    },

    #[error("Launch error: {0}")]
    Launch(#[from] crate::port::LaunchError),

    #[error("missing command")]
    MissingCommand,

    #[error("Failed to write env file {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
