// Domain Layer - Pure resolution and process-outcome types

pub mod config;
pub mod deployment;
pub mod entry;
pub mod environment;
pub mod error;
pub mod key;
pub mod process;

// Re-exports
pub use config::{ResolutionConfig, StoreConfig, DEFAULT_PREFIX};
pub use deployment::{ClusterId, DeploymentContext, RuntimeEnvironment};
pub use entry::RawEntry;
pub use environment::MergedEnvironment;
pub use error::DomainError;
pub use key::KeyRules;
pub use process::{SubprocessResult, SIGNALED_EXIT_CODE};
