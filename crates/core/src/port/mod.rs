// Port Layer - Interfaces for external dependencies

pub mod host_probe;
pub mod key_value_store;
pub mod process_supervisor;

// Re-exports
pub use host_probe::{HostProbe, ProbeError};
pub use key_value_store::{KeyValueStore, StoreError};
pub use process_supervisor::{LaunchError, ProcessSupervisor, SupervisedChild};
