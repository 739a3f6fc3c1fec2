// envetcd Infrastructure - System Adapters
// Implements: ProcessSupervisor, HostProbe

pub mod host_probe_impl;
pub mod process_supervisor;

pub use host_probe_impl::{scan_route_table, SystemHostProbe};
pub use process_supervisor::TokioProcessSupervisor;
