// Application Layer - Use Cases

pub mod driver;
pub mod exit_code;
pub mod export;
pub mod peers;
pub mod resolver;

// Re-exports
pub use driver::{exit_code_for, Driver, Invocation, RunOutcome};
pub use export::{render_env_file, write_env_file};
pub use peers::{gateway_peer, normalize_peers};
pub use resolver::{tiers, MergePolicy, Resolver, Tier};
