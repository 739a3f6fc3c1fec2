// envetcd Infrastructure - etcd Adapter
// Implements: KeyValueStore over the etcd v2 keys API

mod client;
mod members;
mod response;
mod retry;

pub use client::EtcdKeyValueStore;
pub use retry::{RetryDecision, RetryPolicy};
