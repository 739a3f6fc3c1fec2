// Host Probe Port
// Facts about the local host used to fill in unset flags

use async_trait::async_trait;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{0}")]
    Unsupported(String),

    #[error("no default route found")]
    NoDefaultRoute,

    #[error("IO error: {0}")]
    Io(String),

    #[error("malformed route table: {0}")]
    Malformed(String),
}

/// Host probe port
///
/// Used by the CLI to default `--hostname` and to find a store peer when
/// none was configured.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// This host's name, used as the host tier's scope name
    fn hostname(&self) -> Result<String, ProbeError>;

    /// IPv4 gateway of the default route
    ///
    /// Inside a container this is usually the host running the store.
    async fn default_gateway(&self) -> Result<Ipv4Addr, ProbeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Probe returning fixed answers
    pub struct FixedHostProbe {
        pub hostname: String,
        pub gateway: Option<Ipv4Addr>,
    }

    impl FixedHostProbe {
        pub fn new(hostname: impl Into<String>, gateway: Option<Ipv4Addr>) -> Self {
            Self {
                hostname: hostname.into(),
                gateway,
            }
        }
    }

    #[async_trait]
    impl HostProbe for FixedHostProbe {
        fn hostname(&self) -> Result<String, ProbeError> {
            Ok(self.hostname.clone())
        }

        async fn default_gateway(&self) -> Result<Ipv4Addr, ProbeError> {
            self.gateway.ok_or(ProbeError::NoDefaultRoute)
        }
    }
}
