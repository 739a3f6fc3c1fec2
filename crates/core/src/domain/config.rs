// Resolution and store configuration (immutable per invocation)

use std::time::Duration;

use super::error::{DomainError, Result};
use super::key::KeyRules;

/// Root path under which every namespace lives unless overridden
pub const DEFAULT_PREFIX: &str = "/config";

/// Default per-request timeout for store fetches
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default number of attempts the store client makes per peer
pub const DEFAULT_STORE_MAX_ATTEMPTS: u32 = 3;

/// Parameters for one resolution pass
///
/// Built once from flags/env and never mutated afterwards. The `with_*`
/// methods consume and return `self`, so a value handed to the resolver
/// cannot change under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionConfig {
    hostname: String,
    system: String,
    service: String,
    prefix: String,
    rules: KeyRules,
}

impl ResolutionConfig {
    /// Create a config with the default prefix, sanitization and upcasing enabled
    ///
    /// # Example
    /// ```text
    /// let cfg = ResolutionConfig::new("web-01", "billing")
    ///     .with_service("invoicer")
    ///     .with_upcase(false);
    /// ```
    pub fn new(hostname: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            system: system.into(),
            service: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            rules: KeyRules::default(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the root prefix; trailing slashes are dropped so joins stay single-slashed
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.rules.sanitize = sanitize;
        self
    }

    pub fn with_upcase(mut self, upcase: bool) -> Self {
        self.rules.upcase = upcase;
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Service name; empty means no service tier
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn rules(&self) -> KeyRules {
        self.rules
    }

    /// Check that every scope name yields a distinct, single-segment path
    ///
    /// An empty hostname or system would widen the host/system tiers to
    /// every host or system in the store, so both are required.
    pub fn validate(&self) -> Result<()> {
        if !self.prefix.is_empty() && !self.prefix.starts_with('/') {
            return Err(DomainError::ValidationError(format!(
                "prefix must be an absolute path, got '{}'",
                self.prefix
            )));
        }

        for (field, value) in [("hostname", &self.hostname), ("system", &self.system)] {
            if value.is_empty() {
                return Err(DomainError::ValidationError(format!(
                    "{field} cannot be empty"
                )));
            }
            if value.contains('/') {
                return Err(DomainError::ValidationError(format!(
                    "{field} must be a single path segment, got '{value}'"
                )));
            }
        }

        if self.service.contains('/') {
            return Err(DomainError::ValidationError(format!(
                "service must be a single path segment, got '{}'",
                self.service
            )));
        }

        Ok(())
    }
}

/// Store endpoint configuration handed to the store adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Raw endpoint strings as supplied by the operator (not yet normalized)
    pub peers: Vec<String>,
    /// Refresh the peer list from cluster membership before fetching
    pub sync: bool,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl StoreConfig {
    pub fn new(peers: Vec<String>) -> Self {
        Self {
            peers,
            ..Default::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            sync: false,
            timeout: DEFAULT_STORE_TIMEOUT,
            max_attempts: DEFAULT_STORE_MAX_ATTEMPTS,
        }
    }
}
