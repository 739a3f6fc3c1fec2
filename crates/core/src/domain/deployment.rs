// Deployment Context (runtime environment + cluster tag)
// Explicit immutable value passed to the driver instead of process-global state

use std::fmt;

use super::error::{DomainError, Result};

/// Runtime environment the process is deployed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Test,
    Integration,
    Production,
}

impl RuntimeEnvironment {
    /// Parse case-insensitively; anything unrecognised is Development
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEST" => RuntimeEnvironment::Test,
            "INTEGRATION" => RuntimeEnvironment::Integration,
            "PRODUCTION" => RuntimeEnvironment::Production,
            _ => RuntimeEnvironment::Development,
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnvironment::Development => write!(f, "development"),
            RuntimeEnvironment::Test => write!(f, "test"),
            RuntimeEnvironment::Integration => write!(f, "integration"),
            RuntimeEnvironment::Production => write!(f, "production"),
        }
    }
}

/// Cluster identifier; numeric values are stable and used on the wire (`CLUSTER_ID`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterId {
    #[default]
    Dev = 0,
    Test = 1,
    Integration = 2,
    Staging = 3,
    AwsUsWest2_1 = 4,
    AwsUsEast1_1 = 5,
}

impl ClusterId {
    const ALL: [ClusterId; 6] = [
        ClusterId::Dev,
        ClusterId::Test,
        ClusterId::Integration,
        ClusterId::Staging,
        ClusterId::AwsUsWest2_1,
        ClusterId::AwsUsEast1_1,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClusterId::Dev => "DevCluster",
            ClusterId::Test => "TestCluster",
            ClusterId::Integration => "IntegrationCluster",
            ClusterId::Staging => "StagingCluster",
            ClusterId::AwsUsWest2_1 => "AwsUSWest2_1",
            ClusterId::AwsUsEast1_1 => "AwsUSEast1_1",
        };
        write!(f, "{name}")
    }
}

/// Where this invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeploymentContext {
    pub environment: RuntimeEnvironment,
    pub cluster_id: ClusterId,
}

impl DeploymentContext {
    /// Build from the raw `--zvelo-env` / `--cluster-id` flag values
    ///
    /// A missing cluster id is only accepted in development, where it
    /// defaults to [`ClusterId::Dev`].
    ///
    /// # Errors
    /// - `InvalidDeployment` if a non-development environment has no cluster id
    /// - `InvalidDeployment` if the cluster id is not a known index
    pub fn from_flags(environment: &str, cluster_id: Option<&str>) -> Result<Self> {
        let environment = RuntimeEnvironment::parse(environment);

        let raw = cluster_id.map(str::trim).filter(|s| !s.is_empty());
        let Some(raw) = raw else {
            if environment != RuntimeEnvironment::Development {
                return Err(DomainError::InvalidDeployment(format!(
                    "CLUSTER_ID is not set for the {environment} environment"
                )));
            }
            return Ok(Self {
                environment,
                cluster_id: ClusterId::Dev,
            });
        };

        let index: i64 = raw.parse().map_err(|_| {
            DomainError::InvalidDeployment(format!("cluster id '{raw}' is not a number"))
        })?;

        let cluster_id = ClusterId::from_index(index).ok_or_else(|| {
            DomainError::InvalidDeployment(format!("cluster id {index} is out of range"))
        })?;

        Ok(Self {
            environment,
            cluster_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(RuntimeEnvironment::parse("production"), RuntimeEnvironment::Production);
        assert_eq!(RuntimeEnvironment::parse("TeSt"), RuntimeEnvironment::Test);
        assert_eq!(RuntimeEnvironment::parse("staging"), RuntimeEnvironment::Development);
        assert_eq!(RuntimeEnvironment::parse(""), RuntimeEnvironment::Development);
    }

    #[test]
    fn test_development_defaults_cluster() {
        let ctx = DeploymentContext::from_flags("development", None).unwrap();
        assert_eq!(ctx.cluster_id, ClusterId::Dev);

        let ctx = DeploymentContext::from_flags("development", Some("")).unwrap();
        assert_eq!(ctx.cluster_id, ClusterId::Dev);
    }

    #[test]
    fn test_production_requires_cluster() {
        let err = DeploymentContext::from_flags("production", None).unwrap_err();
        assert!(err.to_string().contains("CLUSTER_ID is not set"));
    }

    #[test]
    fn test_cluster_id_parsing() {
        let ctx = DeploymentContext::from_flags("production", Some("4")).unwrap();
        assert_eq!(ctx.environment, RuntimeEnvironment::Production);
        assert_eq!(ctx.cluster_id, ClusterId::AwsUsWest2_1);
        assert_eq!(ctx.cluster_id.index(), 4);

        assert!(DeploymentContext::from_flags("test", Some("9")).is_err());
        assert!(DeploymentContext::from_flags("test", Some("-1")).is_err());
        assert!(DeploymentContext::from_flags("test", Some("one")).is_err());
    }
}
