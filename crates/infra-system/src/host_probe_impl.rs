// Host probe implementation
// reason: /proc/net/route is the only gateway source that needs no extra tooling in a container
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing::debug;

use envetcd_core::port::host_probe::{HostProbe, ProbeError};

/// Kernel IPv4 routing table
pub const ROUTE_TABLE_PATH: &str = "/proc/net/route";

/// Destination column value of the default route
const DEFAULT_DESTINATION: &str = "00000000";

/// Host probe backed by the OS
pub struct SystemHostProbe {
    route_table: PathBuf,
}

impl SystemHostProbe {
    pub fn new() -> Self {
        Self::with_route_table(ROUTE_TABLE_PATH)
    }

    /// Read routes from another file (tests, non-standard procfs mounts)
    pub fn with_route_table(path: impl Into<PathBuf>) -> Self {
        Self {
            route_table: path.into(),
        }
    }
}

impl Default for SystemHostProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostProbe for SystemHostProbe {
    fn hostname(&self) -> Result<String, ProbeError> {
        #[cfg(unix)]
        {
            let name = nix::unistd::gethostname().map_err(|e| ProbeError::Io(e.to_string()))?;
            name.into_string()
                .map_err(|_| ProbeError::Malformed("hostname is not valid UTF-8".to_string()))
        }

        #[cfg(not(unix))]
        {
            std::env::var("COMPUTERNAME")
                .map_err(|_| ProbeError::Unsupported("cannot determine hostname".to_string()))
        }
    }

    async fn default_gateway(&self) -> Result<Ipv4Addr, ProbeError> {
        if !cfg!(target_os = "linux") {
            return Err(ProbeError::Unsupported(
                "not attempting to determine default gateway on non-linux OS".to_string(),
            ));
        }

        let table = tokio::fs::read_to_string(&self.route_table)
            .await
            .map_err(|e| ProbeError::Io(format!("{}: {e}", self.route_table.display())))?;

        let gateway = scan_route_table(&table)?;
        debug!(gateway = %gateway, "Found default gateway");
        Ok(gateway)
    }
}

/// Find the default route's gateway in `/proc/net/route` content
///
/// Columns are whitespace separated; the header row starts with `Iface`.
/// The gateway is a hex u32 in host (little-endian) byte order, so
/// `010C150A` is `10.21.12.1`.
///
/// # Errors
/// - ProbeError::NoDefaultRoute if no row has destination `00000000`
/// - ProbeError::Malformed if that row has no parseable gateway
pub fn scan_route_table(table: &str) -> Result<Ipv4Addr, ProbeError> {
    for line in table.lines() {
        let mut fields = line.split_whitespace();
        let Some(iface) = fields.next() else {
            continue;
        };
        if iface == "Iface" {
            continue;
        }

        if fields.next() != Some(DEFAULT_DESTINATION) {
            continue;
        }

        let gateway = fields
            .next()
            .ok_or_else(|| ProbeError::Malformed(format!("no gateway column: {line}")))?;
        let raw = u32::from_str_radix(gateway, 16)
            .map_err(|e| ProbeError::Malformed(format!("gateway '{gateway}': {e}")))?;

        return Ok(Ipv4Addr::from(raw.to_le_bytes()));
    }

    Err(ProbeError::NoDefaultRoute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_TABLE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t00000000\t010C150A\t0003\t0\t0\t0\t00000000\t0\t0\t0
eth0\t000C150A\t00000000\t0001\t0\t0\t0\t00FCFFFF\t0\t0\t0
";

    #[test]
    fn test_scan_default_route() {
        let gateway = tokio_test::assert_ok!(scan_route_table(SAMPLE_TABLE));
        assert_eq!(gateway, Ipv4Addr::new(10, 21, 12, 1));
    }

    #[test]
    fn test_scan_without_default_route() {
        let table = "\
Iface\tDestination\tGateway \tFlags
eth0\t000C150A\t00000000\t0001
";
        assert!(matches!(
            scan_route_table(table),
            Err(ProbeError::NoDefaultRoute)
        ));
    }

    #[test]
    fn test_scan_bad_gateway() {
        let table = "eth0\t00000000\tZZZZ\t0003\n";
        assert!(matches!(
            scan_route_table(table),
            Err(ProbeError::Malformed(_))
        ));
    }

    #[test]
    fn test_hostname_not_empty() {
        let probe = SystemHostProbe::new();
        let name = probe.hostname().unwrap();
        assert!(!name.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_default_gateway_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_TABLE.as_bytes()).unwrap();

        let probe = SystemHostProbe::with_route_table(file.path());
        let gateway = probe.default_gateway().await.unwrap();
        assert_eq!(gateway, Ipv4Addr::new(10, 21, 12, 1));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_default_gateway_missing_file() {
        let probe = SystemHostProbe::with_route_table("/nonexistent/envetcd/route");
        assert!(matches!(
            probe.default_gateway().await,
            Err(ProbeError::Io(_))
        ));
    }
}
