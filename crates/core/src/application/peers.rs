// Peer address normalization
// Applied once, before the store adapter is built

use std::net::Ipv4Addr;

use tracing::debug;
use url::Url;

use crate::error::{AppError, Result};

/// Scheme assumed for endpoints given as bare `host:port`
pub const DEFAULT_PEER_SCHEME: &str = "http://";

/// Client port the store listens on when reached through the default gateway
pub const DEFAULT_STORE_PORT: u16 = 4001;

/// Normalize raw endpoint strings into absolute URLs
///
/// Entries without a scheme get `http://`. Order and duplicates are kept.
///
/// # Errors
/// - AppError::PeerConfiguration naming the first entry that does not
///   parse as a URL with a host
///
/// # Example
/// ```text
/// normalize_peers(&["127.0.0.1:4001".into()])? == vec!["http://127.0.0.1:4001"]
/// ```
pub fn normalize_peers(peers: &[String]) -> Result<Vec<String>> {
    peers.iter().map(|peer| normalize_peer(peer)).collect()
}

fn normalize_peer(peer: &str) -> Result<String> {
    let trimmed = peer.trim();
    let invalid = |reason: String| AppError::PeerConfiguration {
        peer: peer.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("empty endpoint".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_PEER_SCHEME}{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    let normalized = url.as_str().trim_end_matches('/').to_string();
    debug!(peer = %peer, normalized = %normalized, "Normalized peer");
    Ok(normalized)
}

/// Peer URL for a store reachable through the default gateway
pub fn gateway_peer(gateway: Ipv4Addr) -> String {
    format!("{DEFAULT_PEER_SCHEME}{gateway}:{DEFAULT_STORE_PORT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schemeless_peer_gets_http() {
        let out = normalize_peers(&peers(&["127.0.0.1:4001", "http://127.0.0.1:4001"])).unwrap();
        assert_eq!(out, vec!["http://127.0.0.1:4001", "http://127.0.0.1:4001"]);
    }

    #[test]
    fn test_https_peer_unchanged() {
        let out = normalize_peers(&peers(&["https://etcd.internal:2379"])).unwrap();
        assert_eq!(out, vec!["https://etcd.internal:2379"]);
    }

    #[test]
    fn test_bare_colon_is_rejected() {
        let err = normalize_peers(&peers(&[":"])).unwrap_err();
        match err {
            AppError::PeerConfiguration { peer, .. } => assert_eq!(peer, ":"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_names_offending_entry() {
        let err = normalize_peers(&peers(&["127.0.0.1:4001", "host:notaport"])).unwrap_err();
        assert!(err.to_string().contains("host:notaport"));
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert!(normalize_peers(&peers(&["  "])).is_err());
    }

    #[test]
    fn test_gateway_peer() {
        assert_eq!(
            gateway_peer(Ipv4Addr::new(10, 21, 12, 1)),
            "http://10.21.12.1:4001"
        );
    }
}
