// Cluster member discovery (`GET /v2/members`)

use reqwest::Url;
use tracing::debug;

use crate::response::MembersResponse;

/// Ask one peer for every member's advertised client URLs
pub(crate) async fn fetch_client_urls(
    client: &reqwest::Client,
    peer: &str,
) -> Result<Vec<String>, String> {
    let mut url = Url::parse(peer).map_err(|e| format!("invalid peer URL '{peer}': {e}"))?;
    url.set_path("/v2/members");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("{peer}: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("{peer}: HTTP {}", response.status()));
    }

    let body: MembersResponse = response
        .json()
        .await
        .map_err(|e| format!("{peer}: invalid members response: {e}"))?;

    let mut urls = Vec::new();
    for member in body.members {
        debug!(member = %member.name, urls = ?member.client_urls, "Cluster member");
        for client_url in member.client_urls {
            let client_url = client_url.trim_end_matches('/').to_string();
            if !urls.contains(&client_url) {
                urls.push(client_url);
            }
        }
    }

    Ok(urls)
}
