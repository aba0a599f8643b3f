use serde::Deserialize;

use crate::errors::FlowError;

/// The subset of the provider's well-known discovery document this flow
/// needs. Everything else in the document is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
}

/// Fetch the discovery document. Re-fetched on every call; the endpoints
/// are cheap to look up and a stale cache is worse than the extra request
/// for a single-operator tool.
pub async fn fetch_metadata(
    client: &reqwest::Client,
    well_known_url: &str,
) -> Result<ProviderMetadata, FlowError> {
    let response = client
        .get(well_known_url)
        .send()
        .await
        .map_err(|e| FlowError::Network("discovery document request", e))?;

    if !response.status().is_success() {
        return Err(FlowError::UpstreamStatus(
            "discovery document",
            response.status(),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| FlowError::Network("discovery document parse", e))
}
