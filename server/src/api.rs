use crate::errors::FlowError;

/// Versioned media type the platform API expects in `Accept`.
pub const PLATFORM_MEDIA_TYPE: &str = "application/vnd.deere.axiom.v3+json";

/// Issue a bearer-authenticated GET against the platform API. The response
/// is handed back as-is, non-2xx included; callers decide what a failure
/// looks like for their resource.
pub async fn api_get(
    client: &reqwest::Client,
    access_token: &str,
    url: &str,
) -> Result<reqwest::Response, FlowError> {
    client
        .get(url)
        .bearer_auth(access_token)
        .header(reqwest::header::ACCEPT, PLATFORM_MEDIA_TYPE)
        .send()
        .await
        .map_err(|e| FlowError::Network("platform API request", e))
}
