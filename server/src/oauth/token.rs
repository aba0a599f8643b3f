use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::errors::FlowError;

/// Raw token-endpoint response for both the `authorization_code` and
/// `refresh_token` grants.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// A complete set of credentials from one token exchange. Constructed as a
/// unit so the access token, refresh token, decoded claims, and expiry can
/// never drift apart: a decode failure means no `TokenSet` at all.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    /// Pretty-printed JSON claims from the access token's payload segment.
    pub claims_pretty: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    pub fn from_response(response: TokenResponse) -> Result<Self, FlowError> {
        // Decode first. If the token is malformed nothing is stored.
        let claims_pretty = decode_payload_claims(&response.access_token)?;

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            claims_pretty,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        })
    }
}

/// Decode the middle (payload) segment of a JWT-shaped access token and
/// pretty-print it for display. The segment arrives unpadded, so it is
/// `=`-padded to a multiple of four before base64url decoding.
fn decode_payload_claims(access_token: &str) -> Result<String, FlowError> {
    let segments: Vec<&str> = access_token.split('.').collect();
    if segments.len() != 3 {
        return Err(FlowError::TokenDecode(format!(
            "expected 3 dot-separated segments, found {}",
            segments.len()
        )));
    }

    let mut payload = segments[1].to_string();
    while payload.len() % 4 != 0 {
        payload.push('=');
    }

    let bytes = URL_SAFE
        .decode(payload.as_bytes())
        .map_err(|e| FlowError::TokenDecode(format!("payload is not valid base64url: {e}")))?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| FlowError::TokenDecode(format!("payload is not valid JSON: {e}")))?;

    serde_json::to_string_pretty(&claims).map_err(|e| FlowError::TokenDecode(e.to_string()))
}

/// Exchange an authorization code for a token set.
pub async fn exchange_code(
    client: &reqwest::Client,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
    scope: &str,
) -> Result<TokenSet, FlowError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
        ("code", code),
        ("scope", scope),
    ];

    request_token(client, token_endpoint, client_id, client_secret, &params).await
}

/// Exchange a refresh token for a fresh token set. Same endpoint, shape,
/// and client authentication as the code exchange.
pub async fn refresh_token(
    client: &reqwest::Client,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    redirect_uri: &str,
    scope: &str,
) -> Result<TokenSet, FlowError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("redirect_uri", redirect_uri),
        ("refresh_token", refresh_token),
        ("scope", scope),
    ];

    request_token(client, token_endpoint, client_id, client_secret, &params).await
}

async fn request_token(
    client: &reqwest::Client,
    token_endpoint: &str,
    client_id: &str,
    client_secret: &str,
    params: &[(&str, &str)],
) -> Result<TokenSet, FlowError> {
    let response = client
        .post(token_endpoint)
        .basic_auth(client_id, Some(client_secret))
        .header(reqwest::header::ACCEPT, "application/json")
        .form(params)
        .send()
        .await
        .map_err(|e| FlowError::Network("token endpoint request", e))?;

    if !response.status().is_success() {
        return Err(FlowError::UpstreamStatus(
            "token endpoint",
            response.status(),
        ));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| FlowError::Network("token response parse", e))?;

    TokenSet::from_response(token)
}
