use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::oauth::token::TokenSet;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub http: reqwest::Client,
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn from_env() -> color_eyre::Result<Self> {
        let config = AppConfig::from_env()?;

        let http = reqwest::ClientBuilder::new().use_rustls_tls().build()?;

        let session = Session::from_config(&config);

        Ok(Self {
            config,
            http,
            session: Arc::new(RwLock::new(session)),
        })
    }
}

/// The single flow's mutable state. One instance lives behind a lock on
/// [`AppState`] for the process lifetime; the write lock is what makes a
/// token update all-or-nothing from the point of view of other requests.
#[derive(Debug, Clone)]
pub struct Session {
    pub client_id: String,
    pub client_secret: String,
    pub well_known_url: String,
    pub callback_url: String,
    pub scopes: String,
    pub state_nonce: String,
    pub api_url: String,
    pub org_connection_completed_url: String,
    /// Tokens, decoded claims, and expiry from the most recent exchange.
    pub token: Option<TokenSet>,
    /// Pretty-printed body of the most recent proxied API call.
    pub last_api_response: Option<String>,
}

impl Session {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            well_known_url: config.well_known_url.clone(),
            callback_url: config.callback_url(),
            scopes: config.scopes.clone(),
            state_nonce: Uuid::new_v4().to_string(),
            api_url: config.api_url.clone(),
            org_connection_completed_url: config.org_connection_completed_url(),
            token: None,
            last_api_response: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_unauthenticated() {
        let config = AppConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            host: "localhost".to_string(),
            port: 9090,
            api_url: "https://api.example.com/platform".to_string(),
            well_known_url: "https://idp.example.com/.well-known".to_string(),
            scopes: "ag1 ag2".to_string(),
        };

        let session = Session::from_config(&config);

        assert!(session.token.is_none());
        assert!(session.last_api_response.is_none());
        assert_eq!(session.callback_url, "http://localhost:9090/callback");
        // The nonce is a parseable v4 UUID
        assert!(Uuid::parse_str(&session.state_nonce).is_ok());
    }
}
