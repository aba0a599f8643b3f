use std::env;

/// Default scope list for the John Deere sandbox. The settings form can
/// override it per flow.
pub const DEFAULT_SCOPES: &str = "ag1 ag2 ag3 eq1 eq2 org1 org2 files offline_access";

const DEFAULT_API_URL: &str = "https://sandboxapi.deere.com/platform";
const DEFAULT_WELL_KNOWN_URL: &str =
    "https://signin.johndeere.com/oauth2/aus78tnlaysMraFhC1t7/.well-known/oauth-authorization-server";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub host: String,
    pub port: u16,
    pub api_url: String,
    pub well_known_url: String,
    pub scopes: String,
}

impl AppConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        let port = match env::var("SERVER_PORT") {
            Ok(port) => port.parse()?,
            Err(_) => 9090,
        };

        Ok(Self {
            client_id: env::var("CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("CLIENT_SECRET").unwrap_or_default(),
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port,
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            well_known_url: env::var("WELL_KNOWN_URL")
                .unwrap_or_else(|_| DEFAULT_WELL_KNOWN_URL.to_string()),
            scopes: env::var("SCOPES").unwrap_or_else(|_| DEFAULT_SCOPES.to_string()),
        })
    }

    /// Base URL this server is reachable at from a browser.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The redirect target registered with the identity provider.
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.server_url())
    }

    /// Where the provider sends the user after an organization connection
    /// has been granted.
    pub fn org_connection_completed_url(&self) -> String {
        self.server_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            host: "localhost".to_string(),
            port: 9090,
            api_url: DEFAULT_API_URL.to_string(),
            well_known_url: DEFAULT_WELL_KNOWN_URL.to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
        }
    }

    #[test]
    fn callback_url_is_under_server_url() {
        let config = test_config();
        assert_eq!(config.server_url(), "http://localhost:9090");
        assert_eq!(config.callback_url(), "http://localhost:9090/callback");
    }

    #[test]
    fn org_connection_completed_url_is_the_root() {
        let config = test_config();
        assert_eq!(
            config.org_connection_completed_url(),
            "http://localhost:9090"
        );
    }
}
