use thiserror::Error;

/// Failures a single flow operation can surface. Every route handler does
/// one explicit match over its operation's result and picks the rendered
/// view; none of these ever escape a handler as a raw 500.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0} failed")]
    Network(&'static str, #[source] reqwest::Error),

    #[error("{0} returned status {1}")]
    UpstreamStatus(&'static str, reqwest::StatusCode),

    #[error("upstream response is missing `{0}`")]
    MalformedResponse(&'static str),

    #[error("failed to decode access token payload: {0}")]
    TokenDecode(String),

    #[error("missing required input `{0}`")]
    MissingInput(&'static str),

    #[error("identity provider returned an error: {0}")]
    Provider(String),
}
