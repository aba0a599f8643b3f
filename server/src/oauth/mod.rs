//! OAuth2 / OIDC flow pieces: provider discovery, token exchange and
//! refresh, and the organization connection check.

pub mod discovery;
pub mod org;
pub mod token;
