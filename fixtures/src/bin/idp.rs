use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use clap::Parser;
use fixtures::{run_server, FixtureArgs};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Mock OAuth2 / OIDC identity provider fixture server
#[derive(Parser, Debug)]
#[clap(name = "idp-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,
}

#[derive(Clone)]
struct AppState {
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let state = AppState {
        base_url: args.common.base_url(),
    };

    let app = Router::new()
        .route("/.well-known/oauth-authorization-server", get(discovery))
        .route("/authorize", get(authorize))
        .route("/token", post(token))
        .with_state(state);

    run_server(args.common, app).await
}

async fn discovery(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "issuer": state.base_url,
        "authorization_endpoint": format!("{}/authorize", state.base_url),
        "token_endpoint": format!("{}/token", state.base_url),
        "scopes_supported": ["ag1", "ag2", "ag3", "org1", "org2", "offline_access"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
    }))
}

/// Skip the login/consent screens and bounce straight back to the client
/// with a canned authorization code, echoing the state parameter.
async fn authorize(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let Some(redirect_uri) = params.get("redirect_uri") else {
        return (StatusCode::BAD_REQUEST, "missing redirect_uri").into_response();
    };

    let state = params.get("state").cloned().unwrap_or_default();
    Redirect::to(&format!(
        "{redirect_uri}?code=fixture-auth-code&state={state}"
    ))
    .into_response()
}

async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    // Client authentication must be HTTP Basic with an id:secret pair.
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .map(|decoded| decoded.contains(&b':'))
        .unwrap_or(false);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        )
            .into_response();
    }

    let grant_ok = match params.get("grant_type").map(String::as_str) {
        Some("authorization_code") => params.contains_key("code"),
        Some("refresh_token") => params.contains_key("refresh_token"),
        _ => false,
    };

    if !grant_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response();
    }

    // A JWT-shaped access token: unsigned, but with a decodable payload
    // segment like the real provider issues.
    let claims = json!({
        "sub": "fixture-user",
        "iss": state.base_url,
        "aud": "platform",
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let access_token = format!("eyJhbGciOiJub25lIn0.{payload}.fixture-signature");

    Json(json!({
        "access_token": access_token,
        "refresh_token": "fixture-refresh-token",
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}
