use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clap::Parser;
use fixtures::{run_server, FixtureArgs};
use serde_json::json;

/// Mock agricultural-equipment platform API fixture server
#[derive(Parser, Debug)]
#[clap(name = "platform-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Serve organizations with every connection already granted
    #[clap(long)]
    connected: bool,
}

#[derive(Clone)]
struct AppState {
    base_url: String,
    connected: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let state = AppState {
        base_url: args.common.base_url(),
        connected: args.connected,
    };

    let app = Router::new()
        .route("/organizations", get(organizations))
        .route("/organizations/:id", get(organization))
        .with_state(state);

    run_server(args.common, app).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
}

async fn organizations(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if bearer_token(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "access_denied"})),
        )
            .into_response();
    }

    let mut second_org_links = vec![json!({
        "rel": "self",
        "uri": format!("{}/organizations/2", state.base_url),
    })];
    if !state.connected {
        second_org_links.push(json!({
            "rel": "connections",
            "uri": format!("{}/connections/agrigate-demo", state.base_url),
        }));
    }

    Json(json!({
        "values": [
            {
                "id": "1",
                "name": "Sunrise Farms",
                "links": [
                    {"rel": "self", "uri": format!("{}/organizations/1", state.base_url)},
                ],
            },
            {
                "id": "2",
                "name": "Acme Growers",
                "links": second_org_links,
            },
        ],
    }))
    .into_response()
}

async fn organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if bearer_token(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "access_denied"})),
        )
            .into_response();
    }

    Json(json!({
        "id": id,
        "name": "Sunrise Farms",
        "links": [
            {"rel": "self", "uri": format!("{}/organizations/{id}", state.base_url)},
        ],
    }))
    .into_response()
}
