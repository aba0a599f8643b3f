use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

fn start_fixture(bin: &str, port: u16, extra_args: &[&str]) -> Child {
    let port = port.to_string();
    let mut args = vec![
        "run",
        "-p",
        "fixtures",
        "--bin",
        bin,
        "--",
        "--port",
        port.as_str(),
    ];
    args.extend_from_slice(extra_args);

    Command::new("cargo")
        .args(args)
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to start {bin} fixture: {e}"))
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    for _ in 0..240 {
        if client
            .get(format!("http://localhost:{port}/"))
            .send()
            .await
            .is_ok()
        {
            return;
        }
        sleep(Duration::from_millis(500)).await;
    }
    panic!("Server failed to start on port {port}");
}

#[tokio::test]
async fn idp_serves_discovery_document() {
    let port = 9101;
    let mut server = start_fixture("idp", port, &[]);
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!(
            "http://localhost:{port}/.well-known/oauth-authorization-server"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    assert_eq!(
        json["authorization_endpoint"],
        format!("http://127.0.0.1:{port}/authorize")
    );
    assert_eq!(
        json["token_endpoint"],
        format!("http://127.0.0.1:{port}/token")
    );

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}

#[tokio::test]
async fn idp_authorize_redirects_back_with_code_and_state() {
    let port = 9102;
    let mut server = start_fixture("idp", port, &[]);
    wait_for_server(port).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .get(format!(
            "http://localhost:{port}/authorize?client_id=demo&response_type=code&redirect_uri=http://localhost:9090/callback&state=abc"
        ))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(location.starts_with("http://localhost:9090/callback?"));
    assert!(location.contains("code=fixture-auth-code"));
    assert!(location.contains("state=abc"));

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}

#[tokio::test]
async fn idp_token_endpoint_requires_basic_auth() {
    let port = 9103;
    let mut server = start_fixture("idp", port, &[]);
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let token_url = format!("http://localhost:{port}/token");
    let params = [
        ("grant_type", "authorization_code"),
        ("code", "fixture-auth-code"),
        ("redirect_uri", "http://localhost:9090/callback"),
        ("scope", "ag1 ag2"),
    ];

    // No client authentication: rejected.
    let response = client.post(&token_url).form(&params).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Basic auth: a full token response with a decodable JWT payload.
    let response = client
        .post(&token_url)
        .basic_auth("demo-client", Some("demo-secret"))
        .form(&params)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["refresh_token"], "fixture-refresh-token");

    let access_token = json["access_token"].as_str().unwrap();
    let segments: Vec<&str> = access_token.split('.').collect();
    assert_eq!(segments.len(), 3);

    let payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();
    let claims: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(claims["sub"], "fixture-user");

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}

#[tokio::test]
async fn idp_token_endpoint_handles_refresh_grant() {
    let port = 9104;
    let mut server = start_fixture("idp", port, &[]);
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let token_url = format!("http://localhost:{port}/token");

    // Refresh grant without a refresh token: rejected.
    let response = client
        .post(&token_url)
        .basic_auth("demo-client", Some("demo-secret"))
        .form(&[("grant_type", "refresh_token")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client
        .post(&token_url)
        .basic_auth("demo-client", Some("demo-secret"))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", "fixture-refresh-token"),
            ("redirect_uri", "http://localhost:9090/callback"),
            ("scope", "ag1 ag2"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    assert!(json["access_token"].as_str().unwrap().contains('.'));

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}

#[tokio::test]
async fn platform_flags_an_organization_needing_connection() {
    let port = 9105;
    let mut server = start_fixture("platform", port, &[]);
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let orgs_url = format!("http://localhost:{port}/organizations");

    // Bearer token is required.
    let response = client.get(&orgs_url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = client
        .get(&orgs_url)
        .bearer_auth("fixture-access-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    let values = json["values"].as_array().unwrap();
    assert_eq!(values.len(), 2);

    // The first organization is fully connected; the second still carries
    // the connections link.
    let first_rels: Vec<&str> = values[0]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert!(!first_rels.contains(&"connections"));

    let connections = values[1]["links"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["rel"] == "connections")
        .expect("second organization should have a connections link");
    assert!(connections["uri"].as_str().unwrap().contains("/connections/"));

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}

#[tokio::test]
async fn platform_with_all_connections_granted_has_no_connections_rel() {
    let port = 9106;
    let mut server = start_fixture("platform", port, &["--connected"]);
    wait_for_server(port).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://localhost:{port}/organizations"))
        .bearer_auth("fixture-access-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    for org in json["values"].as_array().unwrap() {
        for link in org["links"].as_array().unwrap() {
            assert_ne!(link["rel"], "connections");
        }
    }

    server.kill().expect("Failed to kill server");
    server.wait().expect("Failed to wait for server");
}
