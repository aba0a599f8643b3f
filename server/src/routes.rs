use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use maud::html;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::components::{
    form::{Form as HtmlForm, InputField},
    layout::{Card, ContentSection, Page},
    ui::{
        badge::{Badge, BadgeColor},
        button::{Button, ButtonVariant},
        heading::Heading,
    },
};
use crate::errors::FlowError;
use crate::oauth::{discovery::fetch_metadata, org::needs_organization_access, token};
use crate::state::{AppState, Session};

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", get(index).post(start_flow))
        .route("/callback", get(callback))
        .route("/call-api", post(call_api))
        .route("/refresh-access-token", get(refresh_access_token))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Render the current settings and token state.
async fn index(State(state): State<AppState>) -> Page {
    let session = state.session.read().await.clone();
    main_view(&session)
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub client_id: String,
    pub client_secret: String,
    pub well_known: String,
    pub callback_url: String,
    pub scopes: String,
    pub state: String,
}

/// Seed the session with the submitted client settings and redirect the
/// browser to the identity provider's authorization endpoint.
async fn start_flow(State(state): State<AppState>, Form(form): Form<SettingsForm>) -> Response {
    {
        let mut session = state.session.write().await;
        session.client_id = form.client_id;
        session.client_secret = form.client_secret;
        session.well_known_url = form.well_known;
        session.callback_url = form.callback_url;
        session.scopes = form.scopes;
        session.state_nonce = form.state;
    }

    let session = state.session.read().await.clone();
    match fetch_metadata(&state.http, &session.well_known_url).await {
        Ok(metadata) => {
            let url = authorization_url(&metadata.authorization_endpoint, &session);
            info!("redirecting to identity provider: {url}");
            Redirect::to(&url).into_response()
        }
        Err(err) => {
            error!(error = ?err, "failed to fetch provider metadata");
            error_page("Error starting authorization flow!").into_response()
        }
    }
}

fn authorization_url(authorization_endpoint: &str, session: &Session) -> String {
    format!(
        "{}?client_id={}&response_type=code&scope={}&redirect_uri={}&state={}",
        authorization_endpoint,
        session.client_id,
        urlencoding::encode(&session.scopes),
        session.callback_url,
        session.state_nonce
    )
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OIDC redirect target: exchange the code, store the tokens, then check
/// whether an organization still needs its connection granted.
async fn callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Response {
    match run_callback(&state, &params).await {
        Ok(Some(connection_url)) => {
            info!("organization requires connection, redirecting to {connection_url}");
            Redirect::to(&connection_url).into_response()
        }
        Ok(None) => {
            let session = state.session.read().await.clone();
            main_view(&session).into_response()
        }
        Err(err) => {
            error!(error = ?err, "authorization code exchange failed");
            error_page("Error getting token!").into_response()
        }
    }
}

async fn run_callback(
    state: &AppState,
    params: &CallbackParams,
) -> Result<Option<String>, FlowError> {
    if let Some(provider_error) = &params.error {
        let description = params
            .error_description
            .as_deref()
            .unwrap_or("no description provided");
        return Err(FlowError::Provider(format!(
            "{provider_error}: {description}"
        )));
    }

    let code = params
        .code
        .as_deref()
        .ok_or(FlowError::MissingInput("code"))?;

    let session = state.session.read().await.clone();

    // The state echo is round-tripped but not enforced; a mismatch is made
    // visible in the logs.
    match params.state.as_deref() {
        Some(echoed) if echoed != session.state_nonce => {
            warn!(
                sent = %session.state_nonce,
                echoed,
                "state parameter mismatch on callback"
            );
        }
        None => warn!("identity provider did not echo the state parameter"),
        _ => {}
    }

    let metadata = fetch_metadata(&state.http, &session.well_known_url).await?;
    let token_set = token::exchange_code(
        &state.http,
        &metadata.token_endpoint,
        &session.client_id,
        &session.client_secret,
        code,
        &session.callback_url,
        &session.scopes,
    )
    .await?;

    let access_token = token_set.access_token.clone();
    state.session.write().await.token = Some(token_set);

    needs_organization_access(
        &state.http,
        &session.api_url,
        &access_token,
        &session.org_connection_completed_url,
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct CallApiForm {
    pub url: Option<String>,
}

/// Proxy an authenticated GET to an arbitrary platform resource and show
/// the response on the main view.
async fn call_api(State(state): State<AppState>, Form(form): Form<CallApiForm>) -> Response {
    match run_call_api(&state, form.url.as_deref()).await {
        Ok(()) => {
            let session = state.session.read().await.clone();
            main_view(&session).into_response()
        }
        Err(err) => {
            error!(error = ?err, "proxied API call failed");
            error_page("Error calling API!").into_response()
        }
    }
}

async fn run_call_api(state: &AppState, url: Option<&str>) -> Result<(), FlowError> {
    let url = url
        .filter(|u| !u.is_empty())
        .ok_or(FlowError::MissingInput("url"))?;

    let access_token = {
        let session = state.session.read().await;
        session
            .token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(FlowError::MissingInput("access token"))?
    };

    let response = crate::api::api_get(&state.http, &access_token, url).await?;
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| FlowError::Network("API response parse", e))?;
    let pretty = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());

    state.session.write().await.last_api_response = Some(pretty);
    Ok(())
}

/// Trade the stored refresh token for a new token pair.
async fn refresh_access_token(State(state): State<AppState>) -> Response {
    match run_refresh(&state).await {
        Ok(()) => {
            let session = state.session.read().await.clone();
            main_view(&session).into_response()
        }
        Err(err) => {
            error!(error = ?err, "token refresh failed");
            error_page("Error getting refresh token!").into_response()
        }
    }
}

async fn run_refresh(state: &AppState) -> Result<(), FlowError> {
    let session = state.session.read().await.clone();
    let refresh = session
        .token
        .as_ref()
        .map(|t| t.refresh_token.clone())
        .ok_or(FlowError::MissingInput("refresh token"))?;

    let metadata = fetch_metadata(&state.http, &session.well_known_url).await?;
    let token_set = token::refresh_token(
        &state.http,
        &metadata.token_endpoint,
        &session.client_id,
        &session.client_secret,
        &refresh,
        &session.callback_url,
        &session.scopes,
    )
    .await?;

    // The previous token set stays in place until the new one has decoded
    // cleanly.
    state.session.write().await.token = Some(token_set);
    Ok(())
}

fn main_view(session: &Session) -> Page {
    let settings_form = html! {
        (Heading::h2("Client settings"))
        (HtmlForm::new("/", "post", html! {
            (InputField::new("client_id").label("Client ID").value(&session.client_id).required(true))
            (InputField::new("client_secret").label("Client secret").input_type("password").value(&session.client_secret).required(true))
            (InputField::new("well_known").label("Well-known discovery URL").value(&session.well_known_url).required(true))
            (InputField::new("callback_url").label("Callback URL").value(&session.callback_url).required(true))
            (InputField::new("scopes").label("Scopes").value(&session.scopes).required(true))
            (InputField::new("state").value(&session.state_nonce).hidden(true))
            (Button::primary("Sign in with the equipment platform").full_width(true))
        }))
    };

    let token_section = match &session.token {
        Some(token) => html! {
            div class="flex items-center gap-3 mb-4" {
                (Heading::h2("Token"))
                (Badge::new("Authenticated", BadgeColor::Green))
            }
            dl class="space-y-3 text-sm" {
                dt class="font-medium text-gray-700" { "Access token" }
                dd { pre class="bg-gray-50 p-2 rounded whitespace-pre-wrap break-all" { (token.access_token) } }
                dt class="font-medium text-gray-700" { "Refresh token" }
                dd { pre class="bg-gray-50 p-2 rounded whitespace-pre-wrap break-all" { (token.refresh_token) } }
                dt class="font-medium text-gray-700" { "Expires at" }
                dd class="text-gray-600" { (token.expires_at.format("%Y-%m-%d %H:%M:%S UTC")) }
                dt class="font-medium text-gray-700" { "Decoded claims" }
                dd { pre class="bg-gray-50 p-2 rounded overflow-x-auto text-xs" { (token.claims_pretty) } }
            }
            div class="mt-4" {
                (Button::new("Refresh access token").variant(ButtonVariant::Secondary).href("/refresh-access-token"))
            }
        },
        None => html! {
            div class="flex items-center gap-3 mb-2" {
                (Heading::h2("Token"))
                (Badge::new("Not authenticated", BadgeColor::Gray))
            }
            p class="text-gray-600 text-sm" {
                "Submit the client settings above to start the authorization flow."
            }
        },
    };

    let placeholder = format!("{}/organizations", session.api_url);
    let api_console = html! {
        (Heading::h2("Call the platform API"))
        (HtmlForm::new("/call-api", "post", html! {
            (InputField::new("url").label("Resource URL").placeholder(&placeholder).required(true))
            (Button::primary("Call API"))
        }))
        @if let Some(response) = &session.last_api_response {
            div class="mt-4" {
                (Heading::h3("Last response"))
                pre class="bg-gray-900 text-green-200 p-3 rounded-lg overflow-x-auto text-xs" { (response) }
            }
        }
    };

    let content = html! {
        div class="max-w-2xl mx-auto" {
            div class="text-center mb-6" {
                (Heading::h1("agrigate").with_color("text-green-800"))
                p class="text-gray-600" { "Three-legged OAuth against the equipment platform API" }
            }
            (Card::new(ContentSection::new(settings_form)).with_max_width("max-w-2xl"))
            (Card::new(ContentSection::new(token_section)).with_max_width("max-w-2xl"))
            (Card::new(ContentSection::new(api_console)).with_max_width("max-w-2xl"))
        }
    };

    Page::new(
        "agrigate - Equipment Platform OAuth".to_string(),
        Box::new(content),
    )
}

fn error_page(message: &str) -> Page {
    let content = html! {
        div class="px-8 py-6 text-center" {
            (Heading::h1("Something went wrong").with_color("text-red-700"))
            p class="text-gray-700 mb-6" { (message) }
            (Button::primary("Return to settings").href("/"))
        }
    };

    Page::new("agrigate - Error".to_string(), Box::new(Card::new(content)))
}
