use color_eyre::eyre::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod components;
mod config;
mod errors;
mod oauth;
mod routes;
mod state;

use state::AppState;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_application())
}

async fn run_application() -> color_eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_state = AppState::from_env()?;

    let addr = format!("{}:{}", app_state.config.host, app_state.config.port);
    info!("agrigate listening on {addr}");
    info!("OAuth callback URL: {}", app_state.config.callback_url());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, routes::routes(app_state)).await?;

    Ok(())
}
