mod api;
mod middleware;

use std::{net::SocketAddr, sync::Arc};

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, rate_limit_from_config, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(serplens_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let profiles = serplens_core::load_profiles(&config.profiles_path)?;
    tracing::info!(profiles = profiles.profiles.len(), "brand profiles loaded");

    let gemini = config
        .gemini_api_key
        .as_deref()
        .map(|key| {
            serplens_provider::GeminiClient::new(
                key,
                config.provider_request_timeout_secs,
                &config.gemini_model,
                &config.gemini_grounded_model,
            )
        })
        .transpose()?
        .map(Arc::new);
    let openai = config
        .openai_api_key
        .as_deref()
        .map(|key| {
            serplens_provider::OpenAiClient::new(
                key,
                config.provider_request_timeout_secs,
                &config.openai_model,
                &config.openai_chat_model,
            )
        })
        .transpose()?
        .map(Arc::new);
    tracing::info!(
        gemini = gemini.is_some(),
        openai = openai.is_some(),
        "provider clients configured"
    );

    let archive = serplens_engine::GrowthArchive::open(&config.archive_path)?;

    let auth = AuthState::from_env(matches!(
        config.env,
        serplens_core::Environment::Development
    ))?;
    let rate_limit = rate_limit_from_config(&config);
    let app = build_app(
        AppState {
            config: Arc::clone(&config),
            gemini,
            openai,
            archive: Arc::new(Mutex::new(archive)),
            auth,
        },
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "serplens listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
