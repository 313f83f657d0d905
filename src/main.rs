mod config;
mod render;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match config::PortalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if config.hosted_ui.is_none() {
        tracing::warn!("COGNITO_DOMAIN/CLIENT_ID/CLIENT_SECRET/REDIRECT_URI not set, sign-in disabled");
    }

    let state = state::AppState::from_config(&config).expect("http client init failed");

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, send_text_url = %config.send_text_url, "contactoo listening");
    axum::serve(listener, app).await.expect("server failed");
}
