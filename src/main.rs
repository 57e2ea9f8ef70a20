use curator_api::api::{create_router, AppState};
use curator_api::config::Config;
use curator_api::services::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curator_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Load the artifact bundle before accepting requests. Missing
    // artifacts degrade the engine instead of failing startup.
    let engine = Engine::new(&config);
    tracing::info!(
        models_dir = %config.models_dir,
        models_loaded = engine.is_fully_loaded(),
        "Engine initialized"
    );

    let state = AppState::new(engine);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
