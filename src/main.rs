use mealmind_local::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mealmind_local=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;
    let config = state.config.clone();
    tracing::info!(data_dir = %config.data_dir.display(), "using data directory");

    if config.archive_after_months > 0 {
        match state.food_log.archive_older_than(config.archive_after_months).await {
            Ok(moved) => tracing::info!(moved, "startup archive pass finished"),
            Err(e) => tracing::warn!(error = %e, "startup archive pass failed; continuing"),
        }
    }

    let app = app::build_app(state);
    app::serve(app, &config.server.host, config.server.port).await
}
