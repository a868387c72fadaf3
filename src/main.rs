mod app;
mod config;
mod db;
mod reward;
mod state;
mod stats;
mod telegram;
mod users;

#[cfg(test)]
mod testing;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "giftgate=debug,tower_http=info,sqlx=warn".to_string());
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

    let state = AppState::init().await?;

    let http_addr = state.config.http_addr;
    tokio::spawn(async move {
        if let Err(e) = app::serve(http_addr, app::build_app()).await {
            tracing::error!(error = %format!("{:#}", e), "health endpoint stopped");
        }
    });
    tracing::info!("bot started");

    telegram::polling::run(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    })
    .await;
    Ok(())
}
