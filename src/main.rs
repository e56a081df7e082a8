use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context as _;
use simple_issues_bot::config::ServerConfig;
use simple_issues_bot::github::GithubApp;
use simple_issues_bot::handlers::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let bot = config.load_bot_config()?;
    let github = GithubApp::from_key_file(config.app_id, &config.private_key_path, config.api_url.clone())?;
    tracing::info!(
        "{} acting as app {} with {} command(s)",
        bot.bot_name(),
        github.app_id(),
        bot.commands().len()
    );

    let ctx = Arc::new(Context {
        bot,
        github,
        webhook_secret: config.webhook_secret,
    });
    let app = simple_issues_bot::app(ctx, &config.webhook_path);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}{}", config.webhook_path);
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
