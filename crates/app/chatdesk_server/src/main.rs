//! Chatdesk web server binary.
//!
//! Opens (and migrates) the SQLite database, picks a completion client and
//! serves the web UI and JSON API until interrupted.

use clap::Parser;
use tracing::info;

/// CLI arguments for the server. Every flag can also come from the environment.
#[derive(Parser, Debug)]
#[command(name = "chatdesk_server", version, about = "Chatdesk web chat server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: String,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = chatdesk_core::db::DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// OpenAI API key. Without one the server runs in demo mode.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = chatdesk_core::completion::DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// Mark the session cookie `Secure` (HTTPS deployments).
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    secure_cookies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,chatdesk_api=debug,chatdesk_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    info!(
        version = chatdesk_core::version(),
        database_url = %args.database_url,
        "starting chatdesk_server"
    );

    info!(
        max_connections = args.max_connections,
        "configuring connection pool"
    );
    let pool = chatdesk_core::db::connect(&args.database_url, args.max_connections).await?;

    // Run database migrations.
    info!("running database migrations");
    chatdesk_api::migrate(&pool).await?;

    let completion = chatdesk_core::completion::client_from_config(
        args.openai_api_key.as_deref(),
        &args.openai_base_url,
    );

    let config = chatdesk_api::config::ApiConfig {
        bind_addr: args.bind,
        database_url: args.database_url,
        jwt_secret: chatdesk_core::auth::jwt::resolve_jwt_secret(),
        session_ttl_secs: chatdesk_core::auth::jwt::SESSION_EXPIRY_SECS,
        secure_cookies: args.secure_cookies,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let state = chatdesk_api::AppState::new(pool.clone(), config, completion)?;
    let app = chatdesk_api::router(state);

    info!(addr = %local_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("shut down");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
