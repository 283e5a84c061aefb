//! `pondokd` — the pesantren records server binary.
//!
//! Usage:
//!   pondokd -c <deployment-name-or-path> [--listen <addr>]
//!
//! The deployment name resolves to `/etc/pondok/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use pondok_core::Module;
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;

/// Pesantren records server.
#[derive(Parser, Debug)]
#[command(name = "pondokd", about = "Pesantren records server")]
struct Cli {
    /// Deployment name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    // Embedded stores, shared by all modules.
    let sql: Arc<dyn pondok_sql::SqlStore> = Arc::new(
        pondok_sql::SqliteStore::open(&data_dir.join("pondok.db"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn pondok_blob::BlobStore> = Arc::new(
        pondok_blob::FileStore::open(&data_dir.join("blob"))
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    let service = pesantren::service::PesantrenService::new(
        Arc::clone(&sql),
        Arc::clone(&blob),
        &server_config.media.base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize pesantren service: {}", e))?;
    let pesantren_module = pesantren::PesantrenModule::new(service);
    info!("Pesantren module initialized");

    let module_routes = vec![("api", pesantren_module.routes())];

    let jwt_state = Arc::new(JwtState::from_secret(&server_config.jwt.secret));
    let app = routes::build_router(jwt_state, module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Pondok server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
