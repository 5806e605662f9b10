//! eventhub entry-point: loads configuration, prepares storage, seeds
//! defaults, and serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eventhub::inbound::http::health::HealthState;
use eventhub::inbound::http::session_config::{BuildMode, session_settings_from_env};
use eventhub::outbound::credentials::BcryptCredentialHasher;
use eventhub::outbound::memory::InMemoryStore;
use eventhub::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use eventhub::settings::{ServerSettings, Settings};
use server::{ServerConfig, Storage, Wiring, build_http_state, create_server};

async fn prepare_storage(settings: &ServerSettings) -> Result<Storage> {
    let Some(url) = settings.database_url() else {
        warn!("EVENTHUB_DATABASE_URL not set; using the in-memory store (data is not persisted)");
        return Ok(Storage::Memory(Arc::new(InMemoryStore::new())));
    };

    run_pending_migrations(url)
        .await
        .wrap_err("apply database migrations")?;

    let pool_config = PoolConfig::new(url)
        .with_max_size(settings.pool_max_size)
        .with_connection_timeout(settings.pool_timeout());
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("build database pool")?;
    Ok(Storage::Postgres(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = Settings::load().wrap_err("load settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("load session settings")?;
    let bind_addr = settings.server.bind_addr()?;

    let storage = prepare_storage(&settings.server).await?;
    let hasher = settings
        .bootstrap
        .bcrypt_cost()
        .map_or_else(BcryptCredentialHasher::default, BcryptCredentialHasher::with_cost);
    let wiring = Wiring {
        hasher: Arc::new(hasher),
        policy: settings.enrollment.policy(),
        plan: settings.bootstrap.plan()?,
    };
    let http_state = build_http_state(&storage, wiring)
        .await
        .wrap_err("seed store")?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );
    info!(bind_addr = %config.bind_addr(), "starting server");
    let server = create_server(health_state.clone(), http_state, config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated")
}
