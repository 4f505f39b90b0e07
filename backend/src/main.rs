//! Backend entry-point: loads configuration, prepares storage and runs the
//! HTTP server.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use marketplace::config::{AppSettings, BuildMode, Secrets, secrets_from_env};
use marketplace::domain::EmailLinks;
use marketplace::inbound::http::health::HealthState;
use marketplace::outbound::email::{EmailTransport, LoggingTransport, SendGridTransport};
use marketplace::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use server::{ServerConfig, UploadTarget, create_server};

const SENDGRID_TIMEOUT: Duration = Duration::from_secs(10);

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

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let mode = BuildMode::from_debug_assertions();
    let secrets = secrets_from_env(&DefaultEnv::new(), mode)?;

    let config = server_config(&settings, secrets)?;
    let config = match settings.database_url() {
        Some(url) => config.with_db_pool(connect(&settings, url).await?),
        None if mode.is_debug() => config,
        None => return Err(eyre!("MARKETPLACE_DATABASE_URL is required in release builds")),
    };

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting marketplace backend");
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated with an error")
}

fn server_config(settings: &AppSettings, secrets: Secrets) -> Result<ServerConfig> {
    let Secrets {
        jwt_secret,
        sendgrid_api_key,
    } = secrets;
    let mail_transport: Arc<dyn EmailTransport> = match sendgrid_api_key {
        Some(api_key) => Arc::new(
            SendGridTransport::new(
                settings.sendgrid_endpoint()?,
                api_key,
                settings.mail_from(),
                SENDGRID_TIMEOUT,
            )
            .wrap_err("failed to build SendGrid client")?,
        ),
        None => Arc::new(LoggingTransport),
    };
    Ok(ServerConfig::new(
        settings.bind_address()?,
        jwt_secret,
        settings.token_ttl(),
        EmailLinks {
            public_base_url: settings.public_base_url().to_owned(),
            frontend_url: settings.frontend_url().to_owned(),
        },
        UploadTarget {
            root: settings.upload_root(),
            public_url: settings.upload_public_url().to_owned(),
        },
        mail_transport,
    ))
}

async fn connect(settings: &AppSettings, database_url: &str) -> Result<DbPool> {
    let applied = apply_migrations(database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    info!(applied, "database schema up to date");
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(|err| eyre!("failed to build database pool: {}", err.into_message()))?;
    Ok(pool)
}
