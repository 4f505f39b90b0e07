//! Builders for the HTTP state and the adapters behind its ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use marketplace::domain::ports::{
    ChatLeadRepository, EnquiryRepository, NotificationRepository, ProductRepository,
    UserRepository,
};
use marketplace::inbound::http::state::{HttpState, HttpStatePorts};
use marketplace::outbound::email::QueuedMailer;
use marketplace::outbound::memory::InMemoryStore;
use marketplace::outbound::persistence::{
    DbPool, DieselEnquiryRepository, DieselNotificationRepository, DieselProductRepository,
    DieselUserRepository,
};
use marketplace::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use marketplace::outbound::storage::CapStdObjectStore;

use super::ServerConfig;

/// The repository ports, grouped so both backends build the same shape.
struct Repositories {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    notifications: Arc<dyn NotificationRepository>,
    enquiries: Arc<dyn EnquiryRepository>,
    chat_leads: Arc<dyn ChatLeadRepository>,
}

fn diesel_repositories(pool: &DbPool) -> Repositories {
    let enquiries = Arc::new(DieselEnquiryRepository::new(pool.clone()));
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        enquiries: enquiries.clone(),
        chat_leads: enquiries,
    }
}

fn memory_repositories(clock: Arc<dyn Clock>) -> Repositories {
    let store = Arc::new(InMemoryStore::new(clock));
    Repositories {
        users: store.clone(),
        products: store.clone(),
        notifications: store.clone(),
        enquiries: store.clone(),
        chat_leads: store,
    }
}

/// Build the HTTP state from configuration.
///
/// Uses the Diesel repositories when a pool is configured and the in-memory
/// store otherwise. Starts the mail delivery worker on the current runtime.
///
/// # Errors
/// Returns [`std::io::Error`] when the upload directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repositories = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            diesel_repositories(pool)
        }
        None => {
            warn!("no database configured; data lives in memory and is lost on restart");
            memory_repositories(Arc::clone(&clock))
        }
    };
    let objects = CapStdObjectStore::open(&config.uploads.root, config.uploads.public_url.clone())?;
    let (mailer, _worker) = QueuedMailer::spawn(Arc::clone(&config.mail_transport));
    let tokens = JwtTokenService::new(&config.jwt_secret, config.token_ttl, Arc::clone(&clock));

    let Repositories {
        users,
        products,
        notifications,
        enquiries,
        chat_leads,
    } = repositories;
    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            users,
            products,
            notifications,
            enquiries,
            chat_leads,
            hasher: Arc::new(BcryptPasswordHasher::default()),
            tokens: Arc::new(tokens),
            mailer: Arc::new(mailer),
            objects: Arc::new(objects),
            clock,
        },
        config.links.clone(),
    )))
}
