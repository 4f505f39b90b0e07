//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use marketplace::domain::EmailLinks;
use marketplace::outbound::email::EmailTransport;
use marketplace::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Where uploads are written and how they are addressed publicly.
#[derive(Clone, Debug)]
pub struct UploadTarget {
    pub root: PathBuf,
    pub public_url: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
    pub(crate) links: EmailLinks,
    pub(crate) uploads: UploadTarget,
    pub(crate) mail_transport: Arc<dyn EmailTransport>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration without a database; storage
    /// defaults to the in-memory adapters until a pool is attached.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        jwt_secret: Zeroizing<Vec<u8>>,
        token_ttl: Duration,
        links: EmailLinks,
        uploads: UploadTarget,
        mail_transport: Arc<dyn EmailTransport>,
    ) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            links,
            uploads,
            mail_transport,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, every repository port is backed by PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
