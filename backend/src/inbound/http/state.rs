//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only talk to domain
//! services, so they stay testable against in-memory adapters.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ChatLeadRepository, EnquiryRepository, Mailer, NotificationRepository, ObjectStore,
    PasswordHasher, ProductRepository, TokenService, UserRepository,
};
use crate::domain::{
    AccountDeps, AccountService, DirectoryService, EmailLinks, EnquiryService,
    NotificationService, ProductService, UploadService,
};

/// Parameter object bundling every port implementation.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub enquiries: Arc<dyn EnquiryRepository>,
    pub chat_leads: Arc<dyn ChatLeadRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub mailer: Arc<dyn Mailer>,
    pub objects: Arc<dyn ObjectStore>,
    pub clock: Arc<dyn Clock>,
}

/// Services consumed by the handlers, plus the token port used by the
/// bearer extractors.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub products: ProductService,
    pub notifications: NotificationService,
    pub enquiries: EnquiryService,
    pub directory: DirectoryService,
    pub uploads: UploadService,
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Wire every service from one set of ports.
    pub fn new(ports: HttpStatePorts, links: EmailLinks) -> Self {
        let HttpStatePorts {
            users,
            products,
            notifications,
            enquiries,
            chat_leads,
            hasher,
            tokens,
            mailer,
            objects,
            clock,
        } = ports;
        let accounts = AccountService::new(
            AccountDeps {
                users: Arc::clone(&users),
                hasher,
                tokens: Arc::clone(&tokens),
                mailer: Arc::clone(&mailer),
                clock: Arc::clone(&clock),
            },
            links.clone(),
        );
        Self {
            accounts,
            products: ProductService::new(
                Arc::clone(&products),
                Arc::clone(&users),
                mailer,
                Arc::clone(&clock),
                links,
            ),
            notifications: NotificationService::new(notifications),
            enquiries: EnquiryService::new(enquiries, chat_leads, Arc::clone(&products)),
            directory: DirectoryService::new(Arc::clone(&users), Arc::clone(&products)),
            uploads: UploadService::new(objects, users, products, clock),
            tokens,
        }
    }
}
