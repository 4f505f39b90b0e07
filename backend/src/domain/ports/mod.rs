//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven adapters (PostgreSQL, the in-memory store, bcrypt, JWT, mail and
//! object storage) implement these traits; domain services only ever hold
//! them as `Arc<dyn Port>`.

mod macros;
pub(crate) use macros::define_port_error;

mod enquiry_repository;
mod mailer;
mod notification_repository;
mod object_store;
mod password_hasher;
mod product_repository;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use enquiry_repository::{MockChatLeadRepository, MockEnquiryRepository};
pub use enquiry_repository::{ChatLeadRepository, EnquiryPersistenceError, EnquiryRepository};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{FixtureMailer, Mailer};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{FixtureObjectStore, ObjectStore, ObjectStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductPersistenceError, ProductRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{FixtureTokenService, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{SellerProfileChange, UserPersistenceError, UserRepository};
