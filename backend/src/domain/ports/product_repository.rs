//! Port abstraction for product persistence.
//!
//! Every write that changes a product's moderation status carries the
//! ledger entry describing it; adapters persist both in one transaction.
use async_trait::async_trait;

use crate::domain::{
    Error, NewProduct, Product, ProductFilter, ProductId, ProductImage, ProductTransition,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by product repository adapters.
    pub enum ProductPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
        /// Appending the ledger entry failed; the transition was rolled back.
        Ledger { message: String } => "notification ledger append failed: {message}",
        /// The addressed product does not exist.
        NotFound { id: i64 } => "product not found: {id}",
        /// The stored product was already DELETED when the write ran.
        AlreadyDeleted { id: i64 } => "product already deleted: {id}",
        /// The owning account no longer exists.
        OwnerMissing { owner: String } => "product owner does not exist: {owner}",
    }
}

impl From<ProductPersistenceError> for Error {
    fn from(value: ProductPersistenceError) -> Self {
        match value {
            ProductPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("product repository unavailable: {message}"))
            }
            ProductPersistenceError::Query { message } => {
                Error::internal(format!("product repository error: {message}"))
            }
            ProductPersistenceError::Ledger { message } => {
                Error::internal(format!("ledger append failed: {message}"))
            }
            ProductPersistenceError::NotFound { .. } => Error::not_found("Product not found"),
            ProductPersistenceError::AlreadyDeleted { .. } => {
                Error::conflict("Product has been deleted")
            }
            ProductPersistenceError::OwnerMissing { .. } => {
                Error::unauthorized("Account no longer exists")
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a PENDING product and its `PRODUCT_CREATED` ledger entry
    /// addressed to the owner, atomically. Fails with
    /// [`ProductPersistenceError::OwnerMissing`] when the owner is gone.
    async fn create(&self, product: &NewProduct) -> Result<Product, ProductPersistenceError>;

    /// Fetch a product (any status) with its images.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError>;

    /// Append `transition.ledger`, then write the new status, details and
    /// deletion time, all in one transaction. Returns the updated product.
    ///
    /// A product whose stored status is DELETED at write time is left
    /// untouched and reported as [`ProductPersistenceError::AlreadyDeleted`].
    async fn apply_transition(
        &self,
        transition: &ProductTransition,
    ) -> Result<Product, ProductPersistenceError>;

    /// Products matching `filter`, newest first, with images.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError>;

    /// Attach an image row to a product.
    async fn add_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<(), ProductPersistenceError>;
}
