//! Port abstractions for enquiries and chat leads.
use async_trait::async_trait;

use crate::domain::{ChatLead, Enquiry, EnquiryFilter, Error, NewChatLead, NewEnquiry};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by enquiry and chat-lead adapters.
    pub enum EnquiryPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "enquiry repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enquiry repository query failed: {message}",
        /// The referenced product does not exist.
        ProductNotFound { id: i64 } => "enquiry references unknown product {id}",
    }
}

impl From<EnquiryPersistenceError> for Error {
    fn from(value: EnquiryPersistenceError) -> Self {
        match value {
            EnquiryPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("enquiry repository unavailable: {message}"))
            }
            EnquiryPersistenceError::Query { message } => {
                Error::internal(format!("enquiry repository error: {message}"))
            }
            EnquiryPersistenceError::ProductNotFound { .. } => {
                Error::not_found("Product not found")
            }
        }
    }
}

/// Enquiry storage; enquiries are immutable once written.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Insert an enquiry.
    async fn create(&self, enquiry: &NewEnquiry) -> Result<Enquiry, EnquiryPersistenceError>;

    /// Enquiries matching `filter`, newest first.
    async fn list(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, EnquiryPersistenceError>;
}

/// Chat lead storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatLeadRepository: Send + Sync {
    /// Insert a lead.
    async fn create(&self, lead: &NewChatLead) -> Result<ChatLead, EnquiryPersistenceError>;

    /// Every lead, newest first.
    async fn list(&self) -> Result<Vec<ChatLead>, EnquiryPersistenceError>;
}
