//! Buyer enquiries and chat leads.

use std::fmt;

use chrono::{DateTime, Utc};

use super::product::ProductId;
use super::user::UserId;

/// Validation failures for enquiry and chat-lead input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnquiryValidationError {
    MissingProductId,
    EmptyMessage,
    EmptyCompanyName,
    EmptyUserName,
    EmptyPhoneNumber,
}

impl EnquiryValidationError {
    /// Field the error refers to, as named on the wire.
    pub fn field(self) -> &'static str {
        match self {
            Self::MissingProductId => "productId",
            Self::EmptyMessage => "message",
            Self::EmptyCompanyName => "companyName",
            Self::EmptyUserName => "userName",
            Self::EmptyPhoneNumber => "phoneNumber",
        }
    }
}

impl fmt::Display for EnquiryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required field: {}", self.field())
    }
}

impl std::error::Error for EnquiryValidationError {}

/// Immutable buyer message against a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enquiry {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an enquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnquiry {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub message: String,
}

impl NewEnquiry {
    /// Validate the free-text message and bind it to its author and product.
    pub fn try_new(
        user_id: UserId,
        product_id: Option<ProductId>,
        message: Option<&str>,
    ) -> Result<Self, EnquiryValidationError> {
        let product_id = product_id.ok_or(EnquiryValidationError::MissingProductId)?;
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or(EnquiryValidationError::EmptyMessage)?;
        Ok(Self {
            user_id,
            product_id,
            message: message.to_owned(),
        })
    }
}

/// Row filter for enquiry listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnquiryFilter {
    All,
    Product(ProductId),
    User(UserId),
    /// Enquiries on products whose `seller_user_id` is this seller.
    Seller(UserId),
}

/// Contact request captured from the public chat widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLead {
    pub id: i64,
    pub company_name: String,
    pub user_name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// Validated chat lead input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatLead {
    pub company_name: String,
    pub user_name: String,
    pub phone_number: String,
}

impl NewChatLead {
    /// Validate that every contact field is present.
    pub fn try_new(
        company_name: Option<&str>,
        user_name: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<Self, EnquiryValidationError> {
        fn required(
            value: Option<&str>,
            error: EnquiryValidationError,
        ) -> Result<String, EnquiryValidationError> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or(error)
        }

        Ok(Self {
            company_name: required(company_name, EnquiryValidationError::EmptyCompanyName)?,
            user_name: required(user_name, EnquiryValidationError::EmptyUserName)?,
            phone_number: required(phone_number, EnquiryValidationError::EmptyPhoneNumber)?,
        })
    }
}
