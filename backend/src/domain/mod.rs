//! Domain primitives, aggregates and use cases.
//!
//! Purpose: define the strongly typed marketplace model (users and their
//! role extensions, products and their moderation lifecycle, the
//! notification ledger, enquiries) together with the services that enforce
//! its invariants. Nothing here knows about HTTP or SQL; collaborators are
//! reached through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Principal / Role / RoleState: authorization and role transitions.
//! - ModerationStatus / ModerationAction: the product state machine.
//! - *Service: use cases consumed by inbound adapters.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod directory_service;
pub mod email;
pub mod enquiry;
pub mod enquiry_service;
pub mod error;
pub mod notification;
pub mod notification_service;
pub mod ports;
pub mod product;
pub mod product_service;
pub mod role_transition;
pub mod trace_id;
pub mod upload;
pub mod upload_service;
pub mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::account_service::{AccountDeps, AccountService, AuthSession};
pub use self::auth::{
    AccountValidationError, LoginCredentials, LoginSurface, PasswordChange, SignupFields,
    SignupForm, VerificationSubmission,
};
pub use self::authorization::{Principal, TokenClaims, ensure_surface_admits};
pub use self::directory_service::{DirectoryService, SellerDirectoryEntry};
pub use self::email::{
    EmailKind, EmailLinks, EmailMessage, confirmation_email, format_event_time,
    password_changed_email, product_event_email, welcome_email,
};
pub use self::enquiry::{
    ChatLead, Enquiry, EnquiryFilter, EnquiryValidationError, NewChatLead, NewEnquiry,
};
pub use self::enquiry_service::EnquiryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notification::{
    InvalidNotificationId, LedgerEntry, Notification, NotificationId, NotificationScope,
    NotificationType, UnknownNotificationType,
};
pub use self::notification_service::NotificationService;
pub use self::product::{
    ModerationAction, ModerationError, ModerationStatus, NewProduct, Product, ProductDetails,
    ProductDraft, ProductFilter, ProductId, ProductImage, ProductTransition,
    ProductValidationError,
};
pub use self::product_service::{ProductService, ProductWithOwner};
pub use self::role_transition::{RoleState, RoleTransitionError, SellerStatus, seller_status};
pub use self::trace_id::TraceId;
pub use self::upload::{ObjectKey, UploadBody, UploadFilename, UploadValidationError};
pub use self::upload_service::UploadService;
pub use self::user::{
    AdminProfile, EmailAddress, NewUser, PasswordDigest, ProfileUpdate, Role, SellerFieldsUpdate,
    SellerProfile, User, UserAccount, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use marketplace::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
