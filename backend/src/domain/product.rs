//! Product listings and their moderation lifecycle.
//!
//! ```text
//! PENDING(0) --approve--> APPROVED(1)
//! PENDING(0) --reject---> REJECTED(-1)
//! any live   --edit-----> PENDING(0)
//! any live   --delete---> DELETED(-2)   (terminal)
//! ```
//!
//! Approve and reject are also accepted from APPROVED/REJECTED so that two
//! admins racing on the same listing resolve as last-writer-wins rather than
//! failing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::notification::NotificationType;
use super::user::UserId;

/// Positive integer identifier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId(i64);

impl ProductId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, ProductValidationError> {
        if raw <= 0 {
            return Err(ProductValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Parse an identifier from a path segment.
    pub fn parse(raw: &str) -> Result<Self, ProductValidationError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ProductValidationError::InvalidId)
            .and_then(Self::new)
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = ProductValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Moderation status; serialised as its stored integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
}

impl ModerationStatus {
    /// Stored integer code.
    pub fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => -1,
            Self::Deleted => -2,
        }
    }

    /// Decode a stored integer.
    pub fn from_code(code: i16) -> Result<Self, ProductValidationError> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Approved),
            -1 => Ok(Self::Rejected),
            -2 => Ok(Self::Deleted),
            other => Err(ProductValidationError::UnknownStatus { code: other }),
        }
    }

    /// Apply a moderation action, returning the next status.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::{ModerationAction, ModerationStatus};
    ///
    /// let next = ModerationStatus::Approved.apply(ModerationAction::Edit);
    /// assert_eq!(next, Ok(ModerationStatus::Pending));
    /// ```
    pub fn apply(self, action: ModerationAction) -> Result<Self, ModerationError> {
        if self == Self::Deleted {
            return Err(ModerationError::AlreadyDeleted);
        }
        Ok(match action {
            ModerationAction::Edit => Self::Pending,
            ModerationAction::Approve => Self::Approved,
            ModerationAction::Reject => Self::Rejected,
            ModerationAction::Delete => Self::Deleted,
        })
    }
}

impl Serialize for ModerationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.code())
    }
}

impl<'de> Deserialize<'de> for ModerationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i16::deserialize(deserializer)?;
        Self::from_code(code).map_err(serde::de::Error::custom)
    }
}

/// Transitions of the moderation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Edit,
    Delete,
    Approve,
    Reject,
}

impl ModerationAction {
    /// Ledger entry type recorded alongside the transition.
    pub fn notification_type(self) -> NotificationType {
        match self {
            Self::Edit => NotificationType::ProductUpdated,
            Self::Delete => NotificationType::ProductDeleted,
            Self::Approve => NotificationType::ProductApproved,
            Self::Reject => NotificationType::ProductRejected,
        }
    }
}

/// Illegal moderation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationError {
    /// Deleted products are terminal.
    AlreadyDeleted,
}

impl fmt::Display for ModerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDeleted => write!(f, "product has been deleted"),
        }
    }
}

impl std::error::Error for ModerationError {}

/// Validation failures for product input.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductValidationError {
    InvalidId,
    UnknownStatus { code: i16 },
    MissingField { field: &'static str },
    NegativePrice { value: f64 },
    NegativeQuantity { value: i32 },
    NonPositiveMinimumOrder { value: i32 },
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "product id must be a positive integer"),
            Self::UnknownStatus { code } => write!(f, "unknown moderation status: {code}"),
            Self::MissingField { field } => write!(f, "missing required field: {field}"),
            Self::NegativePrice { value } => {
                write!(f, "product_price must not be negative (got {value})")
            }
            Self::NegativeQuantity { value } => {
                write!(f, "product_qty must not be negative (got {value})")
            }
            Self::NonPositiveMinimumOrder { value } => write!(
                f,
                "product_minimum_order_quantity must be positive (got {value})"
            ),
        }
    }
}

impl std::error::Error for ProductValidationError {}

/// Unvalidated descriptive fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub color: Option<String>,
    pub source_material: Option<String>,
    pub batch_size: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub application: Option<String>,
    pub description: Option<String>,
    pub additional_notes: Option<String>,
}

/// Validated descriptive fields of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub quantity: i32,
    pub unit: String,
    pub category: String,
    pub country: Option<String>,
    pub color: Option<String>,
    pub source_material: Option<String>,
    pub batch_size: Option<String>,
    pub minimum_order_quantity: Option<i32>,
    pub application: Option<String>,
    pub description: Option<String>,
    pub additional_notes: Option<String>,
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ProductValidationError> {
    match value.map(|v| v.trim().to_owned()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProductValidationError::MissingField { field }),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl TryFrom<ProductDraft> for ProductDetails {
    type Error = ProductValidationError;

    fn try_from(draft: ProductDraft) -> Result<Self, Self::Error> {
        let name = required_text(draft.name, "product_name")?;
        let price = draft.price.ok_or(ProductValidationError::MissingField {
            field: "product_price",
        })?;
        if !price.is_finite() || price < 0.0 {
            return Err(ProductValidationError::NegativePrice { value: price });
        }
        let currency = required_text(draft.currency, "product_currency")?;
        let quantity = draft.quantity.ok_or(ProductValidationError::MissingField {
            field: "product_qty",
        })?;
        if quantity < 0 {
            return Err(ProductValidationError::NegativeQuantity { value: quantity });
        }
        let unit = required_text(draft.unit, "product_unit")?;
        let category = required_text(draft.category, "product_category")?;
        if let Some(moq) = draft.minimum_order_quantity.filter(|moq| *moq <= 0) {
            return Err(ProductValidationError::NonPositiveMinimumOrder { value: moq });
        }

        Ok(Self {
            name,
            price,
            currency,
            quantity,
            unit,
            category,
            country: optional_text(draft.country),
            color: optional_text(draft.color),
            source_material: optional_text(draft.source_material),
            batch_size: optional_text(draft.batch_size),
            minimum_order_quantity: draft.minimum_order_quantity,
            application: optional_text(draft.application),
            description: optional_text(draft.description),
            additional_notes: optional_text(draft.additional_notes),
        })
    }
}

/// Image attached to a product, ordered by `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub url: String,
    pub position: i32,
}

/// A stored product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    /// Owning seller; `None` once the seller's account has been deleted.
    pub seller_user_id: Option<UserId>,
    pub owner_deleted: bool,
    pub details: ProductDetails,
    pub status: ModerationStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Whether `user_id` owns this listing.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.seller_user_id.as_ref() == Some(user_id)
    }
}

/// Insert payload for a new listing; status is always PENDING.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_user_id: UserId,
    pub details: ProductDetails,
}

/// A status change plus the ledger entry that must be written with it.
#[derive(Debug, Clone)]
pub struct ProductTransition {
    pub product_id: ProductId,
    pub status: ModerationStatus,
    /// Replacement descriptive fields, for edits.
    pub details: Option<ProductDetails>,
    /// Deletion timestamp, for soft deletes.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Ledger entry, appended before the row is mutated.
    pub ledger: super::notification::LedgerEntry,
}

/// Row filter for product listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Every product regardless of status.
    All,
    /// Products in exactly this status.
    Status(ModerationStatus),
    /// Products owned by a seller, optionally restricted to one status.
    Seller {
        seller: UserId,
        status: Option<ModerationStatus>,
    },
    /// Approved products not owned by the given seller.
    ApprovedExceptSeller(UserId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> ProductDraft {
        ProductDraft {
            name: Some("Recycled Pallet".into()),
            price: Some(12.5),
            currency: Some("EUR".into()),
            quantity: Some(50),
            unit: Some("PCS".into()),
            category: Some("Wood".into()),
            country: Some("  ".into()),
            ..ProductDraft::default()
        }
    }

    #[rstest]
    #[case(ModerationStatus::Pending, ModerationAction::Approve, ModerationStatus::Approved)]
    #[case(ModerationStatus::Pending, ModerationAction::Reject, ModerationStatus::Rejected)]
    #[case(ModerationStatus::Approved, ModerationAction::Edit, ModerationStatus::Pending)]
    #[case(ModerationStatus::Rejected, ModerationAction::Edit, ModerationStatus::Pending)]
    #[case(ModerationStatus::Approved, ModerationAction::Reject, ModerationStatus::Rejected)]
    #[case(ModerationStatus::Rejected, ModerationAction::Approve, ModerationStatus::Approved)]
    #[case(ModerationStatus::Approved, ModerationAction::Delete, ModerationStatus::Deleted)]
    #[case(ModerationStatus::Pending, ModerationAction::Delete, ModerationStatus::Deleted)]
    fn transitions_follow_lifecycle(
        #[case] from: ModerationStatus,
        #[case] action: ModerationAction,
        #[case] to: ModerationStatus,
    ) {
        assert_eq!(from.apply(action), Ok(to));
    }

    #[rstest]
    #[case(ModerationAction::Edit)]
    #[case(ModerationAction::Delete)]
    #[case(ModerationAction::Approve)]
    #[case(ModerationAction::Reject)]
    fn deleted_is_terminal(#[case] action: ModerationAction) {
        assert_eq!(
            ModerationStatus::Deleted.apply(action),
            Err(ModerationError::AlreadyDeleted)
        );
    }

    #[rstest]
    #[case(0, ModerationStatus::Pending)]
    #[case(1, ModerationStatus::Approved)]
    #[case(-1, ModerationStatus::Rejected)]
    #[case(-2, ModerationStatus::Deleted)]
    fn status_codes_match_storage(#[case] code: i16, #[case] status: ModerationStatus) {
        assert_eq!(ModerationStatus::from_code(code), Ok(status));
        assert_eq!(
            serde_json::to_value(status).expect("serialise"),
            serde_json::json!(code)
        );
    }

    #[rstest]
    fn unknown_status_code_is_rejected() {
        assert_eq!(
            ModerationStatus::from_code(7),
            Err(ProductValidationError::UnknownStatus { code: 7 })
        );
    }

    #[rstest]
    fn draft_with_required_fields_validates(draft: ProductDraft) {
        let details = ProductDetails::try_from(draft).expect("valid draft");
        assert_eq!(details.name, "Recycled Pallet");
        assert_eq!(details.quantity, 50);
        assert!(details.country.is_none(), "blank optionals collapse to None");
    }

    #[rstest]
    fn draft_without_name_is_rejected(mut draft: ProductDraft) {
        draft.name = Some("   ".into());
        assert_eq!(
            ProductDetails::try_from(draft),
            Err(ProductValidationError::MissingField {
                field: "product_name"
            })
        );
    }

    #[rstest]
    fn negative_quantity_is_rejected(mut draft: ProductDraft) {
        draft.quantity = Some(-1);
        assert_eq!(
            ProductDetails::try_from(draft),
            Err(ProductValidationError::NegativeQuantity { value: -1 })
        );
    }

    #[rstest]
    #[case("12", Ok(12))]
    #[case("0", Err(ProductValidationError::InvalidId))]
    #[case("abc", Err(ProductValidationError::InvalidId))]
    fn product_id_parses_path_segments(
        #[case] raw: &str,
        #[case] expected: Result<i64, ProductValidationError>,
    ) {
        assert_eq!(ProductId::parse(raw).map(ProductId::get), expected);
    }
}
