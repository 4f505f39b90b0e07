//! Boundary validation: raw request values to domain types.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field and a stable machine-readable code.

use serde_json::json;

use crate::domain::{
    AccountValidationError, EnquiryValidationError, Error, InvalidNotificationId, NotificationId,
    ProductId, ProductValidationError, UploadValidationError, UserId,
};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidEmail,
    InvalidUuid,
    InvalidId,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

fn value_error(field: &str, code: ErrorCode, message: impl Into<String>, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(name, ErrorCode::MissingField, format!("missing required field: {name}"))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    let name = field.as_str();
    UserId::new(value).map_err(|_| {
        value_error(
            name,
            ErrorCode::InvalidUuid,
            format!("{name} must be a valid UUID"),
            value,
        )
    })
}

pub(crate) fn parse_optional_user_id(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<UserId>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_user_id(raw.trim(), field))
        .transpose()
}

pub(crate) fn parse_product_id(raw: i64, field: FieldName) -> Result<ProductId, Error> {
    let name = field.as_str();
    ProductId::new(raw).map_err(|_| {
        value_error(
            name,
            ErrorCode::InvalidId,
            format!("{name} must be a positive integer"),
            &raw.to_string(),
        )
    })
}

pub(crate) fn parse_notification_id(raw: i64) -> Result<NotificationId, Error> {
    NotificationId::new(raw).map_err(|InvalidNotificationId| {
        value_error(
            "id",
            ErrorCode::InvalidId,
            InvalidNotificationId.to_string(),
            &raw.to_string(),
        )
    })
}

pub(crate) fn account_error(err: AccountValidationError) -> Error {
    let code = match err {
        AccountValidationError::MissingField { .. } => ErrorCode::MissingField,
        AccountValidationError::InvalidEmail => ErrorCode::InvalidEmail,
    };
    field_error(err.field(), code, err.to_string())
}

pub(crate) fn product_error(err: ProductValidationError) -> Error {
    let (field, code) = match &err {
        ProductValidationError::MissingField { field } => (*field, ErrorCode::MissingField),
        ProductValidationError::NegativePrice { .. } => ("product_price", ErrorCode::InvalidValue),
        ProductValidationError::NegativeQuantity { .. } => ("product_qty", ErrorCode::InvalidValue),
        ProductValidationError::NonPositiveMinimumOrder { .. } => {
            ("product_minimum_order_quantity", ErrorCode::InvalidValue)
        }
        ProductValidationError::InvalidId => ("productId", ErrorCode::InvalidId),
        ProductValidationError::UnknownStatus { .. } => ("isApproved", ErrorCode::InvalidValue),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn enquiry_error(err: EnquiryValidationError) -> Error {
    field_error(err.field(), ErrorCode::MissingField, err.to_string())
}

pub(crate) fn upload_error(err: UploadValidationError) -> Error {
    let code = match err {
        UploadValidationError::InvalidFilename => ErrorCode::InvalidValue,
        UploadValidationError::EmptyBody | UploadValidationError::EmptyFilename => {
            ErrorCode::MissingField
        }
    };
    field_error(err.field(), code, err.to_string())
}
