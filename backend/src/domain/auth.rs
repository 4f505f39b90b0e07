//! Account input primitives: signup, login, password change and seller
//! verification payloads.
//!
//! Handlers build these from raw request fields; construction is the single
//! place where "missing" and "blank" are rejected, so services only ever see
//! well-formed values.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Validation failures for account payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    /// A mandatory field was absent or blank.
    MissingField { field: &'static str },
    /// The email field was present but malformed.
    InvalidEmail,
}

impl AccountValidationError {
    /// Field the error refers to, as named on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::InvalidEmail => "email",
        }
    }
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field: {field}"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

fn required(value: Option<&str>, field: &'static str) -> Result<String, AccountValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(AccountValidationError::MissingField { field })
}

fn secret(value: Option<&str>, field: &'static str) -> Result<Zeroizing<String>, AccountValidationError> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| Zeroizing::new(v.to_owned()))
        .ok_or(AccountValidationError::MissingField { field })
}

fn email(value: Option<&str>) -> Result<EmailAddress, AccountValidationError> {
    let raw = required(value, "email")?;
    EmailAddress::new(raw).map_err(|err| match err {
        UserValidationError::EmptyEmail => AccountValidationError::MissingField { field: "email" },
        _ => AccountValidationError::InvalidEmail,
    })
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace; only emptiness is rejected.
///
/// # Examples
/// ```
/// use marketplace::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(Some("Ada@Example.com"), Some("pw")).unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw request fields.
    pub fn try_from_parts(
        email_value: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, AccountValidationError> {
        Ok(Self {
            email: email(email_value)?,
            password: secret(password, "password")?,
        })
    }

    /// Normalised email used for the lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Entry surface a login request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSurface {
    /// The buyer/seller storefront.
    Regular,
    /// The administration console.
    Admin,
}

impl LoginSurface {
    /// Interpret the `X-Frontend-Type` header value.
    ///
    /// The value is compared case-insensitively after trimming; anything
    /// other than `admin` (including an absent header) is the regular surface.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::LoginSurface;
    ///
    /// assert_eq!(LoginSurface::from_header(Some(" Admin ")), LoginSurface::Admin);
    /// assert_eq!(LoginSurface::from_header(None), LoginSurface::Regular);
    /// ```
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.trim().eq_ignore_ascii_case("admin") => Self::Admin,
            _ => Self::Regular,
        }
    }
}

/// Validated signup payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: EmailAddress,
    pub password: Zeroizing<String>,
    pub address: String,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
}

/// Raw signup fields as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignupFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country_code: Option<&'a str>,
    pub phone_number: Option<&'a str>,
}

impl SignupForm {
    /// Validate raw signup fields.
    pub fn try_from_fields(fields: SignupFields<'_>) -> Result<Self, AccountValidationError> {
        Ok(Self {
            name: required(fields.name, "name")?,
            email: email(fields.email)?,
            password: secret(fields.password, "password")?,
            address: required(fields.address, "address")?,
            country_code: optional(fields.country_code),
            phone_number: optional(fields.phone_number),
        })
    }
}

/// Validated change-password payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: Zeroizing<String>,
}

impl PasswordChange {
    /// Both passwords are mandatory.
    pub fn try_from_parts(
        current: Option<&str>,
        replacement: Option<&str>,
    ) -> Result<Self, AccountValidationError> {
        Ok(Self {
            current: secret(current, "currentPassword")?,
            replacement: secret(replacement, "newPassword")?,
        })
    }

    /// Password the caller claims is current.
    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    /// Password to store.
    pub fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

/// Validated seller verification submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSubmission {
    pub business_desc: String,
    pub business_type: String,
    pub verification_doc_url: String,
}

impl VerificationSubmission {
    /// All three fields are mandatory.
    pub fn try_from_parts(
        business_desc: Option<&str>,
        business_type: Option<&str>,
        verification_doc_url: Option<&str>,
    ) -> Result<Self, AccountValidationError> {
        Ok(Self {
            business_desc: required(business_desc, "businessDesc")?,
            business_type: required(business_type, "businessType")?,
            verification_doc_url: required(verification_doc_url, "verificationDocUrl")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some("pw"), AccountValidationError::MissingField { field: "email" })]
    #[case(Some("  "), Some("pw"), AccountValidationError::MissingField { field: "email" })]
    #[case(Some("nope"), Some("pw"), AccountValidationError::InvalidEmail)]
    #[case(Some("a@b.io"), None, AccountValidationError::MissingField { field: "password" })]
    #[case(Some("a@b.io"), Some(""), AccountValidationError::MissingField { field: "password" })]
    fn invalid_login_credentials(
        #[case] email: Option<&str>,
        #[case] password: Option<&str>,
        #[case] expected: AccountValidationError,
    ) {
        assert_eq!(LoginCredentials::try_from_parts(email, password), Err(expected));
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds =
            LoginCredentials::try_from_parts(Some("a@b.io"), Some(" pw ")).expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case(Some("admin"), LoginSurface::Admin)]
    #[case(Some("ADMIN"), LoginSurface::Admin)]
    #[case(Some("storefront"), LoginSurface::Regular)]
    #[case(Some(""), LoginSurface::Regular)]
    #[case(None, LoginSurface::Regular)]
    fn login_surface_from_header(#[case] header: Option<&str>, #[case] expected: LoginSurface) {
        assert_eq!(LoginSurface::from_header(header), expected);
    }

    #[rstest]
    #[case("name")]
    #[case("email")]
    #[case("password")]
    #[case("address")]
    fn signup_requires_core_fields(#[case] missing: &str) {
        let mut fields = SignupFields {
            name: Some("Ada"),
            email: Some("ada@example.com"),
            password: Some("secret"),
            address: Some("1 Analytical Way"),
            country_code: Some("  "),
            phone_number: None,
        };
        match missing {
            "name" => fields.name = None,
            "email" => fields.email = None,
            "password" => fields.password = None,
            _ => fields.address = Some(" "),
        }
        let err = SignupForm::try_from_fields(fields).expect_err("missing field must fail");
        assert_eq!(err.field(), missing);
    }

    #[rstest]
    fn signup_collapses_blank_optionals() {
        let form = SignupForm::try_from_fields(SignupFields {
            name: Some(" Ada "),
            email: Some("Ada@Example.com"),
            password: Some("secret"),
            address: Some("1 Analytical Way"),
            country_code: Some("  "),
            phone_number: Some("+385"),
        })
        .expect("valid signup");
        assert_eq!(form.name, "Ada");
        assert_eq!(form.email.as_ref(), "ada@example.com");
        assert!(form.country_code.is_none());
        assert_eq!(form.phone_number.as_deref(), Some("+385"));
    }

    #[rstest]
    #[case(None, Some("b"), Some("c"), "businessDesc")]
    #[case(Some("a"), Some(" "), Some("c"), "businessType")]
    #[case(Some("a"), Some("b"), None, "verificationDocUrl")]
    fn verification_requires_all_fields(
        #[case] desc: Option<&str>,
        #[case] kind: Option<&str>,
        #[case] url: Option<&str>,
        #[case] field: &str,
    ) {
        let err = VerificationSubmission::try_from_parts(desc, kind, url)
            .expect_err("missing field must fail");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn password_change_requires_both_fields() {
        assert_eq!(
            PasswordChange::try_from_parts(Some("old"), None),
            Err(AccountValidationError::MissingField {
                field: "newPassword"
            })
        );
    }
}
