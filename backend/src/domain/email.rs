//! Outbound email messages raised by account and product events.
//!
//! Messages are plain data; delivery belongs to the
//! [`crate::domain::ports::Mailer`] port and is always best effort.

use chrono::{DateTime, Utc};

use super::product::{Product, ProductId};
use super::user::{EmailAddress, User};

/// Which event produced the message; used for logging and templating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    ConfirmEmail,
    Welcome,
    PasswordChanged,
    ProductPending,
    ProductUpdated,
    ProductDeleted,
    ProductApproved,
    ProductRejected,
}

impl EmailKind {
    /// Template identifier understood by mail transports.
    pub fn template(self) -> &'static str {
        match self {
            Self::ConfirmEmail => "confirmemail",
            Self::Welcome => "welcome",
            Self::PasswordChanged => "password",
            Self::ProductPending => "addproductpending",
            Self::ProductUpdated => "updateproduct",
            Self::ProductDeleted => "deleteproduct",
            Self::ProductApproved => "productapproved",
            Self::ProductRejected => "productrejected",
        }
    }
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub kind: EmailKind,
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Absolute links embedded into messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLinks {
    /// Base URL of this API, used for the confirmation link.
    pub public_base_url: String,
    /// Base URL of the storefront, used for marketplace links.
    pub frontend_url: String,
}

impl EmailLinks {
    /// `{public_base_url}/confirm?token=...` with the token URL-encoded.
    pub fn confirmation(&self, token: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        let mut url = format!("{base}/confirm?");
        url.push_str(
            &url::form_urlencoded::Serializer::new(String::new())
                .append_pair("token", token)
                .finish(),
        );
        url
    }

    /// `{frontend_url}/marketplace/{id}`.
    pub fn marketplace(&self, product_id: ProductId) -> String {
        format!(
            "{}/marketplace/{product_id}",
            self.frontend_url.trim_end_matches('/')
        )
    }
}

/// Render a timestamp as `h:mm AM/PM, DD Mon YYYY`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use marketplace::domain::format_event_time;
///
/// let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 0).unwrap();
/// assert_eq!(format_event_time(at), "2:05 PM, 07 Mar 2025");
/// ```
pub fn format_event_time(at: DateTime<Utc>) -> String {
    at.format("%-I:%M %p, %d %b %Y").to_string()
}

fn message(kind: EmailKind, to: &User, subject: String, lines: &[String]) -> EmailMessage {
    let mut body = format!("Hello {},\n\n", to.name);
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    EmailMessage {
        kind,
        to: to.email.clone(),
        subject,
        body,
    }
}

/// Confirmation request sent right after signup.
pub fn confirmation_email(user: &User, confirm_url: &str) -> EmailMessage {
    message(
        EmailKind::ConfirmEmail,
        user,
        "Confirm your Email Address".to_owned(),
        &[format!("Please confirm your email address: {confirm_url}")],
    )
}

/// Greeting sent once the address is confirmed.
pub fn welcome_email(user: &User) -> EmailMessage {
    message(
        EmailKind::Welcome,
        user,
        "Welcome to the marketplace".to_owned(),
        &["Your email is confirmed. You may now log in.".to_owned()],
    )
}

/// Notice that the account password changed.
pub fn password_changed_email(user: &User, at: DateTime<Utc>) -> EmailMessage {
    message(
        EmailKind::PasswordChanged,
        user,
        "Your password was changed".to_owned(),
        &[format!(
            "Your password was changed at {}. If this was not you, contact support.",
            format_event_time(at)
        )],
    )
}

/// Message for a product lifecycle event addressed to the owning seller.
pub fn product_event_email(
    kind: EmailKind,
    seller: &User,
    product: &Product,
    links: &EmailLinks,
    at: DateTime<Utc>,
) -> EmailMessage {
    let name = &product.details.name;
    let (subject, line) = match kind {
        EmailKind::ProductUpdated => (
            format!("Product Updated | {name}"),
            format!("Your changes to {name} are awaiting review."),
        ),
        EmailKind::ProductDeleted => (
            format!("Product Deleted | {name}"),
            format!("{name} was deleted at {}.", format_event_time(at)),
        ),
        EmailKind::ProductApproved => (
            format!("Product Approved | {name}"),
            format!(
                "{name} is now live: {}",
                links.marketplace(product.id)
            ),
        ),
        EmailKind::ProductRejected => (
            format!("Product Rejected | {name}"),
            format!("{name} was not approved. Please review and resubmit."),
        ),
        _ => (
            format!("New Product Added | {name}"),
            format!("{name} was added and is pending approval."),
        ),
    };
    message(kind, seller, subject, &[line])
}
