//! Object-store keys and validated upload payloads.
//!
//! Keys follow a fixed layout so objects written by earlier deployments stay
//! addressable:
//!
//! ```text
//! profile-pics/{userId}_{timestamp}_{filename}
//! seller/{userId}/{productId}/images/{index}.jpg
//! verification-docs/{userId}/{timestamp}_{filename}
//! ```

use std::fmt;

use super::product::ProductId;
use super::user::UserId;

/// Validation failures for upload requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadValidationError {
    EmptyBody,
    EmptyFilename,
    InvalidFilename,
}

impl UploadValidationError {
    /// Field the error refers to.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyBody => "body",
            Self::EmptyFilename | Self::InvalidFilename => "filename",
        }
    }
}

impl fmt::Display for UploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "upload body must not be empty"),
            Self::EmptyFilename => write!(f, "filename must not be empty"),
            Self::InvalidFilename => write!(f, "filename must not contain path separators"),
        }
    }
}

impl std::error::Error for UploadValidationError {}

/// Sanitised client filename: whitespace runs become `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFilename(String);

impl UploadFilename {
    /// Validate and sanitise a client-supplied filename.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::UploadFilename;
    ///
    /// let name = UploadFilename::new(" my  photo.png ").unwrap();
    /// assert_eq!(name.as_ref(), "my_photo.png");
    /// ```
    pub fn new(raw: &str) -> Result<Self, UploadValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UploadValidationError::EmptyFilename);
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(UploadValidationError::InvalidFilename);
        }
        let sanitised = trimmed.split_whitespace().collect::<Vec<_>>().join("_");
        Ok(Self(sanitised))
    }
}

impl AsRef<str> for UploadFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Non-empty upload body.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadBody(Vec<u8>);

impl UploadBody {
    /// Reject empty bodies.
    pub fn new(bytes: Vec<u8>) -> Result<Self, UploadValidationError> {
        if bytes.is_empty() {
            return Err(UploadValidationError::EmptyBody);
        }
        Ok(Self(bytes))
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for UploadBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadBody({} bytes)", self.0.len())
    }
}

/// Relative key of an object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// `profile-pics/{userId}_{timestamp}_{filename}`.
    pub fn profile_picture(user: &UserId, timestamp_millis: i64, filename: &UploadFilename) -> Self {
        Self(format!(
            "profile-pics/{user}_{timestamp_millis}_{}",
            filename.as_ref()
        ))
    }

    /// `seller/{userId}/{productId}/images/{index}.jpg`.
    pub fn product_image(user: &UserId, product: ProductId, index: usize) -> Self {
        Self(format!("seller/{user}/{product}/images/{index}.jpg"))
    }

    /// `verification-docs/{userId}/{timestamp}_{filename}`.
    pub fn verification_document(
        user: &UserId,
        timestamp_millis: i64,
        filename: &UploadFilename,
    ) -> Self {
        Self(format!(
            "verification-docs/{user}/{timestamp_millis}_{}",
            filename.as_ref()
        ))
    }

    /// Path segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user() -> UserId {
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id")
    }

    #[rstest]
    #[case("", UploadValidationError::EmptyFilename)]
    #[case("   ", UploadValidationError::EmptyFilename)]
    #[case("../etc/passwd", UploadValidationError::InvalidFilename)]
    #[case("a\\b.png", UploadValidationError::InvalidFilename)]
    #[case("..", UploadValidationError::InvalidFilename)]
    fn filename_rejects(#[case] raw: &str, #[case] expected: UploadValidationError) {
        assert_eq!(UploadFilename::new(raw), Err(expected));
    }

    #[rstest]
    fn keys_follow_storage_layout() {
        let name = UploadFilename::new("passport scan.pdf").expect("valid name");
        assert_eq!(
            ObjectKey::profile_picture(&user(), 1_700_000_000_000, &name).as_ref(),
            "profile-pics/3fa85f64-5717-4562-b3fc-2c963f66afa6_1700000000000_passport_scan.pdf"
        );
        assert_eq!(
            ObjectKey::verification_document(&user(), 7, &name).as_ref(),
            "verification-docs/3fa85f64-5717-4562-b3fc-2c963f66afa6/7_passport_scan.pdf"
        );
        let product = ProductId::new(9).expect("positive id");
        assert_eq!(
            ObjectKey::product_image(&user(), product, 2).as_ref(),
            "seller/3fa85f64-5717-4562-b3fc-2c963f66afa6/9/images/2.jpg"
        );
    }

    #[rstest]
    fn empty_body_is_rejected() {
        assert_eq!(UploadBody::new(Vec::new()), Err(UploadValidationError::EmptyBody));
        assert_eq!(UploadBody::new(vec![1, 2]).map(|b| b.len()), Ok(2));
    }
}
