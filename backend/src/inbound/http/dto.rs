//! Response projections shared by the handlers.
//!
//! Field names are camelCase, except the product descriptive fields which
//! keep their `product_*` names. Password digests never leave the domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AdminProfile, ChatLead, Enquiry, Notification, Product, ProductDetails, ProductImage,
    SellerProfile, User, UserAccount,
};

/// Public projection of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[schema(example = "SELLER")]
    pub role: String,
    pub is_email_verified: bool,
    pub is_document_verified: bool,
    pub address: String,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub profile_pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            is_email_verified: user.is_email_verified,
            is_document_verified: user.is_document_verified,
            address: user.address.clone(),
            country_code: user.country_code.clone(),
            phone_number: user.phone_number.clone(),
            profile_pic_url: user.profile_pic_url.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerView {
    pub business_desc: String,
    pub business_type: String,
    pub verification_doc_url: Option<String>,
}

impl From<&SellerProfile> for SellerView {
    fn from(profile: &SellerProfile) -> Self {
        Self {
            business_desc: profile.business_desc.clone(),
            business_type: profile.business_type.clone(),
            verification_doc_url: profile.verification_doc_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub permissions: Vec<String>,
}

impl From<&AdminProfile> for AdminView {
    fn from(profile: &AdminProfile) -> Self {
        Self {
            permissions: profile.permissions.clone(),
        }
    }
}

/// A user with whichever role extensions exist.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seller: Option<SellerView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub admin: Option<AdminView>,
}

impl From<&UserAccount> for AccountView {
    fn from(account: &UserAccount) -> Self {
        Self {
            user: UserView::from(&account.user),
            seller: account.seller.as_ref().map(SellerView::from),
            admin: account.admin.as_ref().map(AdminView::from),
        }
    }
}

/// Token plus the signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountView,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageView {
    pub url: String,
    pub position: i32,
}

impl From<&ProductImage> for ImageView {
    fn from(image: &ProductImage) -> Self {
        Self {
            url: image.url.clone(),
            position: image.position,
        }
    }
}

/// Descriptive product fields as they appear on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductFieldsView {
    #[schema(example = "Recycled Pallet")]
    pub product_name: String,
    pub product_price: f64,
    pub product_currency: String,
    #[schema(example = 50)]
    pub product_qty: i32,
    pub product_unit: String,
    pub product_category: String,
    pub product_country: Option<String>,
    pub product_color: Option<String>,
    pub product_source_material: Option<String>,
    pub product_batch_size: Option<String>,
    pub product_minimum_order_quantity: Option<i32>,
    pub product_application: Option<String>,
    pub product_desc: Option<String>,
    pub product_additional_notes: Option<String>,
}

impl From<&ProductDetails> for ProductFieldsView {
    fn from(details: &ProductDetails) -> Self {
        Self {
            product_name: details.name.clone(),
            product_price: details.price,
            product_currency: details.currency.clone(),
            product_qty: details.quantity,
            product_unit: details.unit.clone(),
            product_category: details.category.clone(),
            product_country: details.country.clone(),
            product_color: details.color.clone(),
            product_source_material: details.source_material.clone(),
            product_batch_size: details.batch_size.clone(),
            product_minimum_order_quantity: details.minimum_order_quantity,
            product_application: details.application.clone(),
            product_desc: details.description.clone(),
            product_additional_notes: details.additional_notes.clone(),
        }
    }
}

/// A product listing. `isApproved` carries the moderation status code:
/// 0 pending, 1 approved, -1 rejected, -2 deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    pub seller_user_id: Option<String>,
    pub owner_deleted: bool,
    #[serde(flatten)]
    pub fields: ProductFieldsView,
    #[schema(example = 0)]
    pub is_approved: i16,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageView>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.get(),
            seller_user_id: product.seller_user_id.as_ref().map(ToString::to_string),
            owner_deleted: product.owner_deleted,
            fields: ProductFieldsView::from(&product.details),
            is_approved: product.status.code(),
            deleted_at: product.deleted_at,
            created_at: product.created_at,
            images: product.images.iter().map(ImageView::from).collect(),
        }
    }
}

pub fn product_views(products: &[Product]) -> Vec<ProductView> {
    products.iter().map(ProductView::from).collect()
}

/// Minimal owner projection attached to a single product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for OwnerView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailView {
    #[serde(flatten)]
    pub product: ProductView,
    pub seller: Option<OwnerView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: i64,
    pub user_id: String,
    pub product_id: Option<i64>,
    #[serde(rename = "type")]
    #[schema(example = "PRODUCT_APPROVED")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationView {
    fn from(entry: &Notification) -> Self {
        Self {
            id: entry.id.get(),
            user_id: entry.user_id.to_string(),
            product_id: entry.product_id.map(|id| id.get()),
            kind: entry.kind.as_str().to_owned(),
            is_read: entry.is_read,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryView {
    pub id: i64,
    pub user_id: String,
    pub product_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Enquiry> for EnquiryView {
    fn from(enquiry: &Enquiry) -> Self {
        Self {
            id: enquiry.id,
            user_id: enquiry.user_id.to_string(),
            product_id: enquiry.product_id.get(),
            message: enquiry.message.clone(),
            created_at: enquiry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatLeadView {
    pub id: i64,
    pub company_name: String,
    pub user_name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatLead> for ChatLeadView {
    fn from(lead: &ChatLead) -> Self {
        Self {
            id: lead.id,
            company_name: lead.company_name.clone(),
            user_name: lead.user_name.clone(),
            phone_number: lead.phone_number.clone(),
            created_at: lead.created_at,
        }
    }
}

/// Seller directory entry: the account plus its visible listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerDirectoryView {
    pub seller: AccountView,
    pub products: Vec<ProductView>,
}

/// URL of a stored upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadView {
    pub url: String,
}
