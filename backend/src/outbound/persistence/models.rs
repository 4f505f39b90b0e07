//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; repositories convert them
//! into domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    admins, chat_leads, enquiries, notifications, product_images, products, sellers, users,
};

// ---------------------------------------------------------------------------
// Users and role extensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub role: String,
    pub is_email_verified: bool,
    pub is_document_verified: bool,
    pub address: String,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub profile_pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Role and verification flags are left to their column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub address: &'a str,
    pub country_code: Option<&'a str>,
    pub phone_number: Option<&'a str>,
}

/// Partial profile update; `None` columns are skipped by Diesel.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub country_code: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub profile_pic_url: Option<&'a str>,
}

impl UserProfileChangeset<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.country_code.is_none()
            && self.phone_number.is_none()
            && self.profile_pic_url.is_none()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sellers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SellerRow {
    pub user_id: Uuid,
    pub business_desc: String,
    pub business_type: String,
    pub verification_doc_url: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = sellers)]
pub(crate) struct SellerFieldsChangeset<'a> {
    pub business_desc: Option<&'a str>,
    pub business_type: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminRow {
    pub user_id: Uuid,
    pub permissions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i64,
    pub seller_user_id: Option<Uuid>,
    pub owner_deleted: bool,
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
    pub status: i16,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Every listing detail column. Used both for inserts and for full
/// replacement on edit, so optional fields cleared by the seller are written
/// back as NULL.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductDetailsRow<'a> {
    pub name: &'a str,
    pub price: f64,
    pub currency: &'a str,
    pub quantity: i32,
    pub unit: &'a str,
    pub category: &'a str,
    pub country: Option<&'a str>,
    pub color: Option<&'a str>,
    pub source_material: Option<&'a str>,
    pub batch_size: Option<&'a str>,
    pub minimum_order_quantity: Option<i32>,
    pub application: Option<&'a str>,
    pub description: Option<&'a str>,
    pub additional_notes: Option<&'a str>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub seller_user_id: Uuid,
    pub status: i16,
    #[diesel(embed)]
    pub details: ProductDetailsRow<'a>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductImageRow {
    pub product_id: i64,
    pub url: String,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_images)]
pub(crate) struct NewProductImageRow<'a> {
    pub product_id: i64,
    pub url: &'a str,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Notifications, enquiries and chat leads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: Option<i64>,
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub user_id: Uuid,
    pub product_id: Option<i64>,
    pub notification_type: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = enquiries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnquiryRow {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = enquiries)]
pub(crate) struct NewEnquiryRow<'a> {
    pub user_id: Uuid,
    pub product_id: i64,
    pub message: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatLeadRow {
    pub id: i64,
    pub company_name: String,
    pub user_name: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_leads)]
pub(crate) struct NewChatLeadRow<'a> {
    pub company_name: &'a str,
    pub user_name: &'a str,
    pub phone_number: &'a str,
}
