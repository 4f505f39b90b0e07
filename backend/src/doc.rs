//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler in the inbound HTTP layer plus health probes
//! - **Schemas**: response projections, request bodies and the wrappers in
//!   [`crate::inbound::http::schemas`] that describe domain errors without
//!   coupling domain types to utoipa
//! - **Security**: the bearer token scheme issued by signup and login
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    ChangePasswordRequest, LoginRequest, SignupRequest, UpdateProfileRequest, VerifyRequest,
};
use crate::inbound::http::dto::{
    AccountView, AdminView, AuthResponse, ChatLeadView, EnquiryView, ImageView,
    MarkAllReadResponse, MessageResponse, NotificationView, OwnerView, ProductDetailView,
    ProductFieldsView, ProductView, SellerDirectoryView, SellerView, UploadView, UserView,
};
use crate::inbound::http::enquiries::{ChatLeadRequest, EnquiryRequest};
use crate::inbound::http::products::ProductRequest;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by handlers.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/v1/auth/signup or /api/v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Marketplace backend API",
        description = "Accounts, moderated product listings, notifications and enquiries."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::verify,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::accounts::delete_account,
        crate::inbound::http::accounts::confirm,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::approve_document,
        crate::inbound::http::users::get_seller,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::list_pending,
        crate::inbound::http::products::list_rejected,
        crate::inbound::http::products::list_by_seller,
        crate::inbound::http::products::list_except_seller,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::products::approve_product,
        crate::inbound::http::products::reject_product,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::enquiries::send_enquiry,
        crate::inbound::http::enquiries::list_enquiries,
        crate::inbound::http::enquiries::list_by_product,
        crate::inbound::http::enquiries::list_by_user,
        crate::inbound::http::enquiries::list_by_seller,
        crate::inbound::http::enquiries::create_chat_lead,
        crate::inbound::http::enquiries::list_chat_leads,
        crate::inbound::http::uploads::profile_picture,
        crate::inbound::http::uploads::product_image,
        crate::inbound::http::uploads::verification_document,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserView,
        SellerView,
        AdminView,
        AccountView,
        AuthResponse,
        MessageResponse,
        ImageView,
        ProductFieldsView,
        ProductView,
        OwnerView,
        ProductDetailView,
        NotificationView,
        MarkAllReadResponse,
        EnquiryView,
        ChatLeadView,
        SellerDirectoryView,
        UploadView,
        SignupRequest,
        LoginRequest,
        UpdateProfileRequest,
        VerifyRequest,
        ChangePasswordRequest,
        ProductRequest,
        EnquiryRequest,
        ChatLeadRequest,
    )),
    tags(
        (name = "auth", description = "Signup, login and account maintenance"),
        (name = "users", description = "Administrative directory and seller profiles"),
        (name = "products", description = "Listings and their moderation"),
        (name = "notifications", description = "Per-user moderation ledger"),
        (name = "enquiries", description = "Buyer enquiries and chat leads"),
        (name = "uploads", description = "Profile pictures, product images and documents"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
