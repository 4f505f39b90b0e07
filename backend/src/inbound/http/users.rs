//! Directory handlers.
//!
//! ```text
//! GET  /api/v1/users
//! POST /api/v1/users/{userId}/approve
//! GET  /api/v1/sellers/{sellerId}
//! ```

use actix_web::{get, post, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{AccountView, SellerDirectoryView, product_views};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};

/// Every account, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Accounts", body = [AccountView]),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<AccountView>>> {
    let accounts = state.directory.list_users(auth.principal()).await?;
    Ok(web::Json(accounts.iter().map(AccountView::from).collect()))
}

/// Confirm a user's verification document and promote them to SELLER.
#[utoipa::path(
    post,
    path = "/api/v1/users/{userId}/approve",
    params(("userId" = String, Path, description = "User to promote")),
    responses(
        (status = 200, description = "Promoted account", body = AccountView),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Target is an administrator", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "approveDocument"
)]
#[post("/users/{user_id}/approve")]
pub async fn approve_document(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AccountView>> {
    let target = parse_user_id(&path.into_inner(), FieldName::new("userId"))?;
    let account = state
        .accounts
        .approve_document(auth.principal(), &target)
        .await?;
    Ok(web::Json(AccountView::from(&account)))
}

/// Seller profile with the listings the caller may see.
#[utoipa::path(
    get,
    path = "/api/v1/sellers/{sellerId}",
    params(("sellerId" = String, Path, description = "Seller user id")),
    responses(
        (status = 200, description = "Seller and listings", body = SellerDirectoryView),
        (status = 400, description = "Malformed seller id", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 404, description = "Unknown seller", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getSeller"
)]
#[get("/sellers/{seller_id}")]
pub async fn get_seller(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SellerDirectoryView>> {
    let seller = parse_user_id(&path.into_inner(), FieldName::new("sellerId"))?;
    let entry = state
        .directory
        .get_seller(auth.principal(), &seller)
        .await?;
    Ok(web::Json(SellerDirectoryView {
        seller: AccountView::from(&entry.account),
        products: product_views(&entry.products),
    }))
}
