//! Product catalogue and moderation handlers.
//!
//! ```text
//! GET    /api/v1/products
//! GET    /api/v1/products/pending | /rejected
//! GET    /api/v1/products/seller/{sellerUserId}
//! GET    /api/v1/products/except/{sellerUserId}
//! GET    /api/v1/products/{productId}
//! POST   /api/v1/products
//! PUT    /api/v1/products/{productId}
//! DELETE /api/v1/products/{productId}
//! POST   /api/v1/products/{productId}/approve | /reject
//! ```
//!
//! Literal sub-paths must be registered before `/products/{productId}`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ProductDetails, ProductDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, MaybeAuthenticated};
use crate::inbound::http::dto::{OwnerView, ProductDetailView, ProductView, product_views};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_product_id, parse_user_id, product_error};

const PRODUCT_ID: FieldName = FieldName::new("productId");
const SELLER_USER_ID: FieldName = FieldName::new("sellerUserId");

/// Descriptive product fields. Names keep their `product_*` wire form.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductRequest {
    #[schema(example = "Recycled Pallet")]
    pub product_name: Option<String>,
    #[schema(example = 12.5)]
    pub product_price: Option<f64>,
    #[schema(example = "EUR")]
    pub product_currency: Option<String>,
    #[schema(example = 50)]
    pub product_qty: Option<i32>,
    #[schema(example = "pcs")]
    pub product_unit: Option<String>,
    pub product_category: Option<String>,
    pub product_country: Option<String>,
    pub product_color: Option<String>,
    pub product_source_material: Option<String>,
    pub product_batch_size: Option<String>,
    pub product_minimum_order_quantity: Option<i32>,
    pub product_application: Option<String>,
    pub product_desc: Option<String>,
    pub product_additional_notes: Option<String>,
}

impl From<ProductRequest> for ProductDraft {
    fn from(value: ProductRequest) -> Self {
        Self {
            name: value.product_name,
            price: value.product_price,
            currency: value.product_currency,
            quantity: value.product_qty,
            unit: value.product_unit,
            category: value.product_category,
            country: value.product_country,
            color: value.product_color,
            source_material: value.product_source_material,
            batch_size: value.product_batch_size,
            minimum_order_quantity: value.product_minimum_order_quantity,
            application: value.product_application,
            description: value.product_desc,
            additional_notes: value.product_additional_notes,
        }
    }
}

fn details_from(payload: web::Json<ProductRequest>) -> ApiResult<ProductDetails> {
    ProductDetails::try_from(ProductDraft::from(payload.into_inner())).map_err(product_error)
}

/// Public catalogue; administrators also see unapproved listings.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Listings, newest first", body = [ProductView])),
    tags = ["products"],
    operation_id = "listProducts",
    security([], ("BearerAuth" = []))
)]
#[get("/products")]
pub async fn list_products(
    auth: MaybeAuthenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let products = state.products.list_all(auth.principal()).await?;
    Ok(web::Json(product_views(&products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/pending",
    responses(
        (status = 200, description = "Moderation queue", body = [ProductView]),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listPendingProducts"
)]
#[get("/products/pending")]
pub async fn list_pending(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let products = state.products.list_pending(auth.principal()).await?;
    Ok(web::Json(product_views(&products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/rejected",
    responses(
        (status = 200, description = "Rejected listings", body = [ProductView]),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listRejectedProducts"
)]
#[get("/products/rejected")]
pub async fn list_rejected(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let products = state.products.list_rejected(auth.principal()).await?;
    Ok(web::Json(product_views(&products)))
}

/// A seller's listings. Strangers only see approved ones.
#[utoipa::path(
    get,
    path = "/api/v1/products/seller/{sellerUserId}",
    params(("sellerUserId" = String, Path, description = "Seller user id")),
    responses(
        (status = 200, description = "Seller listings", body = [ProductView]),
        (status = 400, description = "Malformed seller id", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listSellerProducts",
    security([], ("BearerAuth" = []))
)]
#[get("/products/seller/{seller_user_id}")]
pub async fn list_by_seller(
    auth: MaybeAuthenticated,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let seller = parse_user_id(&path.into_inner(), SELLER_USER_ID)?;
    let products = state
        .products
        .list_by_seller(auth.principal(), &seller)
        .await?;
    Ok(web::Json(product_views(&products)))
}

/// Approved listings of every other seller.
#[utoipa::path(
    get,
    path = "/api/v1/products/except/{sellerUserId}",
    params(("sellerUserId" = String, Path, description = "Seller to exclude")),
    responses(
        (status = 200, description = "Other sellers' listings", body = [ProductView]),
        (status = 400, description = "Malformed seller id", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProductsExceptSeller",
    security([])
)]
#[get("/products/except/{seller_user_id}")]
pub async fn list_except_seller(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let seller = parse_user_id(&path.into_inner(), SELLER_USER_ID)?;
    let products = state.products.list_except_seller(&seller).await?;
    Ok(web::Json(product_views(&products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{productId}",
    params(("productId" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with owner", body = ProductDetailView),
        (status = 400, description = "Malformed product id", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([], ("BearerAuth" = []))
)]
#[get("/products/{product_id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductDetailView>> {
    let id = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let found = state.products.get_one(id).await?;
    Ok(web::Json(ProductDetailView {
        product: ProductView::from(&found.product),
        seller: found.owner.as_ref().map(OwnerView::from),
    }))
}

/// Create a listing in PENDING status.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Listing created", body = ProductView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Caller is not a seller", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    auth: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let details = details_from(payload)?;
    let product = state.products.create(auth.principal(), details).await?;
    Ok(HttpResponse::Created().json(ProductView::from(&product)))
}

/// Replace a listing's fields; the listing returns to PENDING.
#[utoipa::path(
    put,
    path = "/api/v1/products/{productId}",
    params(("productId" = i64, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated listing", body = ProductView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Caller does not own the listing", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema),
        (status = 409, description = "Listing was deleted", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{product_id}")]
pub async fn update_product(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<web::Json<ProductView>> {
    let id = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let details = details_from(payload)?;
    let product = state
        .products
        .update(auth.principal(), id, details)
        .await?;
    Ok(web::Json(ProductView::from(&product)))
}

/// Soft delete: the status becomes DELETED and `deletedAt` is stamped.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{productId}",
    params(("productId" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted listing", body = ProductView),
        (status = 403, description = "Caller does not own the listing", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{product_id}")]
pub async fn delete_product(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductView>> {
    let id = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let product = state.products.delete(auth.principal(), id).await?;
    Ok(web::Json(ProductView::from(&product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/{productId}/approve",
    params(("productId" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Approved listing", body = ProductView),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema),
        (status = 409, description = "Listing cannot be moderated", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "approveProduct"
)]
#[post("/products/{product_id}/approve")]
pub async fn approve_product(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductView>> {
    let id = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let product = state.products.approve(auth.principal(), id).await?;
    Ok(web::Json(ProductView::from(&product)))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/{productId}/reject",
    params(("productId" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Rejected listing", body = ProductView),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema),
        (status = 409, description = "Listing cannot be moderated", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "rejectProduct"
)]
#[post("/products/{product_id}/reject")]
pub async fn reject_product(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductView>> {
    let id = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let product = state.products.reject(auth.principal(), id).await?;
    Ok(web::Json(ProductView::from(&product)))
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
