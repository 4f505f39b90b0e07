//! Raw-body uploads.
//!
//! Each request carries one object as its body (`application/octet-stream`
//! or an image content type) and names it with the `filename` query
//! parameter.
//!
//! ```text
//! POST /api/v1/uploads/profile-pic?filename=me.png
//! POST /api/v1/uploads/products/{productId}/images
//! POST /api/v1/uploads/verification-doc?filename=licence.pdf
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, UploadBody, UploadFilename};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{AccountView, ImageView, UploadView};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_product_id, upload_error};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FilenameQuery {
    /// Client filename; whitespace is replaced by `_`.
    pub filename: Option<String>,
}

fn filename(query: &FilenameQuery) -> Result<UploadFilename, Error> {
    UploadFilename::new(query.filename.as_deref().unwrap_or_default()).map_err(upload_error)
}

fn body(bytes: web::Bytes) -> Result<UploadBody, Error> {
    UploadBody::new(bytes.to_vec()).map_err(upload_error)
}

#[utoipa::path(
    post,
    path = "/api/v1/uploads/profile-pic",
    params(FilenameQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Stored picture", body = UploadView),
        (status = 400, description = "Empty body or filename", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 503, description = "Object store unavailable", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "uploadProfilePicture"
)]
#[post("/uploads/profile-pic")]
pub async fn profile_picture(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<FilenameQuery>,
    bytes: web::Bytes,
) -> ApiResult<HttpResponse> {
    let name = filename(&query)?;
    let url = state
        .uploads
        .profile_picture(auth.principal(), &name, body(bytes)?)
        .await?;
    Ok(HttpResponse::Created().json(UploadView { url }))
}

/// Append an image to a listing the caller owns. The stored name is
/// derived from the image position, so `filename` is optional here.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/products/{productId}/images",
    params(("productId" = i64, Path, description = "Product id")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Stored image", body = ImageView),
        (status = 400, description = "Empty body", body = ErrorSchema),
        (status = 403, description = "Caller does not own the listing", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "uploadProductImage"
)]
#[post("/uploads/products/{product_id}/images")]
pub async fn product_image(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    bytes: web::Bytes,
) -> ApiResult<HttpResponse> {
    let id = parse_product_id(path.into_inner(), FieldName::new("productId"))?;
    let image = state
        .uploads
        .product_image(auth.principal(), id, body(bytes)?)
        .await?;
    Ok(HttpResponse::Created().json(ImageView::from(&image)))
}

/// Store a verification document; an admin then confirms it.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/verification-doc",
    params(FilenameQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Account awaiting document approval", body = AccountView),
        (status = 400, description = "Empty body or filename", body = ErrorSchema),
        (status = 403, description = "Administrators cannot sell", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "uploadVerificationDocument"
)]
#[post("/uploads/verification-doc")]
pub async fn verification_document(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<FilenameQuery>,
    bytes: web::Bytes,
) -> ApiResult<HttpResponse> {
    let name = filename(&query)?;
    let account = state
        .uploads
        .verification_document(auth.principal(), &name, body(bytes)?)
        .await?;
    Ok(HttpResponse::Created().json(AccountView::from(&account)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::details;
    use crate::domain::ports::ProductRepository;
    use crate::domain::NewProduct;
    use crate::http_service;
    use crate::test_support::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[actix_web::test]
    async fn profile_picture_is_keyed_by_user_and_sanitised() {
        let app = TestApp::new();
        let user = app.verified_user("ada@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/uploads/profile-pic?filename=my%20photo.png")
            .insert_header((AUTHORIZATION, app.bearer(&user)))
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload(vec![1_u8, 2, 3])
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let keys = app.objects.keys();
        assert_eq!(keys.len(), 1);
        let key = &keys[0];
        assert!(key.starts_with(&format!("profile-pics/{}_", user.id)));
        assert!(key.ends_with("_my_photo.png"));
        assert_eq!(body["url"], format!("memory://{key}"));
    }

    #[rstest]
    #[case("/api/v1/uploads/profile-pic?filename=a.png", Vec::new(), "body")]
    #[case("/api/v1/uploads/profile-pic", vec![1_u8], "filename")]
    #[case("/api/v1/uploads/verification-doc?filename=%20", vec![1_u8], "filename")]
    #[actix_web::test]
    async fn empty_inputs_are_rejected(
        #[case] uri: &str,
        #[case] payload: Vec<u8>,
        #[case] field: &str,
    ) {
        let app = TestApp::new();
        let user = app.verified_user("ada@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header((AUTHORIZATION, app.bearer(&user)))
            .set_payload(payload)
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
        assert!(app.objects.keys().is_empty());
    }

    #[actix_web::test]
    async fn product_images_are_numbered_by_position() {
        let app = TestApp::new();
        let seller = app.seller("shop@example.com").await;
        let product = ProductRepository::create(
            &app.store,
            &NewProduct {
                seller_user_id: seller.id.clone(),
                details: details("Pallet"),
            },
        )
        .await
        .expect("product");
        let svc = http_service!(app).await;
        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri(&format!("/api/v1/uploads/products/{}/images", product.id))
                .insert_header((AUTHORIZATION, app.bearer(&seller)))
                .set_payload(vec![0xff_u8, 0xd8])
                .to_request();
            let res = test::call_service(&svc, req).await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }
        assert_eq!(
            app.objects.keys(),
            vec![
                format!("seller/{}/{}/images/0.jpg", seller.id, product.id),
                format!("seller/{}/{}/images/1.jpg", seller.id, product.id),
            ]
        );
    }

    #[actix_web::test]
    async fn only_owners_add_product_images() {
        let app = TestApp::new();
        let owner = app.seller("owner@example.com").await;
        let other = app.seller("other@example.com").await;
        let product = ProductRepository::create(
            &app.store,
            &NewProduct {
                seller_user_id: owner.id.clone(),
                details: details("Pallet"),
            },
        )
        .await
        .expect("product");
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/uploads/products/{}/images", product.id))
            .insert_header((AUTHORIZATION, app.bearer(&other)))
            .set_payload(vec![1_u8])
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(app.objects.keys().is_empty());
    }

    #[actix_web::test]
    async fn verification_document_leaves_role_for_admin_approval() {
        let app = TestApp::new();
        let user = app.verified_user("ada@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/uploads/verification-doc?filename=licence.pdf")
            .insert_header((AUTHORIZATION, app.bearer(&user)))
            .set_payload(b"%PDF".to_vec())
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["role"], "USER");
        assert_eq!(body["isDocumentVerified"], false);
        let doc_url = body["seller"]["verificationDocUrl"]
            .as_str()
            .expect("document url");
        assert!(doc_url.starts_with(&format!("memory://verification-docs/{}/", user.id)));
        assert!(doc_url.ends_with("_licence.pdf"));
    }
}
