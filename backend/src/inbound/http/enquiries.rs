//! Buyer enquiries and anonymous chat leads.
//!
//! ```text
//! POST /api/v1/enquiries
//! GET  /api/v1/enquiries
//! GET  /api/v1/enquiries/product/{productId}
//! GET  /api/v1/enquiries/user[?userId=]
//! GET  /api/v1/enquiries/seller[?sellerUserId=]
//! POST /api/v1/chat-leads
//! GET  /api/v1/chat-leads
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{NewChatLead, NewEnquiry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{ChatLeadView, EnquiryView};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, enquiry_error, parse_optional_user_id, parse_product_id,
};

const PRODUCT_ID: FieldName = FieldName::new("productId");

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnquiryRequest {
    #[schema(example = 7)]
    pub product_id: Option<i64>,
    #[schema(example = "Can you ship 200 units to Zagreb?")]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChatLeadRequest {
    pub company_name: Option<String>,
    pub user_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserFilterQuery {
    /// Author to list; other users require admin rights.
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SellerFilterQuery {
    /// Seller to list; honoured for admins only.
    pub seller_user_id: Option<String>,
}

fn views(enquiries: &[crate::domain::Enquiry]) -> Vec<EnquiryView> {
    enquiries.iter().map(EnquiryView::from).collect()
}

/// Send an enquiry about a listing.
#[utoipa::path(
    post,
    path = "/api/v1/enquiries",
    request_body = EnquiryRequest,
    responses(
        (status = 201, description = "Enquiry recorded", body = EnquiryView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "sendEnquiry"
)]
#[post("/enquiries")]
pub async fn send_enquiry(
    auth: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<EnquiryRequest>,
) -> ApiResult<HttpResponse> {
    let product_id = payload
        .product_id
        .map(|raw| parse_product_id(raw, PRODUCT_ID))
        .transpose()?;
    let enquiry = NewEnquiry::try_new(
        auth.principal().user_id().clone(),
        product_id,
        payload.message.as_deref(),
    )
    .map_err(enquiry_error)?;
    let created = state.enquiries.send(enquiry).await?;
    Ok(HttpResponse::Created().json(EnquiryView::from(&created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries",
    responses(
        (status = 200, description = "Every enquiry, newest first", body = [EnquiryView]),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "listEnquiries"
)]
#[get("/enquiries")]
pub async fn list_enquiries(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<EnquiryView>>> {
    let enquiries = state.enquiries.list_all(auth.principal()).await?;
    Ok(web::Json(views(&enquiries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries/product/{productId}",
    params(("productId" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Enquiries on the product", body = [EnquiryView]),
        (status = 400, description = "Malformed product id", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "listProductEnquiries",
    security([])
)]
#[get("/enquiries/product/{product_id}")]
pub async fn list_by_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<EnquiryView>>> {
    let product = parse_product_id(path.into_inner(), PRODUCT_ID)?;
    let enquiries = state.enquiries.list_by_product(product).await?;
    Ok(web::Json(views(&enquiries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries/user",
    params(UserFilterQuery),
    responses(
        (status = 200, description = "Enquiries written by the user", body = [EnquiryView]),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 403, description = "Another user's enquiries", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "listUserEnquiries"
)]
#[get("/enquiries/user")]
pub async fn list_by_user(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<UserFilterQuery>,
) -> ApiResult<web::Json<Vec<EnquiryView>>> {
    let requested = parse_optional_user_id(query.user_id.as_deref(), FieldName::new("userId"))?;
    let enquiries = state
        .enquiries
        .list_by_user(auth.principal(), requested)
        .await?;
    Ok(web::Json(views(&enquiries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enquiries/seller",
    params(SellerFilterQuery),
    responses(
        (status = 200, description = "Enquiries on the seller's listings", body = [EnquiryView]),
        (status = 400, description = "Malformed seller id", body = ErrorSchema),
        (status = 403, description = "Caller is not a seller", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "listSellerEnquiries"
)]
#[get("/enquiries/seller")]
pub async fn list_by_seller(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<SellerFilterQuery>,
) -> ApiResult<web::Json<Vec<EnquiryView>>> {
    let requested = if auth.principal().is_admin() {
        parse_optional_user_id(
            query.seller_user_id.as_deref(),
            FieldName::new("sellerUserId"),
        )?
    } else {
        None
    };
    let enquiries = state
        .enquiries
        .list_by_seller(auth.principal(), requested)
        .await?;
    Ok(web::Json(views(&enquiries)))
}

/// Capture a chat lead from the public site.
#[utoipa::path(
    post,
    path = "/api/v1/chat-leads",
    request_body = ChatLeadRequest,
    responses(
        (status = 201, description = "Lead captured", body = ChatLeadView),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "createChatLead",
    security([])
)]
#[post("/chat-leads")]
pub async fn create_chat_lead(
    state: web::Data<HttpState>,
    payload: web::Json<ChatLeadRequest>,
) -> ApiResult<HttpResponse> {
    let lead = NewChatLead::try_new(
        payload.company_name.as_deref(),
        payload.user_name.as_deref(),
        payload.phone_number.as_deref(),
    )
    .map_err(enquiry_error)?;
    let created = state.enquiries.create_chat_lead(lead).await?;
    Ok(HttpResponse::Created().json(ChatLeadView::from(&created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat-leads",
    responses(
        (status = 200, description = "Leads, newest first", body = [ChatLeadView]),
        (status = 403, description = "Caller is not an admin", body = ErrorSchema)
    ),
    tags = ["enquiries"],
    operation_id = "listChatLeads"
)]
#[get("/chat-leads")]
pub async fn list_chat_leads(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ChatLeadView>>> {
    let leads = state.enquiries.list_chat_leads(auth.principal()).await?;
    Ok(web::Json(leads.iter().map(ChatLeadView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::details;
    use crate::domain::ports::ProductRepository;
    use crate::domain::{NewProduct, Product, User};
    use crate::http_service;
    use crate::test_support::TestApp;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn listing(app: &TestApp, owner: &User) -> Product {
        ProductRepository::create(
            &app.store,
            &NewProduct {
                seller_user_id: owner.id.clone(),
                details: details("Pallet"),
            },
        )
        .await
        .expect("product")
    }

    #[actix_web::test]
    async fn buyers_enquire_and_sellers_see_their_own() {
        let app = TestApp::new();
        let owner = app.seller("owner@example.com").await;
        let other = app.seller("other@example.com").await;
        let buyer = app.verified_user("buyer@example.com").await;
        let product = listing(&app, &owner).await;
        let svc = http_service!(app).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/enquiries")
            .insert_header((AUTHORIZATION, app.bearer(&buyer)))
            .set_json(json!({"productId": product.id.get(), "message": "Price for 200?"}))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["userId"], buyer.id.to_string());

        for (seller, expected) in [(&owner, 1), (&other, 0)] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/v1/enquiries/seller?sellerUserId={}", owner.id))
                .insert_header((AUTHORIZATION, app.bearer(seller)))
                .to_request();
            let body: Vec<Value> = test::call_and_read_body_json(&svc, req).await;
            assert_eq!(body.len(), expected);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/enquiries/product/{}", product.id))
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&svc, req).await;
        assert_eq!(body[0]["message"], "Price for 200?");
    }

    #[rstest]
    #[case(json!({"message": "hi"}), StatusCode::BAD_REQUEST)]
    #[case(json!({"productId": 1, "message": "   "}), StatusCode::BAD_REQUEST)]
    #[case(json!({"productId": 99, "message": "hi"}), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn invalid_enquiries_are_rejected(#[case] payload: Value, #[case] expected: StatusCode) {
        let app = TestApp::new();
        let owner = app.seller("owner@example.com").await;
        listing(&app, &owner).await;
        let buyer = app.verified_user("buyer@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/enquiries")
            .insert_header((AUTHORIZATION, app.bearer(&buyer)))
            .set_json(payload)
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn users_cannot_read_each_others_enquiries() {
        let app = TestApp::new();
        let alice = app.verified_user("alice@example.com").await;
        let bob = app.verified_user("bob@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/enquiries/user?userId={}", bob.id))
            .insert_header((AUTHORIZATION, app.bearer(&alice)))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn plain_users_have_no_seller_enquiries() {
        let app = TestApp::new();
        let user = app.verified_user("ada@example.com").await;
        let svc = http_service!(app).await;
        let req = test::TestRequest::get()
            .uri("/api/v1/enquiries/seller")
            .insert_header((AUTHORIZATION, app.bearer(&user)))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn chat_leads_are_public_to_create_and_admin_to_read() {
        let app = TestApp::new();
        let admin = app.admin("root@example.com");
        let seller = app.seller("shop@example.com").await;
        let svc = http_service!(app).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/chat-leads")
            .set_json(json!({
                "companyName": "Harbour Co",
                "userName": "Lin",
                "phoneNumber": "+385 1 234",
            }))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/v1/chat-leads")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/chat-leads")
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&svc, req).await;
        assert_eq!(body[0]["companyName"], "Harbour Co");
    }

    #[actix_web::test]
    async fn chat_leads_need_every_field() {
        let app = TestApp::new();
        let svc = http_service!(app).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/chat-leads")
            .set_json(json!({"companyName": "Harbour Co", "userName": "Lin"}))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "phoneNumber");
    }
}
