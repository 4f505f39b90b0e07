//! HTTP coverage for the product handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{EmailKind, NotificationScope, NotificationType, User};
use crate::domain::ports::NotificationRepository;
use crate::http_service;
use crate::test_support::TestApp;

fn pallet(name: &str) -> Value {
    json!({
        "product_name": name,
        "product_price": 12.5,
        "product_currency": "EUR",
        "product_qty": 50,
        "product_unit": "pcs",
        "product_category": "Packaging",
        "product_color": "Natural",
    })
}

macro_rules! send {
    ($svc:expr, $req:expr) => {
        test::call_service(&$svc, $req.to_request()).await
    };
}

async fn ledger_for(app: &TestApp, user: &User) -> Vec<NotificationType> {
    NotificationRepository::list(&app.store, &NotificationScope::User(user.id.clone()))
        .await
        .expect("ledger")
        .into_iter()
        .map(|entry| entry.kind)
        .collect()
}

#[actix_web::test]
async fn seller_creates_pending_listing() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let svc = http_service!(app).await;
    let res = send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Recycled Pallet"))
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["product_name"], "Recycled Pallet");
    assert_eq!(body["product_qty"], 50);
    assert_eq!(body["isApproved"], 0);
    assert_eq!(body["sellerUserId"], seller.id.to_string());
    assert_eq!(
        ledger_for(&app, &seller).await,
        vec![NotificationType::ProductCreated]
    );
    assert!(
        app.mailer
            .sent()
            .iter()
            .any(|m| m.kind == EmailKind::ProductPending)
    );
}

#[actix_web::test]
async fn plain_users_cannot_create_listings() {
    let app = TestApp::new();
    let user = app.verified_user("ada@example.com").await;
    let svc = http_service!(app).await;
    let res = send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&user)))
            .set_json(pallet("Pallet"))
    );
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case(json!({"product_price": 1.0}), "product_name")]
#[case(json!({"product_name": "P", "product_price": -1.0, "product_currency": "EUR", "product_qty": 1, "product_unit": "pcs", "product_category": "c"}), "product_price")]
#[actix_web::test]
async fn invalid_listings_are_rejected(#[case] payload: Value, #[case] field: &str) {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let svc = http_service!(app).await;
    let res = send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(payload)
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
    assert!(ledger_for(&app, &seller).await.is_empty());
}

#[actix_web::test]
async fn moderation_round_trip() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let admin = app.admin("root@example.com");
    let svc = http_service!(app).await;

    let created: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Recycled Pallet"))
    ))
    .await;
    let id = created["id"].as_i64().expect("id");

    let approved: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri(&format!("/api/v1/products/{id}/approve"))
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
    ))
    .await;
    assert_eq!(approved["isApproved"], 1);

    let updated: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::put()
            .uri(&format!("/api/v1/products/{id}"))
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Recycled Pallet v2"))
    ))
    .await;
    assert_eq!(updated["isApproved"], 0);
    assert_eq!(updated["product_name"], "Recycled Pallet v2");

    let rejected: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri(&format!("/api/v1/products/{id}/reject"))
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
    ))
    .await;
    assert_eq!(rejected["isApproved"], -1);

    assert_eq!(
        ledger_for(&app, &seller).await,
        vec![
            NotificationType::ProductRejected,
            NotificationType::ProductUpdated,
            NotificationType::ProductApproved,
            NotificationType::ProductCreated,
        ]
    );
    assert!(ledger_for(&app, &admin).await.is_empty());
}

#[rstest]
#[case("approve")]
#[case("reject")]
#[actix_web::test]
async fn only_admins_moderate(#[case] action: &str) {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let buyer = app.verified_user("ada@example.com").await;
    let svc = http_service!(app).await;
    let created: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Pallet"))
    ))
    .await;
    let id = created["id"].as_i64().expect("id");

    for caller in [&buyer, &seller] {
        let res = send!(
            svc,
            test::TestRequest::post()
                .uri(&format!("/api/v1/products/{id}/{action}"))
                .insert_header((AUTHORIZATION, app.bearer(caller)))
        );
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
    let current: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::get().uri(&format!("/api/v1/products/{id}"))
    ))
    .await;
    assert_eq!(current["isApproved"], 0);
    assert_eq!(
        ledger_for(&app, &seller).await,
        vec![NotificationType::ProductCreated]
    );
}

#[actix_web::test]
async fn strangers_cannot_edit_or_delete() {
    let app = TestApp::new();
    let owner = app.seller("owner@example.com").await;
    let other = app.seller("other@example.com").await;
    let svc = http_service!(app).await;
    let created: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&owner)))
            .set_json(pallet("Pallet"))
    ))
    .await;
    let id = created["id"].as_i64().expect("id");

    let res = send!(
        svc,
        test::TestRequest::put()
            .uri(&format!("/api/v1/products/{id}"))
            .insert_header((AUTHORIZATION, app.bearer(&other)))
            .set_json(pallet("Hijacked"))
    );
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = send!(
        svc,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/products/{id}"))
            .insert_header((AUTHORIZATION, app.bearer(&other)))
    );
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn deleted_listings_are_frozen() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let svc = http_service!(app).await;
    let created: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Pallet"))
    ))
    .await;
    let id = created["id"].as_i64().expect("id");

    let deleted: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/products/{id}"))
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
    ))
    .await;
    assert_eq!(deleted["isApproved"], -2);
    assert!(deleted["deletedAt"].is_string());
    assert_eq!(deleted["product_name"], "Pallet");

    let res = send!(
        svc,
        test::TestRequest::put()
            .uri(&format!("/api/v1/products/{id}"))
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Back again"))
    );
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn public_listing_hides_unapproved_products() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let admin = app.admin("root@example.com");
    let svc = http_service!(app).await;
    let mut ids = Vec::new();
    for name in ["Approved", "Pending"] {
        let created: Value = test::read_body_json(send!(
            svc,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .insert_header((AUTHORIZATION, app.bearer(&seller)))
                .set_json(pallet(name))
        ))
        .await;
        ids.push(created["id"].as_i64().expect("id"));
    }
    send!(
        svc,
        test::TestRequest::post()
            .uri(&format!("/api/v1/products/{}/approve", ids[0]))
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
    );

    let anonymous: Vec<Value> = test::read_body_json(send!(
        svc,
        test::TestRequest::get().uri("/api/v1/products")
    ))
    .await;
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0]["product_name"], "Approved");

    let as_seller: Vec<Value> = test::read_body_json(send!(
        svc,
        test::TestRequest::get()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
    ))
    .await;
    assert_eq!(as_seller.len(), 1);

    let as_admin: Vec<Value> = test::read_body_json(send!(
        svc,
        test::TestRequest::get()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
    ))
    .await;
    assert_eq!(as_admin.len(), 2);

    let pending: Vec<Value> = test::read_body_json(send!(
        svc,
        test::TestRequest::get()
            .uri("/api/v1/products/pending")
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
    ))
    .await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], ids[1]);
}

#[actix_web::test]
async fn seller_listings_widen_for_the_owner() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let svc = http_service!(app).await;
    send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Pending"))
    );
    let uri = format!("/api/v1/products/seller/{}", seller.id);

    let public: Vec<Value> =
        test::read_body_json(send!(svc, test::TestRequest::get().uri(&uri))).await;
    assert!(public.is_empty());

    let own: Vec<Value> = test::read_body_json(send!(
        svc,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
    ))
    .await;
    assert_eq!(own.len(), 1);
}

#[actix_web::test]
async fn product_detail_includes_owner() {
    let app = TestApp::new();
    let seller = app.seller("shop@example.com").await;
    let svc = http_service!(app).await;
    let created: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&seller)))
            .set_json(pallet("Pallet"))
    ))
    .await;
    let id = created["id"].as_i64().expect("id");
    let body: Value = test::read_body_json(send!(
        svc,
        test::TestRequest::get().uri(&format!("/api/v1/products/{id}"))
    ))
    .await;
    assert_eq!(body["seller"]["email"], "shop@example.com");
    assert_eq!(body["ownerDeleted"], false);
}

#[rstest]
#[case("/api/v1/products/abc", StatusCode::BAD_REQUEST)]
#[case("/api/v1/products/0", StatusCode::BAD_REQUEST)]
#[case("/api/v1/products/404", StatusCode::NOT_FOUND)]
#[case("/api/v1/products/except/not-a-uuid", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn malformed_or_unknown_ids(#[case] uri: &str, #[case] expected: StatusCode) {
    let app = TestApp::new();
    let svc = http_service!(app).await;
    let res = send!(svc, test::TestRequest::get().uri(uri));
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn pending_queue_requires_a_token() {
    let app = TestApp::new();
    let svc = http_service!(app).await;
    let res = send!(svc, test::TestRequest::get().uri("/api/v1/products/rejected"));
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
