//! End-to-end journey from signup to a moderated, enquired-about listing,
//! driven entirely through the HTTP surface over the in-memory adapters.

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test;
use marketplace::domain::EmailKind;
use marketplace::http_service;
use marketplace::test_support::TestApp;
use serde_json::{Value, json};

const PASSWORD: &str = "s3cret-pass";

macro_rules! call {
    ($svc:expr, $req:expr $(,)?) => {{
        let res = test::call_service(&$svc, $req.to_request()).await;
        let status: StatusCode = res.status();
        let bytes = test::read_body(res).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }};
}

fn bearer(body: &Value) -> String {
    format!("Bearer {}", body["token"].as_str().expect("token in response"))
}

fn crate_listing() -> Value {
    json!({
        "product_name": "Oak Crate",
        "product_price": 40,
        "product_currency": "EUR",
        "product_qty": 12,
        "product_unit": "pcs",
        "product_category": "Storage",
    })
}

fn confirmation_token(app: &TestApp, email: &str) -> String {
    let sent = app.mailer.sent();
    let message = sent
        .iter()
        .find(|m| m.kind == EmailKind::ConfirmEmail && m.to.as_ref() == email)
        .expect("confirmation email");
    let (_, tail) = message.body.split_once("token=").expect("link in body");
    tail.split_whitespace()
        .next()
        .expect("token text")
        .trim_end_matches(['"', '<', '>'])
        .to_owned()
}

#[actix_web::test]
async fn signup_to_enquiry_round_trip() {
    let app = TestApp::new();
    let admin = app.admin("root@example.com");
    let svc = http_service!(app).await;

    // Register and confirm the future seller.
    let (status, _) = call!(svc,
        test::TestRequest::post().uri("/api/v1/auth/signup").set_json(json!({
            "name": "Grace",
            "email": "Grace@Example.com",
            "password": PASSWORD,
            "address": "1 Dock Road",
        })),
    );
    assert_eq!(status, StatusCode::CREATED);

    let login = || {
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "grace@example.com", "password": PASSWORD}))
    };
    let (status, _) = call!(svc, login());
    assert_eq!(status, StatusCode::FORBIDDEN, "unconfirmed email blocks login");

    let token = confirmation_token(&app, "grace@example.com");
    let (status, _) = call!(svc,
        test::TestRequest::get().uri(&format!("/confirm?token={token}")),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, session) = call!(svc, login());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "USER");
    let user_id = session["user"]["id"].as_str().expect("id").to_owned();

    // A plain user cannot list products yet.
    let (status, _) = call!(svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, bearer(&session)))
            .set_json(crate_listing()),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Submit a document; an admin approves it.
    let (status, account) = call!(svc,
        test::TestRequest::post()
            .uri("/api/v1/uploads/verification-doc?filename=licence.pdf")
            .insert_header((AUTHORIZATION, bearer(&session)))
            .set_payload(b"%PDF-1.7".to_vec()),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["role"], "USER");

    let (status, promoted) = call!(svc,
        test::TestRequest::post()
            .uri(&format!("/api/v1/users/{user_id}/approve"))
            .insert_header((AUTHORIZATION, app.bearer(&admin))),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "SELLER");

    // The promotion only shows up in a fresh token.
    let (status, session) = call!(svc, login());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "SELLER");
    let seller = bearer(&session);

    let (status, product) = call!(svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, seller.clone()))
            .set_json(crate_listing()),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["isApproved"], 0);
    let product_id = product["id"].as_i64().expect("product id");

    let public = || test::TestRequest::get().uri("/api/v1/products");
    let (_, listed) = call!(svc, public());
    assert_eq!(listed, json!([]), "pending listings stay hidden");

    let (status, approved) = call!(svc,
        test::TestRequest::post()
            .uri(&format!("/api/v1/products/{product_id}/approve"))
            .insert_header((AUTHORIZATION, app.bearer(&admin))),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["isApproved"], 1);

    let (_, listed) = call!(svc, public());
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert!(
        app.mailer
            .sent()
            .iter()
            .any(|m| m.kind == EmailKind::ProductApproved && m.to.as_ref() == "grace@example.com")
    );

    // A buyer asks about it and the seller sees the enquiry.
    let buyer = app.verified_user("buyer@example.com").await;
    let (status, _) = call!(svc,
        test::TestRequest::post()
            .uri("/api/v1/enquiries")
            .insert_header((AUTHORIZATION, app.bearer(&buyer)))
            .set_json(json!({"productId": product_id, "message": "Do you ship?"})),
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, inbox) = call!(svc,
        test::TestRequest::get()
            .uri("/api/v1/enquiries/seller")
            .insert_header((AUTHORIZATION, seller.clone())),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox[0]["message"], "Do you ship?");
    assert_eq!(inbox[0]["userId"], buyer.id.to_string());

    let (_, ledger) = call!(svc,
        test::TestRequest::get()
            .uri("/api/v1/notifications")
            .insert_header((AUTHORIZATION, seller.clone())),
    );
    let kinds: Vec<&str> = ledger
        .as_array()
        .expect("ledger array")
        .iter()
        .filter_map(|entry| entry["type"].as_str())
        .collect();
    assert_eq!(kinds, ["PRODUCT_APPROVED", "PRODUCT_CREATED"]);

    // Deleting the account orphans, but keeps, the listing.
    let (status, _) = call!(svc,
        test::TestRequest::delete()
            .uri("/api/v1/auth")
            .insert_header((AUTHORIZATION, seller)),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, detail) = call!(svc,
        test::TestRequest::get().uri(&format!("/api/v1/products/{product_id}")),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["ownerDeleted"], true);
    assert_eq!(detail["sellerUserId"], Value::Null);

    let (status, _) = call!(svc, login());
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn tokens_outliving_their_account_cannot_list_products() {
    let app = TestApp::new();
    let seller = app.seller("gone@example.com").await;
    let token = app.bearer(&seller);
    let svc = http_service!(app).await;

    let (status, _) = call!(svc,
        test::TestRequest::delete()
            .uri("/api/v1/auth")
            .insert_header((AUTHORIZATION, token.clone())),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(svc,
        test::TestRequest::post()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, token))
            .set_json(crate_listing()),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (_, listed) = call!(svc,
        test::TestRequest::get()
            .uri("/api/v1/products")
            .insert_header((AUTHORIZATION, app.bearer(&app.admin("root@example.com")))),
    );
    assert_eq!(listed, json!([]));
}
