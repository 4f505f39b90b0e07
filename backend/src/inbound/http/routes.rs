//! Route table for the marketplace API.
//!
//! Everything except the e-mail confirmation link lives under `/api/v1`.
//! Health probes and Swagger UI are mounted by the server because they do
//! not need [`HttpState`](crate::inbound::http::state::HttpState).

use actix_web::web;

use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::{accounts, enquiries, notifications, products, uploads, users};

/// Register extractor configuration and every API handler.
///
/// Literal product sub-paths (`pending`, `rejected`, `seller/..`,
/// `except/..`) are registered ahead of `/products/{product_id}` so the
/// id matcher never swallows them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .app_data(web::PayloadConfig::new(uploads::MAX_UPLOAD_BYTES));

    let api = web::scope("/api/v1")
        .service(accounts::signup)
        .service(accounts::login)
        .service(accounts::update_profile)
        .service(accounts::verify)
        .service(accounts::change_password)
        .service(accounts::delete_account)
        .service(users::list_users)
        .service(users::approve_document)
        .service(users::get_seller)
        .service(products::list_products)
        .service(products::list_pending)
        .service(products::list_rejected)
        .service(products::list_by_seller)
        .service(products::list_except_seller)
        .service(products::create_product)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(products::approve_product)
        .service(products::reject_product)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(enquiries::send_enquiry)
        .service(enquiries::list_enquiries)
        .service(enquiries::list_by_product)
        .service(enquiries::list_by_user)
        .service(enquiries::list_by_seller)
        .service(enquiries::create_chat_lead)
        .service(enquiries::list_chat_leads)
        .service(uploads::profile_picture)
        .service(uploads::product_image)
        .service(uploads::verification_document);

    cfg.service(api).service(accounts::confirm);
}

#[cfg(test)]
mod tests {
    use crate::http_service;
    use crate::test_support::TestApp;
    use crate::TRACE_ID_HEADER;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test;
    use rstest::rstest;

    #[actix_web::test]
    async fn unknown_routes_are_not_found() {
        let app = TestApp::new();
        let svc = http_service!(app).await;
        let req = test::TestRequest::get().uri("/api/v1/nowhere").to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case("/api/v1/products/pending")]
    #[case("/api/v1/products/rejected")]
    #[actix_web::test]
    async fn literal_product_paths_win_over_ids(#[case] uri: &str) {
        let app = TestApp::new();
        let admin = app.admin("root@example.com");
        let svc = http_service!(app).await;
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((AUTHORIZATION, app.bearer(&admin)))
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn responses_carry_a_trace_id() {
        let app = TestApp::new();
        let svc = http_service!(app).await;
        let req = test::TestRequest::get().uri("/api/v1/products").to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(TRACE_ID_HEADER));
    }

    #[actix_web::test]
    async fn confirmation_link_sits_outside_the_api_scope() {
        let app = TestApp::new();
        let svc = http_service!(app).await;
        let req = test::TestRequest::get()
            .uri("/confirm?token=nope")
            .to_request();
        let res = test::call_service(&svc, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
