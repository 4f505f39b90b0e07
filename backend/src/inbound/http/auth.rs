//! Bearer-token extractors.
//!
//! [`Authenticated`] rejects requests without a valid token (401);
//! [`MaybeAuthenticated`] treats a missing or unusable token as anonymous,
//! for public endpoints that widen their results for privileged callers.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, Principal};

use super::state::HttpState;

const BEARER: &str = "bearer";

/// Raw token from `Authorization: Bearer <token>`; the scheme is matched
/// case-insensitively.
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("Malformed authorization header"))?;
    let (scheme, token) = raw
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("Malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER) || token.is_empty() {
        return Err(Error::unauthorized("Malformed authorization header"));
    }
    Ok(Some(token))
}

fn principal_for(req: &HttpRequest, token: &str) -> Result<Principal, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let claims = state.tokens.validate(token)?;
    Ok(Principal::from(claims))
}

/// Principal of a request that must carry a valid bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = bearer_token(req).and_then(|token| {
            let token = token.ok_or_else(|| Error::unauthorized("Authorization token missing"))?;
            principal_for(req, token).map(Self)
        });
        ready(result)
    }
}

/// Principal of a request on a public endpoint, if it presented one.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Principal>);

impl MaybeAuthenticated {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let principal = match bearer_token(req) {
            Ok(Some(token)) => match principal_for(req, token) {
                Ok(principal) => Some(principal),
                Err(err) => {
                    debug!(error = %err, "optional bearer token ignored");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                debug!(error = %err, "optional authorization header ignored");
                None
            }
        };
        ready(Ok(Self(principal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureTokenService, TokenService};
    use crate::domain::{Role, TokenClaims, UserId};
    use crate::inbound::http::test_utils::fixture_state;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    fn token(role: Role) -> (UserId, String) {
        let subject = UserId::random();
        let token = FixtureTokenService
            .issue(&TokenClaims {
                subject: subject.clone(),
                role,
            })
            .expect("token");
        (subject, token)
    }

    async fn whoami(auth: Authenticated) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{}", auth.0.role(), auth.0.user_id()))
    }

    async fn maybe(auth: MaybeAuthenticated) -> HttpResponse {
        match auth.principal() {
            Some(p) => HttpResponse::Ok().body(p.role().to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(fixture_state().state))
                    .route("/me", web::get().to(whoami))
                    .route("/maybe", web::get().to(maybe)),
            )
            .await
        };
    }

    #[rstest]
    #[case("Bearer")]
    #[case("bearer")]
    #[actix_web::test]
    async fn valid_token_yields_principal(#[case] scheme: &str) {
        let app = app!();
        let (subject, token) = token(Role::Seller);
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION, format!("{scheme} {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, format!("SELLER:{subject}").as_bytes());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer"))]
    #[case(Some("Basic dXNlcjpwdw=="))]
    #[case(Some("Bearer USER.not-a-uuid"))]
    #[actix_web::test]
    async fn missing_or_invalid_token_is_unauthorized(#[case] header: Option<&str>) {
        let app = app!();
        let mut req = test::TestRequest::get().uri("/me");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(None, "anonymous")]
    #[case(Some("Bearer garbage"), "anonymous")]
    #[actix_web::test]
    async fn optional_extractor_never_rejects(
        #[case] header: Option<&str>,
        #[case] expected: &str,
    ) {
        let app = app!();
        let mut req = test::TestRequest::get().uri("/maybe");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let body = test::call_and_read_body(&app, req.to_request()).await;
        assert_eq!(body, expected.as_bytes());
    }

    #[actix_web::test]
    async fn optional_extractor_sees_admins() {
        let app = app!();
        let (_, token) = token(Role::Admin);
        let req = test::TestRequest::get()
            .uri("/maybe")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "ADMIN".as_bytes());
    }
}
