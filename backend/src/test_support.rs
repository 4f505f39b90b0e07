//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).
//!
//! [`TestApp`] wires the HTTP state over the in-memory store with
//! deterministic doubles: reversible password digests, unsigned
//! `ROLE.uuid` tokens, a recording mailer and an in-memory object store.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    FixtureMailer, FixtureObjectStore, FixturePasswordHasher, FixtureTokenService,
    SellerProfileChange, TokenService, UserRepository,
};
use crate::domain::{
    AdminProfile, EmailAddress, EmailLinks, NewUser, PasswordDigest, Role, RoleState,
    TokenClaims, User, UserAccount, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;

/// Password every helper-created account signs in with.
pub const TEST_PASSWORD: &str = "correct horse";

/// Fully wired HTTP state plus handles on its doubles.
#[derive(Clone)]
pub struct TestApp {
    pub state: HttpState,
    pub store: InMemoryStore,
    pub mailer: FixtureMailer,
    pub objects: FixtureObjectStore,
}

impl TestApp {
    /// Wire a fresh application over empty tables.
    pub fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let store = InMemoryStore::new(Arc::clone(&clock));
        let mailer = FixtureMailer::default();
        let objects = FixtureObjectStore::default();
        let shared = Arc::new(store.clone());
        let state = HttpState::new(
            HttpStatePorts {
                users: shared.clone(),
                products: shared.clone(),
                notifications: shared.clone(),
                enquiries: shared.clone(),
                chat_leads: shared,
                hasher: Arc::new(FixturePasswordHasher),
                tokens: Arc::new(FixtureTokenService),
                mailer: Arc::new(mailer.clone()),
                objects: Arc::new(objects.clone()),
                clock,
            },
            EmailLinks {
                public_base_url: "http://api.test".into(),
                frontend_url: "http://shop.test".into(),
            },
        );
        Self {
            state,
            store,
            mailer,
            objects,
        }
    }

    /// State wrapped for `App::app_data`.
    pub fn data(&self) -> web::Data<HttpState> {
        web::Data::new(self.state.clone())
    }

    /// Bearer token for `user` under its current role.
    pub fn token_for(&self, id: &UserId, role: Role) -> String {
        FixtureTokenService
            .issue(&TokenClaims {
                subject: id.clone(),
                role,
            })
            .unwrap_or_else(|err| panic!("fixture token: {err}"))
    }

    /// `Authorization` header value for `user`.
    pub fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.token_for(&user.id, user.role))
    }

    /// A confirmed plain user signed up with [`TEST_PASSWORD`].
    pub async fn verified_user(&self, email: &str) -> User {
        let user = UserRepository::create(
            &self.store,
            &NewUser {
                name: "Test User".into(),
                email: EmailAddress::new(email).unwrap_or_else(|err| panic!("email: {err}")),
                password_digest: PasswordDigest::new(format!("fixture${TEST_PASSWORD}")),
                address: "1 Test Street".into(),
                country_code: None,
                phone_number: None,
            },
        )
        .await
        .unwrap_or_else(|err| panic!("create user: {err}"));
        self.store
            .mark_email_verified(&user.id)
            .await
            .unwrap_or_else(|err| panic!("verify email: {err}"));
        User {
            is_email_verified: true,
            ..user
        }
    }

    /// A confirmed, document-verified seller with a business profile.
    pub async fn seller(&self, email: &str) -> User {
        let user = self.verified_user(email).await;
        let promoted = RoleState::of(&user)
            .promote_to_seller()
            .unwrap_or_else(|err| panic!("promote: {err}"));
        self.store
            .apply_role_state(
                &user.id,
                promoted,
                SellerProfileChange::Replace {
                    business_desc: "Reclaimed materials".into(),
                    business_type: "Wholesale".into(),
                    verification_doc_url: "memory://verification-docs/licence.pdf".into(),
                },
            )
            .await
            .unwrap_or_else(|err| panic!("apply role: {err}"))
            .user
    }

    /// A confirmed administrator, provisioned directly in storage.
    pub fn admin(&self, email: &str) -> User {
        let id = UserId::random();
        let user = User {
            id: id.clone(),
            name: "Test Admin".into(),
            email: EmailAddress::new(email).unwrap_or_else(|err| panic!("email: {err}")),
            password_digest: PasswordDigest::new(format!("fixture${TEST_PASSWORD}")),
            role: Role::Admin,
            is_email_verified: true,
            is_document_verified: false,
            address: "1 Admin Row".into(),
            country_code: None,
            phone_number: None,
            profile_pic_url: None,
            created_at: Utc::now(),
        };
        self.store
            .seed_account(UserAccount {
                user: user.clone(),
                seller: None,
                admin: Some(AdminProfile {
                    user_id: id,
                    permissions: vec!["moderate_products".into()],
                }),
            })
            .unwrap_or_else(|err| panic!("seed admin: {err}"));
        user
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialise the full HTTP surface over a [`TestApp`]'s state.
///
/// Expands to an `actix_web::test::init_service` call, so it must be awaited
/// inside an async test.
#[macro_export]
macro_rules! http_service {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($app.data())
                .wrap($crate::Trace)
                .configure($crate::inbound::http::routes::configure),
        )
    };
}
