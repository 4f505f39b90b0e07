//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    EmailAddress, EmailLinks, ModerationStatus, PasswordDigest, Product, ProductDetails,
    ProductId, Role, User, UserId,
};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn links() -> EmailLinks {
    EmailLinks {
        public_base_url: "https://api.example.com".into(),
        frontend_url: "https://shop.example.com".into(),
    }
}

pub(crate) fn user(role: Role) -> User {
    let id = UserId::random();
    User {
        email: EmailAddress::new(format!("{}@example.com", id.as_uuid().simple()))
            .expect("valid email"),
        id,
        name: "Ada".into(),
        password_digest: PasswordDigest::new("fixture$secret"),
        role,
        is_email_verified: true,
        is_document_verified: role == Role::Seller,
        address: "1 Analytical Way".into(),
        country_code: Some("HR".into()),
        phone_number: None,
        profile_pic_url: None,
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn details(name: &str) -> ProductDetails {
    ProductDetails {
        name: name.into(),
        price: 12.5,
        currency: "EUR".into(),
        quantity: 50,
        unit: "PCS".into(),
        category: "Wood".into(),
        country: None,
        color: None,
        source_material: None,
        batch_size: None,
        minimum_order_quantity: None,
        application: None,
        description: None,
        additional_notes: None,
    }
}

pub(crate) fn product(id: i64, owner: &UserId, status: ModerationStatus) -> Product {
    Product {
        id: ProductId::new(id).expect("positive id"),
        seller_user_id: Some(owner.clone()),
        owner_deleted: false,
        details: details("Recycled Pallet"),
        status,
        deleted_at: None,
        created_at: fixture_timestamp(),
        images: Vec::new(),
    }
}
