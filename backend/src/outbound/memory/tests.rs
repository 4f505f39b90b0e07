//! Behavioural coverage for the in-memory repositories.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixtures::{details, fixture_clock};
use crate::domain::ports::{
    ChatLeadRepository, EnquiryRepository, NotificationRepository, ProductPersistenceError,
    ProductRepository, SellerProfileChange, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, EnquiryFilter, LedgerEntry, ModerationStatus, NewChatLead, NewEnquiry,
    NewProduct, NewUser, NotificationScope, NotificationType, PasswordDigest, ProductFilter,
    ProductId, ProductImage, ProductTransition, Role, RoleState,
};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new(fixture_clock())
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Grace".into(),
        email: EmailAddress::new(email).expect("valid email"),
        password_digest: PasswordDigest::new("fixture$pw"),
        address: "3 Harbour Row".into(),
        country_code: None,
        phone_number: None,
    }
}

async fn seller(store: &InMemoryStore, email: &str) -> User {
    let user = UserRepository::create(store, &new_user(email))
        .await
        .expect("user created");
    let promoted = RoleState::of(&user).promote_to_seller().expect("promotable");
    store
        .apply_role_state(&user.id, promoted, SellerProfileChange::EnsureExists)
        .await
        .expect("promoted")
        .user
}

async fn listing(store: &InMemoryStore, owner: &User, name: &str) -> Product {
    ProductRepository::create(
        store,
        &NewProduct {
            seller_user_id: owner.id.clone(),
            details: details(name),
        },
    )
    .await
    .expect("product created")
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected(store: InMemoryStore) {
    UserRepository::create(&store, &new_user("grace@example.com"))
        .await
        .expect("first signup");
    let err = UserRepository::create(&store, &new_user("grace@example.com"))
        .await
        .expect_err("duplicate");
    assert_eq!(err, UserPersistenceError::duplicate_email("grace@example.com"));
}

#[rstest]
#[tokio::test]
async fn new_users_start_unverified(store: InMemoryStore) {
    let user = UserRepository::create(&store, &new_user("grace@example.com"))
        .await
        .expect("created");
    assert_eq!(user.role, Role::User);
    assert!(!user.is_email_verified);
    assert!(!user.is_document_verified);
}

#[rstest]
#[tokio::test]
async fn document_change_keeps_business_fields(store: InMemoryStore) {
    let user = UserRepository::create(&store, &new_user("grace@example.com"))
        .await
        .expect("created");
    store
        .apply_role_state(
            &user.id,
            RoleState::of(&user),
            SellerProfileChange::Replace {
                business_desc: "Reclaimed timber".into(),
                business_type: "Wholesale".into(),
                verification_doc_url: "memory://a.pdf".into(),
            },
        )
        .await
        .expect("replace");
    let account = store
        .apply_role_state(
            &user.id,
            RoleState::of(&user),
            SellerProfileChange::Document {
                verification_doc_url: "memory://b.pdf".into(),
            },
        )
        .await
        .expect("document");
    let profile = account.seller.expect("seller profile");
    assert_eq!(profile.business_desc, "Reclaimed timber");
    assert_eq!(profile.verification_doc_url.as_deref(), Some("memory://b.pdf"));
}

#[rstest]
#[tokio::test]
async fn product_creation_appends_created_entry(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let product = listing(&store, &owner, "Pallet").await;

    let entries = NotificationRepository::list(&store, &NotificationScope::User(owner.id.clone()))
        .await
        .expect("ledger");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, NotificationType::ProductCreated);
    assert_eq!(entries[0].product_id, Some(product.id));
    assert_eq!(product.status, ModerationStatus::Pending);
}

#[rstest]
#[tokio::test]
async fn transition_on_missing_product_leaves_ledger_untouched(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let missing = ProductId::new(99).expect("id");
    let err = store
        .apply_transition(&ProductTransition {
            product_id: missing,
            status: ModerationStatus::Approved,
            details: None,
            deleted_at: None,
            ledger: LedgerEntry {
                user_id: owner.id.clone(),
                product_id: Some(missing),
                kind: NotificationType::ProductApproved,
            },
        })
        .await
        .expect_err("missing product");
    assert!(matches!(err, ProductPersistenceError::NotFound { .. }));

    let entries = NotificationRepository::list(&store, &NotificationScope::Everyone)
        .await
        .expect("ledger");
    assert!(entries.is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_a_seller_orphans_their_products(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let product = listing(&store, &owner, "Pallet").await;

    store.delete_account(&owner.id).await.expect("deleted");

    let kept = ProductRepository::find(&store, product.id)
        .await
        .expect("lookup")
        .expect("product retained");
    assert!(kept.seller_user_id.is_none());
    assert!(kept.owner_deleted);
    let ledger = NotificationRepository::list(&store, &NotificationScope::User(owner.id))
        .await
        .expect("ledger");
    assert_eq!(ledger.len(), 1, "ledger entries survive account deletion");
}

#[rstest]
#[tokio::test]
async fn except_seller_listing_hides_own_and_unapproved(store: InMemoryStore) {
    let me = seller(&store, "me@example.com").await;
    let other = seller(&store, "other@example.com").await;
    let mine = listing(&store, &me, "Mine").await;
    let theirs = listing(&store, &other, "Theirs").await;
    let pending = listing(&store, &other, "Pending").await;
    for product in [&mine, &theirs] {
        store
            .apply_transition(&ProductTransition {
                product_id: product.id,
                status: ModerationStatus::Approved,
                details: None,
                deleted_at: None,
                ledger: LedgerEntry {
                    user_id: product.seller_user_id.clone().expect("owner"),
                    product_id: Some(product.id),
                    kind: NotificationType::ProductApproved,
                },
            })
            .await
            .expect("approved");
    }

    let listed = ProductRepository::list(&store, &ProductFilter::ApprovedExceptSeller(me.id))
        .await
        .expect("listing");
    let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![theirs.id]);
    assert!(!ids.contains(&pending.id));
}

#[rstest]
#[tokio::test]
async fn images_are_kept_in_position_order(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let product = listing(&store, &owner, "Pallet").await;
    for position in [1, 0] {
        store
            .add_image(
                product.id,
                &ProductImage {
                    url: format!("memory://{position}"),
                    position,
                },
            )
            .await
            .expect("image");
    }
    let stored = ProductRepository::find(&store, product.id)
        .await
        .expect("lookup")
        .expect("product");
    let positions: Vec<_> = stored.images.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[rstest]
#[tokio::test]
async fn mark_all_read_only_touches_scope(store: InMemoryStore) {
    let a = seller(&store, "a@example.com").await;
    let b = seller(&store, "b@example.com").await;
    listing(&store, &a, "A1").await;
    listing(&store, &a, "A2").await;
    listing(&store, &b, "B1").await;

    let changed = store
        .mark_all_read(&NotificationScope::User(a.id.clone()))
        .await
        .expect("marked");
    assert_eq!(changed, 2);
    let again = store
        .mark_all_read(&NotificationScope::User(a.id))
        .await
        .expect("marked");
    assert_eq!(again, 0);
    let unread_b = NotificationRepository::list(&store, &NotificationScope::User(b.id))
        .await
        .expect("ledger");
    assert!(unread_b.iter().all(|entry| !entry.is_read));
}

#[rstest]
#[tokio::test]
async fn seller_enquiries_follow_product_ownership(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let other = seller(&store, "other@example.com").await;
    let buyer = UserRepository::create(&store, &new_user("buyer@example.com"))
        .await
        .expect("buyer");
    let product = listing(&store, &owner, "Pallet").await;
    EnquiryRepository::create(
        &store,
        &NewEnquiry::try_new(buyer.id.clone(), Some(product.id), Some("Price for 200?"))
            .expect("valid"),
    )
    .await
    .expect("enquiry");

    let for_owner = EnquiryRepository::list(&store, &EnquiryFilter::Seller(owner.id))
        .await
        .expect("owner listing");
    let for_other = EnquiryRepository::list(&store, &EnquiryFilter::Seller(other.id))
        .await
        .expect("other listing");
    assert_eq!(for_owner.len(), 1);
    assert!(for_other.is_empty());
}

#[rstest]
#[tokio::test]
async fn chat_leads_list_newest_first(store: InMemoryStore) {
    for company in ["First Co", "Second Co"] {
        ChatLeadRepository::create(
            &store,
            &NewChatLead::try_new(Some(company), Some("Lin"), Some("+385 1 234")).expect("valid"),
        )
        .await
        .expect("lead");
    }
    let leads = ChatLeadRepository::list(&store).await.expect("leads");
    let names: Vec<_> = leads.iter().map(|l| l.company_name.as_str()).collect();
    assert_eq!(names, vec!["Second Co", "First Co"]);
}

#[rstest]
#[tokio::test]
async fn transitions_on_deleted_products_are_refused(store: InMemoryStore) {
    let owner = seller(&store, "owner@example.com").await;
    let product = listing(&store, &owner, "Pallet").await;
    let transition = |status, kind| ProductTransition {
        product_id: product.id,
        status,
        details: None,
        deleted_at: None,
        ledger: LedgerEntry {
            user_id: owner.id.clone(),
            product_id: Some(product.id),
            kind,
        },
    };
    store
        .apply_transition(&transition(
            ModerationStatus::Deleted,
            NotificationType::ProductDeleted,
        ))
        .await
        .expect("delete applies");

    let err = store
        .apply_transition(&transition(
            ModerationStatus::Approved,
            NotificationType::ProductApproved,
        ))
        .await
        .expect_err("deleted is terminal");
    assert_eq!(err, ProductPersistenceError::already_deleted(product.id.get()));

    let kinds: Vec<_> = NotificationRepository::list(&store, &NotificationScope::Everyone)
        .await
        .expect("ledger")
        .into_iter()
        .map(|entry| entry.kind)
        .collect();
    assert_eq!(
        kinds,
        [NotificationType::ProductDeleted, NotificationType::ProductCreated]
    );
}

#[rstest]
#[tokio::test]
async fn products_need_an_existing_owner(store: InMemoryStore) {
    let ghost = UserId::random();
    let err = ProductRepository::create(
        &store,
        &NewProduct {
            seller_user_id: ghost.clone(),
            details: details("Pallet"),
        },
    )
    .await
    .expect_err("unknown owner");
    assert_eq!(err, ProductPersistenceError::owner_missing(ghost.to_string()));
    assert!(
        ProductRepository::list(&store, &ProductFilter::All)
            .await
            .expect("list")
            .is_empty()
    );
}

/// Serves one stale read from `find`, as if another request's write landed
/// between this request's read and its write.
struct StaleFind {
    inner: InMemoryStore,
    stale: std::sync::Mutex<Option<Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for StaleFind {
    async fn create(&self, product: &NewProduct) -> Result<Product, ProductPersistenceError> {
        ProductRepository::create(&self.inner, product).await
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError> {
        let stale = self.stale.lock().ok().and_then(|mut slot| slot.take());
        match stale {
            Some(product) => Ok(Some(product)),
            None => ProductRepository::find(&self.inner, id).await,
        }
    }

    async fn apply_transition(
        &self,
        transition: &ProductTransition,
    ) -> Result<Product, ProductPersistenceError> {
        self.inner.apply_transition(transition).await
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        ProductRepository::list(&self.inner, filter).await
    }

    async fn add_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<(), ProductPersistenceError> {
        self.inner.add_image(id, image).await
    }
}

#[rstest]
#[case(Role::Admin)]
#[case(Role::Seller)]
#[tokio::test]
async fn delete_landing_after_a_read_still_wins(store: InMemoryStore, #[case] actor: Role) {
    use std::sync::Arc;

    use crate::domain::fixtures::links;
    use crate::domain::ports::FixtureMailer;
    use crate::domain::{ErrorCode, Principal, ProductService};

    let owner = seller(&store, "owner@example.com").await;
    let pending = listing(&store, &owner, "Pallet").await;
    let products = Arc::new(StaleFind {
        inner: store.clone(),
        stale: std::sync::Mutex::new(Some(pending.clone())),
    });
    let service = ProductService::new(
        products,
        Arc::new(store.clone()),
        Arc::new(FixtureMailer::default()),
        fixture_clock(),
        links(),
    );
    let owner_principal = Principal::new(owner.id.clone(), Role::Seller);

    // The owner's delete commits after the stale PENDING snapshot was taken.
    let direct = ProductService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(FixtureMailer::default()),
        fixture_clock(),
        links(),
    );
    direct
        .delete(&owner_principal, pending.id)
        .await
        .expect("owner delete");

    let err = match actor {
        Role::Admin => service
            .approve(&Principal::new(UserId::random(), Role::Admin), pending.id)
            .await
            .expect_err("approve after delete"),
        _ => service
            .update(&owner_principal, pending.id, details("Renamed"))
            .await
            .expect_err("edit after delete"),
    };
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "Product has been deleted");

    let stored = ProductRepository::find(&store, pending.id)
        .await
        .expect("lookup")
        .expect("retained");
    assert_eq!(stored.status, ModerationStatus::Deleted);
    assert!(stored.deleted_at.is_some());
    assert_eq!(stored.details.name, "Pallet");
}
