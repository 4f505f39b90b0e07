//! Upload use cases: profile pictures, product images and verification
//! documents.
//!
//! Bytes are written to the object store first; the database row pointing
//! at them is written afterwards. A failed row write leaves an orphaned
//! object, never a dangling URL.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ObjectStore, ProductRepository, SellerProfileChange, UserRepository};
use crate::domain::{
    Error, ModerationStatus, ObjectKey, Principal, ProductId, ProductImage, ProfileUpdate,
    RoleState, RoleTransitionError, UploadBody, UploadFilename, UserAccount,
};

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            users,
            products,
            clock,
        }
    }

    /// Store a profile picture and point the caller's profile at it.
    pub async fn profile_picture(
        &self,
        principal: &Principal,
        filename: &UploadFilename,
        body: UploadBody,
    ) -> Result<String, Error> {
        let key = ObjectKey::profile_picture(
            principal.user_id(),
            self.clock.utc().timestamp_millis(),
            filename,
        );
        let url = self.store.put(&key, body.into_bytes()).await?;
        self.users
            .update_profile(
                principal.user_id(),
                &ProfileUpdate {
                    profile_pic_url: Some(url.clone()),
                    ..ProfileUpdate::default()
                },
            )
            .await?;
        info!(user_id = %principal.user_id(), %key, "profile picture stored");
        Ok(url)
    }

    /// Append an image to a product the caller owns.
    pub async fn product_image(
        &self,
        principal: &Principal,
        product_id: ProductId,
        body: UploadBody,
    ) -> Result<ProductImage, Error> {
        let product = self
            .products
            .find(product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product not found"))?;
        if !product.is_owned_by(principal.user_id()) {
            return Err(Error::forbidden("You can only modify your own products"));
        }
        if product.status == ModerationStatus::Deleted {
            return Err(Error::conflict("Product has been deleted"));
        }
        let index = product.images.len();
        let key = ObjectKey::product_image(principal.user_id(), product_id, index);
        let url = self.store.put(&key, body.into_bytes()).await?;
        let image = ProductImage {
            url,
            position: i32::try_from(index)
                .map_err(|_| Error::invalid_request("too many images for one product"))?,
        };
        self.products.add_image(product_id, &image).await?;
        info!(product_id = %product_id, %key, "product image stored");
        Ok(image)
    }

    /// Store a verification document and record it on the seller profile.
    ///
    /// A plain user stays unverified until an admin approves the document;
    /// a seller only has the document URL replaced.
    pub async fn verification_document(
        &self,
        principal: &Principal,
        filename: &UploadFilename,
        body: UploadBody,
    ) -> Result<UserAccount, Error> {
        let user = self
            .users
            .find_by_id(principal.user_id())
            .await?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let state = RoleState::of(&user)
            .submit_document()
            .map_err(|err| match err {
                RoleTransitionError::AdministratorCannotSell => Error::forbidden(err.to_string()),
            })?;
        let key = ObjectKey::verification_document(
            &user.id,
            self.clock.utc().timestamp_millis(),
            filename,
        );
        let url = self.store.put(&key, body.into_bytes()).await?;
        let account = self
            .users
            .apply_role_state(
                &user.id,
                state,
                SellerProfileChange::Document {
                    verification_doc_url: url,
                },
            )
            .await?;
        info!(user_id = %user.id, %key, "verification document stored");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{fixture_clock, product, user};
    use crate::domain::ports::{MockObjectStore, MockProductRepository, MockUserRepository};
    use crate::domain::{ErrorCode, Role, UserId};

    fn body() -> UploadBody {
        UploadBody::new(vec![0xFF, 0xD8]).expect("non-empty")
    }

    fn service(
        store: MockObjectStore,
        users: MockUserRepository,
        products: MockProductRepository,
    ) -> UploadService {
        UploadService::new(
            Arc::new(store),
            Arc::new(users),
            Arc::new(products),
            fixture_clock(),
        )
    }

    #[tokio::test]
    async fn product_image_index_follows_existing_images() {
        let owner = UserId::random();
        let mut stored = product(6, &owner, ModerationStatus::Approved);
        stored.images.push(ProductImage {
            url: "memory://0".into(),
            position: 0,
        });
        let expected_key = format!("seller/{owner}/6/images/1.jpg");
        let mut products = MockProductRepository::new();
        products
            .expect_find()
            .return_once(move |_| Ok(Some(stored)));
        products
            .expect_add_image()
            .withf(|_, image| image.position == 1)
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .withf(move |key, _| key.as_ref() == expected_key)
            .times(1)
            .return_once(|key, _| Ok(format!("memory://{key}")));

        let image = service(store, MockUserRepository::new(), products)
            .product_image(
                &Principal::new(owner, Role::Seller),
                ProductId::new(6).expect("id"),
                body(),
            )
            .await
            .expect("stored");
        assert_eq!(image.position, 1);
    }

    #[tokio::test]
    async fn product_image_for_foreign_product_is_forbidden() {
        let mut products = MockProductRepository::new();
        products.expect_find().return_once(|_| {
            Ok(Some(product(6, &UserId::random(), ModerationStatus::Approved)))
        });
        let mut store = MockObjectStore::new();
        store.expect_put().times(0);

        let err = service(store, MockUserRepository::new(), products)
            .product_image(
                &Principal::new(UserId::random(), Role::Seller),
                ProductId::new(6).expect("id"),
                body(),
            )
            .await
            .expect_err("not the owner");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn verification_upload_keeps_user_pending() {
        let plain = user(Role::User);
        let id = plain.id.clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(plain)));
        users
            .expect_apply_role_state()
            .withf(|_, state, change| {
                state.role() == Role::User
                    && !state.is_document_verified()
                    && matches!(change, SellerProfileChange::Document { .. })
            })
            .times(1)
            .return_once(|_, _, _| Ok(UserAccount::plain(user(Role::User))));
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .withf(|key, _| key.as_ref().starts_with("verification-docs/"))
            .times(1)
            .return_once(|key, _| Ok(format!("memory://{key}")));

        let name = UploadFilename::new("licence.pdf").expect("valid name");
        service(store, users, MockProductRepository::new())
            .verification_document(&Principal::new(id, Role::User), &name, body())
            .await
            .expect("document stored");
    }

    #[tokio::test]
    async fn admins_cannot_upload_verification_documents() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Ok(Some(user(Role::Admin))));
        let mut store = MockObjectStore::new();
        store.expect_put().times(0);

        let name = UploadFilename::new("licence.pdf").expect("valid name");
        let err = service(store, users, MockProductRepository::new())
            .verification_document(&Principal::new(UserId::random(), Role::Admin), &name, body())
            .await
            .expect_err("admin refused");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn profile_picture_updates_profile_url() {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .withf(|key, _| key.as_ref().ends_with("_1741356300000_me.png"))
            .times(1)
            .return_once(|key, _| Ok(format!("memory://{key}")));
        let mut users = MockUserRepository::new();
        users
            .expect_update_profile()
            .withf(|_, update| {
                update
                    .profile_pic_url
                    .as_deref()
                    .is_some_and(|url| url.starts_with("memory://profile-pics/"))
            })
            .times(1)
            .return_once(|_, _| Ok(UserAccount::plain(user(Role::User))));

        let name = UploadFilename::new("me.png").expect("valid name");
        let url = service(store, users, MockProductRepository::new())
            .profile_picture(&Principal::new(UserId::random(), Role::User), &name, body())
            .await
            .expect("stored");
        assert!(url.ends_with("me.png"));
    }
}
