//! User directory: admin user listing and seller lookup.

use std::sync::Arc;

use crate::domain::ports::{ProductRepository, UserRepository};
use crate::domain::{
    Error, ModerationStatus, Principal, Product, ProductFilter, Role, UserAccount, UserId,
};

/// A seller account with its listings.
#[derive(Debug, Clone)]
pub struct SellerDirectoryEntry {
    pub account: UserAccount,
    pub products: Vec<Product>,
}

#[derive(Clone)]
pub struct DirectoryService {
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
}

impl DirectoryService {
    pub fn new(users: Arc<dyn UserRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { users, products }
    }

    /// Every account, newest first. Admin only.
    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<UserAccount>, Error> {
        principal.require_admin()?;
        Ok(self.users.list_accounts().await?)
    }

    /// Seller profile plus listings visible to `viewer`.
    pub async fn get_seller(
        &self,
        viewer: &Principal,
        seller: &UserId,
    ) -> Result<SellerDirectoryEntry, Error> {
        let account = self
            .users
            .find_account(seller)
            .await?
            .filter(|a| a.user.role == Role::Seller && a.seller.is_some())
            .ok_or_else(|| Error::not_found("Seller not found"))?;
        let privileged = viewer.is_admin() || viewer.user_id() == seller;
        let products = self
            .products
            .list(&ProductFilter::Seller {
                seller: seller.clone(),
                status: (!privileged).then_some(ModerationStatus::Approved),
            })
            .await?;
        Ok(SellerDirectoryEntry { account, products })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::user;
    use crate::domain::ports::{MockProductRepository, MockUserRepository};
    use crate::domain::{ErrorCode, SellerProfile};

    #[tokio::test]
    async fn listing_users_requires_admin() {
        let mut users = MockUserRepository::new();
        users.expect_list_accounts().times(0);
        let err = DirectoryService::new(Arc::new(users), Arc::new(MockProductRepository::new()))
            .list_users(&Principal::new(UserId::random(), Role::Seller))
            .await
            .expect_err("seller refused");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn plain_user_is_not_a_seller() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .return_once(|_| Ok(Some(UserAccount::plain(user(Role::User)))));

        let err = DirectoryService::new(Arc::new(users), Arc::new(MockProductRepository::new()))
            .get_seller(&Principal::new(UserId::random(), Role::User), &UserId::random())
            .await
            .expect_err("not a seller");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn strangers_see_only_approved_listings() {
        let seller = user(Role::Seller);
        let seller_id = seller.id.clone();
        let account = UserAccount {
            seller: Some(SellerProfile {
                user_id: seller.id.clone(),
                business_desc: "Pallets".into(),
                business_type: "Wholesale".into(),
                verification_doc_url: None,
            }),
            admin: None,
            user: seller,
        };
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .return_once(move |_| Ok(Some(account)));
        let expected = ProductFilter::Seller {
            seller: seller_id.clone(),
            status: Some(ModerationStatus::Approved),
        };
        let mut products = MockProductRepository::new();
        products
            .expect_list()
            .withf(move |f| *f == expected)
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let entry = DirectoryService::new(Arc::new(users), Arc::new(products))
            .get_seller(&Principal::new(UserId::random(), Role::User), &seller_id)
            .await
            .expect("seller found");
        assert!(entry.products.is_empty());
    }
}
