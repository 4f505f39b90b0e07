//! Product moderation use cases.
//!
//! Each transition is validated against [`ModerationStatus::apply`], then
//! handed to the repository together with the ledger entry it produces so
//! both land in one transaction. The owner email is dispatched afterwards.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{Mailer, ProductRepository, UserRepository};
use crate::domain::{
    EmailKind, EmailLinks, Error, LedgerEntry, ModerationAction, ModerationError,
    ModerationStatus, NewProduct, Principal, Product, ProductDetails, ProductFilter, ProductId,
    ProductTransition, Role, User, UserId, product_event_email,
};

/// A product together with its (possibly deleted) owner.
#[derive(Debug, Clone)]
pub struct ProductWithOwner {
    pub product: Product,
    pub owner: Option<User>,
}

/// Product lifecycle and listing use cases.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    links: EmailLinks,
}

/// A token whose subject has since deleted their account.
fn account_gone() -> Error {
    Error::unauthorized("Account no longer exists")
}

fn moderation_error(err: ModerationError) -> Error {
    match err {
        ModerationError::AlreadyDeleted => Error::conflict("Product has been deleted"),
    }
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        links: EmailLinks,
    ) -> Self {
        Self {
            products,
            users,
            mailer,
            clock,
            links,
        }
    }

    async fn load(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Product not found"))
    }

    fn require_owner(principal: &Principal, product: &Product) -> Result<(), Error> {
        if product.is_owned_by(principal.user_id()) {
            Ok(())
        } else {
            Err(Error::forbidden("You can only modify your own products"))
        }
    }

    /// Look up the recipient and dispatch. Failures are logged, never
    /// returned.
    async fn notify(&self, kind: EmailKind, recipient: &UserId, product: &Product) {
        match self.users.find_by_id(recipient).await {
            Ok(Some(user)) => self.mailer.dispatch(product_event_email(
                kind,
                &user,
                product,
                &self.links,
                self.clock.utc(),
            )),
            Ok(None) => warn!(
                user_id = %recipient,
                product_id = %product.id,
                "email recipient no longer exists"
            ),
            Err(err) => warn!(
                user_id = %recipient,
                product_id = %product.id,
                error = %err,
                "failed to resolve email recipient"
            ),
        }
    }

    async fn transition(
        &self,
        product: &Product,
        action: ModerationAction,
        recipient: UserId,
        details: Option<ProductDetails>,
    ) -> Result<Product, Error> {
        let status = product.status.apply(action).map_err(moderation_error)?;
        let deleted_at = (action == ModerationAction::Delete).then(|| self.clock.utc());
        let updated = self
            .products
            .apply_transition(&ProductTransition {
                product_id: product.id,
                status,
                details,
                deleted_at,
                ledger: LedgerEntry {
                    user_id: recipient,
                    product_id: Some(product.id),
                    kind: action.notification_type(),
                },
            })
            .await?;
        info!(
            product_id = %updated.id,
            from = product.status.code(),
            to = updated.status.code(),
            "product status changed"
        );
        Ok(updated)
    }

    /// Create a PENDING listing owned by the caller.
    pub async fn create(
        &self,
        principal: &Principal,
        details: ProductDetails,
    ) -> Result<Product, Error> {
        principal.require_role(&[Role::Seller, Role::Admin])?;
        let owner = self
            .users
            .find_by_id(principal.user_id())
            .await?
            .ok_or_else(account_gone)?;
        let product = self
            .products
            .create(&NewProduct {
                seller_user_id: owner.id.clone(),
                details,
            })
            .await?;
        info!(product_id = %product.id, seller_id = %owner.id, "product created");
        self.mailer.dispatch(product_event_email(
            EmailKind::ProductPending,
            &owner,
            &product,
            &self.links,
            self.clock.utc(),
        ));
        Ok(product)
    }

    /// Owner edit; always sends the listing back to PENDING.
    pub async fn update(
        &self,
        principal: &Principal,
        id: ProductId,
        details: ProductDetails,
    ) -> Result<Product, Error> {
        let product = self.load(id).await?;
        Self::require_owner(principal, &product)?;
        let updated = self
            .transition(
                &product,
                ModerationAction::Edit,
                principal.user_id().clone(),
                Some(details),
            )
            .await?;
        self.notify(EmailKind::ProductUpdated, principal.user_id(), &updated)
            .await;
        Ok(updated)
    }

    /// Owner soft delete. Descriptive fields are left as they were.
    pub async fn delete(&self, principal: &Principal, id: ProductId) -> Result<Product, Error> {
        let product = self.load(id).await?;
        Self::require_owner(principal, &product)?;
        let deleted = self
            .transition(
                &product,
                ModerationAction::Delete,
                principal.user_id().clone(),
                None,
            )
            .await?;
        self.notify(EmailKind::ProductDeleted, principal.user_id(), &deleted)
            .await;
        Ok(deleted)
    }

    /// Admin approval; the ledger entry is addressed to the owning seller.
    pub async fn approve(&self, principal: &Principal, id: ProductId) -> Result<Product, Error> {
        self.moderate(principal, id, ModerationAction::Approve, EmailKind::ProductApproved)
            .await
    }

    /// Admin rejection; the ledger entry is addressed to the owning seller.
    pub async fn reject(&self, principal: &Principal, id: ProductId) -> Result<Product, Error> {
        self.moderate(principal, id, ModerationAction::Reject, EmailKind::ProductRejected)
            .await
    }

    async fn moderate(
        &self,
        principal: &Principal,
        id: ProductId,
        action: ModerationAction,
        email: EmailKind,
    ) -> Result<Product, Error> {
        principal.require_admin()?;
        let product = self.load(id).await?;
        let owner = product
            .seller_user_id
            .clone()
            .ok_or_else(|| Error::conflict("Product owner no longer exists"))?;
        let updated = self.transition(&product, action, owner.clone(), None).await?;
        self.notify(email, &owner, &updated).await;
        Ok(updated)
    }

    /// Single product in any status, with its owner.
    pub async fn get_one(&self, id: ProductId) -> Result<ProductWithOwner, Error> {
        let product = self.load(id).await?;
        let owner = match &product.seller_user_id {
            Some(owner) => self.users.find_by_id(owner).await?,
            None => None,
        };
        Ok(ProductWithOwner { product, owner })
    }

    /// Public catalogue: APPROVED only, unless the viewer is an admin.
    pub async fn list_all(&self, viewer: Option<&Principal>) -> Result<Vec<Product>, Error> {
        let filter = match viewer {
            Some(principal) if principal.is_admin() => ProductFilter::All,
            _ => ProductFilter::Status(ModerationStatus::Approved),
        };
        Ok(self.products.list(&filter).await?)
    }

    /// A seller's listings. Strangers see APPROVED ones; the seller and
    /// admins see every status.
    pub async fn list_by_seller(
        &self,
        viewer: Option<&Principal>,
        seller: &UserId,
    ) -> Result<Vec<Product>, Error> {
        let privileged =
            viewer.is_some_and(|p| p.is_admin() || p.user_id() == seller);
        let status = (!privileged).then_some(ModerationStatus::Approved);
        Ok(self
            .products
            .list(&ProductFilter::Seller {
                seller: seller.clone(),
                status,
            })
            .await?)
    }

    /// APPROVED listings of every other seller.
    pub async fn list_except_seller(&self, seller: &UserId) -> Result<Vec<Product>, Error> {
        Ok(self
            .products
            .list(&ProductFilter::ApprovedExceptSeller(seller.clone()))
            .await?)
    }

    /// Moderation queue.
    pub async fn list_pending(&self, principal: &Principal) -> Result<Vec<Product>, Error> {
        principal.require_admin()?;
        Ok(self
            .products
            .list(&ProductFilter::Status(ModerationStatus::Pending))
            .await?)
    }

    pub async fn list_rejected(&self, principal: &Principal) -> Result<Vec<Product>, Error> {
        principal.require_admin()?;
        Ok(self
            .products
            .list(&ProductFilter::Status(ModerationStatus::Rejected))
            .await?)
    }
}

#[cfg(test)]
#[path = "product_service_tests.rs"]
mod tests;
