//! Products and the notification ledger over the in-memory tables.
//!
//! Both live under the same lock, so a transition and its ledger entry are
//! applied together or not at all.

use std::cmp::Reverse;
use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    NotificationPersistenceError, NotificationRepository, ProductPersistenceError,
    ProductRepository,
};
use crate::domain::{
    LedgerEntry, ModerationStatus, NewProduct, Notification, NotificationId, NotificationScope,
    NotificationType, Product, ProductFilter, ProductId, ProductImage, ProductTransition,
};

use super::{InMemoryStore, MemoryState};

impl InMemoryStore {
    fn catalogue(&self) -> Result<MutexGuard<'_, MemoryState>, ProductPersistenceError> {
        self.lock().map_err(ProductPersistenceError::query)
    }

    fn ledger(&self) -> Result<MutexGuard<'_, MemoryState>, NotificationPersistenceError> {
        self.lock().map_err(NotificationPersistenceError::query)
    }
}

fn append_entry(
    state: &mut MemoryState,
    entry: &LedgerEntry,
    now: DateTime<Utc>,
) -> Result<Notification, String> {
    let raw = MemoryState::bump(&mut state.next_notification_id);
    let id = NotificationId::new(raw).map_err(|err| err.to_string())?;
    let notification = Notification {
        id,
        user_id: entry.user_id.clone(),
        product_id: entry.product_id,
        kind: entry.kind,
        is_read: false,
        created_at: now,
    };
    state.notifications.insert(raw, notification.clone());
    Ok(notification)
}

fn matches(filter: &ProductFilter, product: &Product) -> bool {
    match filter {
        ProductFilter::All => true,
        ProductFilter::Status(status) => product.status == *status,
        ProductFilter::Seller { seller, status } => {
            product.is_owned_by(seller) && status.is_none_or(|s| product.status == s)
        }
        ProductFilter::ApprovedExceptSeller(seller) => {
            product.status == ModerationStatus::Approved && !product.is_owned_by(seller)
        }
    }
}

fn in_scope(scope: &NotificationScope, entry: &Notification) -> bool {
    match scope {
        NotificationScope::Everyone => true,
        NotificationScope::User(user) => &entry.user_id == user,
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create(&self, new_product: &NewProduct) -> Result<Product, ProductPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.catalogue()?;
        if !state.users.contains_key(&new_product.seller_user_id) {
            return Err(ProductPersistenceError::owner_missing(
                new_product.seller_user_id.to_string(),
            ));
        }
        let raw = MemoryState::bump(&mut state.next_product_id);
        let id = ProductId::new(raw).map_err(|err| ProductPersistenceError::query(err.to_string()))?;
        let product = Product {
            id,
            seller_user_id: Some(new_product.seller_user_id.clone()),
            owner_deleted: false,
            details: new_product.details.clone(),
            status: ModerationStatus::Pending,
            deleted_at: None,
            created_at: now,
            images: Vec::new(),
        };
        let entry = LedgerEntry {
            user_id: new_product.seller_user_id.clone(),
            product_id: Some(id),
            kind: NotificationType::ProductCreated,
        };
        append_entry(&mut state, &entry, now).map_err(ProductPersistenceError::ledger)?;
        state.products.insert(raw, product.clone());
        Ok(product)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError> {
        Ok(self.catalogue()?.products.get(&id.get()).cloned())
    }

    async fn apply_transition(
        &self,
        transition: &ProductTransition,
    ) -> Result<Product, ProductPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.catalogue()?;
        let key = transition.product_id.get();
        match state.products.get(&key).map(|product| product.status) {
            None => return Err(ProductPersistenceError::not_found(key)),
            Some(ModerationStatus::Deleted) => {
                return Err(ProductPersistenceError::already_deleted(key));
            }
            Some(_) => {}
        }
        append_entry(&mut state, &transition.ledger, now).map_err(ProductPersistenceError::ledger)?;
        let product = state
            .products
            .get_mut(&key)
            .ok_or_else(|| ProductPersistenceError::not_found(key))?;
        product.status = transition.status;
        product.deleted_at = transition.deleted_at;
        if let Some(details) = &transition.details {
            product.details = details.clone();
        }
        Ok(product.clone())
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let state = self.catalogue()?;
        let mut listed: Vec<Product> = state
            .products
            .values()
            .filter(|product| matches(filter, product))
            .cloned()
            .collect();
        listed.sort_by_key(|product| Reverse((product.created_at, product.id)));
        Ok(listed)
    }

    async fn add_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<(), ProductPersistenceError> {
        let mut state = self.catalogue()?;
        let product = state
            .products
            .get_mut(&id.get())
            .ok_or_else(|| ProductPersistenceError::not_found(id.get()))?;
        product.images.push(image.clone());
        product.images.sort_by_key(|image| image.position);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn list(
        &self,
        scope: &NotificationScope,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let state = self.ledger()?;
        Ok(state
            .notifications
            .values()
            .rev()
            .filter(|entry| in_scope(scope, entry))
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationPersistenceError> {
        Ok(self.ledger()?.notifications.get(&id.get()).cloned())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationPersistenceError> {
        let mut state = self.ledger()?;
        let entry = state
            .notifications
            .get_mut(&id.get())
            .ok_or_else(|| NotificationPersistenceError::not_found(id.get()))?;
        entry.is_read = true;
        Ok(entry.clone())
    }

    async fn mark_all_read(
        &self,
        scope: &NotificationScope,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut state = self.ledger()?;
        let mut changed = 0;
        for entry in state.notifications.values_mut() {
            if !entry.is_read && in_scope(scope, entry) {
                entry.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
