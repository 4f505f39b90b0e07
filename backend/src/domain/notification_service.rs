//! Ledger queries and read-flag updates with self-or-admin scoping.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::NotificationRepository;
use crate::domain::{
    Error, Notification, NotificationId, NotificationScope, Principal, UserId,
};

/// Notification ledger use cases.
#[derive(Clone)]
pub struct NotificationService {
    ledger: Arc<dyn NotificationRepository>,
}

fn scope_for(principal: &Principal, requested: Option<UserId>) -> NotificationScope {
    match principal.scope_to(requested) {
        Some(user) => NotificationScope::User(user),
        None => NotificationScope::Everyone,
    }
}

impl NotificationService {
    pub fn new(ledger: Arc<dyn NotificationRepository>) -> Self {
        Self { ledger }
    }

    /// List entries. Non-admins always get their own regardless of
    /// `requested`; admins get `requested` or everything.
    pub async fn list(
        &self,
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Result<Vec<Notification>, Error> {
        let scope = scope_for(principal, requested);
        Ok(self.ledger.list(&scope).await?)
    }

    /// Mark one entry read. Re-marking a read entry is a no-op.
    pub async fn mark_read(
        &self,
        principal: &Principal,
        id: NotificationId,
    ) -> Result<Notification, Error> {
        let entry = self
            .ledger
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("Notification not found"))?;
        principal.require_self_or_admin(&entry.user_id)?;
        if entry.is_read {
            return Ok(entry);
        }
        Ok(self.ledger.mark_read(id).await?)
    }

    /// Mark every unread entry in scope read; returns the count changed.
    pub async fn mark_all_read(
        &self,
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Result<u64, Error> {
        let scope = scope_for(principal, requested);
        let count = self.ledger.mark_all_read(&scope).await?;
        debug!(count, "notifications marked read");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::fixture_timestamp;
    use crate::domain::ports::MockNotificationRepository;
    use crate::domain::{ErrorCode, NotificationType, Role};
    use rstest::rstest;

    fn entry(owner: &UserId, is_read: bool) -> Notification {
        Notification {
            id: NotificationId::new(1).expect("id"),
            user_id: owner.clone(),
            product_id: None,
            kind: NotificationType::ProductCreated,
            is_read,
            created_at: fixture_timestamp(),
        }
    }

    #[rstest]
    #[case(Role::User, true)]
    #[case(Role::Seller, false)]
    #[tokio::test]
    async fn non_admin_listing_ignores_requested_user(#[case] role: Role, #[case] ask: bool) {
        let me = UserId::random();
        let expected = NotificationScope::User(me.clone());
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_list()
            .withf(move |scope| *scope == expected)
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let requested = ask.then(UserId::random);
        NotificationService::new(Arc::new(ledger))
            .list(&Principal::new(me, role), requested)
            .await
            .expect("listing");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(UserId::random()))]
    #[tokio::test]
    async fn admin_listing_honours_requested_user(#[case] requested: Option<UserId>) {
        let expected = requested
            .clone()
            .map_or(NotificationScope::Everyone, NotificationScope::User);
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_list()
            .withf(move |scope| *scope == expected)
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        NotificationService::new(Arc::new(ledger))
            .list(&Principal::new(UserId::random(), Role::Admin), requested)
            .await
            .expect("listing");
    }

    #[tokio::test]
    async fn marking_someone_elses_entry_is_forbidden() {
        let owner = UserId::random();
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_find()
            .return_once(move |_| Ok(Some(entry(&owner, false))));
        ledger.expect_mark_read().times(0);

        let err = NotificationService::new(Arc::new(ledger))
            .mark_read(
                &Principal::new(UserId::random(), Role::Seller),
                NotificationId::new(1).expect("id"),
            )
            .await
            .expect_err("not the addressee");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn marking_read_entry_again_is_a_no_op() {
        let owner = UserId::random();
        let stored = entry(&owner, true);
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_find()
            .return_once(move |_| Ok(Some(stored)));
        ledger.expect_mark_read().times(0);

        let result = NotificationService::new(Arc::new(ledger))
            .mark_read(
                &Principal::new(owner, Role::User),
                NotificationId::new(1).expect("id"),
            )
            .await
            .expect("idempotent");
        assert!(result.is_read);
    }

    #[tokio::test]
    async fn admin_may_mark_any_entry() {
        let owner = UserId::random();
        let unread = entry(&owner, false);
        let read = entry(&owner, true);
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_find()
            .return_once(move |_| Ok(Some(unread)));
        ledger
            .expect_mark_read()
            .times(1)
            .return_once(move |_| Ok(read));

        let result = NotificationService::new(Arc::new(ledger))
            .mark_read(
                &Principal::new(UserId::random(), Role::Admin),
                NotificationId::new(1).expect("id"),
            )
            .await
            .expect("admin override");
        assert!(result.is_read);
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let mut ledger = MockNotificationRepository::new();
        ledger.expect_find().return_once(|_| Ok(None));

        let err = NotificationService::new(Arc::new(ledger))
            .mark_read(
                &Principal::new(UserId::random(), Role::Admin),
                NotificationId::new(4).expect("id"),
            )
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn mark_all_read_is_scoped_like_list() {
        let me = UserId::random();
        let expected = NotificationScope::User(me.clone());
        let mut ledger = MockNotificationRepository::new();
        ledger
            .expect_mark_all_read()
            .withf(move |scope| *scope == expected)
            .times(1)
            .return_once(|_| Ok(3));

        let count = NotificationService::new(Arc::new(ledger))
            .mark_all_read(&Principal::new(me, Role::User), Some(UserId::random()))
            .await
            .expect("marked");
        assert_eq!(count, 3);
    }
}
