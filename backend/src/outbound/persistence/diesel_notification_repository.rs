//! PostgreSQL-backed notification ledger.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{
    LedgerEntry, Notification, NotificationId, NotificationScope, NotificationType, ProductId,
    UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel implementation of the [`NotificationRepository`] port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> NotificationPersistenceError {
    map_pool_error(error, NotificationPersistenceError::connection)
}

fn diesel_error(error: DieselError) -> NotificationPersistenceError {
    map_diesel_error(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

/// Insert payload for a ledger entry; shared with the product repository,
/// which appends inside its own transactions.
pub(super) fn ledger_row(entry: &LedgerEntry) -> NewNotificationRow<'static> {
    NewNotificationRow {
        user_id: *entry.user_id.as_uuid(),
        product_id: entry.product_id.map(ProductId::get),
        notification_type: entry.kind.as_str(),
    }
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationPersistenceError> {
    let id = NotificationId::new(row.id).map_err(|err| {
        NotificationPersistenceError::query(format!("stored notification id invalid: {err}"))
    })?;
    let kind = row
        .notification_type
        .parse::<NotificationType>()
        .map_err(|err| NotificationPersistenceError::query(err.to_string()))?;
    let product_id = row
        .product_id
        .map(ProductId::new)
        .transpose()
        .map_err(|err| NotificationPersistenceError::query(err.to_string()))?;
    Ok(Notification {
        id,
        user_id: UserId::from_uuid(row.user_id),
        product_id,
        kind,
        is_read: row.is_read,
        created_at: row.created_at,
    })
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn list(
        &self,
        scope: &NotificationScope,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = notifications::table
            .select(NotificationRow::as_select())
            .order_by((notifications::created_at.desc(), notifications::id.desc()))
            .into_boxed();
        if let NotificationScope::User(user) = scope {
            query = query.filter(notifications::user_id.eq(*user.as_uuid()));
        }
        let rows: Vec<NotificationRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_notification).collect()
    }

    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        notifications::table
            .find(id.get())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_notification)
            .transpose()
    }

    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(notifications::table.find(id.get()))
            .set(notifications::is_read.eq(true))
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .ok_or_else(|| NotificationPersistenceError::not_found(id.get()))?;
        row_to_notification(row)
    }

    async fn mark_all_read(
        &self,
        scope: &NotificationScope,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let unread = notifications::table.filter(notifications::is_read.eq(false));
        let updated = match scope {
            NotificationScope::Everyone => {
                diesel::update(unread)
                    .set(notifications::is_read.eq(true))
                    .execute(&mut conn)
                    .await
            }
            NotificationScope::User(user) => {
                diesel::update(unread.filter(notifications::user_id.eq(*user.as_uuid())))
                    .set(notifications::is_read.eq(true))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }
}
