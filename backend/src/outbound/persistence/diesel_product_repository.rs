//! PostgreSQL-backed `ProductRepository`.
//!
//! Every status change runs in one transaction with its ledger row: the
//! notification is inserted first and the product update follows, so a
//! failed append rolls the whole transition back. The update only matches
//! rows that are not yet DELETED, so a concurrent delete always wins.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{ProductPersistenceError, ProductRepository};
use crate::domain::{
    ModerationStatus, NewProduct, NotificationType, Product, ProductDetails,
    ProductFilter, ProductId, ProductImage, ProductTransition, UserId,
};

use super::diesel_error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::diesel_notification_repository::ledger_row;
use super::models::{
    NewNotificationRow, NewProductImageRow, NewProductRow, ProductDetailsRow, ProductImageRow,
    ProductRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{notifications, product_images, products};

/// Diesel implementation of the [`ProductRepository`] port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transition transaction, keeping ledger failures apart.
#[derive(Debug)]
enum TransitionFailure {
    Diesel(DieselError),
    Ledger(DieselError),
    Missing,
    AlreadyDeleted,
    OwnerMissing,
}

impl From<DieselError> for TransitionFailure {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

fn pool_error(error: PoolError) -> ProductPersistenceError {
    map_pool_error(error, ProductPersistenceError::connection)
}

fn diesel_error(error: DieselError) -> ProductPersistenceError {
    map_diesel_error(
        error,
        ProductPersistenceError::query,
        ProductPersistenceError::connection,
    )
}

fn transition_error(failure: TransitionFailure, id: i64) -> ProductPersistenceError {
    match failure {
        TransitionFailure::Diesel(err) => diesel_error(err),
        TransitionFailure::Ledger(err) => {
            warn!(
                event = "ledger_append_failed",
                product_id = id,
                error = %err,
                "ledger append failed; transition rolled back"
            );
            ProductPersistenceError::ledger(err.to_string())
        }
        TransitionFailure::Missing => ProductPersistenceError::not_found(id),
        TransitionFailure::AlreadyDeleted => ProductPersistenceError::already_deleted(id),
        TransitionFailure::OwnerMissing => {
            ProductPersistenceError::owner_missing(format!("owner of product {id}"))
        }
    }
}

fn details_row(details: &ProductDetails) -> ProductDetailsRow<'_> {
    ProductDetailsRow {
        name: &details.name,
        price: details.price,
        currency: &details.currency,
        quantity: details.quantity,
        unit: &details.unit,
        category: &details.category,
        country: details.country.as_deref(),
        color: details.color.as_deref(),
        source_material: details.source_material.as_deref(),
        batch_size: details.batch_size.as_deref(),
        minimum_order_quantity: details.minimum_order_quantity,
        application: details.application.as_deref(),
        description: details.description.as_deref(),
        additional_notes: details.additional_notes.as_deref(),
    }
}

fn row_to_product(
    row: ProductRow,
    images: Vec<ProductImage>,
) -> Result<Product, ProductPersistenceError> {
    let id = ProductId::new(row.id)
        .map_err(|err| ProductPersistenceError::query(format!("stored id invalid: {err}")))?;
    let status = ModerationStatus::from_code(row.status)
        .map_err(|err| ProductPersistenceError::query(format!("stored status invalid: {err}")))?;
    Ok(Product {
        id,
        seller_user_id: row.seller_user_id.map(UserId::from_uuid),
        owner_deleted: row.owner_deleted,
        details: ProductDetails {
            name: row.name,
            price: row.price,
            currency: row.currency,
            quantity: row.quantity,
            unit: row.unit,
            category: row.category,
            country: row.country,
            color: row.color,
            source_material: row.source_material,
            batch_size: row.batch_size,
            minimum_order_quantity: row.minimum_order_quantity,
            application: row.application,
            description: row.description,
            additional_notes: row.additional_notes,
        },
        status,
        deleted_at: row.deleted_at,
        created_at: row.created_at,
        images,
    })
}

/// Load images for `rows` in one query and assemble domain products.
async fn with_images(
    conn: &mut AsyncPgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<Product>, ProductPersistenceError> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let image_rows: Vec<ProductImageRow> = product_images::table
        .filter(product_images::product_id.eq_any(&ids))
        .select(ProductImageRow::as_select())
        .order_by((product_images::product_id, product_images::position))
        .load(conn)
        .await
        .map_err(diesel_error)?;

    let mut by_product: HashMap<i64, Vec<ProductImage>> = HashMap::new();
    for image in image_rows {
        by_product
            .entry(image.product_id)
            .or_default()
            .push(ProductImage {
                url: image.url,
                position: image.position,
            });
    }

    rows.into_iter()
        .map(|row| {
            let images = by_product.remove(&row.id).unwrap_or_default();
            row_to_product(row, images)
        })
        .collect()
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<Product>, ProductPersistenceError> {
    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(diesel_error)?;
    match row {
        Some(row) => Ok(with_images(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn create(&self, product: &NewProduct) -> Result<Product, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let owner = *product.seller_user_id.as_uuid();
        let new_row = NewProductRow {
            seller_user_id: owner,
            status: ModerationStatus::Pending.code(),
            details: details_row(&product.details),
        };

        let created: Result<ProductRow, TransitionFailure> = conn
            .transaction(|conn| {
                async move {
                    let row = diesel::insert_into(products::table)
                        .values(&new_row)
                        .returning(ProductRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| {
                            if is_foreign_key_violation(&err) {
                                TransitionFailure::OwnerMissing
                            } else {
                                TransitionFailure::Diesel(err)
                            }
                        })?;
                    diesel::insert_into(notifications::table)
                        .values(&NewNotificationRow {
                            user_id: owner,
                            product_id: Some(row.id),
                            notification_type: NotificationType::ProductCreated.as_str(),
                        })
                        .execute(conn)
                        .await
                        .map_err(TransitionFailure::Ledger)?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await;
        let row = created.map_err(|failure| match failure {
            TransitionFailure::OwnerMissing => {
                ProductPersistenceError::owner_missing(product.seller_user_id.to_string())
            }
            other => transition_error(other, 0),
        })?;

        row_to_product(row, Vec::new())
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        load_one(&mut conn, id.get()).await
    }

    async fn apply_transition(
        &self,
        transition: &ProductTransition,
    ) -> Result<Product, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let id = transition.product_id.get();
        let ledger = ledger_row(&transition.ledger);
        let details = transition.details.as_ref().map(details_row);
        let status = transition.status.code();
        let deleted_at = transition.deleted_at;

        let applied: Result<(), TransitionFailure> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(notifications::table)
                        .values(&ledger)
                        .execute(conn)
                        .await
                        .map_err(TransitionFailure::Ledger)?;

                    let target = products::table
                        .find(id)
                        .filter(products::status.ne(ModerationStatus::Deleted.code()));
                    let updated = match &details {
                        Some(details) => {
                            diesel::update(target)
                                .set((
                                    details,
                                    products::status.eq(status),
                                    products::deleted_at.eq(deleted_at),
                                ))
                                .execute(conn)
                                .await?
                        }
                        None => {
                            diesel::update(target)
                                .set((
                                    products::status.eq(status),
                                    products::deleted_at.eq(deleted_at),
                                ))
                                .execute(conn)
                                .await?
                        }
                    };
                    if updated == 0 {
                        let exists = products::table
                            .find(id)
                            .select(products::id)
                            .first::<i64>(conn)
                            .await
                            .optional()?;
                        return Err(match exists {
                            Some(_) => TransitionFailure::AlreadyDeleted,
                            None => TransitionFailure::Missing,
                        });
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        applied.map_err(|failure| transition_error(failure, id))?;

        load_one(&mut conn, id)
            .await?
            .ok_or_else(|| ProductPersistenceError::not_found(id))
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = products::table
            .select(ProductRow::as_select())
            .order_by((products::created_at.desc(), products::id.desc()))
            .into_boxed();

        query = match filter {
            ProductFilter::All => query,
            ProductFilter::Status(status) => query.filter(products::status.eq(status.code())),
            ProductFilter::Seller { seller, status } => {
                let query = query.filter(products::seller_user_id.eq(*seller.as_uuid()));
                match status {
                    Some(status) => query.filter(products::status.eq(status.code())),
                    None => query,
                }
            }
            ProductFilter::ApprovedExceptSeller(seller) => query
                .filter(products::status.eq(ModerationStatus::Approved.code()))
                .filter(products::seller_user_id.is_distinct_from(*seller.as_uuid())),
        };

        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        with_images(&mut conn, rows).await
    }

    async fn add_image(
        &self,
        id: ProductId,
        image: &ProductImage,
    ) -> Result<(), ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(product_images::table)
            .values(&NewProductImageRow {
                product_id: id.get(),
                url: &image.url,
                position: image.position,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    ProductPersistenceError::not_found(id.get())
                } else {
                    diesel_error(err)
                }
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(status: i16) -> ProductRow {
        ProductRow {
            id: 3,
            seller_user_id: None,
            owner_deleted: true,
            name: "Offcut Board".into(),
            price: 4.0,
            currency: "EUR".into(),
            quantity: 10,
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
            status,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn orphaned_row_converts_without_owner() {
        let product = row_to_product(row(1), Vec::new()).expect("valid row");
        assert!(product.seller_user_id.is_none());
        assert!(product.owner_deleted);
        assert_eq!(product.status, ModerationStatus::Approved);
    }

    #[rstest]
    fn unknown_status_code_is_a_query_error() {
        assert!(matches!(
            row_to_product(row(9), Vec::new()),
            Err(ProductPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn ledger_failures_keep_their_own_variant() {
        let mapped = transition_error(TransitionFailure::Ledger(DieselError::NotFound), 3);
        assert!(matches!(mapped, ProductPersistenceError::Ledger { .. }));
    }

    #[rstest]
    #[case(TransitionFailure::Missing, ProductPersistenceError::not_found(3))]
    #[case(TransitionFailure::AlreadyDeleted, ProductPersistenceError::already_deleted(3))]
    fn unchanged_rows_are_classified(
        #[case] failure: TransitionFailure,
        #[case] expected: ProductPersistenceError,
    ) {
        assert_eq!(transition_error(failure, 3), expected);
    }
}
