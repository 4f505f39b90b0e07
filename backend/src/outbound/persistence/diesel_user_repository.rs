//! PostgreSQL-backed `UserRepository`.
//!
//! Users and their seller/admin rows are written in a single transaction
//! whenever more than one table changes. Email uniqueness is left to the
//! `users_email_key` index so concurrent sign-ups cannot both succeed.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SellerProfileChange, UserPersistenceError, UserRepository};
use crate::domain::{
    AdminProfile, EmailAddress, NewUser, PasswordDigest, ProfileUpdate, Role, RoleState,
    SellerProfile, User, UserAccount, UserId,
};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{
    AdminRow, NewUserRow, SellerFieldsChangeset, SellerRow, UserProfileChangeset, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{admins, products, sellers, users};

/// Diesel implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: DieselError) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Like [`diesel_error`] but reports unique violations as a duplicate email.
fn write_error(error: DieselError, email: Option<&EmailAddress>) -> UserPersistenceError {
    match email {
        Some(email) if is_unique_violation(&error) => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        _ => diesel_error(error),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| UserPersistenceError::query(format!("stored role invalid: {err}")))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email,
        password_digest: PasswordDigest::new(row.password_digest),
        role,
        is_email_verified: row.is_email_verified,
        is_document_verified: row.is_document_verified,
        address: row.address,
        country_code: row.country_code,
        phone_number: row.phone_number,
        profile_pic_url: row.profile_pic_url,
        created_at: row.created_at,
    })
}

fn row_to_seller(row: SellerRow) -> SellerProfile {
    SellerProfile {
        user_id: UserId::from_uuid(row.user_id),
        business_desc: row.business_desc,
        business_type: row.business_type,
        verification_doc_url: row.verification_doc_url,
    }
}

fn row_to_admin(row: AdminRow) -> AdminProfile {
    AdminProfile {
        user_id: UserId::from_uuid(row.user_id),
        permissions: row.permissions,
    }
}

type AccountRows = (UserRow, Option<SellerRow>, Option<AdminRow>);

fn rows_to_account(
    (user, seller, admin): AccountRows,
) -> Result<UserAccount, UserPersistenceError> {
    Ok(UserAccount {
        user: row_to_user(user)?,
        seller: seller.map(row_to_seller),
        admin: admin.map(row_to_admin),
    })
}

async fn load_account_rows(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> QueryResult<Option<AccountRows>> {
    let Some(user) = users::table
        .find(id)
        .select(UserRow::as_select())
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };
    let seller = sellers::table
        .find(id)
        .select(SellerRow::as_select())
        .first(conn)
        .await
        .optional()?;
    let admin = admins::table
        .find(id)
        .select(AdminRow::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(Some((user, seller, admin)))
}

fn profile_changeset(update: &ProfileUpdate) -> UserProfileChangeset<'_> {
    UserProfileChangeset {
        name: update.name.as_deref(),
        email: update.email.as_ref().map(AsRef::as_ref),
        address: update.address.as_deref(),
        country_code: update.country_code.as_deref(),
        phone_number: update.phone_number.as_deref(),
        profile_pic_url: update.profile_pic_url.as_deref(),
    }
}

async fn write_seller_change(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
    change: &SellerProfileChange,
) -> QueryResult<()> {
    match change {
        SellerProfileChange::Replace {
            business_desc,
            business_type,
            verification_doc_url,
        } => {
            diesel::insert_into(sellers::table)
                .values((
                    sellers::user_id.eq(user_id),
                    sellers::business_desc.eq(business_desc),
                    sellers::business_type.eq(business_type),
                    sellers::verification_doc_url.eq(verification_doc_url),
                ))
                .on_conflict(sellers::user_id)
                .do_update()
                .set((
                    sellers::business_desc.eq(excluded(sellers::business_desc)),
                    sellers::business_type.eq(excluded(sellers::business_type)),
                    sellers::verification_doc_url.eq(excluded(sellers::verification_doc_url)),
                ))
                .execute(conn)
                .await?;
        }
        SellerProfileChange::Document {
            verification_doc_url,
        } => {
            diesel::insert_into(sellers::table)
                .values((
                    sellers::user_id.eq(user_id),
                    sellers::verification_doc_url.eq(verification_doc_url),
                ))
                .on_conflict(sellers::user_id)
                .do_update()
                .set(sellers::verification_doc_url.eq(excluded(sellers::verification_doc_url)))
                .execute(conn)
                .await?;
        }
        SellerProfileChange::EnsureExists => {
            diesel::insert_into(sellers::table)
                .values(sellers::user_id.eq(user_id))
                .on_conflict(sellers::user_id)
                .do_nothing()
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            name: &user.name,
            email: user.email.as_ref(),
            password_digest: user.password_digest.as_ref(),
            address: &user.address,
            country_code: user.country_code.as_deref(),
            phone_number: user.phone_number.as_deref(),
        };
        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| write_error(err, Some(&user.email)))?;
        row_to_user(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_account(
        &self,
        id: &UserId,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        load_account_rows(&mut conn, *id.as_uuid())
            .await
            .map_err(diesel_error)?
            .map(rows_to_account)
            .transpose()
    }

    async fn list_accounts(&self) -> Result<Vec<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let user_rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let mut seller_rows: HashMap<Uuid, SellerRow> = sellers::table
            .select(SellerRow::as_select())
            .load::<SellerRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(|row| (row.user_id, row))
            .collect();
        let mut admin_rows: HashMap<Uuid, AdminRow> = admins::table
            .select(AdminRow::as_select())
            .load::<AdminRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(|row| (row.user_id, row))
            .collect();

        user_rows
            .into_iter()
            .map(|user| {
                let seller = seller_rows.remove(&user.id);
                let admin = admin_rows.remove(&user.id);
                rows_to_account((user, seller, admin))
            })
            .collect()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let user_id = *id.as_uuid();
        let changes = profile_changeset(update);
        let seller_changes = update.seller.as_ref().map(|fields| SellerFieldsChangeset {
            business_desc: fields.business_desc.as_deref(),
            business_type: fields.business_type.as_deref(),
        });

        let rows = conn
            .transaction(|conn| {
                async move {
                    if !changes.is_empty() {
                        diesel::update(users::table.find(user_id))
                            .set(&changes)
                            .execute(conn)
                            .await?;
                    }
                    if let Some(seller) = seller_changes
                        .as_ref()
                        .filter(|s| s.business_desc.is_some() || s.business_type.is_some())
                    {
                        diesel::update(sellers::table.find(user_id))
                            .set(seller)
                            .execute(conn)
                            .await?;
                    }
                    load_account_rows(conn, user_id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| write_error(err, update.email.as_ref()))?;

        let rows = rows.ok_or_else(|| UserPersistenceError::not_found(id.as_ref()))?;
        rows_to_account(rows)
    }

    async fn set_password_digest(
        &self,
        id: &UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set(users::password_digest.eq(digest.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found(id.as_ref()));
        }
        Ok(())
    }

    async fn mark_email_verified(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set(users::is_email_verified.eq(true))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::not_found(id.as_ref()));
        }
        Ok(())
    }

    async fn apply_role_state(
        &self,
        id: &UserId,
        state: RoleState,
        seller: SellerProfileChange,
    ) -> Result<UserAccount, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let user_id = *id.as_uuid();

        let rows = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(users::table.find(user_id))
                        .set((
                            users::role.eq(state.role().as_str()),
                            users::is_document_verified.eq(state.is_document_verified()),
                        ))
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Ok(None);
                    }
                    write_seller_change(conn, user_id, &seller).await?;
                    load_account_rows(conn, user_id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        let rows = rows.ok_or_else(|| UserPersistenceError::not_found(id.as_ref()))?;
        rows_to_account(rows)
    }

    async fn delete_account(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let user_id = *id.as_uuid();

        let deleted = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(sellers::table.find(user_id))
                        .execute(conn)
                        .await?;
                    diesel::delete(admins::table.find(user_id))
                        .execute(conn)
                        .await?;
                    diesel::update(products::table.filter(products::seller_user_id.eq(user_id)))
                        .set((
                            products::seller_user_id.eq(None::<Uuid>),
                            products::owner_deleted.eq(true),
                        ))
                        .execute(conn)
                        .await?;
                    diesel::delete(users::table.find(user_id))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        if deleted == 0 {
            return Err(UserPersistenceError::not_found(id.as_ref()));
        }
        Ok(())
    }
}
