//! PostgreSQL-backed enquiry and chat-lead storage.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ChatLeadRepository, EnquiryPersistenceError, EnquiryRepository};
use crate::domain::{ChatLead, Enquiry, EnquiryFilter, NewChatLead, NewEnquiry, ProductId, UserId};

use super::diesel_error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::models::{ChatLeadRow, EnquiryRow, NewChatLeadRow, NewEnquiryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{chat_leads, enquiries, products};

/// Diesel implementation of [`EnquiryRepository`] and [`ChatLeadRepository`].
#[derive(Clone)]
pub struct DieselEnquiryRepository {
    pool: DbPool,
}

impl DieselEnquiryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> EnquiryPersistenceError {
    map_pool_error(error, EnquiryPersistenceError::connection)
}

fn diesel_error(error: DieselError) -> EnquiryPersistenceError {
    map_diesel_error(
        error,
        EnquiryPersistenceError::query,
        EnquiryPersistenceError::connection,
    )
}

fn row_to_enquiry(row: EnquiryRow) -> Result<Enquiry, EnquiryPersistenceError> {
    let product_id = ProductId::new(row.product_id)
        .map_err(|err| EnquiryPersistenceError::query(err.to_string()))?;
    Ok(Enquiry {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        product_id,
        message: row.message,
        created_at: row.created_at,
    })
}

fn row_to_lead(row: ChatLeadRow) -> ChatLead {
    ChatLead {
        id: row.id,
        company_name: row.company_name,
        user_name: row.user_name,
        phone_number: row.phone_number,
        created_at: row.created_at,
    }
}

#[async_trait]
impl EnquiryRepository for DieselEnquiryRepository {
    async fn create(&self, enquiry: &NewEnquiry) -> Result<Enquiry, EnquiryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(enquiries::table)
            .values(&NewEnquiryRow {
                user_id: *enquiry.user_id.as_uuid(),
                product_id: enquiry.product_id.get(),
                message: &enquiry.message,
            })
            .returning(EnquiryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    EnquiryPersistenceError::product_not_found(enquiry.product_id.get())
                } else {
                    diesel_error(err)
                }
            })?;
        row_to_enquiry(row)
    }

    async fn list(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, EnquiryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = enquiries::table
            .inner_join(products::table)
            .select(EnquiryRow::as_select())
            .order_by((enquiries::created_at.desc(), enquiries::id.desc()))
            .into_boxed();
        query = match filter {
            EnquiryFilter::All => query,
            EnquiryFilter::Product(product) => {
                query.filter(enquiries::product_id.eq(product.get()))
            }
            EnquiryFilter::User(user) => query.filter(enquiries::user_id.eq(*user.as_uuid())),
            EnquiryFilter::Seller(seller) => {
                query.filter(products::seller_user_id.eq(*seller.as_uuid()))
            }
        };
        let rows: Vec<EnquiryRow> = query.load(&mut conn).await.map_err(diesel_error)?;
        rows.into_iter().map(row_to_enquiry).collect()
    }
}

#[async_trait]
impl ChatLeadRepository for DieselEnquiryRepository {
    async fn create(&self, lead: &NewChatLead) -> Result<ChatLead, EnquiryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(chat_leads::table)
            .values(&NewChatLeadRow {
                company_name: &lead.company_name,
                user_name: &lead.user_name,
                phone_number: &lead.phone_number,
            })
            .returning(ChatLeadRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(row_to_lead(row))
    }

    async fn list(&self) -> Result<Vec<ChatLead>, EnquiryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ChatLeadRow> = chat_leads::table
            .select(ChatLeadRow::as_select())
            .order_by((chat_leads::created_at.desc(), chat_leads::id.desc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(row_to_lead).collect())
    }
}
