//! Enquiry and chat-lead use cases.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{ChatLeadRepository, EnquiryRepository, ProductRepository};
use crate::domain::{
    ChatLead, Enquiry, EnquiryFilter, Error, ModerationStatus, NewChatLead, NewEnquiry, Principal,
    ProductId, Role, UserId,
};

#[derive(Clone)]
pub struct EnquiryService {
    enquiries: Arc<dyn EnquiryRepository>,
    leads: Arc<dyn ChatLeadRepository>,
    products: Arc<dyn ProductRepository>,
}

impl EnquiryService {
    pub fn new(
        enquiries: Arc<dyn EnquiryRepository>,
        leads: Arc<dyn ChatLeadRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            enquiries,
            leads,
            products,
        }
    }

    /// Record an enquiry against an existing, non-deleted product.
    pub async fn send(&self, enquiry: NewEnquiry) -> Result<Enquiry, Error> {
        let exists = self
            .products
            .find(enquiry.product_id)
            .await?
            .is_some_and(|p| p.status != ModerationStatus::Deleted);
        if !exists {
            return Err(Error::not_found("Product not found"));
        }
        let created = self.enquiries.create(&enquiry).await?;
        info!(enquiry_id = created.id, product_id = %created.product_id, "enquiry sent");
        Ok(created)
    }

    pub async fn list_all(&self, principal: &Principal) -> Result<Vec<Enquiry>, Error> {
        principal.require_admin()?;
        Ok(self.enquiries.list(&EnquiryFilter::All).await?)
    }

    pub async fn list_by_product(&self, product: ProductId) -> Result<Vec<Enquiry>, Error> {
        Ok(self.enquiries.list(&EnquiryFilter::Product(product)).await?)
    }

    /// Enquiries written by `requested`, defaulting to the caller.
    pub async fn list_by_user(
        &self,
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Result<Vec<Enquiry>, Error> {
        let target = requested.unwrap_or_else(|| principal.user_id().clone());
        principal.require_self_or_admin(&target)?;
        Ok(self.enquiries.list(&EnquiryFilter::User(target)).await?)
    }

    /// Enquiries on products owned by a seller. Ownership is derived through
    /// the product, so sellers only ever see enquiries on their listings;
    /// only admins may name a different seller.
    pub async fn list_by_seller(
        &self,
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Result<Vec<Enquiry>, Error> {
        principal.require_role(&[Role::Seller, Role::Admin])?;
        let seller = requested
            .filter(|_| principal.is_admin())
            .unwrap_or_else(|| principal.user_id().clone());
        Ok(self.enquiries.list(&EnquiryFilter::Seller(seller)).await?)
    }

    pub async fn create_chat_lead(&self, lead: NewChatLead) -> Result<ChatLead, Error> {
        let created = self.leads.create(&lead).await?;
        info!(lead_id = created.id, "chat lead captured");
        Ok(created)
    }

    pub async fn list_chat_leads(&self, principal: &Principal) -> Result<Vec<ChatLead>, Error> {
        principal.require_admin()?;
        Ok(self.leads.list().await?)
    }
}
