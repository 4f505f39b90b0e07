//! Enquiries and chat leads over the in-memory tables.

use std::sync::MutexGuard;

use async_trait::async_trait;

use crate::domain::ports::{ChatLeadRepository, EnquiryPersistenceError, EnquiryRepository};
use crate::domain::{ChatLead, Enquiry, EnquiryFilter, NewChatLead, NewEnquiry};

use super::{InMemoryStore, MemoryState};

impl InMemoryStore {
    fn enquiries(&self) -> Result<MutexGuard<'_, MemoryState>, EnquiryPersistenceError> {
        self.lock().map_err(EnquiryPersistenceError::query)
    }
}

fn visible(state: &MemoryState, filter: &EnquiryFilter, enquiry: &Enquiry) -> bool {
    match filter {
        EnquiryFilter::All => true,
        EnquiryFilter::Product(product) => enquiry.product_id == *product,
        EnquiryFilter::User(user) => &enquiry.user_id == user,
        EnquiryFilter::Seller(seller) => state
            .products
            .get(&enquiry.product_id.get())
            .is_some_and(|product| product.is_owned_by(seller)),
    }
}

#[async_trait]
impl EnquiryRepository for InMemoryStore {
    async fn create(&self, enquiry: &NewEnquiry) -> Result<Enquiry, EnquiryPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.enquiries()?;
        if !state.products.contains_key(&enquiry.product_id.get()) {
            return Err(EnquiryPersistenceError::product_not_found(
                enquiry.product_id.get(),
            ));
        }
        let stored = Enquiry {
            id: MemoryState::bump(&mut state.next_enquiry_id),
            user_id: enquiry.user_id.clone(),
            product_id: enquiry.product_id,
            message: enquiry.message.clone(),
            created_at: now,
        };
        state.enquiries.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, filter: &EnquiryFilter) -> Result<Vec<Enquiry>, EnquiryPersistenceError> {
        let state = self.enquiries()?;
        Ok(state
            .enquiries
            .iter()
            .rev()
            .filter(|enquiry| visible(&state, filter, enquiry))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChatLeadRepository for InMemoryStore {
    async fn create(&self, lead: &NewChatLead) -> Result<ChatLead, EnquiryPersistenceError> {
        let now = self.clock.utc();
        let mut state = self.enquiries()?;
        let stored = ChatLead {
            id: MemoryState::bump(&mut state.next_lead_id),
            company_name: lead.company_name.clone(),
            user_name: lead.user_name.clone(),
            phone_number: lead.phone_number.clone(),
            created_at: now,
        };
        state.chat_leads.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<ChatLead>, EnquiryPersistenceError> {
        Ok(self.enquiries()?.chat_leads.iter().rev().cloned().collect())
    }
}
