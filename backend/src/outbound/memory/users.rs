//! `UserRepository` over the in-memory tables.

use async_trait::async_trait;

use crate::domain::ports::{SellerProfileChange, UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUser, PasswordDigest, ProfileUpdate, RoleState, SellerProfile, User,
    UserAccount, UserId,
};

use super::{InMemoryStore, MemoryState, StoredUser};

impl InMemoryStore {
    fn users(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, UserPersistenceError> {
        self.lock().map_err(UserPersistenceError::query)
    }
}

fn missing(id: &UserId) -> UserPersistenceError {
    UserPersistenceError::not_found(id.as_ref())
}

fn apply_seller_change(state: &mut MemoryState, id: &UserId, change: SellerProfileChange) {
    let profile = state
        .sellers
        .entry(id.clone())
        .or_insert_with(|| SellerProfile {
            user_id: id.clone(),
            business_desc: String::new(),
            business_type: String::new(),
            verification_doc_url: None,
        });
    match change {
        SellerProfileChange::Replace {
            business_desc,
            business_type,
            verification_doc_url,
        } => {
            profile.business_desc = business_desc;
            profile.business_type = business_type;
            profile.verification_doc_url = Some(verification_doc_url);
        }
        SellerProfileChange::Document {
            verification_doc_url,
        } => profile.verification_doc_url = Some(verification_doc_url),
        SellerProfileChange::EnsureExists => {}
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.users()?;
        if state.email_taken(new_user.email.as_ref(), None) {
            return Err(UserPersistenceError::duplicate_email(new_user.email.as_ref()));
        }
        let initial = RoleState::initial();
        let user = User {
            id: UserId::random(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_digest: new_user.password_digest.clone(),
            role: initial.role(),
            is_email_verified: false,
            is_document_verified: initial.is_document_verified(),
            address: new_user.address.clone(),
            country_code: new_user.country_code.clone(),
            phone_number: new_user.phone_number.clone(),
            profile_pic_url: None,
            created_at: self.clock.utc(),
        };
        state.next_user_seq += 1;
        let seq = state.next_user_seq;
        state.users.insert(
            user.id.clone(),
            StoredUser {
                seq,
                user: user.clone(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users()?.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users()?
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_account(
        &self,
        id: &UserId,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.users()?.account(id))
    }

    async fn list_accounts(&self) -> Result<Vec<UserAccount>, UserPersistenceError> {
        let state = self.users()?;
        let mut stored: Vec<&StoredUser> = state.users.values().collect();
        stored.sort_by(|a, b| {
            b.user
                .created_at
                .cmp(&a.user.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(stored
            .into_iter()
            .filter_map(|s| state.account(&s.user.id))
            .collect())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, UserPersistenceError> {
        let mut state = self.users()?;
        if let Some(email) = &update.email {
            if state.email_taken(email.as_ref(), Some(id)) {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }
        let stored = state.users.get_mut(id).ok_or_else(|| missing(id))?;
        let user = &mut stored.user;
        if let Some(name) = &update.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(address) = &update.address {
            user.address.clone_from(address);
        }
        if let Some(code) = &update.country_code {
            user.country_code = Some(code.clone());
        }
        if let Some(phone) = &update.phone_number {
            user.phone_number = Some(phone.clone());
        }
        if let Some(url) = &update.profile_pic_url {
            user.profile_pic_url = Some(url.clone());
        }
        if let (Some(fields), Some(profile)) = (&update.seller, state.sellers.get_mut(id)) {
            if let Some(desc) = &fields.business_desc {
                profile.business_desc.clone_from(desc);
            }
            if let Some(kind) = &fields.business_type {
                profile.business_type.clone_from(kind);
            }
        }
        state.account(id).ok_or_else(|| missing(id))
    }

    async fn set_password_digest(
        &self,
        id: &UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.users()?;
        let stored = state.users.get_mut(id).ok_or_else(|| missing(id))?;
        stored.user.password_digest = digest.clone();
        Ok(())
    }

    async fn mark_email_verified(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.users()?;
        let stored = state.users.get_mut(id).ok_or_else(|| missing(id))?;
        stored.user.is_email_verified = true;
        Ok(())
    }

    async fn apply_role_state(
        &self,
        id: &UserId,
        role_state: RoleState,
        seller: SellerProfileChange,
    ) -> Result<UserAccount, UserPersistenceError> {
        let mut state = self.users()?;
        let stored = state.users.get_mut(id).ok_or_else(|| missing(id))?;
        stored.user.role = role_state.role();
        stored.user.is_document_verified = role_state.is_document_verified();
        apply_seller_change(&mut state, id, seller);
        state.account(id).ok_or_else(|| missing(id))
    }

    async fn delete_account(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.users()?;
        if state.users.remove(id).is_none() {
            return Err(missing(id));
        }
        state.sellers.remove(id);
        state.admins.remove(id);
        for product in state.products.values_mut() {
            if product.is_owned_by(id) {
                product.seller_user_id = None;
                product.owner_deleted = true;
            }
        }
        Ok(())
    }
}
