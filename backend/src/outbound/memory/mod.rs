//! In-memory implementations of every repository port.
//!
//! Backs debug builds started without `database_url` and the integration
//! tests. All tables live behind one mutex, so a product transition and its
//! ledger entry become visible together exactly as they would after a
//! committed database transaction.

mod enquiries;
mod products;
mod users;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use mockable::Clock;

use crate::domain::{
    AdminProfile, ChatLead, Enquiry, Notification, Product, SellerProfile, User, UserAccount,
    UserId,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, StoredUser>,
    sellers: HashMap<UserId, SellerProfile>,
    admins: HashMap<UserId, AdminProfile>,
    products: BTreeMap<i64, Product>,
    notifications: BTreeMap<i64, Notification>,
    enquiries: Vec<Enquiry>,
    chat_leads: Vec<ChatLead>,
    next_user_seq: u64,
    next_product_id: i64,
    next_notification_id: i64,
    next_enquiry_id: i64,
    next_lead_id: i64,
}

/// A user row plus its insertion sequence, used to break `created_at` ties.
#[derive(Clone)]
struct StoredUser {
    seq: u64,
    user: User,
}

impl MemoryState {
    fn account(&self, id: &UserId) -> Option<UserAccount> {
        self.users.get(id).map(|stored| UserAccount {
            user: stored.user.clone(),
            seller: self.sellers.get(id).cloned(),
            admin: self.admins.get(id).cloned(),
        })
    }

    fn email_taken(&self, email: &str, except: Option<&UserId>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.email.as_ref() == email && Some(&stored.user.id) != except)
    }

    fn bump(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Shared handle to the in-memory tables.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            clock,
        }
    }

    /// Insert a complete account, replacing any account with the same id.
    ///
    /// The HTTP surface never creates administrators; deployments provision
    /// them directly in storage, and this is the in-memory equivalent.
    pub fn seed_account(&self, account: UserAccount) -> Result<(), String> {
        let mut state = self.lock()?;
        let id = account.user.id.clone();
        state.next_user_seq += 1;
        let seq = state.next_user_seq;
        state.users.insert(
            id.clone(),
            StoredUser {
                seq,
                user: account.user,
            },
        );
        match account.seller {
            Some(seller) => state.sellers.insert(id.clone(), seller),
            None => state.sellers.remove(&id),
        };
        match account.admin {
            Some(admin) => state.admins.insert(id, admin),
            None => state.admins.remove(&id),
        };
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

#[cfg(test)]
mod tests;
