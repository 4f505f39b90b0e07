//! Account use cases: signup, login, email confirmation, profile edits,
//! seller verification and account removal.
//!
//! Every role change goes through [`RoleState`]; this service never writes
//! `role` or `is_document_verified` directly. Emails are dispatched after
//! the persistent write and never affect the outcome.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    Mailer, PasswordHasher, SellerProfileChange, TokenService, UserRepository,
};
use crate::domain::{
    EmailLinks, Error, LoginCredentials, LoginSurface, NewUser, PasswordChange, Principal,
    ProfileUpdate, Role, RoleState, RoleTransitionError, SellerStatus,
    SignupForm, TokenClaims, User, UserAccount, UserId, VerificationSubmission,
    confirmation_email, ensure_surface_admits, password_changed_email, seller_status,
    welcome_email,
};

/// Token plus the account it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub account: UserAccount,
}

pub(crate) const INVALID_CONFIRMATION: &str = "Invalid or expired token. Please register again.";
pub(crate) const ALREADY_CONFIRMED: &str = "Email is already confirmed";

/// Collaborators of [`AccountService`].
#[derive(Clone)]
pub struct AccountDeps {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Account lifecycle and role-transition use cases.
#[derive(Clone)]
pub struct AccountService {
    deps: AccountDeps,
    links: EmailLinks,
}

fn not_found() -> Error {
    Error::not_found("User not found")
}

fn transition_error(err: RoleTransitionError) -> Error {
    match err {
        RoleTransitionError::AdministratorCannotSell => Error::conflict(err.to_string()),
    }
}

impl AccountService {
    pub fn new(deps: AccountDeps, links: EmailLinks) -> Self {
        Self { deps, links }
    }

    async fn load_user(&self, id: &UserId) -> Result<User, Error> {
        self.deps
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)
    }

    fn issue(&self, user: &User) -> Result<String, Error> {
        let claims = TokenClaims {
            subject: user.id.clone(),
            role: user.role,
        };
        Ok(self.deps.tokens.issue(&claims)?)
    }

    /// Register a new USER and send the confirmation link.
    pub async fn signup(&self, form: SignupForm) -> Result<AuthSession, Error> {
        let digest = self.deps.hasher.hash(form.password.as_str()).await?;
        let user = self
            .deps
            .users
            .create(&NewUser {
                name: form.name,
                email: form.email,
                password_digest: digest,
                address: form.address,
                country_code: form.country_code,
                phone_number: form.phone_number,
            })
            .await?;
        let token = self.issue(&user)?;
        info!(user_id = %user.id, "user signed up");

        self.deps
            .mailer
            .dispatch(confirmation_email(&user, &self.links.confirmation(&token)));
        Ok(AuthSession {
            token,
            account: UserAccount::plain(user),
        })
    }

    /// Authenticate through `surface`.
    ///
    /// Checks run in a fixed order: account lookup (404), surface predicate
    /// (403), password (401), confirmed email (403).
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
        surface: LoginSurface,
    ) -> Result<AuthSession, Error> {
        let user = self
            .deps
            .users
            .find_by_email(credentials.email())
            .await?
            .ok_or_else(not_found)?;

        ensure_surface_admits(surface, user.role)?;

        if !self
            .deps
            .hasher
            .verify(credentials.password(), &user.password_digest)
            .await?
        {
            return Err(Error::unauthorized("Invalid credentials"));
        }
        if !user.is_email_verified {
            return Err(Error::forbidden("Please confirm your email before logging in"));
        }

        let account = match user.role {
            Role::User => UserAccount::plain(user),
            Role::Seller | Role::Admin => self
                .deps
                .users
                .find_account(&user.id)
                .await?
                .ok_or_else(not_found)?,
        };
        let token = self.issue(&account.user)?;
        info!(user_id = %account.user.id, role = %account.user.role, "user logged in");
        Ok(AuthSession { token, account })
    }

    /// Consume a confirmation token and flip `is_email_verified`.
    pub async fn confirm_email(&self, token: &str) -> Result<(), Error> {
        let claims = self
            .deps
            .tokens
            .validate(token)
            .map_err(|_| Error::invalid_request(INVALID_CONFIRMATION))?;
        let user = self.load_user(&claims.subject).await?;
        if user.is_email_verified {
            return Err(Error::invalid_request(ALREADY_CONFIRMED));
        }
        self.deps.users.mark_email_verified(&user.id).await?;
        info!(user_id = %user.id, "email confirmed");
        self.deps.mailer.dispatch(welcome_email(&user));
        Ok(())
    }

    /// Apply a partial profile update for the caller.
    ///
    /// Seller fields are silently dropped unless the caller is a seller.
    pub async fn update_profile(
        &self,
        principal: &Principal,
        mut update: ProfileUpdate,
    ) -> Result<UserAccount, Error> {
        if principal.role() != Role::Seller {
            update.seller = None;
        }
        let account = self
            .deps
            .users
            .update_profile(principal.user_id(), &update)
            .await?;
        Ok(account)
    }

    /// Self-service seller verification; only plain users may submit.
    ///
    /// A user whose document an admin approved after their token was issued
    /// may still complete the business details once. Whichever of the two
    /// paths runs first, the account ends as the same verified seller.
    pub async fn submit_verification(
        &self,
        principal: &Principal,
        submission: VerificationSubmission,
    ) -> Result<UserAccount, Error> {
        principal.require_role(&[Role::User])?;
        let account = self
            .deps
            .users
            .find_account(principal.user_id())
            .await?
            .ok_or_else(not_found)?;
        let details_missing = account
            .seller
            .as_ref()
            .is_none_or(|profile| !profile.has_business_details());
        match seller_status(&account.user, account.seller.as_ref()) {
            SellerStatus::PlainUser | SellerStatus::PendingVerification => {}
            SellerStatus::Seller if details_missing => {}
            SellerStatus::Seller | SellerStatus::Administrator => {
                return Err(Error::forbidden("Only users may request seller verification"));
            }
        }
        let user = account.user;
        let state = RoleState::of(&user)
            .promote_to_seller()
            .map_err(transition_error)?;
        let account = self
            .deps
            .users
            .apply_role_state(
                &user.id,
                state,
                SellerProfileChange::Replace {
                    business_desc: submission.business_desc,
                    business_type: submission.business_type,
                    verification_doc_url: submission.verification_doc_url,
                },
            )
            .await?;
        info!(user_id = %user.id, "user promoted to seller by verification");
        Ok(account)
    }

    /// Admin confirmation of a seller document. Idempotent.
    pub async fn approve_document(
        &self,
        principal: &Principal,
        target: &UserId,
    ) -> Result<UserAccount, Error> {
        principal.require_admin()?;
        let user = self.load_user(target).await?;
        let state = RoleState::of(&user)
            .promote_to_seller()
            .map_err(transition_error)?;
        let account = self
            .deps
            .users
            .apply_role_state(&user.id, state, SellerProfileChange::EnsureExists)
            .await?;
        info!(user_id = %user.id, admin_id = %principal.user_id(), "seller document approved");
        Ok(account)
    }

    /// Replace the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        principal: &Principal,
        change: PasswordChange,
    ) -> Result<(), Error> {
        let user = self.load_user(principal.user_id()).await?;
        if !self
            .deps
            .hasher
            .verify(change.current(), &user.password_digest)
            .await?
        {
            return Err(Error::unauthorized("Current password is incorrect"));
        }
        let digest = self.deps.hasher.hash(change.replacement()).await?;
        self.deps.users.set_password_digest(&user.id, &digest).await?;
        info!(user_id = %user.id, "password changed");
        self.deps
            .mailer
            .dispatch(password_changed_email(&user, self.deps.clock.utc()));
        Ok(())
    }

    /// Delete the caller's account. Owned products are retained.
    pub async fn delete_account(&self, principal: &Principal) -> Result<(), Error> {
        let id = principal.user_id();
        self.deps.users.delete_account(id).await.map_err(|err| {
            warn!(user_id = %id, error = %err, "account deletion failed");
            Error::from(err)
        })?;
        info!(user_id = %id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
