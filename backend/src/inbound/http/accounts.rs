//! Account handlers: signup, login, profile, verification, password and
//! account removal, plus the email confirmation link.
//!
//! ```text
//! POST   /api/v1/auth/signup
//! POST   /api/v1/auth/login            (X-Frontend-Type: admin)
//! POST   /api/v1/auth/update-profile
//! POST   /api/v1/auth/verify
//! POST   /api/v1/auth/change-password
//! DELETE /api/v1/auth
//! GET    /confirm?token=...
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AccountValidationError, AuthSession, EmailAddress, LoginCredentials, LoginSurface,
    PasswordChange, ProfileUpdate, SellerFieldsUpdate, SignupFields, SignupForm,
    UserValidationError, VerificationSubmission,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{AccountView, AuthResponse, MessageResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, account_error, missing_field_error};

/// Header selecting the login surface.
pub const FRONTEND_TYPE_HEADER: &str = "x-frontend-type";

const EMAIL_CONFIRMED: &str = "Email confirmed! You may now log in.";

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignupRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
}

impl TryFrom<&SignupRequest> for SignupForm {
    type Error = AccountValidationError;

    fn try_from(value: &SignupRequest) -> Result<Self, Self::Error> {
        Self::try_from_fields(SignupFields {
            name: value.name.as_deref(),
            email: value.email.as_deref(),
            password: value.password.as_deref(),
            address: value.address.as_deref(),
            country_code: value.country_code.as_deref(),
            phone_number: value.phone_number.as_deref(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial profile update; absent or blank fields are left untouched.
/// `businessDesc`/`businessType` only apply to sellers.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub profile_pic_url: Option<String>,
    pub business_desc: Option<String>,
    pub business_type: Option<String>,
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
}

impl TryFrom<&UpdateProfileRequest> for ProfileUpdate {
    type Error = AccountValidationError;

    fn try_from(value: &UpdateProfileRequest) -> Result<Self, Self::Error> {
        let email = present(value.email.as_ref())
            .map(|raw| {
                EmailAddress::new(raw).map_err(|err| match err {
                    UserValidationError::EmptyEmail => {
                        AccountValidationError::MissingField { field: "email" }
                    }
                    _ => AccountValidationError::InvalidEmail,
                })
            })
            .transpose()?;
        let seller = SellerFieldsUpdate {
            business_desc: present(value.business_desc.as_ref()),
            business_type: present(value.business_type.as_ref()),
        };
        Ok(Self {
            name: present(value.name.as_ref()),
            email,
            address: present(value.address.as_ref()),
            country_code: present(value.country_code.as_ref()),
            phone_number: present(value.phone_number.as_ref()),
            profile_pic_url: present(value.profile_pic_url.as_ref()),
            seller: (!seller.is_empty()).then_some(seller),
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyRequest {
    pub business_desc: Option<String>,
    pub business_type: Option<String>,
    pub verification_doc_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConfirmQuery {
    /// Token from the confirmation email.
    pub token: Option<String>,
}

fn auth_response(session: AuthSession) -> AuthResponse {
    AuthResponse {
        token: session.token,
        user: AccountView::from(&session.account),
    }
}

/// Register a new user and send the confirmation email.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let form = SignupForm::try_from(&payload.into_inner()).map_err(account_error)?;
    let session = state.accounts.signup(form).await?;
    Ok(HttpResponse::Created().json(auth_response(session)))
}

/// Sign in through the storefront, or the admin console when
/// `X-Frontend-Type: admin` is present.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    params(
        ("X-Frontend-Type" = Option<String>, Header, description = "`admin` selects the admin console surface")
    ),
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Wrong password", body = ErrorSchema),
        (status = 403, description = "Wrong surface or unconfirmed email", body = ErrorSchema),
        (status = 404, description = "Unknown email", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials =
        LoginCredentials::try_from_parts(payload.email.as_deref(), payload.password.as_deref())
            .map_err(account_error)?;
    let surface = LoginSurface::from_header(
        req.headers()
            .get(FRONTEND_TYPE_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    let session = state.accounts.login(&credentials, surface).await?;
    Ok(web::Json(auth_response(session)))
}

/// Update the caller's profile.
#[utoipa::path(
    post,
    path = "/api/v1/auth/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[post("/auth/update-profile")]
pub async fn update_profile(
    auth: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<AccountView>> {
    let update = ProfileUpdate::try_from(&payload.into_inner()).map_err(account_error)?;
    let account = state
        .accounts
        .update_profile(auth.principal(), update)
        .await?;
    Ok(web::Json(AccountView::from(&account)))
}

/// Submit seller verification details; promotes a USER to SELLER.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Seller account", body = AccountView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 403, description = "Caller is not a plain user", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "submitVerification"
)]
#[post("/auth/verify")]
pub async fn verify(
    auth: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<VerifyRequest>,
) -> ApiResult<web::Json<AccountView>> {
    let submission = VerificationSubmission::try_from_parts(
        payload.business_desc.as_deref(),
        payload.business_type.as_deref(),
        payload.verification_doc_url.as_deref(),
    )
    .map_err(account_error)?;
    let account = state
        .accounts
        .submit_verification(auth.principal(), submission)
        .await?;
    Ok(web::Json(AccountView::from(&account)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Current password is incorrect", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[post("/auth/change-password")]
pub async fn change_password(
    auth: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let change = PasswordChange::try_from_parts(
        payload.current_password.as_deref(),
        payload.new_password.as_deref(),
    )
    .map_err(account_error)?;
    state
        .accounts
        .change_password(auth.principal(), change)
        .await?;
    Ok(web::Json(MessageResponse::new("Password changed successfully")))
}

/// Delete the caller's account. Owned products stay listed as orphaned.
#[utoipa::path(
    delete,
    path = "/api/v1/auth",
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthenticated", body = ErrorSchema),
        (status = 404, description = "Account already gone", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "deleteAccount"
)]
#[delete("/auth")]
pub async fn delete_account(
    auth: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.accounts.delete_account(auth.principal()).await?;
    Ok(web::Json(MessageResponse::new("Account deleted successfully")))
}

/// Target of the confirmation link; answers with plain text.
#[utoipa::path(
    get,
    path = "/confirm",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Email confirmed", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing, invalid or already used token", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "confirmEmail",
    security([])
)]
#[get("/confirm")]
pub async fn confirm(
    state: web::Data<HttpState>,
    query: web::Query<ConfirmQuery>,
) -> ApiResult<HttpResponse> {
    let token = query
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new("token")))?;
    state.accounts.confirm_email(token).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(EMAIL_CONFIRMED))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
