//! Notification ledger handlers.
//!
//! ```text
//! GET   /api/v1/notifications[?userId=]
//! PATCH /api/v1/notifications/{id}/read
//! PATCH /api/v1/notifications/read-all[?userId=]
//! ```
//!
//! `userId` is only honoured for administrators; everyone else is scoped to
//! their own entries whatever they send.

use actix_web::{get, patch, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, Principal, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{MarkAllReadResponse, NotificationView};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_notification_id, parse_optional_user_id};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TargetUserQuery {
    /// Ledger owner to target; administrators only.
    pub user_id: Option<String>,
}

fn requested_user(principal: &Principal, query: &TargetUserQuery) -> Result<Option<UserId>, Error> {
    if !principal.is_admin() {
        return Ok(None);
    }
    parse_optional_user_id(query.user_id.as_deref(), FieldName::new("userId"))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(TargetUserQuery),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = [NotificationView]),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<TargetUserQuery>,
) -> ApiResult<web::Json<Vec<NotificationView>>> {
    let requested = requested_user(auth.principal(), &query)?;
    let entries = state
        .notifications
        .list(auth.principal(), requested)
        .await?;
    Ok(web::Json(entries.iter().map(NotificationView::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Entry marked read", body = NotificationView),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 403, description = "Entry belongs to someone else", body = ErrorSchema),
        (status = 404, description = "Unknown entry", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[patch("/notifications/{id}/read")]
pub async fn mark_read(
    auth: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<NotificationView>> {
    let id = parse_notification_id(path.into_inner())?;
    let entry = state.notifications.mark_read(auth.principal(), id).await?;
    Ok(web::Json(NotificationView::from(&entry)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/read-all",
    params(TargetUserQuery),
    responses(
        (status = 200, description = "Number of entries changed", body = MarkAllReadResponse),
        (status = 400, description = "Malformed user id", body = ErrorSchema),
        (status = 401, description = "Unauthenticated", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[patch("/notifications/read-all")]
pub async fn mark_all_read(
    auth: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<TargetUserQuery>,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let requested = requested_user(auth.principal(), &query)?;
    let updated = state
        .notifications
        .mark_all_read(auth.principal(), requested)
        .await?;
    Ok(web::Json(MarkAllReadResponse { updated }))
}
