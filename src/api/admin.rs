//! Admin endpoints: user roles, dashboard and reports

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        report::{CalendarQuery, DashboardStats, PeriodReport, ReportQuery},
        request::RequestView,
        user::{UpdateRole, User},
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// List stored users
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list", body = Vec<User>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list(&principal).await?;
    Ok(Json(users))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRole,
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Role cannot be granted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    JsonBody(data): JsonBody<UpdateRole>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update_role(&principal, id, data.role).await?;
    Ok(Json(user))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/admin/dashboard-stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.reports.dashboard(&principal).await?;
    Ok(Json(stats))
}

/// Overdue requests, earliest first
#[utoipa::path(
    get,
    path = "/admin/overdue-requests",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue requests", body = Vec<RequestView>)
    )
)]
pub async fn overdue_requests(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestView>>> {
    let requests = state.services.reports.overdue(&principal).await?;
    Ok(Json(requests))
}

/// Requests scheduled inside a window
#[utoipa::path(
    get,
    path = "/admin/calendar",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Scheduled requests", body = Vec<RequestView>),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn calendar(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<RequestView>>> {
    let requests = state.services.reports.calendar(&principal, query).await?;
    Ok(Json(requests))
}

/// Breakdown of requests created inside a window
#[utoipa::path(
    get,
    path = "/admin/reports",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses(
        (status = 200, description = "Period report", body = PeriodReport),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn reports(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PeriodReport>> {
    let report = state.services.reports.report(&principal, query).await?;
    Ok(Json(report))
}
