//! Maintenance request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::request::{CreateRequest, MaintenanceRequest, RequestView, UpdateRequest},
    AppState,
};

use super::{AuthenticatedUser, JsonBody, MessageResponse};

/// List requests with references resolved and the overdue flag computed
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request list", body = Vec<RequestView>)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<RequestView>>> {
    let requests = state.services.requests.list(&principal).await?;
    Ok(Json(requests))
}

/// File a maintenance request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = MaintenanceRequest),
        (status = 400, description = "Missing fields or unknown maintenance team"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateRequest>,
) -> AppResult<(StatusCode, Json<MaintenanceRequest>)> {
    let request = state.services.requests.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Update a request (admin or team member)
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = MaintenanceRequest),
        (status = 403, description = "Not a member of the request's team"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    JsonBody(data): JsonBody<UpdateRequest>,
) -> AppResult<Json<MaintenanceRequest>> {
    let request = state.services.requests.update(&principal, id, data).await?;
    Ok(Json(request))
}

/// Delete a request (admin only)
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.requests.delete(&principal, id).await?;
    Ok(Json(MessageResponse::new("Request deleted successfully")))
}
