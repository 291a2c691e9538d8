//! Maintenance team endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::team::{CreateTeam, Team, TeamView, UpdateTeam},
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// List teams with their technicians
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Team list", body = Vec<TeamView>)
    )
)]
pub async fn list_teams(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<TeamView>>> {
    let teams = state.services.teams.list(&principal).await?;
    Ok(Json(teams))
}

/// Create a team
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Missing name or unknown technician"),
        (status = 409, description = "Team already exists")
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    JsonBody(data): JsonBody<CreateTeam>,
) -> AppResult<(StatusCode, Json<Team>)> {
    let team = state.services.teams.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Update a team
#[utoipa::path(
    put,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = UpdateTeam,
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 400, description = "Unknown technician"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn update_team(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    JsonBody(data): JsonBody<UpdateTeam>,
) -> AppResult<Json<Team>> {
    let team = state.services.teams.update(&principal, id, data).await?;
    Ok(Json(team))
}
