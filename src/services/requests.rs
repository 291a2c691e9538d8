//! Maintenance request lifecycle

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{equipment::EquipmentService, teams::TeamsService, users::UsersService};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::EquipmentSummary,
        principal::{Action, Principal},
        request::{
            validate_duration, CreateRequest, MaintenanceRequest, NewRequest, RequestView,
            UpdateRequest,
        },
        team::TeamSummary,
    },
    repository::{RequestFilter, Repository},
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
    users: UsersService,
    equipment: EquipmentService,
    teams: TeamsService,
}

impl RequestsService {
    pub fn new(
        repository: Repository,
        users: UsersService,
        equipment: EquipmentService,
        teams: TeamsService,
    ) -> Self {
        Self {
            repository,
            users,
            equipment,
            teams,
        }
    }

    /// File a request against a piece of equipment.
    ///
    /// The owning team comes from the equipment's team name and is resolved
    /// once, here.
    pub async fn create(
        &self,
        caller: &Principal,
        data: CreateRequest,
    ) -> AppResult<MaintenanceRequest> {
        caller.authorize(Action::CreateRequest, None)?;

        let draft = data.validate()?;

        let equipment = self
            .repository
            .equipment
            .get_by_id(draft.equipment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))?;

        let team = self
            .teams
            .find_by_name(&equipment.maintenance_team)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Maintenance team '{}' for this equipment not found in system",
                    equipment.maintenance_team
                ))
            })?;

        let request = self
            .repository
            .requests
            .create(&NewRequest::new(draft, team.id, caller.id))
            .await?;

        tracing::info!(
            request_id = %request.id,
            equipment_id = %request.equipment_id,
            team = %team.team_name,
            "Maintenance request created"
        );
        Ok(request)
    }

    pub async fn list(&self, caller: &Principal) -> AppResult<Vec<RequestView>> {
        caller.authorize(Action::ListRequests, None)?;

        let requests = self.repository.requests.list(&RequestFilter::all()).await?;
        self.views(requests, Utc::now()).await
    }

    /// Partial update by an admin or a member of the request's team.
    ///
    /// Moving to `scrap` also flags the equipment as scrapped. That step is
    /// best-effort: its failure is logged and the status change still goes through.
    pub async fn update(
        &self,
        caller: &Principal,
        id: Uuid,
        data: UpdateRequest,
    ) -> AppResult<MaintenanceRequest> {
        let request = self.get_by_id(id).await?;

        let team = self.repository.teams.get_by_id(request.team_id).await?;
        caller.authorize(Action::UpdateRequest, team.as_ref())?;

        if let Some(duration) = data.duration {
            validate_duration(duration)?;
        }

        if data.is_scrap() {
            match self.equipment.mark_scrapped(request.equipment_id).await {
                Ok(true) => {
                    tracing::info!(equipment_id = %request.equipment_id, "Equipment scrapped")
                }
                Ok(false) => tracing::warn!(
                    equipment_id = %request.equipment_id,
                    "Scrapped request references missing equipment"
                ),
                Err(e) => tracing::warn!(
                    equipment_id = %request.equipment_id,
                    error = %e,
                    "Failed to mark equipment as scrapped"
                ),
            }
        }

        let updated = self
            .repository
            .requests
            .update(id, &data)
            .await?
            .ok_or_else(not_found)?;

        if updated.status != request.status {
            tracing::info!(
                request_id = %id,
                from = %request.status,
                to = %updated.status,
                "Request status changed"
            );
        }
        Ok(updated)
    }

    pub async fn delete(&self, caller: &Principal, id: Uuid) -> AppResult<()> {
        self.get_by_id(id).await?;
        caller.authorize(Action::DeleteRequest, None)?;

        if !self.repository.requests.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!(request_id = %id, "Maintenance request deleted");
        Ok(())
    }

    /// Resolve references for display and compute `isOverdue` against `now`.
    /// Dangling references become `None`.
    pub async fn views(
        &self,
        requests: Vec<MaintenanceRequest>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RequestView>> {
        let equipment_ids: Vec<Uuid> = requests.iter().map(|r| r.equipment_id).collect();
        let team_ids: Vec<Uuid> = requests.iter().map(|r| r.team_id).collect();
        let user_ids: Vec<Uuid> = requests
            .iter()
            .flat_map(|r| r.assigned_technician_id.into_iter().chain([r.created_by]))
            .collect();

        let equipment: HashMap<Uuid, EquipmentSummary> = self
            .repository
            .equipment
            .get_by_ids(&equipment_ids)
            .await?
            .iter()
            .map(|e| (e.id, EquipmentSummary::from(e)))
            .collect();
        let teams: HashMap<Uuid, TeamSummary> = self
            .repository
            .teams
            .get_by_ids(&team_ids)
            .await?
            .iter()
            .map(|t| (t.id, TeamSummary::from(t)))
            .collect();
        let users = self.users.summaries(&user_ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| RequestView {
                is_overdue: r.is_overdue_at(now),
                equipment: equipment.get(&r.equipment_id).cloned(),
                maintenance_team: teams.get(&r.team_id).cloned(),
                assigned_technician: r
                    .assigned_technician_id
                    .and_then(|id| users.get(&id).cloned()),
                created_by: users.get(&r.created_by).cloned(),
                id: r.id,
                subject: r.subject,
                request_type: r.request_type,
                status: r.status,
                scheduled_date: r.scheduled_date,
                duration: r.duration,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceRequest> {
        self.repository
            .requests
            .get_by_id(id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Request not found".to_string())
}
