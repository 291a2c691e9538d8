//! Maintenance team model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserSummary;

/// Maintenance team record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    /// Globally unique
    pub team_name: String,
    /// Member user ids, in insertion order and without duplicates
    pub technicians: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.technicians.contains(&user_id)
    }
}

/// Team with technicians resolved for display
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: Uuid,
    pub team_name: String,
    pub technicians: Vec<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to a team as shown inside a maintenance request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: Uuid,
    pub team_name: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            team_name: team.team_name.clone(),
        }
    }
}

/// Create team request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeam {
    pub team_name: Option<String>,
    pub technicians: Option<Vec<Uuid>>,
}

/// Update team request. `technicians`, when present, replaces the whole membership.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeam {
    pub team_name: Option<String>,
    pub technicians: Option<Vec<Uuid>>,
}

/// Collapse repeated ids, keeping first-occurrence order
pub fn dedup_members(ids: &[Uuid]) -> Vec<Uuid> {
    let mut members = Vec::with_capacity(ids.len());
    for id in ids {
        if !members.contains(id) {
            members.push(*id);
        }
    }
    members
}
