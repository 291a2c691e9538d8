//! Maintenance request model and status machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{equipment::EquipmentSummary, team::TeamSummary, user::UserSummary};
use crate::error::{AppError, AppResult};

/// Request status.
///
/// Any status may be set from any other; `Repaired` and `Scrap` only close the
/// request for overdue/open accounting and stay editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    New,
    InProgress,
    Repaired,
    Scrap,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::New,
        RequestStatus::InProgress,
        RequestStatus::Repaired,
        RequestStatus::Scrap,
    ];
    pub const OPEN: [RequestStatus; 2] = [RequestStatus::New, RequestStatus::InProgress];
    pub const CLOSED: [RequestStatus; 2] = [RequestStatus::Repaired, RequestStatus::Scrap];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Repaired => "repaired",
            RequestStatus::Scrap => "scrap",
        }
    }

    pub fn is_closed(&self) -> bool {
        Self::CLOSED.contains(self)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid request status: {}", s))
    }
}

text_enum_sqlx!(RequestStatus);

/// Request type, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Corrective,
    Preventive,
}

impl RequestType {
    pub const ALL: [RequestType; 2] = [RequestType::Corrective, RequestType::Preventive];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Corrective => "corrective",
            RequestType::Preventive => "preventive",
        }
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "corrective" => Ok(RequestType::Corrective),
            "preventive" => Ok(RequestType::Preventive),
            _ => Err(format!("Invalid request type: {}", s)),
        }
    }
}

text_enum_sqlx!(RequestType);

/// True iff `now` is past the schedule and the request is not closed.
/// Never stored; computed wherever requests are read.
pub fn is_overdue(
    now: DateTime<Utc>,
    scheduled_date: DateTime<Utc>,
    status: RequestStatus,
) -> bool {
    now > scheduled_date && !status.is_closed()
}

/// Maintenance request record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub subject: String,
    pub equipment_id: Uuid,
    pub request_type: RequestType,
    /// Resolved from the equipment's team name at creation, never re-resolved
    pub team_id: Uuid,
    pub assigned_technician_id: Option<Uuid>,
    pub status: RequestStatus,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        is_overdue(now, self.scheduled_date, self.status)
    }
}

/// Request with references resolved for display. Dangling references are `null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: Uuid,
    pub subject: String,
    pub equipment: Option<EquipmentSummary>,
    pub request_type: RequestType,
    pub maintenance_team: Option<TeamSummary>,
    pub assigned_technician: Option<UserSummary>,
    pub status: RequestStatus,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_overdue: bool,
}

/// Create request payload. The team is never supplied by the caller.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub subject: Option<String>,
    /// Equipment id
    pub equipment: Option<Uuid>,
    pub request_type: Option<RequestType>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_optional")]
    #[schema(value_type = Option<String>, example = "2024-01-01T10:30")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
}

/// Caller-supplied fields of a request, validated
#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub subject: String,
    pub equipment_id: Uuid,
    pub request_type: RequestType,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
}

impl CreateRequest {
    pub fn validate(self) -> AppResult<RequestDraft> {
        let missing = || AppError::Validation("Please add all required fields".to_string());
        let draft = RequestDraft {
            subject: super::non_blank(self.subject).ok_or_else(missing)?,
            equipment_id: self.equipment.ok_or_else(missing)?,
            request_type: self.request_type.ok_or_else(missing)?,
            scheduled_date: self.scheduled_date.ok_or_else(missing)?,
            duration: self.duration.ok_or_else(missing)?,
        };
        validate_duration(draft.duration)?;
        Ok(draft)
    }
}

pub(crate) fn validate_duration(duration: f64) -> AppResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation("Duration must be a positive number".to_string()))
    }
}

/// Insert payload for the requests store
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub subject: String,
    pub equipment_id: Uuid,
    pub request_type: RequestType,
    pub team_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub created_by: Uuid,
}

impl NewRequest {
    pub fn new(draft: RequestDraft, team_id: Uuid, created_by: Uuid) -> Self {
        Self {
            subject: draft.subject,
            equipment_id: draft.equipment_id,
            request_type: draft.request_type,
            team_id,
            scheduled_date: draft.scheduled_date,
            duration: draft.duration,
            created_by,
        }
    }
}

/// Partial request update
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub status: Option<RequestStatus>,
    pub assigned_technician: Option<Uuid>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_optional")]
    #[schema(value_type = Option<String>, example = "2024-01-01T10:30")]
    pub scheduled_date: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
}

impl UpdateRequest {
    pub fn is_scrap(&self) -> bool {
        self.status == Some(RequestStatus::Scrap)
    }
}
