//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{non_blank, user::UserSummary};
use crate::error::{AppError, AppResult};

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    /// Globally unique
    pub serial_number: String,
    pub department: String,
    pub assigned_user_id: Option<Uuid>,
    /// Name of the owning maintenance team, resolved by name when a request is filed
    pub maintenance_team: String,
    pub location: String,
    pub purchase_date: NaiveDate,
    pub warranty_date: NaiveDate,
    pub is_scrapped: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Equipment with its assigned user resolved for display
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentView {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub assigned_user: Option<UserSummary>,
}

/// Reference to equipment as shown inside a maintenance request
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub department: String,
    pub location: String,
}

impl From<&Equipment> for EquipmentSummary {
    fn from(e: &Equipment) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            serial_number: e.serial_number.clone(),
            department: e.department.clone(),
            location: e.location.clone(),
        }
    }
}

/// Create equipment request
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub department: Option<String>,
    pub maintenance_team: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_date: Option<NaiveDate>,
}

/// Validated insert payload for the equipment store
#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub name: String,
    pub serial_number: String,
    pub department: String,
    pub maintenance_team: String,
    pub location: String,
    pub purchase_date: NaiveDate,
    pub warranty_date: NaiveDate,
}

impl CreateEquipment {
    /// Every field is required; blank strings count as missing.
    pub fn validate(self) -> AppResult<NewEquipment> {
        let missing = || AppError::Validation("Please add all required fields".to_string());
        Ok(NewEquipment {
            name: non_blank(self.name).ok_or_else(missing)?,
            serial_number: non_blank(self.serial_number).ok_or_else(missing)?,
            department: non_blank(self.department).ok_or_else(missing)?,
            maintenance_team: non_blank(self.maintenance_team).ok_or_else(missing)?,
            location: non_blank(self.location).ok_or_else(missing)?,
            purchase_date: self.purchase_date.ok_or_else(missing)?,
            warranty_date: self.warranty_date.ok_or_else(missing)?,
        })
    }
}

/// Partial equipment update. Omitted fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub department: Option<String>,
    pub maintenance_team: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_date: Option<NaiveDate>,
    /// Omitted: unchanged. `null` or `""`: cleared.
    #[serde(default, deserialize_with = "clearable")]
    #[schema(value_type = Option<String>)]
    pub assigned_user: Option<Option<Uuid>>,
}

impl UpdateEquipment {
    /// Blank text values are treated as omitted
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            serial_number: non_blank(self.serial_number),
            department: non_blank(self.department),
            maintenance_team: non_blank(self.maintenance_team),
            location: non_blank(self.location),
            ..self
        }
    }
}

/// Distinguishes an omitted field (`None`, via `#[serde(default)]`) from an
/// explicit clear (`Some(None)`).
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Some(None)),
        Some(s) => s
            .parse()
            .map(|id| Some(Some(id)))
            .map_err(serde::de::Error::custom),
    }
}
