//! In-process storage backend
//!
//! Each record kind is kept in insertion order behind one lock; every store
//! method runs inside a single critical section.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EquipmentStore, RequestFilter, RequestOrder, RequestsStore, TeamsStore, UsersStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{Equipment, NewEquipment, UpdateEquipment},
        request::{MaintenanceRequest, NewRequest, RequestStatus, UpdateRequest},
        team::Team,
        user::{NewUser, Role, User},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    equipment: Vec<Equipment>,
    teams: Vec<Team>,
    requests: Vec<MaintenanceRequest>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl UsersStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let mut equipment = self.tables.read().await.equipment.clone();
        equipment.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(equipment)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let tables = self.tables.read().await;
        Ok(tables.equipment.iter().find(|e| e.id == id).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>> {
        let tables = self.tables.read().await;
        Ok(tables.equipment.iter().filter(|e| ids.contains(&e.id)).cloned().collect())
    }

    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .equipment
            .iter()
            .any(|e| e.serial_number == serial_number && Some(e.id) != exclude_id))
    }

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let mut tables = self.tables.write().await;
        if tables.equipment.iter().any(|e| e.serial_number == data.serial_number) {
            return Err(serial_conflict());
        }
        let now = Utc::now();
        let equipment = Equipment {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            serial_number: data.serial_number.clone(),
            department: data.department.clone(),
            assigned_user_id: None,
            maintenance_team: data.maintenance_team.clone(),
            location: data.location.clone(),
            purchase_date: data.purchase_date,
            warranty_date: data.warranty_date,
            is_scrapped: false,
            created_at: now,
            updated_at: now,
        };
        tables.equipment.push(equipment.clone());
        Ok(equipment)
    }

    async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Option<Equipment>> {
        let mut tables = self.tables.write().await;
        if let Some(ref serial) = data.serial_number {
            if tables.equipment.iter().any(|e| &e.serial_number == serial && e.id != id) {
                return Err(serial_conflict());
            }
        }
        let Some(equipment) = tables.equipment.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        macro_rules! apply {
            ($field:ident) => {
                if let Some(ref val) = data.$field {
                    equipment.$field = val.clone();
                }
            };
        }

        apply!(name);
        apply!(serial_number);
        apply!(department);
        apply!(maintenance_team);
        apply!(location);
        apply!(purchase_date);
        apply!(warranty_date);
        if let Some(assigned) = data.assigned_user {
            equipment.assigned_user_id = assigned;
        }
        equipment.updated_at = Utc::now();
        Ok(Some(equipment.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.equipment.len();
        tables.equipment.retain(|e| e.id != id);
        Ok(tables.equipment.len() != before)
    }

    async fn mark_scrapped(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.equipment.iter_mut().find(|e| e.id == id) {
            Some(equipment) => {
                equipment.is_scrapped = true;
                equipment.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }
}

fn serial_conflict() -> AppError {
    AppError::Conflict("Equipment with this serial number already exists".to_string())
}

fn team_conflict() -> AppError {
    AppError::Conflict("Team already exists".to_string())
}

#[async_trait]
impl TeamsStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Team>> {
        Ok(self.tables.read().await.teams.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().filter(|t| ids.contains(&t.id)).cloned().collect())
    }

    async fn find_by_name(&self, team_name: &str) -> AppResult<Option<Team>> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|t| t.team_name == team_name).cloned())
    }

    async fn create(&self, team_name: &str, technicians: &[Uuid]) -> AppResult<Team> {
        let mut tables = self.tables.write().await;
        if tables.teams.iter().any(|t| t.team_name == team_name) {
            return Err(team_conflict());
        }
        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            team_name: team_name.to_string(),
            technicians: technicians.to_vec(),
            created_at: now,
            updated_at: now,
        };
        tables.teams.push(team.clone());
        Ok(team)
    }

    async fn update(
        &self,
        id: Uuid,
        team_name: Option<String>,
        technicians: Option<Vec<Uuid>>,
    ) -> AppResult<Option<Team>> {
        let mut tables = self.tables.write().await;
        // Unique index on team_name
        if let Some(ref name) = team_name {
            if tables.teams.iter().any(|t| &t.team_name == name && t.id != id) {
                return Err(team_conflict());
            }
        }
        Ok(tables.teams.iter_mut().find(|t| t.id == id).map(|team| {
            if let Some(name) = team_name {
                team.team_name = name;
            }
            if let Some(members) = technicians {
                team.technicians = members;
            }
            team.updated_at = Utc::now();
            team.clone()
        }))
    }
}

#[async_trait]
impl RequestsStore for MemoryStore {
    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<MaintenanceRequest> = tables
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        if filter.order == RequestOrder::ScheduledDateAsc {
            requests.sort_by_key(|r| r.scheduled_date);
        }
        Ok(requests)
    }

    async fn count(&self, filter: &RequestFilter) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.requests.iter().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MaintenanceRequest>> {
        let tables = self.tables.read().await;
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, data: &NewRequest) -> AppResult<MaintenanceRequest> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let request = MaintenanceRequest {
            id: Uuid::new_v4(),
            subject: data.subject.clone(),
            equipment_id: data.equipment_id,
            request_type: data.request_type,
            team_id: data.team_id,
            assigned_technician_id: None,
            status: RequestStatus::New,
            scheduled_date: data.scheduled_date,
            duration: data.duration,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn update(
        &self,
        id: Uuid,
        data: &UpdateRequest,
    ) -> AppResult<Option<MaintenanceRequest>> {
        let mut tables = self.tables.write().await;
        Ok(tables.requests.iter_mut().find(|r| r.id == id).map(|request| {
            if let Some(status) = data.status {
                request.status = status;
            }
            if let Some(technician) = data.assigned_technician {
                request.assigned_technician_id = Some(technician);
            }
            if let Some(scheduled_date) = data.scheduled_date {
                request.scheduled_date = scheduled_date;
            }
            if let Some(duration) = data.duration {
                request.duration = duration;
            }
            request.updated_at = Utc::now();
            request.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.requests.len();
        tables.requests.retain(|r| r.id != id);
        Ok(tables.requests.len() != before)
    }
}
