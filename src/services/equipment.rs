//! Equipment registry service

use uuid::Uuid;

use super::users::UsersService;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentView, UpdateEquipment},
        principal::{Action, Principal},
    },
    repository::Repository,
};

const SERIAL_CONFLICT: &str = "Equipment with this serial number already exists";

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    users: UsersService,
}

impl EquipmentService {
    pub fn new(repository: Repository, users: UsersService) -> Self {
        Self { repository, users }
    }

    pub async fn list(&self, caller: &Principal) -> AppResult<Vec<EquipmentView>> {
        caller.authorize(Action::ReadEquipment, None)?;

        let equipment = self.repository.equipment.list().await?;
        let user_ids: Vec<Uuid> = equipment.iter().filter_map(|e| e.assigned_user_id).collect();
        let users = self.users.summaries(&user_ids).await?;

        Ok(equipment
            .into_iter()
            .map(|e| EquipmentView {
                assigned_user: e.assigned_user_id.and_then(|id| users.get(&id).cloned()),
                equipment: e,
            })
            .collect())
    }

    pub async fn create(&self, caller: &Principal, data: CreateEquipment) -> AppResult<Equipment> {
        caller.authorize(Action::ManageEquipment, None)?;

        let data = data.validate()?;
        if self.repository.equipment.serial_exists(&data.serial_number, None).await? {
            return Err(AppError::Conflict(SERIAL_CONFLICT.to_string()));
        }

        let equipment = self.repository.equipment.create(&data).await?;
        tracing::info!(
            equipment_id = %equipment.id,
            serial = %equipment.serial_number,
            "Equipment created"
        );
        Ok(equipment)
    }

    pub async fn update(
        &self,
        caller: &Principal,
        id: Uuid,
        data: UpdateEquipment,
    ) -> AppResult<Equipment> {
        caller.authorize(Action::ManageEquipment, None)?;

        let data = data.normalized();
        let current = self.get_by_id(id).await?;

        if let Some(ref serial) = data.serial_number {
            if *serial != current.serial_number
                && self.repository.equipment.serial_exists(serial, Some(id)).await?
            {
                return Err(AppError::Conflict(SERIAL_CONFLICT.to_string()));
            }
        }

        self.repository
            .equipment
            .update(id, &data)
            .await?
            .ok_or_else(not_found)
    }

    /// Hard delete. Requests keep their equipment id.
    pub async fn delete(&self, caller: &Principal, id: Uuid) -> AppResult<()> {
        caller.authorize(Action::ManageEquipment, None)?;

        if !self.repository.equipment.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!(equipment_id = %id, "Equipment removed");
        Ok(())
    }

    /// Set the scrapped flag. Idempotent; false if the equipment is gone.
    pub async fn mark_scrapped(&self, id: Uuid) -> AppResult<bool> {
        self.repository.equipment.mark_scrapped(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        self.repository
            .equipment
            .get_by_id(id)
            .await?
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Equipment not found".to_string())
}
