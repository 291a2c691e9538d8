//! Equipment table

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, NewEquipment, UpdateEquipment},
    repository::EquipmentStore,
};

const SERIAL_CONFLICT: &str = "Equipment with this serial number already exists";

#[async_trait]
impl EquipmentStore for PgStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn serial_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM equipment
                WHERE serial_number = $1 AND ($2::uuid IS NULL OR id != $2)
            )
            "#,
        )
        .bind(serial_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (id, name, serial_number, department, maintenance_team,
                                   location, purchase_date, warranty_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.serial_number)
        .bind(&data.department)
        .bind(&data.maintenance_team)
        .bind(&data.location)
        .bind(data.purchase_date)
        .bind(data.warranty_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, SERIAL_CONFLICT))
    }

    async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Option<Equipment>> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.serial_number, "serial_number");
        add_field!(data.department, "department");
        add_field!(data.maintenance_team, "maintenance_team");
        add_field!(data.location, "location");
        add_field!(data.purchase_date, "purchase_date");
        add_field!(data.warranty_date, "warranty_date");
        add_field!(data.assigned_user, "assigned_user_id");

        let query = format!("UPDATE equipment SET {} WHERE id = $1 RETURNING *", sets.join(", "));

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.serial_number);
        bind_field!(data.department);
        bind_field!(data.maintenance_team);
        bind_field!(data.location);
        bind_field!(data.purchase_date);
        bind_field!(data.warranty_date);
        // Some(None) binds NULL
        bind_field!(data.assigned_user);

        builder
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, SERIAL_CONFLICT))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_scrapped(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE equipment SET is_scrapped = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
