//! Maintenance teams table

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::team::Team,
    repository::TeamsStore,
};

const TEAM_CONFLICT: &str = "Team already exists";

#[async_trait]
impl TeamsStore for PgStore {
    async fn list(&self) -> AppResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>("SELECT * FROM maintenance_teams ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Team>> {
        let row = sqlx::query_as::<_, Team>("SELECT * FROM maintenance_teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, Team>("SELECT * FROM maintenance_teams WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_name(&self, team_name: &str) -> AppResult<Option<Team>> {
        let row = sqlx::query_as::<_, Team>("SELECT * FROM maintenance_teams WHERE team_name = $1")
            .bind(team_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, team_name: &str, technicians: &[Uuid]) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO maintenance_teams (id, team_name, technicians)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team_name)
        .bind(technicians)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, TEAM_CONFLICT))
    }

    async fn update(
        &self,
        id: Uuid,
        team_name: Option<String>,
        technicians: Option<Vec<Uuid>>,
    ) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>(
            r#"
            UPDATE maintenance_teams
            SET team_name = COALESCE($2, team_name),
                technicians = COALESCE($3, technicians),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(team_name)
        .bind(technicians)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, TEAM_CONFLICT))
    }
}
