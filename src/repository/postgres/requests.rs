//! Maintenance requests table

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::AppResult,
    models::request::{MaintenanceRequest, NewRequest, RequestStatus, UpdateRequest},
    repository::{RequestFilter, RequestOrder, RequestsStore},
};

fn status_names(statuses: &[RequestStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Append the WHERE clause for `filter`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RequestFilter) {
    builder.push(" WHERE TRUE");
    if let Some(ref statuses) = filter.status_in {
        builder.push(" AND status = ANY(").push_bind(status_names(statuses)).push(")");
    }
    if let Some(ref statuses) = filter.status_not_in {
        builder.push(" AND status <> ALL(").push_bind(status_names(statuses)).push(")");
    }
    if let Some(before) = filter.scheduled_before {
        builder.push(" AND scheduled_date < ").push_bind(before);
    }
    if let Some((start, end)) = filter.scheduled_between {
        builder
            .push(" AND scheduled_date >= ")
            .push_bind(start)
            .push(" AND scheduled_date <= ")
            .push_bind(end);
    }
    if let Some((start, end)) = filter.created_between {
        builder
            .push(" AND created_at >= ")
            .push_bind(start)
            .push(" AND created_at <= ")
            .push_bind(end);
    }
}

#[async_trait]
impl RequestsStore for PgStore {
    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM maintenance_requests");
        push_filter(&mut builder, filter);
        builder.push(match filter.order {
            RequestOrder::CreatedAt => " ORDER BY created_at",
            RequestOrder::ScheduledDateAsc => " ORDER BY scheduled_date ASC",
        });

        let rows = builder
            .build_query_as::<MaintenanceRequest>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self, filter: &RequestFilter) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM maintenance_requests");
        push_filter(&mut builder, filter);

        let count = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MaintenanceRequest>> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, data: &NewRequest) -> AppResult<MaintenanceRequest> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (id, subject, equipment_id, request_type, team_id,
                                              status, scheduled_date, duration, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.subject)
        .bind(data.equipment_id)
        .bind(data.request_type)
        .bind(data.team_id)
        .bind(RequestStatus::New)
        .bind(data.scheduled_date)
        .bind(data.duration)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        data: &UpdateRequest,
    ) -> AppResult<Option<MaintenanceRequest>> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = COALESCE($2, status),
                assigned_technician_id = COALESCE($3, assigned_technician_id),
                scheduled_date = COALESCE($4, scheduled_date),
                duration = COALESCE($5, duration),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.status)
        .bind(data.assigned_technician)
        .bind(data.scheduled_date)
        .bind(data.duration)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
