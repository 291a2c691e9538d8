//! Repository layer: storage traits and their backends
//!
//! Each entity has one store trait. Every mutating method is a single atomic
//! operation against one record in the backend (one SQL statement, or one
//! critical section in memory), and unique constraints on serial number, team
//! name and email are enforced by the store itself.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        equipment::{Equipment, NewEquipment, UpdateEquipment},
        request::{MaintenanceRequest, NewRequest, RequestStatus, UpdateRequest},
        team::Team,
        user::{NewUser, Role, User},
    },
};

#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<User>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;
    /// Exact, case-sensitive match
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// `Conflict` if the email is taken
    async fn create(&self, user: &NewUser) -> AppResult<User>;
    async fn update_role(&self, id: Uuid, role: Role) -> AppResult<Option<User>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Equipment>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>>;
    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Equipment>>;
    async fn serial_exists(&self, serial_number: &str, exclude_id: Option<Uuid>) -> AppResult<bool>;
    /// `Conflict` if the serial number is taken
    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment>;
    /// Applies only the supplied fields. `Conflict` if a new serial number is taken.
    async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Option<Equipment>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    /// Sets the scrapped flag; returns false if the equipment does not exist
    async fn mark_scrapped(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait TeamsStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Team>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Team>>;
    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Team>>;
    /// Exact match on team name
    async fn find_by_name(&self, team_name: &str) -> AppResult<Option<Team>>;
    /// `Conflict` if the name is taken
    async fn create(&self, team_name: &str, technicians: &[Uuid]) -> AppResult<Team>;
    /// `technicians`, when supplied, replaces the whole membership
    async fn update(
        &self,
        id: Uuid,
        team_name: Option<String>,
        technicians: Option<Vec<Uuid>>,
    ) -> AppResult<Option<Team>>;
}

#[async_trait]
pub trait RequestsStore: Send + Sync {
    async fn list(&self, filter: &RequestFilter) -> AppResult<Vec<MaintenanceRequest>>;
    async fn count(&self, filter: &RequestFilter) -> AppResult<i64>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MaintenanceRequest>>;
    async fn create(&self, data: &NewRequest) -> AppResult<MaintenanceRequest>;
    /// Applies only the supplied fields
    async fn update(&self, id: Uuid, data: &UpdateRequest) -> AppResult<Option<MaintenanceRequest>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Result ordering for request queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestOrder {
    /// Creation order
    #[default]
    CreatedAt,
    ScheduledDateAsc,
}

/// Predicate over maintenance requests. All set conditions must hold.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status_in: Option<Vec<RequestStatus>>,
    pub status_not_in: Option<Vec<RequestStatus>>,
    /// scheduled_date < value
    pub scheduled_before: Option<DateTime<Utc>>,
    /// Inclusive scheduled_date window
    pub scheduled_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Inclusive created_at window
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub order: RequestOrder,
}

impl RequestFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Status `new` or `in-progress`
    pub fn open() -> Self {
        Self {
            status_in: Some(RequestStatus::OPEN.to_vec()),
            ..Self::default()
        }
    }

    /// Scheduled before `now` and not closed
    pub fn overdue(now: DateTime<Utc>) -> Self {
        Self {
            scheduled_before: Some(now),
            status_not_in: Some(RequestStatus::CLOSED.to_vec()),
            order: RequestOrder::ScheduledDateAsc,
            ..Self::default()
        }
    }

    pub fn scheduled_within(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            scheduled_between: Some((start, end)),
            order: RequestOrder::ScheduledDateAsc,
            ..Self::default()
        }
    }

    pub fn created_within(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            created_between: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        if let Some(ref statuses) = self.status_in {
            if !statuses.contains(&request.status) {
                return false;
            }
        }
        if let Some(ref statuses) = self.status_not_in {
            if statuses.contains(&request.status) {
                return false;
            }
        }
        if let Some(before) = self.scheduled_before {
            if request.scheduled_date >= before {
                return false;
            }
        }
        if let Some((start, end)) = self.scheduled_between {
            if request.scheduled_date < start || request.scheduled_date > end {
                return false;
            }
        }
        if let Some((start, end)) = self.created_between {
            if request.created_at < start || request.created_at > end {
                return false;
            }
        }
        true
    }
}

/// Main repository struct holding one handle per store
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersStore>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub teams: Arc<dyn TeamsStore>,
    pub requests: Arc<dyn RequestsStore>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            users: store.clone(),
            equipment: store.clone(),
            teams: store.clone(),
            requests: store,
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            equipment: store.clone(),
            teams: store.clone(),
            requests: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::RequestType;
    use chrono::Duration;

    fn request(status: RequestStatus, scheduled_date: DateTime<Utc>) -> MaintenanceRequest {
        let now = Utc::now();
        MaintenanceRequest {
            id: Uuid::new_v4(),
            subject: "Check belts".into(),
            equipment_id: Uuid::new_v4(),
            request_type: RequestType::Preventive,
            team_id: Uuid::new_v4(),
            assigned_technician_id: None,
            status,
            scheduled_date,
            duration: 1.0,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_overdue_filter_agrees_with_predicate() {
        let now = Utc::now();
        let filter = RequestFilter::overdue(now);
        for status in RequestStatus::ALL {
            for offset in [-2, 2] {
                let r = request(status, now + Duration::hours(offset));
                assert_eq!(filter.matches(&r), r.is_overdue_at(now), "{status} {offset}");
            }
        }
    }

    #[test]
    fn test_open_filter() {
        let now = Utc::now();
        let open = RequestFilter::open();
        assert!(open.matches(&request(RequestStatus::New, now)));
        assert!(open.matches(&request(RequestStatus::InProgress, now)));
        assert!(!open.matches(&request(RequestStatus::Repaired, now)));
        assert!(!open.matches(&request(RequestStatus::Scrap, now)));
    }

    #[test]
    fn test_scheduled_window_is_inclusive() {
        let start = Utc::now();
        let end = start + Duration::days(30);
        let filter = RequestFilter::scheduled_within(start, end);
        assert!(filter.matches(&request(RequestStatus::New, start)));
        assert!(filter.matches(&request(RequestStatus::New, end)));
        assert!(!filter.matches(&request(RequestStatus::New, end + Duration::seconds(1))));
        assert!(!filter.matches(&request(RequestStatus::New, start - Duration::seconds(1))));
    }
}
