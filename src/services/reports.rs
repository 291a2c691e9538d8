//! Dashboard counters, overdue listing, calendar and period reports.
//!
//! All figures are read from the current store contents without isolation,
//! so concurrent writes may or may not be reflected.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::requests::RequestsService;
use crate::{
    error::{AppError, AppResult},
    models::{
        principal::{Action, Principal},
        report::{CalendarQuery, DashboardStats, PeriodReport, ReportPeriod, ReportQuery},
        request::{MaintenanceRequest, RequestStatus, RequestType, RequestView},
        timestamp,
    },
    repository::{RequestFilter, Repository},
};

const UNKNOWN: &str = "Unknown";
const CALENDAR_DAYS: i64 = 30;
const REPORT_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    requests: RequestsService,
}

impl ReportsService {
    pub fn new(repository: Repository, requests: RequestsService) -> Self {
        Self {
            repository,
            requests,
        }
    }

    /// Round-trip to the requests store
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.requests.count(&RequestFilter::all()).await.map(|_| ())
    }

    pub async fn dashboard(&self, caller: &Principal) -> AppResult<DashboardStats> {
        caller.authorize(Action::ViewReports, None)?;

        let store = &self.repository.requests;
        Ok(DashboardStats {
            total_requests: store.count(&RequestFilter::all()).await?,
            open_requests: store.count(&RequestFilter::open()).await?,
            overdue_requests: store.count(&RequestFilter::overdue(Utc::now())).await?,
            low_stock_parts: 0,
        })
    }

    /// Overdue requests, earliest schedule first
    pub async fn overdue(&self, caller: &Principal) -> AppResult<Vec<RequestView>> {
        caller.authorize(Action::ViewReports, None)?;

        let now = Utc::now();
        let requests = self.repository.requests.list(&RequestFilter::overdue(now)).await?;
        self.requests.views(requests, now).await
    }

    /// Requests scheduled inside the window, earliest first
    pub async fn calendar(
        &self,
        caller: &Principal,
        query: CalendarQuery,
    ) -> AppResult<Vec<RequestView>> {
        caller.authorize(Action::ViewReports, None)?;

        let now = Utc::now();
        let start = parse_bound(query.start.as_deref(), false)?.unwrap_or(now);
        let end = parse_bound(query.end.as_deref(), true)?
            .unwrap_or_else(|| now + Duration::days(CALENDAR_DAYS));

        let requests = self
            .repository
            .requests
            .list(&RequestFilter::scheduled_within(start, end))
            .await?;
        self.requests.views(requests, now).await
    }

    /// Breakdown of requests created inside the window
    pub async fn report(&self, caller: &Principal, query: ReportQuery) -> AppResult<PeriodReport> {
        caller.authorize(Action::ViewReports, None)?;

        let now = Utc::now();
        let start = parse_bound(query.start_date.as_deref(), false)?
            .unwrap_or_else(|| now - Duration::days(REPORT_DAYS));
        let end = parse_bound(query.end_date.as_deref(), true)?.unwrap_or(now);

        let requests = self
            .repository
            .requests
            .list(&RequestFilter::created_within(start, end))
            .await?;

        let equipment_ids: Vec<Uuid> = requests.iter().map(|r| r.equipment_id).collect();
        let team_ids: Vec<Uuid> = requests.iter().map(|r| r.team_id).collect();

        let departments: HashMap<Uuid, String> = self
            .repository
            .equipment
            .get_by_ids(&equipment_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e.department))
            .collect();
        let team_names: HashMap<Uuid, String> = self
            .repository
            .teams
            .get_by_ids(&team_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.team_name))
            .collect();

        Ok(summarize(
            ReportPeriod { start, end },
            &requests,
            &departments,
            &team_names,
        ))
    }
}

/// Group `requests` by status, type, department and team
pub fn summarize(
    period: ReportPeriod,
    requests: &[MaintenanceRequest],
    departments: &HashMap<Uuid, String>,
    team_names: &HashMap<Uuid, String>,
) -> PeriodReport {
    let mut by_status: BTreeMap<String, i64> =
        RequestStatus::ALL.iter().map(|s| (s.as_str().to_string(), 0)).collect();
    let mut by_type: BTreeMap<String, i64> =
        RequestType::ALL.iter().map(|t| (t.as_str().to_string(), 0)).collect();
    let mut by_department = BTreeMap::new();
    let mut by_team = BTreeMap::new();

    for request in requests {
        *by_status.entry(request.status.as_str().to_string()).or_default() += 1;
        *by_type.entry(request.request_type.as_str().to_string()).or_default() += 1;

        let department = departments
            .get(&request.equipment_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN);
        *by_department.entry(department.to_string()).or_default() += 1;

        let team = team_names
            .get(&request.team_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN);
        *by_team.entry(team.to_string()).or_default() += 1;
    }

    PeriodReport {
        period,
        total_requests: requests.len() as i64,
        by_status,
        by_type,
        by_department,
        by_team,
    }
}

/// Parse an optional window bound. A bare date is the start of that day, or
/// its last millisecond when `end_of_day` is set.
fn parse_bound(value: Option<&str>, end_of_day: bool) -> AppResult<Option<DateTime<Utc>>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    timestamp::parse(value, end_of_day)
        .map(Some)
        .ok_or_else(|| AppError::Validation(format!("Invalid date: {}", value)))
}
