//! Dashboard and report types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Dashboard counters
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_requests: i64,
    /// Requests in `new` or `in-progress`
    pub open_requests: i64,
    pub overdue_requests: i64,
    /// No parts inventory exists; always 0
    pub low_stock_parts: i64,
}

/// Calendar window, scheduled-date based
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// RFC 3339 timestamp or YYYY-MM-DD (default: now)
    pub start: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD (default: now + 30 days)
    pub end: Option<String>,
}

/// Report window, creation-date based
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct ReportQuery {
    /// RFC 3339 timestamp or YYYY-MM-DD (default: now - 30 days)
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD (default: now)
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReportPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Request counts for a creation window
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub period: ReportPeriod,
    pub total_requests: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
    /// Unknown equipment is counted under "Unknown"
    pub by_department: BTreeMap<String, i64>,
    /// Unresolved teams are counted under "Unknown"
    pub by_team: BTreeMap<String, i64>,
}
