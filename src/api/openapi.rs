//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, equipment, health, requests, teams};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GearGuard API",
        description = "Maintenance management REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Teams
        teams::list_teams,
        teams::create_team,
        teams::update_team,
        // Requests
        requests::list_requests,
        requests::create_request,
        requests::update_request,
        requests::delete_request,
        // Admin
        admin::list_users,
        admin::update_user_role,
        admin::dashboard_stats,
        admin::overdue_requests,
        admin::calendar,
        admin::reports,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            crate::models::principal::Principal,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::UpdateRole,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentView,
            crate::models::equipment::EquipmentSummary,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Teams
            crate::models::team::Team,
            crate::models::team::TeamView,
            crate::models::team::TeamSummary,
            crate::models::team::CreateTeam,
            crate::models::team::UpdateTeam,
            // Requests
            crate::models::request::RequestStatus,
            crate::models::request::RequestType,
            crate::models::request::MaintenanceRequest,
            crate::models::request::RequestView,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            // Reports
            crate::models::report::DashboardStats,
            crate::models::report::ReportPeriod,
            crate::models::report::PeriodReport,
            // Misc
            health::HealthResponse,
            super::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup, login and current principal"),
        (name = "equipment", description = "Equipment registry"),
        (name = "teams", description = "Maintenance teams"),
        (name = "requests", description = "Maintenance requests"),
        (name = "admin", description = "User roles, dashboard and reports")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
