//! API handlers for GearGuard REST endpoints

pub mod admin;
pub mod auth;
pub mod equipment;
pub mod health;
pub mod openapi;
pub mod requests;
pub mod teams;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{error::AppError, models::principal::Principal, AppState};

/// Extractor for the authenticated principal behind a bearer token
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Not authorized, no token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::Authentication("Invalid authorization header format".to_string())
            })?;

        let principal = state.services.auth.resolve(token.trim()).await?;
        Ok(AuthenticatedUser(principal))
    }
}

/// JSON request body; malformed payloads are rejected as `ValidationError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Plain confirmation body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            put(equipment::update_equipment).delete(equipment::delete_equipment),
        )
        // Teams
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/:id", put(teams::update_team))
        // Maintenance requests
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/requests/:id",
            put(requests::update_request).delete(requests::delete_request),
        )
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/role", put(admin::update_user_role))
        .route("/admin/dashboard-stats", get(admin::dashboard_stats))
        .route("/admin/overdue-requests", get(admin::overdue_requests))
        .route("/admin/calendar", get(admin::calendar))
        .route("/admin/reports", get(admin::reports))
        .with_state(state);

    // OpenAPI documentation
    let docs = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(docs)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        models::user::Role,
        repository::Repository,
        services::{testing, Services},
    };

    struct TestApp {
        router: Router,
        services: Services,
        repository: Repository,
    }

    impl TestApp {
        fn new() -> Self {
            let config = AppConfig::default();
            let repository = Repository::in_memory();
            let services =
                Services::new(repository.clone(), config.auth.clone(), config.admin.clone());
            let router = create_router(AppState {
                config: Arc::new(config),
                services: Arc::new(services.clone()),
            });
            Self {
                router,
                services,
                repository,
            }
        }

        fn admin_token(&self) -> String {
            let admin = testing::admin();
            self.services.auth.issue_token(admin.id, Role::Admin).unwrap()
        }

        async fn user_token(&self, role: Role) -> (String, String) {
            let user = testing::insert_user(&self.repository, "Uma", role).await;
            let token = self.services.auth.issue_token(user.id, user.role).unwrap();
            (user.id.to_string(), token)
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(value) => {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = app.send(Method::GET, "/api/v1/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthenticated() {
        let app = TestApp::new();
        let (status, body) = app.send(Method::GET, "/api/v1/requests", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthenticated");

        let (status, body) = app
            .send(Method::GET, "/api/v1/requests", Some("garbage"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_me_returns_principal() {
        let app = TestApp::new();
        let admin = app.admin_token();
        let (status, body) = app.send(Method::GET, "/api/v1/auth/me", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");
        assert_eq!(body["email"], "admin@gmail.com");
    }

    #[tokio::test]
    async fn test_request_flow_over_http() {
        let app = TestApp::new();
        let admin = app.admin_token();
        let (_, user) = app.user_token(Role::User).await;

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/teams",
                Some(&admin),
                Some(json!({ "teamName": "HVAC-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let equipment = json!({
            "name": "Chiller",
            "serialNumber": "SN-001",
            "department": "Facilities",
            "maintenanceTeam": "HVAC-1",
            "location": "Basement",
            "purchaseDate": "2022-05-01",
            "warrantyDate": "2025-05-01"
        });
        let (status, _) = app
            .send(Method::POST, "/api/v1/equipment", Some(&user), Some(equipment.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = app
            .send(Method::POST, "/api/v1/equipment", Some(&admin), Some(equipment.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["isScrapped"], false);

        let (status, body) = app
            .send(Method::POST, "/api/v1/equipment", Some(&admin), Some(equipment))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Conflict");

        let yesterday = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();
        let (status, request) = app
            .send(
                Method::POST,
                "/api/v1/requests",
                Some(&user),
                Some(json!({
                    "subject": "Compressor trips",
                    "equipment": created["id"],
                    "requestType": "corrective",
                    "scheduledDate": yesterday,
                    "duration": 2
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(request["status"], "new");

        let (status, listed) = app.send(Method::GET, "/api/v1/requests", Some(&user), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["isOverdue"], true);
        assert_eq!(listed[0]["maintenanceTeam"]["teamName"], "HVAC-1");
        assert_eq!(listed[0]["equipment"]["serialNumber"], "SN-001");

        // The filer is not a team member
        let uri = format!("/api/v1/requests/{}", request["id"].as_str().unwrap());
        let (status, body) = app
            .send(Method::PUT, &uri, Some(&user), Some(json!({ "status": "repaired" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&admin), Some(json!({ "status": "scrap" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "scrap");

        let (_, equipment) = app.send(Method::GET, "/api/v1/equipment", Some(&user), None).await;
        assert_eq!(equipment[0]["isScrapped"], true);

        let (status, stats) = app
            .send(Method::GET, "/api/v1/admin/dashboard-stats", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalRequests"], 1);
        assert_eq!(stats["openRequests"], 0);
        assert_eq!(stats["overdueRequests"], 0);

        let (status, _) = app.send(Method::DELETE, &uri, Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Request deleted successfully");
    }

    #[tokio::test]
    async fn test_admin_routes() {
        let app = TestApp::new();
        let admin = app.admin_token();
        let (user_id, user) = app.user_token(Role::User).await;

        let (status, _) = app.send(Method::GET, "/api/v1/admin/users", Some(&user), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, users) = app
            .send(Method::GET, "/api/v1/admin/users", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert!(users[0].get("passwordHash").is_none());

        let uri = format!("/api/v1/admin/users/{user_id}/role");
        let (status, body) = app
            .send(Method::PUT, &uri, Some(&admin), Some(json!({ "role": "technician" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "technician");

        let (status, body) = app
            .send(
                Method::GET,
                "/api/v1/admin/reports?startDate=not-a-date",
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");

        let (status, report) = app
            .send(
                Method::GET,
                "/api/v1/admin/reports?startDate=2024-01-01&endDate=2024-01-31",
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["totalRequests"], 0);
        assert_eq!(report["byStatus"]["in-progress"], 0);

        let (status, calendar) = app
            .send(Method::GET, "/api/v1/admin/calendar", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(calendar.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let app = TestApp::new();
        let admin = app.admin_token();

        app.send(
            Method::POST,
            "/api/v1/teams",
            Some(&admin),
            Some(json!({ "teamName": "HVAC-1" })),
        )
        .await;
        let (_, equipment) = app
            .send(
                Method::POST,
                "/api/v1/equipment",
                Some(&admin),
                Some(json!({
                    "name": "Chiller",
                    "serialNumber": "SN-001",
                    "department": "Facilities",
                    "maintenanceTeam": "HVAC-1",
                    "location": "Basement",
                    "purchaseDate": "2022-05-01",
                    "warrantyDate": "2025-05-01"
                })),
            )
            .await;
        let request = |overrides: Value| {
            let mut body = json!({
                "subject": "Compressor trips",
                "equipment": equipment["id"],
                "requestType": "corrective",
                "scheduledDate": "2024-01-01T10:30:00Z",
                "duration": 2
            });
            if let (Some(body), Some(overrides)) = (body.as_object_mut(), overrides.as_object()) {
                body.extend(overrides.clone());
            }
            body
        };

        for overrides in [
            json!({ "requestType": "emergency" }),
            json!({ "equipment": "not-a-uuid" }),
            json!({ "scheduledDate": "next tuesday" }),
            json!({ "duration": "long" }),
        ] {
            let (status, body) = app
                .send(Method::POST, "/api/v1/requests", Some(&admin), Some(request(overrides)))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "ValidationError");
            assert!(body["message"].is_string());
        }

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/v1/admin/users/{}/role", uuid::Uuid::new_v4()),
                Some(&admin),
                Some(json!({ "role": "overlord" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ValidationError");
    }

    #[tokio::test]
    async fn test_schedule_accepts_datetime_without_offset() {
        let app = TestApp::new();
        let admin = app.admin_token();

        app.send(
            Method::POST,
            "/api/v1/teams",
            Some(&admin),
            Some(json!({ "teamName": "HVAC-1" })),
        )
        .await;
        let (_, equipment) = app
            .send(
                Method::POST,
                "/api/v1/equipment",
                Some(&admin),
                Some(json!({
                    "name": "Chiller",
                    "serialNumber": "SN-001",
                    "department": "Facilities",
                    "maintenanceTeam": "HVAC-1",
                    "location": "Basement",
                    "purchaseDate": "2022-05-01",
                    "warrantyDate": "2025-05-01"
                })),
            )
            .await;

        let (status, created) = app
            .send(
                Method::POST,
                "/api/v1/requests",
                Some(&admin),
                Some(json!({
                    "subject": "Compressor trips",
                    "equipment": equipment["id"],
                    "requestType": "preventive",
                    "scheduledDate": "2024-01-01T10:30",
                    "duration": 2
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["scheduledDate"], "2024-01-01T10:30:00Z");

        let uri = format!("/api/v1/requests/{}", created["id"].as_str().unwrap());
        let (status, updated) = app
            .send(
                Method::PUT,
                &uri,
                Some(&admin),
                Some(json!({ "scheduledDate": "2024-02-15" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["scheduledDate"], "2024-02-15T00:00:00Z");

        let (status, body) = app
            .send(Method::PUT, &uri, Some(&admin), Some(json!({ "scheduledDate": "soon" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Invalid date: soon"));
    }
}
