//! Business logic services

pub mod auth;
pub mod equipment;
pub mod reports;
pub mod requests;
pub mod teams;
pub mod users;

use crate::{
    config::{AdminConfig, AuthConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub teams: teams::TeamsService,
    pub requests: requests::RequestsService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, admin_config: AdminConfig) -> Self {
        let users = users::UsersService::new(repository.clone(), admin_config.clone());
        let equipment = equipment::EquipmentService::new(repository.clone(), users.clone());
        let teams = teams::TeamsService::new(repository.clone(), users.clone());
        let requests = requests::RequestsService::new(
            repository.clone(),
            users.clone(),
            equipment.clone(),
            teams.clone(),
        );

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config, admin_config),
            reports: reports::ReportsService::new(repository, requests.clone()),
            users,
            equipment,
            teams,
            requests,
        }
    }
}
