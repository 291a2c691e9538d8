//! User administration service

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    config::AdminConfig,
    error::{AppError, AppResult},
    models::{
        principal::{Action, Principal},
        user::{Role, User, UserSummary},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    admin: AdminConfig,
}

impl UsersService {
    pub fn new(repository: Repository, admin: AdminConfig) -> Self {
        Self { repository, admin }
    }

    /// All stored accounts. The administrative principal is never among them.
    pub async fn list(&self, caller: &Principal) -> AppResult<Vec<User>> {
        caller.authorize(Action::ManageUsers, None)?;
        self.repository.users.list().await
    }

    /// Change a user's role. `admin` cannot be granted.
    pub async fn update_role(&self, caller: &Principal, id: Uuid, role: Role) -> AppResult<User> {
        caller.authorize(Action::ManageUsers, None)?;

        if role == Role::Admin {
            return Err(AppError::Validation("Invalid role".to_string()));
        }

        let user = self
            .repository
            .users
            .update_role(id, role)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, role = %role, "User role changed");
        Ok(user)
    }

    /// Display summaries for `ids`, keyed by id. Unknown ids are left out;
    /// the administrative id resolves from configuration.
    pub async fn summaries(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, UserSummary>> {
        let mut summaries: HashMap<Uuid, UserSummary> = self
            .repository
            .users
            .get_by_ids(ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        if ids.contains(&self.admin.id) {
            summaries.insert(
                self.admin.id,
                UserSummary {
                    id: self.admin.id,
                    name: self.admin.name.clone(),
                    email: self.admin.email.clone(),
                },
            );
        }

        Ok(summaries)
    }
}
