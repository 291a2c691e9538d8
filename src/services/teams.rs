//! Team registry service

use uuid::Uuid;

use super::users::UsersService;
use crate::{
    error::{AppError, AppResult},
    models::{
        non_blank,
        principal::{Action, Principal},
        team::{dedup_members, CreateTeam, Team, TeamView, UpdateTeam},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TeamsService {
    repository: Repository,
    users: UsersService,
}

impl TeamsService {
    pub fn new(repository: Repository, users: UsersService) -> Self {
        Self { repository, users }
    }

    /// Teams with their technicians resolved. Unknown member ids are skipped.
    pub async fn list(&self, caller: &Principal) -> AppResult<Vec<TeamView>> {
        caller.authorize(Action::ReadTeams, None)?;

        let teams = self.repository.teams.list().await?;
        let member_ids: Vec<Uuid> = teams
            .iter()
            .flat_map(|t| t.technicians.iter().copied())
            .collect();
        let users = self.users.summaries(&member_ids).await?;

        Ok(teams
            .into_iter()
            .map(|t| TeamView {
                technicians: t.technicians.iter().filter_map(|id| users.get(id).cloned()).collect(),
                id: t.id,
                team_name: t.team_name,
                created_at: t.created_at,
                updated_at: t.updated_at,
            })
            .collect())
    }

    pub async fn create(&self, caller: &Principal, data: CreateTeam) -> AppResult<Team> {
        caller.authorize(Action::ManageTeams, None)?;

        let team_name = non_blank(data.team_name)
            .ok_or_else(|| AppError::Validation("Please add a team name".to_string()))?;

        if self.find_by_name(&team_name).await?.is_some() {
            return Err(AppError::Conflict("Team already exists".to_string()));
        }

        let technicians = self
            .checked_members(data.technicians.as_deref().unwrap_or_default())
            .await?;
        let team = self.repository.teams.create(&team_name, &technicians).await?;
        tracing::info!(team_id = %team.id, team_name = %team.team_name, "Team created");
        Ok(team)
    }

    /// Partial update. A new name is not pre-checked; the store still rejects duplicates.
    pub async fn update(&self, caller: &Principal, id: Uuid, data: UpdateTeam) -> AppResult<Team> {
        caller.authorize(Action::ManageTeams, None)?;

        let not_found = || AppError::NotFound("Team not found".to_string());
        self.repository.teams.get_by_id(id).await?.ok_or_else(not_found)?;

        let technicians = match data.technicians {
            Some(ids) => Some(self.checked_members(&ids).await?),
            None => None,
        };

        self.repository
            .teams
            .update(id, non_blank(data.team_name), technicians)
            .await?
            .ok_or_else(not_found)
    }

    /// Exact-name lookup
    pub async fn find_by_name(&self, team_name: &str) -> AppResult<Option<Team>> {
        self.repository.teams.find_by_name(team_name).await
    }

    /// Dedupe `ids` and require every one to be a stored user
    async fn checked_members(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let members = dedup_members(ids);
        if members.is_empty() {
            return Ok(members);
        }

        let found = self.repository.users.get_by_ids(&members).await?;
        if found.len() != members.len() {
            return Err(AppError::Validation(
                "One or more technician IDs are invalid".to_string(),
            ));
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::user::Role, services::testing};

    #[tokio::test]
    async fn test_create_validates_every_member() {
        let (services, repository) = testing::services();
        let admin = testing::admin();
        let tech = testing::insert_user(&repository, "Tom", Role::Technician).await;

        let err = services
            .teams
            .create(
                &admin,
                CreateTeam {
                    team_name: Some("HVAC-1".into()),
                    technicians: Some(vec![tech.id, Uuid::new_v4()]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repository.teams.list().await.unwrap().is_empty());

        let team = services
            .teams
            .create(
                &admin,
                CreateTeam {
                    team_name: Some("HVAC-1".into()),
                    technicians: Some(vec![tech.id, tech.id]),
                },
            )
            .await
            .unwrap();
        assert_eq!(team.technicians, vec![tech.id]);
    }

    #[tokio::test]
    async fn test_create_rules() {
        let (services, repository) = testing::services();
        let admin = testing::admin();

        let err = services.teams.create(&admin, CreateTeam::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let named = || CreateTeam {
            team_name: Some("Electrical".into()),
            technicians: None,
        };
        services.teams.create(&admin, named()).await.unwrap();
        let err = services.teams.create(&admin, named()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let user = testing::insert_user(&repository, "Uma", Role::User).await;
        let err = services.teams.create(&user, named()).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_membership() {
        let (services, repository) = testing::services();
        let admin = testing::admin();
        let a = testing::insert_user(&repository, "Ann", Role::Technician).await;
        let b = testing::insert_user(&repository, "Bob", Role::Technician).await;

        let team = services
            .teams
            .create(
                &admin,
                CreateTeam {
                    team_name: Some("Mechanics".into()),
                    technicians: Some(vec![a.id]),
                },
            )
            .await
            .unwrap();

        let updated = services
            .teams
            .update(
                &admin,
                team.id,
                UpdateTeam {
                    team_name: None,
                    technicians: Some(vec![b.id]),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.team_name, "Mechanics");
        assert_eq!(updated.technicians, vec![b.id]);

        let views = services.teams.list(&b).await.unwrap();
        assert_eq!(views[0].technicians, vec![b.summary()]);

        let err = services
            .teams
            .update(&admin, Uuid::new_v4(), UpdateTeam::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let (services, _) = testing::services();
        services
            .teams
            .create(
                &testing::admin(),
                CreateTeam {
                    team_name: Some("HVAC-1".into()),
                    technicians: None,
                },
            )
            .await
            .unwrap();
        assert!(services.teams.find_by_name("HVAC-1").await.unwrap().is_some());
        assert!(services.teams.find_by_name("hvac-1").await.unwrap().is_none());
    }
}
