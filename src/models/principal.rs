//! Authenticated principals and the per-operation capability policy
//!
//! Every service operation names an [`Action`]; the policy maps each action to
//! one [`Requirement`], and [`Principal::authorize`] evaluates it the same way
//! for every caller.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{team::Team, user::{Role, User, UserSummary}};
use crate::error::{AppError, AppResult};

/// A resolved caller identity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRequest,
    ListRequests,
    UpdateRequest,
    DeleteRequest,
    ReadEquipment,
    ManageEquipment,
    ReadTeams,
    ManageTeams,
    ManageUsers,
    ViewReports,
}

/// What a caller must satisfy to perform an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Admin,
    /// Admin, or a technician listed in the owning team
    AdminOrTeamMember,
}

impl Action {
    pub fn requirement(self) -> Requirement {
        match self {
            Action::CreateRequest
            | Action::ListRequests
            | Action::ReadEquipment
            | Action::ReadTeams => Requirement::Authenticated,
            Action::UpdateRequest => Requirement::AdminOrTeamMember,
            Action::DeleteRequest
            | Action::ManageEquipment
            | Action::ManageTeams
            | Action::ManageUsers
            | Action::ViewReports => Requirement::Admin,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Action::UpdateRequest => {
                "Not authorized. Only technicians of the assigned team can update this request."
            }
            Action::DeleteRequest => "Not authorized. Only admins can delete requests.",
            _ => "Access denied. Admin privileges required.",
        }
    }
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Whether this principal satisfies `action`. `team` is the team owning the
    /// target record; a missing team only lets admins through.
    pub fn can(&self, action: Action, team: Option<&Team>) -> bool {
        match action.requirement() {
            Requirement::Authenticated => true,
            Requirement::Admin => self.is_admin(),
            Requirement::AdminOrTeamMember => {
                self.is_admin() || team.is_some_and(|t| t.has_member(self.id))
            }
        }
    }

    pub fn authorize(&self, action: Action, team: Option<&Team>) -> AppResult<()> {
        if self.can(action, team) {
            Ok(())
        } else {
            Err(AppError::Authorization(action.denial().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            name: "p".into(),
            email: "p@example.com".into(),
            role,
        }
    }

    fn team_with(members: Vec<Uuid>) -> Team {
        Team {
            id: Uuid::new_v4(),
            team_name: "HVAC-1".into(),
            technicians: members,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_only_actions() {
        let admin = principal(Role::Admin);
        let tech = principal(Role::Technician);
        for action in [
            Action::DeleteRequest,
            Action::ManageEquipment,
            Action::ManageTeams,
            Action::ManageUsers,
            Action::ViewReports,
        ] {
            assert!(admin.can(action, None));
            assert!(!tech.can(action, None));
        }
    }

    #[test]
    fn test_update_request_requires_team_membership() {
        let member = principal(Role::Technician);
        let outsider = principal(Role::Technician);
        let team = team_with(vec![member.id]);

        assert!(member.can(Action::UpdateRequest, Some(&team)));
        assert!(!outsider.can(Action::UpdateRequest, Some(&team)));
        assert!(!member.can(Action::UpdateRequest, None));
        assert!(principal(Role::Admin).can(Action::UpdateRequest, None));
    }

    #[test]
    fn test_membership_does_not_depend_on_role() {
        // Plain users listed in a team can still act on its requests
        let user = principal(Role::User);
        let team = team_with(vec![user.id]);
        assert!(user.authorize(Action::UpdateRequest, Some(&team)).is_ok());
    }

    #[test]
    fn test_denial_is_forbidden() {
        let err = principal(Role::User)
            .authorize(Action::DeleteRequest, None)
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
