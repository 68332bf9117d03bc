//! Decides which "Owners" team a newly created project or organization gets.
//!
//! The store calls these inside the transaction that inserts the entity, so
//! an entity is never visible without its owner team. Both functions return
//! `None` when an owner team already exists for the entity, which makes a
//! repeated run (a retried creation event, say) a no-op.

use crate::types::{OWNERS_TEAM_NAME, Organization, Project, ResolvedNamespace, Team};

/// Owner team for a new project. Only user-owned projects get one: the owning
/// user becomes its sole member. Organization-owned projects are
/// administered through the organization's own teams.
pub fn project_owner_team(
    project: &Project,
    owner: &ResolvedNamespace,
    existing_owner_teams: &[Team],
) -> Option<Team> {
    if existing_owner_teams.iter().any(|team| team.is_owner_team) {
        tracing::debug!(project = %project.name, "Project already has an owners team");
        return None;
    }

    match owner {
        ResolvedNamespace::User(user) => {
            let mut team = Team::for_project(OWNERS_TEAM_NAME, &project.id).owner();
            team.users = vec![user.id.clone()];
            Some(team)
        }
        ResolvedNamespace::Organization(_) => None,
    }
}

/// Owner team for a new organization: covers all projects and starts with no
/// members.
pub fn organization_owner_team(
    org: &Organization,
    existing_owner_teams: &[Team],
) -> Option<Team> {
    if existing_owner_teams.iter().any(|team| team.is_owner_team) {
        tracing::debug!(organization = %org.name, "Organization already has an owners team");
        return None;
    }

    Some(
        Team::for_organization(OWNERS_TEAM_NAME, &org.id)
            .owner()
            .all_projects(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TeamScope, User};

    #[test]
    fn test_user_project_gets_owner_team_with_owner() {
        let alice = User::new("alice", "");
        let project = Project::new(&alice.id, "widgets", "");

        let team =
            project_owner_team(&project, &ResolvedNamespace::User(alice.clone()), &[]).unwrap();

        assert_eq!(team.name, "Owners");
        assert!(team.is_owner_team);
        assert_eq!(team.users, vec![alice.id]);
        assert_eq!(
            team.scope,
            TeamScope::Project {
                project_id: project.id
            }
        );
    }

    #[test]
    fn test_organization_project_gets_no_team() {
        let org = Organization::new("acme");
        let project = Project::new(&org.id, "widgets", "");

        assert!(project_owner_team(&project, &ResolvedNamespace::Organization(org), &[]).is_none());
    }

    #[test]
    fn test_organization_owner_team_shape() {
        let org = Organization::new("acme");

        let team = organization_owner_team(&org, &[]).unwrap();

        assert_eq!(team.name, "Owners");
        assert!(team.is_owner_team);
        assert!(team.users.is_empty());
        assert_eq!(
            team.scope,
            TeamScope::Organization {
                organization_id: org.id,
                projects: Vec::new(),
                is_all_projects: true,
            }
        );
    }

    #[test]
    fn test_existing_owner_team_skips_provisioning() {
        let alice = User::new("alice", "");
        let project = Project::new(&alice.id, "widgets", "");
        let existing = Team::for_project(OWNERS_TEAM_NAME, &project.id).owner();

        assert!(
            project_owner_team(&project, &ResolvedNamespace::User(alice), &[existing]).is_none()
        );

        let org = Organization::new("acme");
        let existing = organization_owner_team(&org, &[]).unwrap();
        assert!(organization_owner_team(&org, &[existing]).is_none());
    }

    #[test]
    fn test_non_owner_teams_do_not_block_provisioning() {
        let org = Organization::new("acme");
        let devs = Team::for_organization("devs", &org.id);

        assert!(organization_owner_team(&org, &[devs]).is_some());
    }
}
