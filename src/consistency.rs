//! Keeps organization teams linked only to projects their organization owns.
//!
//! The invariant is repaired on request, not enforced continuously: moving a
//! project to another namespace leaves stale links in place until
//! [`Team::make_consistent`] (or [`repair_organization`]) runs.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Project, Team, TeamScope};

/// Linked projects that are not owned by the given organization.
pub fn foreign_projects<'a>(
    organization_id: &'a str,
    projects: &'a [Project],
) -> impl Iterator<Item = &'a Project> + 'a {
    projects
        .iter()
        .filter(move |project| project.namespace_id != organization_id)
}

#[must_use]
pub fn is_consistent(organization_id: &str, projects: &[Project]) -> bool {
    foreign_projects(organization_id, projects).next().is_none()
}

/// Rejects linking an organization team to a project owned elsewhere.
pub fn ensure_linkable(organization_id: &str, project: &Project) -> Result<()> {
    if project.namespace_id != organization_id {
        return Err(Error::Validation(format!(
            "project '{}' does not belong to the team's organization",
            project.name
        )));
    }
    Ok(())
}

impl Team {
    /// Returns true if every project linked to this team belongs to the
    /// team's organization. Project teams are always consistent.
    pub fn check_consistent(&self, store: &dyn Store) -> Result<bool> {
        match &self.scope {
            TeamScope::Organization {
                organization_id, ..
            } => {
                let linked = store.list_team_projects(&self.id)?;
                Ok(is_consistent(organization_id, &linked))
            }
            TeamScope::Project { .. } => Ok(true),
        }
    }

    /// Unlinks projects owned outside the team's organization and refreshes
    /// `projects` from the store. Returns the unlinked project ids.
    pub fn make_consistent(&mut self, store: &dyn Store) -> Result<Vec<String>> {
        match &mut self.scope {
            TeamScope::Organization { projects, .. } => {
                let removed = store.retain_team_projects(&self.id)?;
                if !removed.is_empty() {
                    tracing::warn!(
                        team = %self.name,
                        removed = removed.len(),
                        "Unlinked projects owned outside the team's organization"
                    );
                }
                *projects = store
                    .list_team_projects(&self.id)?
                    .into_iter()
                    .map(|project| project.id)
                    .collect();
                projects.sort();
                Ok(removed)
            }
            TeamScope::Project { .. } => Ok(Vec::new()),
        }
    }
}

/// Repairs every team of an organization. Returns the number of links
/// removed across all of them.
pub fn repair_organization(store: &dyn Store, organization_id: &str) -> Result<usize> {
    let mut removed = 0;
    for mut team in store.list_organization_teams(organization_id)? {
        removed += team.make_consistent(store)?.len();
    }
    tracing::info!(organization_id, removed, "Repaired organization teams");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::Organization;
    use tempfile::TempDir;

    fn project(namespace_id: &str, name: &str) -> Project {
        Project::new(namespace_id, name, "")
    }

    #[test]
    fn test_foreign_projects_filters_by_owner() {
        let projects = vec![project("acme", "a"), project("beta", "b"), project("acme", "c")];

        let foreign: Vec<&str> = foreign_projects("acme", &projects)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(foreign, vec!["b"]);
        assert!(!is_consistent("acme", &projects));
        assert!(is_consistent("acme", &projects[..1]));
        assert!(is_consistent("acme", &[]));
    }

    #[test]
    fn test_ensure_linkable() {
        assert!(ensure_linkable("acme", &project("acme", "a")).is_ok());
        assert!(matches!(
            ensure_linkable("acme", &project("beta", "b")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_make_consistent_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let acme = Organization::new("acme");
        let beta = Organization::new("beta");
        store.create_organization(&acme).unwrap();
        store.create_organization(&beta).unwrap();

        let mut widgets = project(&acme.id, "widgets");
        let gears = project(&acme.id, "gears");
        store.create_project(&widgets).unwrap();
        store.create_project(&gears).unwrap();

        let mut team = Team::for_organization("devs", &acme.id);
        store.create_team(&team).unwrap();
        store.link_team_project(&team.id, &widgets.id).unwrap();
        store.link_team_project(&team.id, &gears.id).unwrap();

        widgets.namespace_id = beta.id.clone();
        store.update_project(&widgets).unwrap();
        assert!(!team.check_consistent(&store).unwrap());

        let first = team.make_consistent(&store).unwrap();
        let after_first = team.scope.clone();
        let second = team.make_consistent(&store).unwrap();

        assert_eq!(first, vec![widgets.id.clone()]);
        assert!(second.is_empty());
        assert_eq!(team.scope, after_first);
        assert!(team.check_consistent(&store).unwrap());
    }

    #[test]
    fn test_project_team_is_always_consistent() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let org = Organization::new("acme");
        store.create_organization(&org).unwrap();
        let widgets = project(&org.id, "widgets");
        store.create_project(&widgets).unwrap();

        let mut team = Team::for_project("devs", &widgets.id);
        store.create_team(&team).unwrap();

        assert!(team.check_consistent(&store).unwrap());
        assert!(team.make_consistent(&store).unwrap().is_empty());
        assert!(team.check_consistent(&store).unwrap());
    }

    #[test]
    fn test_repair_organization_covers_all_teams() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let acme = Organization::new("acme");
        let beta = Organization::new("beta");
        store.create_organization(&acme).unwrap();
        store.create_organization(&beta).unwrap();
        let mut widgets = project(&acme.id, "widgets");
        store.create_project(&widgets).unwrap();

        for name in ["devs", "ops"] {
            let team = Team::for_organization(name, &acme.id);
            store.create_team(&team).unwrap();
            store.link_team_project(&team.id, &widgets.id).unwrap();
        }

        widgets.namespace_id = beta.id.clone();
        store.update_project(&widgets).unwrap();

        assert_eq!(repair_organization(&store, &acme.id).unwrap(), 2);
        assert_eq!(repair_organization(&store, &acme.id).unwrap(), 0);
        for team in store.list_organization_teams(&acme.id).unwrap() {
            assert!(team.check_consistent(&store).unwrap());
        }
    }
}
