//! Permission resolution.
//!
//! A check asks whether an acting user holds a permission slug on a target.
//! Project targets consult the project's own teams first and fall back to the
//! rule of the namespace that owns the project. A single team has to satisfy
//! every condition of a grant by itself; rights are never combined across
//! teams.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Organization, Project, ResolvedNamespace, Team, TeamScope, User};

/// What a permission is being checked against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Control over a user account itself.
    User(&'a User),
    /// An organization, optionally in the context of one of its projects.
    Organization(&'a Organization, Option<&'a Project>),
    Project(&'a Project),
}

/// Returns true if `user` holds `slug` on `target`.
///
/// A missing permission record or team is a plain `false`. Fails with
/// [`Error::Integrity`] when a project's namespace cannot be resolved.
pub fn has_permission(
    store: &dyn Store,
    user: &User,
    slug: &str,
    target: Target<'_>,
) -> Result<bool> {
    match target {
        Target::User(account) => Ok(check_user_permission(user, account)),
        Target::Organization(org, project) => {
            check_organization_permission(store, user, org, slug, project)
        }
        Target::Project(project) => check_project_permission(store, user, project, slug),
    }
}

/// An account is controlled by its owner alone.
#[must_use]
pub fn check_user_permission(user: &User, account: &User) -> bool {
    user.id == account.id
}

/// Returns true if one of the organization's teams grants `slug` to `user`
/// for `project`. Without a project only all-projects teams apply.
pub fn check_organization_permission(
    store: &dyn Store,
    user: &User,
    org: &Organization,
    slug: &str,
    project: Option<&Project>,
) -> Result<bool> {
    let project_id = project.map(|p| p.id.as_str());
    let teams = store.list_user_organization_teams(&org.id, &user.id)?;

    let granted = teams
        .iter()
        .any(|team| team_grants(team, &user.id, slug, project_id));

    tracing::debug!(
        user = %user.name,
        organization = %org.name,
        project = project.map(|p| p.name.as_str()).unwrap_or("-"),
        slug,
        granted,
        "Checked organization teams"
    );
    Ok(granted)
}

/// Returns true if a team of `project` grants `slug` to `user`, falling back
/// to the rule of the namespace that owns the project.
pub fn check_project_permission(
    store: &dyn Store,
    user: &User,
    project: &Project,
    slug: &str,
) -> Result<bool> {
    let teams = store.list_user_project_teams(&project.id, &user.id)?;
    if teams
        .iter()
        .any(|team| team_grants(team, &user.id, slug, Some(&project.id)))
    {
        tracing::debug!(
            user = %user.name,
            project = %project.name,
            slug,
            "Granted by project team"
        );
        return Ok(true);
    }

    let owner = store
        .resolve_namespace(&project.namespace_id)?
        .ok_or_else(|| {
            Error::Integrity(format!(
                "project '{}' references missing namespace '{}'",
                project.name, project.namespace_id
            ))
        })?;

    check_namespace_permission(store, user, &owner, slug, Some(project))
}

/// Applies the rule of a resolved namespace.
pub fn check_namespace_permission(
    store: &dyn Store,
    user: &User,
    namespace: &ResolvedNamespace,
    slug: &str,
    project: Option<&Project>,
) -> Result<bool> {
    match namespace {
        ResolvedNamespace::User(account) => Ok(check_user_permission(user, account)),
        ResolvedNamespace::Organization(org) => {
            check_organization_permission(store, user, org, slug, project)
        }
    }
}

/// Membership, project coverage and authority must all hold on this one team.
fn team_grants(team: &Team, user_id: &str, slug: &str, project_id: Option<&str>) -> bool {
    team.has_member(user_id) && covers_project(team, project_id) && authorizes(team, slug)
}

// Owner teams pass for any slug, even one missing from the catalog.
fn authorizes(team: &Team, slug: &str) -> bool {
    team.is_owner_team || team.holds_slug(slug)
}

fn covers_project(team: &Team, project_id: Option<&str>) -> bool {
    match &team.scope {
        TeamScope::Organization {
            projects,
            is_all_projects,
            ..
        } => *is_all_projects || project_id.is_some_and(|id| projects.iter().any(|p| p == id)),
        TeamScope::Project {
            project_id: scoped,
        } => project_id == Some(scoped.as_str()),
    }
}
