use serde::Serialize;

use crate::store::Store;
use crate::types::{Team, TeamScope};

use super::init_store;

#[derive(Serialize)]
struct Summary {
    users: usize,
    organizations: usize,
    projects: usize,
    permissions: usize,
    teams: usize,
}

#[derive(Serialize)]
struct UserOutput {
    id: String,
    name: String,
    email: String,
    is_staff: bool,
    is_superuser: bool,
    date_joined: String,
}

#[derive(Serialize)]
struct OrganizationOutput {
    id: String,
    name: String,
    created_at: String,
}

#[derive(Serialize)]
struct ProjectOutput {
    id: String,
    namespace: String,
    name: String,
    description: String,
}

#[derive(Serialize)]
struct PermissionOutput {
    id: String,
    slug: String,
    name: String,
    applies_to_project: bool,
}

#[derive(Serialize)]
struct TeamOutput {
    id: String,
    name: String,
    scope: &'static str,
    owner_id: String,
    is_owner_team: bool,
    is_all_projects: bool,
    members: Vec<String>,
    permissions: Vec<String>,
    projects: Vec<String>,
}

#[derive(Serialize)]
struct DetailedInfo {
    users: Vec<UserOutput>,
    organizations: Vec<OrganizationOutput>,
    projects: Vec<ProjectOutput>,
    permissions: Vec<PermissionOutput>,
    teams: Vec<TeamOutput>,
}

fn team_output(store: &dyn Store, team: &Team) -> anyhow::Result<TeamOutput> {
    let mut members = Vec::with_capacity(team.users.len());
    for user_id in &team.users {
        members.push(
            store
                .get_user(user_id)?
                .map(|u| u.name)
                .unwrap_or_else(|| "<unknown>".to_string()),
        );
    }

    let (scope, owner_id, is_all_projects) = match &team.scope {
        TeamScope::Organization {
            organization_id,
            is_all_projects,
            ..
        } => ("organization", organization_id.clone(), *is_all_projects),
        TeamScope::Project { project_id } => ("project", project_id.clone(), false),
    };

    let projects = store
        .list_team_projects(&team.id)?
        .into_iter()
        .map(|p| p.name)
        .collect();

    Ok(TeamOutput {
        id: team.id.clone(),
        name: team.name.clone(),
        scope,
        owner_id,
        is_owner_team: team.is_owner_team,
        is_all_projects,
        members,
        permissions: team.permissions.iter().map(|p| p.slug.clone()).collect(),
        projects,
    })
}

pub fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let users = store.list_users("", 10000)?;
    let organizations = store.list_organizations("", 10000)?;
    let namespaces = store.list_namespaces("", 10000)?;
    let permissions = store.list_permissions()?;

    let mut projects = Vec::new();
    for ns in &namespaces {
        for project in store.list_projects(&ns.id)? {
            projects.push((ns.name.clone(), project));
        }
    }

    let mut teams = Vec::new();
    for org in &organizations {
        teams.extend(store.list_organization_teams(&org.id)?);
    }
    for (_, project) in &projects {
        teams.extend(store.list_project_teams(&project.id)?);
    }

    if json {
        let mut team_outputs = Vec::with_capacity(teams.len());
        for team in &teams {
            team_outputs.push(team_output(&store, team)?);
        }

        let info = DetailedInfo {
            users: users
                .iter()
                .map(|u| UserOutput {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    email: u.email.clone(),
                    is_staff: u.is_staff,
                    is_superuser: u.is_superuser,
                    date_joined: u.date_joined.to_rfc3339(),
                })
                .collect(),
            organizations: organizations
                .iter()
                .map(|o| OrganizationOutput {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    created_at: o.created_at.to_rfc3339(),
                })
                .collect(),
            projects: projects
                .iter()
                .map(|(namespace, p)| ProjectOutput {
                    id: p.id.clone(),
                    namespace: namespace.clone(),
                    name: p.name.clone(),
                    description: p.description.clone(),
                })
                .collect(),
            permissions: permissions
                .iter()
                .map(|p| PermissionOutput {
                    id: p.id.clone(),
                    slug: p.slug.clone(),
                    name: p.name.clone(),
                    applies_to_project: p.applies_to_project,
                })
                .collect(),
            teams: team_outputs,
        };

        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let summary = Summary {
            users: users.len(),
            organizations: organizations.len(),
            projects: projects.len(),
            permissions: permissions.len(),
            teams: teams.len(),
        };

        println!();
        println!("Gatehouse Status");
        println!("{}", "─".repeat(16));
        println!("Users:          {}", summary.users);
        println!("Organizations:  {}", summary.organizations);
        println!("Projects:       {}", summary.projects);
        println!("Permissions:    {}", summary.permissions);
        println!("Teams:          {}", summary.teams);
        println!();
    }

    Ok(())
}
