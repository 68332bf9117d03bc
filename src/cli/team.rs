use crate::store::Store;
use crate::types::{Team, TeamScope};

use super::{find_project, find_user, init_store};

fn find_team(store: &dyn Store, id: &str) -> anyhow::Result<Team> {
    store
        .get_team(id)?
        .ok_or_else(|| anyhow::anyhow!("Team not found: {}", id))
}

pub fn run_team_add(
    data_dir: String,
    name: String,
    org: Option<String>,
    project: Option<String>,
    owner: bool,
    all_projects: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let mut team = match (org, project) {
        (Some(org_name), None) => {
            let org = store
                .get_organization_by_name(&org_name)?
                .ok_or_else(|| anyhow::anyhow!("Organization not found: {}", org_name))?;
            let team = Team::for_organization(name, org.id);
            if all_projects { team.all_projects() } else { team }
        }
        (None, Some(reference)) => {
            if all_projects {
                anyhow::bail!("--all-projects only applies to organization teams");
            }
            let project = find_project(&store, &reference)?;
            Team::for_project(name, project.id)
        }
        _ => anyhow::bail!("Exactly one of --org or --project is required"),
    };
    if owner {
        team = team.owner();
    }

    store.create_team(&team)?;

    println!("Created team \"{}\" ({})", team.name, team.id);
    Ok(())
}

pub fn run_team_member(data_dir: String, team_id: String, user: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let team = find_team(&store, &team_id)?;
    let user = find_user(&store, &user)?;

    store.add_team_member(&team.id, &user.id)?;

    println!("Added \"{}\" to team \"{}\"", user.name, team.name);
    Ok(())
}

pub fn run_team_grant(data_dir: String, team_id: String, slug: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let team = find_team(&store, &team_id)?;

    let permissions = store.list_permissions_by_slug(&slug)?;
    if permissions.is_empty() {
        anyhow::bail!("Permission not found: {}", slug);
    }

    for permission in &permissions {
        if team.permissions.iter().any(|p| p.id == permission.id) {
            continue;
        }
        store.grant_team_permission(&team.id, &permission.id)?;
    }

    println!("Granted \"{}\" to team \"{}\"", slug, team.name);
    Ok(())
}

pub fn run_team_link(data_dir: String, team_id: String, project: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let team = find_team(&store, &team_id)?;
    let linked = find_project(&store, &project)?;

    store.link_team_project(&team.id, &linked.id)?;

    println!("Linked team \"{}\" to \"{}\"", team.name, project);
    Ok(())
}

pub fn run_team_check(data_dir: String, team_id: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let team = find_team(&store, &team_id)?;

    if team.check_consistent(&store)? {
        println!("consistent");
        return Ok(());
    }

    println!("inconsistent");
    if let TeamScope::Organization {
        organization_id, ..
    } = &team.scope
    {
        let linked = store.list_team_projects(&team.id)?;
        for project in crate::consistency::foreign_projects(organization_id, &linked) {
            let owner = store
                .get_namespace(&project.namespace_id)?
                .map(|ns| ns.name)
                .unwrap_or_else(|| "<unknown>".to_string());
            println!("  {}/{}", owner, project.name);
        }
    }
    Ok(())
}

pub fn run_team_repair(data_dir: String, team_id: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let mut team = find_team(&store, &team_id)?;

    let removed = team.make_consistent(&store)?;

    println!(
        "Repaired team \"{}\": {} link(s) removed",
        team.name,
        removed.len()
    );
    Ok(())
}
