use crate::store::Store;
use crate::types::Project;

use super::{find_project, init_store};

pub fn run_project_add(
    data_dir: String,
    namespace: String,
    name: String,
    description: String,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let owner = store
        .get_namespace_by_name(&namespace)?
        .ok_or_else(|| anyhow::anyhow!("Namespace not found: {}", namespace))?;

    if store.get_project_by_name(&owner.id, &name)?.is_some() {
        anyhow::bail!("Project '{}/{}' already exists", namespace, name);
    }

    let project = Project::new(&owner.id, name, description);
    store.create_project(&project)?;

    println!(
        "Created project \"{}/{}\" ({})",
        owner.name, project.name, project.id
    );
    for team in store.list_project_teams(&project.id)? {
        println!("  Team \"{}\" ({})", team.name, team.id);
    }
    Ok(())
}

pub fn run_project_move(data_dir: String, project: String, to: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let mut moving = find_project(&store, &project)?;

    let destination = store
        .get_namespace_by_name(&to)?
        .ok_or_else(|| anyhow::anyhow!("Namespace not found: {}", to))?;

    if destination.id == moving.namespace_id {
        println!("Project \"{}\" is already in \"{}\"", project, to);
        return Ok(());
    }

    if store
        .get_project_by_name(&destination.id, &moving.name)?
        .is_some()
    {
        anyhow::bail!("Project '{}/{}' already exists", to, moving.name);
    }

    moving.namespace_id = destination.id;
    store.update_project(&moving)?;

    println!("Moved project \"{}\" to \"{}/{}\"", project, to, moving.name);
    Ok(())
}
