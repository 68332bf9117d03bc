use crate::consistency::repair_organization;
use crate::store::Store;
use crate::types::Organization;

use super::{confirm_action, init_store};

fn find_organization(store: &dyn Store, name: &str) -> anyhow::Result<Organization> {
    store
        .get_organization_by_name(name)?
        .ok_or_else(|| anyhow::anyhow!("Organization not found: {}", name))
}

pub fn run_org_add(data_dir: String, name: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    if store.get_namespace_by_name(&name)?.is_some() {
        anyhow::bail!("Namespace '{}' already exists", name);
    }

    let org = Organization::new(name);
    store.create_organization(&org)?;

    println!("Created organization \"{}\" ({})", org.name, org.id);
    for team in store.list_organization_teams(&org.id)? {
        println!("  Team \"{}\" ({})", team.name, team.id);
    }
    Ok(())
}

pub fn run_org_remove(data_dir: String, name: String, yes: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let org = find_organization(&store, &name)?;

    confirm_action(yes)?;

    if store.delete_organization(&org.id)? {
        println!("Removed organization \"{}\"", org.name);
    }
    Ok(())
}

pub fn run_org_repair(data_dir: String, name: String) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let org = find_organization(&store, &name)?;

    let removed = repair_organization(&store, &org.id)?;

    println!(
        "Repaired organization \"{}\": {} link(s) removed",
        org.name, removed
    );
    Ok(())
}
