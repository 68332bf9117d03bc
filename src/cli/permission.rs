use crate::store::Store;
use crate::types::Permission;

use super::init_store;

pub fn run_permission_add(
    data_dir: String,
    slug: String,
    name: String,
    description: String,
    global: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let mut permission = Permission::new(slug, name, description);
    permission.applies_to_project = !global;
    store.create_permission(&permission)?;

    let existing = store.list_permissions_by_slug(&permission.slug)?.len();
    if existing > 1 {
        println!(
            "Note: {} catalog entries now share the slug \"{}\"",
            existing, permission.slug
        );
    }

    println!(
        "Created permission \"{}\" ({})",
        permission.slug, permission.id
    );
    Ok(())
}
