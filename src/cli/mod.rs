mod check;
mod commands;
mod info;
mod org;
mod permission;
mod project;
mod team;
mod user;

pub use check::run_check;
pub use commands::{
    OrgCommands, PermissionCommands, ProjectCommands, TeamCommands, UserCommands,
};
pub use info::run_info;
pub use org::{run_org_add, run_org_remove, run_org_repair};
pub use permission::run_permission_add;
pub use project::{run_project_add, run_project_move};
pub use team::{
    run_team_add, run_team_check, run_team_grant, run_team_link, run_team_member,
    run_team_repair,
};
pub use user::{run_user_add, run_user_email, run_user_remove};

use crate::config::StoreConfig;
use crate::store::{SqliteStore, Store};
use crate::types::{Project, User};

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let config = StoreConfig::load(data_dir)?;
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'gatehouse init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}

/// Create the data directory and an empty database.
pub fn run_init(data_dir: String) -> anyhow::Result<()> {
    std::fs::create_dir_all(&data_dir)?;

    let config = StoreConfig::load(&data_dir)?;
    let db_path = config.db_path();

    if db_path.exists() {
        anyhow::bail!(
            "Already initialized. Database exists at: {}",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

pub(crate) fn confirm_action(yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("--yes is required for destructive operations");
    }
    Ok(())
}

pub(crate) fn find_user(store: &dyn Store, name: &str) -> anyhow::Result<User> {
    store
        .get_user_by_name(name)?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", name))
}

/// Looks up a project written as `namespace/project`.
pub(crate) fn find_project(store: &dyn Store, reference: &str) -> anyhow::Result<Project> {
    let Some((namespace_name, project_name)) = reference.split_once('/') else {
        anyhow::bail!("Project must be given as NAMESPACE/PROJECT, got '{}'", reference);
    };

    let namespace = store
        .get_namespace_by_name(namespace_name)?
        .ok_or_else(|| anyhow::anyhow!("Namespace not found: {}", namespace_name))?;

    store
        .get_project_by_name(&namespace.id, project_name)?
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", reference))
}
