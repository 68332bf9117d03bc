use crate::access::{Target, has_permission};
use crate::store::Store;
use crate::types::ResolvedNamespace;

use super::{find_project, find_user, init_store};

/// Prints `allowed` or `denied`. A denial is not an error.
pub fn run_check(
    data_dir: String,
    user: String,
    slug: String,
    project: Option<String>,
    namespace: Option<String>,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let acting = find_user(&store, &user)?;

    let allowed = match (project, namespace) {
        (Some(reference), None) => {
            let project = find_project(&store, &reference)?;
            has_permission(&store, &acting, &slug, Target::Project(&project))?
        }
        (None, Some(name)) => {
            let ns = store
                .get_namespace_by_name(&name)?
                .ok_or_else(|| anyhow::anyhow!("Namespace not found: {}", name))?;
            let resolved = store.resolve_namespace(&ns.id)?.ok_or_else(|| {
                anyhow::anyhow!("Namespace '{}' has no user or organization record", name)
            })?;
            let target = match &resolved {
                ResolvedNamespace::User(account) => Target::User(account),
                ResolvedNamespace::Organization(org) => Target::Organization(org, None),
            };
            has_permission(&store, &acting, &slug, target)?
        }
        _ => anyhow::bail!("Exactly one of --project or --namespace is required"),
    };

    println!("{}", if allowed { "allowed" } else { "denied" });
    Ok(())
}
