mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the persistence interface the permission core calls into.
///
/// Creation of projects and organizations provisions their owner team in the
/// same transaction as the insert. Team lookups used for permission checks
/// and the project repair of organization teams are each executed inside a
/// single transaction.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Namespace operations
    fn get_namespace(&self, id: &str) -> Result<Option<Namespace>>;
    fn get_namespace_by_name(&self, name: &str) -> Result<Option<Namespace>>;
    fn list_namespaces(&self, cursor: &str, limit: i32) -> Result<Vec<Namespace>>;
    /// Returns the concrete variant behind a namespace id, `None` if no such
    /// namespace exists, or [`Error::Integrity`](crate::error::Error::Integrity)
    /// if the row exists but its variant record does not.
    fn resolve_namespace(&self, id: &str) -> Result<Option<ResolvedNamespace>>;
    fn rename_namespace(&self, id: &str, name: &str) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Organization operations
    fn create_organization(&self, org: &Organization) -> Result<()>;
    fn get_organization(&self, id: &str) -> Result<Option<Organization>>;
    fn get_organization_by_name(&self, name: &str) -> Result<Option<Organization>>;
    fn list_organizations(&self, cursor: &str, limit: i32) -> Result<Vec<Organization>>;
    fn delete_organization(&self, id: &str) -> Result<bool>;

    // Project operations
    fn create_project(&self, project: &Project) -> Result<()>;
    fn get_project(&self, id: &str) -> Result<Option<Project>>;
    fn get_project_by_name(&self, namespace_id: &str, name: &str) -> Result<Option<Project>>;
    fn list_projects(&self, namespace_id: &str) -> Result<Vec<Project>>;
    /// Persists name, description and owning namespace. Moving a project to
    /// another namespace does not touch team links.
    fn update_project(&self, project: &Project) -> Result<()>;
    fn delete_project(&self, id: &str) -> Result<bool>;

    // Version operations
    fn create_version(&self, version: &Version) -> Result<()>;
    fn get_version(&self, id: &str) -> Result<Option<Version>>;
    fn list_versions(&self, project_id: &str) -> Result<Vec<Version>>;
    fn delete_version(&self, id: &str) -> Result<bool>;

    // File operations
    fn create_file(&self, file: &File) -> Result<()>;
    fn get_file(&self, id: &str) -> Result<Option<File>>;
    fn list_files(&self, version_id: &str) -> Result<Vec<File>>;
    fn delete_file(&self, id: &str) -> Result<bool>;

    // Permission catalog operations
    fn create_permission(&self, permission: &Permission) -> Result<()>;
    fn get_permission(&self, id: &str) -> Result<Option<Permission>>;
    fn list_permissions(&self) -> Result<Vec<Permission>>;
    fn list_permissions_by_slug(&self, slug: &str) -> Result<Vec<Permission>>;
    fn delete_permission(&self, id: &str) -> Result<bool>;

    // Team operations
    fn create_team(&self, team: &Team) -> Result<()>;
    fn get_team(&self, id: &str) -> Result<Option<Team>>;
    fn list_organization_teams(&self, organization_id: &str) -> Result<Vec<Team>>;
    fn list_project_teams(&self, project_id: &str) -> Result<Vec<Team>>;
    fn delete_team(&self, id: &str) -> Result<bool>;

    // Team M2M operations
    fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<()>;
    fn remove_team_member(&self, team_id: &str, user_id: &str) -> Result<bool>;
    fn grant_team_permission(&self, team_id: &str, permission_id: &str) -> Result<()>;
    fn revoke_team_permission(&self, team_id: &str, permission_id: &str) -> Result<bool>;
    fn link_team_project(&self, team_id: &str, project_id: &str) -> Result<()>;
    fn unlink_team_project(&self, team_id: &str, project_id: &str) -> Result<bool>;
    fn set_team_all_projects(&self, team_id: &str, all_projects: bool) -> Result<()>;

    // Permission resolution support
    fn list_user_project_teams(&self, project_id: &str, user_id: &str) -> Result<Vec<Team>>;
    fn list_user_organization_teams(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Vec<Team>>;

    // Consistency support
    fn list_team_projects(&self, team_id: &str) -> Result<Vec<Project>>;
    /// Unlinks every project that no longer belongs to the team's
    /// organization and returns the removed project ids.
    fn retain_team_projects(&self, team_id: &str) -> Result<Vec<String>>;

    // Owner-team provisioning, safe to re-run for the same entity
    fn provision_project_owner_team(&self, project_id: &str) -> Result<Option<Team>>;
    fn provision_organization_owner_team(&self, organization_id: &str) -> Result<Option<Team>>;

    fn close(&self) -> Result<()>;
}
