use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the team created alongside every new project or organization.
pub const OWNERS_TEAM_NAME: &str = "Owners";

/// Discriminator stored with every namespace row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceKind {
    User,
    Organization,
}

impl NamespaceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }

    pub fn parse(s: &str) -> Option<NamespaceKind> {
        match s {
            "user" => Some(Self::User),
            "organization" => Some(Self::Organization),
            _ => None,
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shared identity row behind every user and organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub id: String,
    pub name: String,
    pub kind: NamespaceKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Same value as the id of the user's namespace row.
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: normalize_email(email),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }

    #[must_use]
    pub fn new_superuser(name: impl Into<String>, email: &str) -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
            ..Self::new(name, email)
        }
    }
}

/// Lowercases the domain part of an email address. The local part is left
/// alone since mail servers may treat it case-sensitively.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A namespace resolved to its concrete variant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedNamespace {
    User(User),
    Organization(Organization),
}

impl ResolvedNamespace {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::User(user) => &user.id,
            Self::Organization(org) => &org.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::User(user) => &user.name,
            Self::Organization(org) => &org.name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NamespaceKind {
        match self {
            Self::User(_) => NamespaceKind::User,
            Self::Organization(_) => NamespaceKind::Organization,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub namespace_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    #[must_use]
    pub fn new(
        namespace_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            namespace_id: namespace_id.into(),
            name: name.into(),
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Version {
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: String,
    pub version_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl File {
    #[must_use]
    pub fn new(
        version_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version_id: version_id.into(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// An entry in the catalog of grantable rights. Slugs are indexed but not
/// unique, so several catalog rows may share one slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub applies_to_project: bool,
}

impl Permission {
    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slug: slug.into(),
            name: name.into(),
            description: description.into(),
            applies_to_project: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum TeamScope {
    Organization {
        organization_id: String,
        /// Explicitly linked project ids. Ignored for resolution when
        /// `is_all_projects` is set.
        #[serde(default)]
        projects: Vec<String>,
        #[serde(default)]
        is_all_projects: bool,
    },
    Project {
        project_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub is_owner_team: bool,
    #[serde(flatten)]
    pub scope: TeamScope,
    /// Member user ids.
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    #[must_use]
    pub fn for_organization(name: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self::with_scope(
            name,
            TeamScope::Organization {
                organization_id: organization_id.into(),
                projects: Vec::new(),
                is_all_projects: false,
            },
        )
    }

    #[must_use]
    pub fn for_project(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self::with_scope(
            name,
            TeamScope::Project {
                project_id: project_id.into(),
            },
        )
    }

    fn with_scope(name: impl Into<String>, scope: TeamScope) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            is_owner_team: false,
            scope,
            users: Vec::new(),
            permissions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn owner(mut self) -> Self {
        self.is_owner_team = true;
        self
    }

    /// Marks an organization team as covering every project of its
    /// organization. Has no effect on project teams.
    #[must_use]
    pub fn all_projects(mut self) -> Self {
        if let TeamScope::Organization {
            is_all_projects, ..
        } = &mut self.scope
        {
            *is_all_projects = true;
        }
        self
    }

    #[must_use]
    pub fn organization_id(&self) -> Option<&str> {
        match &self.scope {
            TeamScope::Organization {
                organization_id, ..
            } => Some(organization_id),
            TeamScope::Project { .. } => None,
        }
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        match &self.scope {
            TeamScope::Project { project_id } => Some(project_id),
            TeamScope::Organization { .. } => None,
        }
    }

    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.users.iter().any(|id| id == user_id)
    }

    #[must_use]
    pub fn holds_slug(&self, slug: &str) -> bool {
        self.permissions.iter().any(|p| p.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("Alice@Example.COM"), "Alice@example.com");
        assert_eq!(normalize_email("  bob@HOST "), "bob@host");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
        assert_eq!(normalize_email(""), "");
    }

    #[test]
    fn test_superuser_flags() {
        let user = User::new("alice", "alice@example.com");
        assert!(user.is_active);
        assert!(!user.is_superuser);

        let admin = User::new_superuser("root", "root@example.com");
        assert!(admin.is_staff);
        assert!(admin.is_superuser);
    }

    #[test]
    fn test_all_projects_ignored_for_project_team() {
        let team = Team::for_project("devs", "p-1").all_projects();
        assert_eq!(
            team.scope,
            TeamScope::Project {
                project_id: "p-1".to_string()
            }
        );
    }

    #[test]
    fn test_namespace_kind_parse() {
        assert_eq!(NamespaceKind::parse("user"), Some(NamespaceKind::User));
        assert_eq!(
            NamespaceKind::parse("organization"),
            Some(NamespaceKind::Organization)
        );
        assert_eq!(NamespaceKind::parse("group"), None);
    }
}
