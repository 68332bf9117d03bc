use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::consistency;
use crate::error::{Error, Result};
use crate::provision;
use crate::types::validation::{
    validate_file_name, validate_namespace_name, validate_permission, validate_project_name,
    validate_team_name, validate_version_name,
};
use crate::types::*;

const NAMESPACE_COLUMNS: &str = "n.id, n.name, n.kind, n.created_at";
const USER_SELECT: &str = "SELECT n.id, n.name, u.email, u.is_active, u.is_staff, u.is_superuser, u.date_joined
     FROM users u JOIN namespaces n ON n.id = u.id";
const ORGANIZATION_SELECT: &str =
    "SELECT n.id, n.name, n.created_at FROM organizations o JOIN namespaces n ON n.id = o.id";
const PROJECT_COLUMNS: &str = "p.id, p.namespace_id, p.name, p.description, p.created_at, p.updated_at";
const PERMISSION_COLUMNS: &str = "p.id, p.slug, p.name, p.description, p.applies_to_project";
const TEAM_COLUMNS: &str = "t.id, t.name, t.is_owner_team, t.organization_id, t.project_id, t.is_all_projects, t.created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

impl FromSql for NamespaceKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let kind = value.as_str()?;
        NamespaceKind::parse(kind)
            .ok_or_else(|| FromSqlError::Other(format!("unknown namespace kind '{kind}'").into()))
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// Row mappers

fn namespace_from_row(row: &Row<'_>) -> rusqlite::Result<Namespace> {
    Ok(Namespace {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        is_active: row.get(3)?,
        is_staff: row.get(4)?,
        is_superuser: row.get(5)?,
        date_joined: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn organization_from_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        namespace_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<Version> {
    Ok(Version {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        version_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn permission_from_row(row: &Row<'_>) -> rusqlite::Result<Permission> {
    Ok(Permission {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        applies_to_project: row.get(4)?,
    })
}

/// A `teams` row before its scope and M2M sets are loaded.
struct TeamRow {
    id: String,
    name: String,
    is_owner_team: bool,
    organization_id: Option<String>,
    project_id: Option<String>,
    is_all_projects: bool,
    created_at: String,
}

fn team_row(row: &Row<'_>) -> rusqlite::Result<TeamRow> {
    Ok(TeamRow {
        id: row.get(0)?,
        name: row.get(1)?,
        is_owner_team: row.get(2)?,
        organization_id: row.get(3)?,
        project_id: row.get(4)?,
        is_all_projects: row.get(5)?,
        created_at: row.get(6)?,
    })
}

// Connection-level helpers. These take a plain connection so they run the
// same way inside and outside a transaction.

fn row_exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )
    .map_err(Error::from)
}

fn query_ids(conn: &Connection, sql: &str, id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![id], |row| row.get(0))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn get_namespace_in(conn: &Connection, id: &str) -> Result<Option<Namespace>> {
    conn.query_row(
        &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces n WHERE n.id = ?1"),
        params![id],
        namespace_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn get_user_in(conn: &Connection, id: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("{USER_SELECT} WHERE u.id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn get_organization_in(conn: &Connection, id: &str) -> Result<Option<Organization>> {
    conn.query_row(
        &format!("{ORGANIZATION_SELECT} WHERE o.id = ?1"),
        params![id],
        organization_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn get_project_in(conn: &Connection, id: &str) -> Result<Option<Project>> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1"),
        params![id],
        project_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn resolve_namespace_in(conn: &Connection, id: &str) -> Result<Option<ResolvedNamespace>> {
    let Some(namespace) = get_namespace_in(conn, id)? else {
        return Ok(None);
    };

    let resolved = match namespace.kind {
        NamespaceKind::User => get_user_in(conn, id)?.map(ResolvedNamespace::User),
        NamespaceKind::Organization => {
            get_organization_in(conn, id)?.map(ResolvedNamespace::Organization)
        }
    };

    resolved.map(Some).ok_or_else(|| {
        Error::Integrity(format!(
            "namespace '{}' is marked as {} but has no {} record",
            namespace.name, namespace.kind, namespace.kind
        ))
    })
}

fn insert_namespace(
    conn: &Connection,
    id: &str,
    name: &str,
    kind: NamespaceKind,
    created_at: &DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO namespaces (id, name, kind, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, kind.as_str(), format_datetime(created_at)],
    )
    .map_err(Error::from_insert)?;
    Ok(())
}

fn load_team_projects(conn: &Connection, team_id: &str) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM team_projects tp
         JOIN projects p ON p.id = tp.project_id
         WHERE tp.team_id = ?1 ORDER BY p.name"
    ))?;
    let rows = stmt.query_map(params![team_id], project_from_row)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn hydrate_team(conn: &Connection, row: TeamRow) -> Result<Team> {
    let scope = match (row.organization_id, row.project_id) {
        (Some(organization_id), None) => TeamScope::Organization {
            organization_id,
            projects: query_ids(
                conn,
                "SELECT project_id FROM team_projects WHERE team_id = ?1 ORDER BY project_id",
                &row.id,
            )?,
            is_all_projects: row.is_all_projects,
        },
        (None, Some(project_id)) => TeamScope::Project { project_id },
        _ => {
            return Err(Error::Integrity(format!(
                "team '{}' must be scoped to exactly one organization or project",
                row.id
            )));
        }
    };

    let users = query_ids(
        conn,
        "SELECT user_id FROM team_users WHERE team_id = ?1 ORDER BY user_id",
        &row.id,
    )?;

    let permissions = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM team_permissions tp
             JOIN permissions p ON p.id = tp.permission_id
             WHERE tp.team_id = ?1 ORDER BY p.slug, p.id"
        ))?;
        let rows = stmt.query_map(params![row.id], permission_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()?
    };

    Ok(Team {
        id: row.id,
        name: row.name,
        is_owner_team: row.is_owner_team,
        scope,
        users,
        permissions,
        created_at: parse_datetime(&row.created_at),
    })
}

fn load_teams<P: rusqlite::Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Team>> {
    let rows = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams t WHERE {filter} ORDER BY t.created_at, t.id"
        ))?;
        let rows = stmt.query_map(params, team_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()?
    };

    rows.into_iter().map(|row| hydrate_team(conn, row)).collect()
}

fn load_team(conn: &Connection, id: &str) -> Result<Option<Team>> {
    Ok(load_teams(conn, "t.id = ?1", params![id])?.into_iter().next())
}

fn insert_team(conn: &Connection, team: &Team) -> Result<()> {
    let (organization_id, project_id, is_all_projects, projects): (
        Option<&str>,
        Option<&str>,
        bool,
        &[String],
    ) = match &team.scope {
        TeamScope::Organization {
            organization_id,
            projects,
            is_all_projects,
        } => (
            Some(organization_id.as_str()),
            None,
            *is_all_projects,
            projects.as_slice(),
        ),
        TeamScope::Project { project_id } => (None, Some(project_id.as_str()), false, &[][..]),
    };

    conn.execute(
        "INSERT INTO teams (id, name, is_owner_team, organization_id, project_id, is_all_projects, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            team.id,
            team.name,
            team.is_owner_team,
            organization_id,
            project_id,
            is_all_projects,
            format_datetime(&team.created_at),
        ],
    )
    .map_err(Error::from_insert)?;

    for user_id in &team.users {
        conn.execute(
            "INSERT OR IGNORE INTO team_users (team_id, user_id) VALUES (?1, ?2)",
            params![team.id, user_id],
        )?;
    }

    for permission in &team.permissions {
        conn.execute(
            "INSERT OR IGNORE INTO team_permissions (team_id, permission_id) VALUES (?1, ?2)",
            params![team.id, permission.id],
        )?;
    }

    for project_id in projects {
        conn.execute(
            "INSERT OR IGNORE INTO team_projects (team_id, project_id) VALUES (?1, ?2)",
            params![team.id, project_id],
        )?;
    }

    Ok(())
}

fn provision_project(conn: &Connection, project: &Project) -> Result<Option<Team>> {
    let existing = load_teams(
        conn,
        "t.project_id = ?1 AND t.is_owner_team = 1",
        params![project.id],
    )?;
    let owner = resolve_namespace_in(conn, &project.namespace_id)?.ok_or_else(|| {
        Error::Integrity(format!(
            "project '{}' references missing namespace '{}'",
            project.name, project.namespace_id
        ))
    })?;

    let Some(team) = provision::project_owner_team(project, &owner, &existing) else {
        return Ok(None);
    };
    insert_team(conn, &team)?;
    tracing::info!(
        project = %project.name,
        owner = %owner.name(),
        "Provisioned project owners team"
    );
    Ok(Some(team))
}

fn provision_organization(conn: &Connection, org: &Organization) -> Result<Option<Team>> {
    let existing = load_teams(
        conn,
        "t.organization_id = ?1 AND t.is_owner_team = 1",
        params![org.id],
    )?;

    let Some(team) = provision::organization_owner_team(org, &existing) else {
        return Ok(None);
    };
    insert_team(conn, &team)?;
    tracing::info!(organization = %org.name, "Provisioned organization owners team");
    Ok(Some(team))
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Namespace operations

    fn get_namespace(&self, id: &str) -> Result<Option<Namespace>> {
        get_namespace_in(&self.conn(), id)
    }

    fn get_namespace_by_name(&self, name: &str) -> Result<Option<Namespace>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {NAMESPACE_COLUMNS} FROM namespaces n WHERE n.name = ?1"),
            params![name],
            namespace_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_namespaces(&self, cursor: &str, limit: i32) -> Result<Vec<Namespace>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {NAMESPACE_COLUMNS} FROM namespaces n WHERE n.name > ?1 ORDER BY n.name LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], namespace_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn resolve_namespace(&self, id: &str) -> Result<Option<ResolvedNamespace>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let resolved = resolve_namespace_in(&tx, id)?;
        tx.commit()?;
        Ok(resolved)
    }

    fn rename_namespace(&self, id: &str, name: &str) -> Result<()> {
        validate_namespace_name(name)?;

        let rows = self
            .conn()
            .execute(
                "UPDATE namespaces SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(Error::from_insert)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        validate_namespace_name(&user.name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        insert_namespace(
            &tx,
            &user.id,
            &user.name,
            NamespaceKind::User,
            &user.date_joined,
        )?;
        tx.execute(
            "INSERT INTO users (id, email, is_active, is_staff, is_superuser, date_joined)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                normalize_email(&user.email),
                user.is_active,
                user.is_staff,
                user.is_superuser,
                format_datetime(&user.date_joined),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        get_user_in(&self.conn(), id)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{USER_SELECT} WHERE n.name = ?1"),
            params![name],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{USER_SELECT} WHERE n.name > ?1 ORDER BY n.name LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        validate_namespace_name(&user.name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE users SET email = ?1, is_active = ?2, is_staff = ?3, is_superuser = ?4
             WHERE id = ?5",
            params![
                normalize_email(&user.email),
                user.is_active,
                user.is_staff,
                user.is_superuser,
                user.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }

        tx.execute(
            "UPDATE namespaces SET name = ?1 WHERE id = ?2",
            params![user.name, user.id],
        )
        .map_err(Error::from_insert)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM namespaces WHERE id = ?1 AND kind = 'user'",
            params![id],
        )?;
        Ok(rows > 0)
    }

    // Organization operations

    fn create_organization(&self, org: &Organization) -> Result<()> {
        validate_namespace_name(&org.name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        insert_namespace(
            &tx,
            &org.id,
            &org.name,
            NamespaceKind::Organization,
            &org.created_at,
        )?;
        tx.execute(
            "INSERT INTO organizations (id) VALUES (?1)",
            params![org.id],
        )?;
        provision_organization(&tx, org)?;

        tx.commit()?;
        Ok(())
    }

    fn get_organization(&self, id: &str) -> Result<Option<Organization>> {
        get_organization_in(&self.conn(), id)
    }

    fn get_organization_by_name(&self, name: &str) -> Result<Option<Organization>> {
        let conn = self.conn();
        conn.query_row(
            &format!("{ORGANIZATION_SELECT} WHERE n.name = ?1"),
            params![name],
            organization_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_organizations(&self, cursor: &str, limit: i32) -> Result<Vec<Organization>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{ORGANIZATION_SELECT} WHERE n.name > ?1 ORDER BY n.name LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], organization_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_organization(&self, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM namespaces WHERE id = ?1 AND kind = 'organization'",
            params![id],
        )?;
        Ok(rows > 0)
    }

    // Project operations

    fn create_project(&self, project: &Project) -> Result<()> {
        validate_project_name(&project.name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        if !row_exists(&tx, "namespaces", &project.namespace_id)? {
            return Err(Error::NotFound);
        }

        tx.execute(
            "INSERT INTO projects (id, namespace_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project.id,
                project.namespace_id,
                project.name,
                project.description,
                format_datetime(&project.created_at),
                format_datetime(&project.updated_at),
            ],
        )
        .map_err(Error::from_insert)?;
        provision_project(&tx, project)?;

        tx.commit()?;
        Ok(())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        get_project_in(&self.conn(), id)
    }

    fn get_project_by_name(&self, namespace_id: &str, name: &str) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.namespace_id = ?1 AND p.name = ?2"
            ),
            params![namespace_id, name],
            project_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_projects(&self, namespace_id: &str) -> Result<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.namespace_id = ?1 ORDER BY p.name"
        ))?;

        let rows = stmt.query_map(params![namespace_id], project_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_project(&self, project: &Project) -> Result<()> {
        validate_project_name(&project.name)?;

        let conn = self.conn();
        let previous = get_project_in(&conn, &project.id)?.ok_or(Error::NotFound)?;

        if !row_exists(&conn, "namespaces", &project.namespace_id)? {
            return Err(Error::NotFound);
        }

        conn.execute(
            "UPDATE projects SET namespace_id = ?1, name = ?2, description = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                project.namespace_id,
                project.name,
                project.description,
                format_datetime(&Utc::now()),
                project.id,
            ],
        )
        .map_err(Error::from_insert)?;

        if previous.namespace_id != project.namespace_id {
            tracing::info!(
                project = %project.name,
                from = %previous.namespace_id,
                to = %project.namespace_id,
                "Project moved; organization teams of the previous owner keep their links until repaired"
            );
        }
        Ok(())
    }

    fn delete_project(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Version operations

    fn create_version(&self, version: &Version) -> Result<()> {
        validate_version_name(&version.name)?;

        let conn = self.conn();
        if !row_exists(&conn, "projects", &version.project_id)? {
            return Err(Error::NotFound);
        }

        conn.execute(
            "INSERT INTO versions (id, project_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                version.id,
                version.project_id,
                version.name,
                version.description,
                format_datetime(&version.created_at),
            ],
        )
        .map_err(Error::from_insert)?;
        Ok(())
    }

    fn get_version(&self, id: &str) -> Result<Option<Version>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, project_id, name, description, created_at FROM versions WHERE id = ?1",
            params![id],
            version_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_versions(&self, project_id: &str) -> Result<Vec<Version>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, description, created_at
             FROM versions WHERE project_id = ?1 ORDER BY created_at, name",
        )?;

        let rows = stmt.query_map(params![project_id], version_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_version(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM versions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // File operations

    fn create_file(&self, file: &File) -> Result<()> {
        validate_file_name(&file.name)?;

        let conn = self.conn();
        if !row_exists(&conn, "versions", &file.version_id)? {
            return Err(Error::NotFound);
        }

        conn.execute(
            "INSERT INTO files (id, version_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                file.id,
                file.version_id,
                file.name,
                file.description,
                format_datetime(&file.created_at),
            ],
        )
        .map_err(Error::from_insert)?;
        Ok(())
    }

    fn get_file(&self, id: &str) -> Result<Option<File>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, version_id, name, description, created_at FROM files WHERE id = ?1",
            params![id],
            file_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_files(&self, version_id: &str) -> Result<Vec<File>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, version_id, name, description, created_at
             FROM files WHERE version_id = ?1 ORDER BY name",
        )?;

        let rows = stmt.query_map(params![version_id], file_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_file(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Permission catalog operations

    fn create_permission(&self, permission: &Permission) -> Result<()> {
        validate_permission(
            &permission.slug,
            &permission.name,
            &permission.description,
        )?;

        self.conn()
            .execute(
                "INSERT INTO permissions (id, slug, name, description, applies_to_project)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    permission.id,
                    permission.slug,
                    permission.name,
                    permission.description,
                    permission.applies_to_project,
                ],
            )
            .map_err(Error::from_insert)?;
        Ok(())
    }

    fn get_permission(&self, id: &str) -> Result<Option<Permission>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PERMISSION_COLUMNS} FROM permissions p WHERE p.id = ?1"),
            params![id],
            permission_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_permissions(&self) -> Result<Vec<Permission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions p ORDER BY p.slug, p.id"
        ))?;

        let rows = stmt.query_map([], permission_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_permissions_by_slug(&self, slug: &str) -> Result<Vec<Permission>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions p WHERE p.slug = ?1 ORDER BY p.id"
        ))?;

        let rows = stmt.query_map(params![slug], permission_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_permission(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM permissions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Team operations

    fn create_team(&self, team: &Team) -> Result<()> {
        validate_team_name(&team.name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        match &team.scope {
            TeamScope::Organization {
                organization_id,
                projects,
                ..
            } => {
                if !row_exists(&tx, "organizations", organization_id)? {
                    return Err(Error::NotFound);
                }
                for project_id in projects {
                    let project = get_project_in(&tx, project_id)?.ok_or(Error::NotFound)?;
                    consistency::ensure_linkable(organization_id, &project)?;
                }
            }
            TeamScope::Project { project_id } => {
                if !row_exists(&tx, "projects", project_id)? {
                    return Err(Error::NotFound);
                }
            }
        }

        for user_id in &team.users {
            if !row_exists(&tx, "users", user_id)? {
                return Err(Error::NotFound);
            }
        }
        for permission in &team.permissions {
            if !row_exists(&tx, "permissions", &permission.id)? {
                return Err(Error::NotFound);
            }
        }

        insert_team(&tx, team)?;

        tx.commit()?;
        Ok(())
    }

    fn get_team(&self, id: &str) -> Result<Option<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let team = load_team(&tx, id)?;
        tx.commit()?;
        Ok(team)
    }

    fn list_organization_teams(&self, organization_id: &str) -> Result<Vec<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let teams = load_teams(&tx, "t.organization_id = ?1", params![organization_id])?;
        tx.commit()?;
        Ok(teams)
    }

    fn list_project_teams(&self, project_id: &str) -> Result<Vec<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let teams = load_teams(&tx, "t.project_id = ?1", params![project_id])?;
        tx.commit()?;
        Ok(teams)
    }

    fn delete_team(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM teams WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Team M2M operations

    fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<()> {
        let conn = self.conn();
        if !row_exists(&conn, "teams", team_id)? || !row_exists(&conn, "users", user_id)? {
            return Err(Error::NotFound);
        }

        conn.execute(
            "INSERT OR IGNORE INTO team_users (team_id, user_id) VALUES (?1, ?2)",
            params![team_id, user_id],
        )?;
        Ok(())
    }

    fn remove_team_member(&self, team_id: &str, user_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM team_users WHERE team_id = ?1 AND user_id = ?2",
            params![team_id, user_id],
        )?;
        Ok(rows > 0)
    }

    fn grant_team_permission(&self, team_id: &str, permission_id: &str) -> Result<()> {
        let conn = self.conn();
        if !row_exists(&conn, "teams", team_id)?
            || !row_exists(&conn, "permissions", permission_id)?
        {
            return Err(Error::NotFound);
        }

        conn.execute(
            "INSERT OR IGNORE INTO team_permissions (team_id, permission_id) VALUES (?1, ?2)",
            params![team_id, permission_id],
        )?;
        Ok(())
    }

    fn revoke_team_permission(&self, team_id: &str, permission_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM team_permissions WHERE team_id = ?1 AND permission_id = ?2",
            params![team_id, permission_id],
        )?;
        Ok(rows > 0)
    }

    fn link_team_project(&self, team_id: &str, project_id: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let team = load_team(&tx, team_id)?.ok_or(Error::NotFound)?;
        let Some(organization_id) = team.organization_id() else {
            return Err(Error::Conflict(
                "project teams cannot be linked to other projects".to_string(),
            ));
        };
        let project = get_project_in(&tx, project_id)?.ok_or(Error::NotFound)?;
        consistency::ensure_linkable(organization_id, &project)?;

        tx.execute(
            "INSERT OR IGNORE INTO team_projects (team_id, project_id) VALUES (?1, ?2)",
            params![team_id, project_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn unlink_team_project(&self, team_id: &str, project_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM team_projects WHERE team_id = ?1 AND project_id = ?2",
            params![team_id, project_id],
        )?;
        Ok(rows > 0)
    }

    fn set_team_all_projects(&self, team_id: &str, all_projects: bool) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE teams SET is_all_projects = ?1 WHERE id = ?2 AND organization_id IS NOT NULL",
            params![all_projects, team_id],
        )?;

        if rows == 0 {
            if row_exists(&conn, "teams", team_id)? {
                return Err(Error::Conflict(
                    "only organization teams can cover all projects".to_string(),
                ));
            }
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Permission resolution support

    fn list_user_project_teams(&self, project_id: &str, user_id: &str) -> Result<Vec<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let teams = load_teams(
            &tx,
            "t.project_id = ?1
             AND EXISTS (SELECT 1 FROM team_users tu WHERE tu.team_id = t.id AND tu.user_id = ?2)",
            params![project_id, user_id],
        )?;
        tx.commit()?;
        Ok(teams)
    }

    fn list_user_organization_teams(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Vec<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let teams = load_teams(
            &tx,
            "t.organization_id = ?1
             AND EXISTS (SELECT 1 FROM team_users tu WHERE tu.team_id = t.id AND tu.user_id = ?2)",
            params![organization_id, user_id],
        )?;
        tx.commit()?;
        Ok(teams)
    }

    // Consistency support

    fn list_team_projects(&self, team_id: &str) -> Result<Vec<Project>> {
        load_team_projects(&self.conn(), team_id)
    }

    fn retain_team_projects(&self, team_id: &str) -> Result<Vec<String>> {
        let mut conn = self.conn();
        // Take the write lock up front so no project can move between the
        // read of the links and their removal.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let team = load_team(&tx, team_id)?.ok_or(Error::NotFound)?;
        let removed: Vec<String> = match team.organization_id() {
            Some(organization_id) => {
                let linked = load_team_projects(&tx, team_id)?;
                consistency::foreign_projects(organization_id, &linked)
                    .map(|project| project.id.clone())
                    .collect()
            }
            None => Vec::new(),
        };

        for project_id in &removed {
            tx.execute(
                "DELETE FROM team_projects WHERE team_id = ?1 AND project_id = ?2",
                params![team_id, project_id],
            )?;
        }

        tx.commit()?;
        Ok(removed)
    }

    // Owner-team provisioning

    fn provision_project_owner_team(&self, project_id: &str) -> Result<Option<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let project = get_project_in(&tx, project_id)?.ok_or(Error::NotFound)?;
        let team = provision_project(&tx, &project)?;

        tx.commit()?;
        Ok(team)
    }

    fn provision_organization_owner_team(&self, organization_id: &str) -> Result<Option<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let org = get_organization_in(&tx, organization_id)?.ok_or(Error::NotFound)?;
        let team = provision_organization(&tx, &org)?;

        tx.commit()?;
        Ok(team)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
