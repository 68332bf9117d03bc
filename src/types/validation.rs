use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 32;
const MAX_SLUG_LEN: usize = 64;
const MAX_PERMISSION_NAME_LEN: usize = 64;
const MAX_TEAM_NAME_LEN: usize = 80;

/// Word characters plus `.`, `@`, `+` and `-`.
fn is_extended_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn check_length(value: &str, entity: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{entity} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(Error::Validation(format!(
            "{entity} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}

/// Strict identifier: no spaces anywhere.
fn validate_extended_name(name: &str, entity: &str) -> Result<()> {
    check_length(name, entity, MAX_NAME_LEN)?;
    if !name.chars().all(is_extended_char) {
        return Err(Error::Validation(format!(
            "{entity} can only contain letters, digits, underscores, and . @ + -"
        )));
    }
    Ok(())
}

/// Like [`validate_extended_name`] but allows internal spaces.
fn validate_trimmed_name(name: &str, entity: &str) -> Result<()> {
    check_length(name, entity, MAX_NAME_LEN)?;
    if !name.chars().all(|c| c == ' ' || is_extended_char(c)) {
        return Err(Error::Validation(format!(
            "{entity} can only contain letters, digits, spaces, underscores, and . @ + -"
        )));
    }
    if name.starts_with(' ') || name.ends_with(' ') {
        return Err(Error::Validation(format!(
            "{entity} cannot start or end with a space"
        )));
    }
    Ok(())
}

pub fn validate_namespace_name(name: &str) -> Result<()> {
    validate_extended_name(name, "Namespace name")
}

pub fn validate_project_name(name: &str) -> Result<()> {
    validate_extended_name(name, "Project name")
}

pub fn validate_version_name(name: &str) -> Result<()> {
    validate_trimmed_name(name, "Version name")
}

pub fn validate_file_name(name: &str) -> Result<()> {
    validate_trimmed_name(name, "File name")
}

pub fn validate_permission(slug: &str, name: &str, description: &str) -> Result<()> {
    check_length(slug, "Permission slug", MAX_SLUG_LEN)?;
    if !slug.chars().all(is_slug_char) {
        return Err(Error::Validation(
            "Permission slug can only contain ASCII letters, digits, hyphens, and underscores"
                .to_string(),
        ));
    }
    check_length(name.trim(), "Permission name", MAX_PERMISSION_NAME_LEN)?;
    if description.trim().is_empty() {
        return Err(Error::Validation(
            "Permission description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_team_name(name: &str) -> Result<()> {
    check_length(name.trim(), "Team name", MAX_TEAM_NAME_LEN)
}
