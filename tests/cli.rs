//! CLI integration tests for the gatehouse binary.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use gatehouse::store::{SqliteStore, Store};
use predicates::prelude::*;
use serde_json::Value;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// A context with the database already created.
    fn initialized() -> Self {
        let ctx = Self::new();
        ctx.init().success();
        ctx
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn init(&self) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["init", "--data-dir", &self.data_dir_str()])
            .assert()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gatehouse").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Runs `gatehouse <group> <action> --data-dir <dir> <args...>`.
    fn run(&self, group: &str, action: &str, args: &[&str]) -> assert_cmd::assert::Assert {
        let data_dir = self.data_dir_str();
        let mut full = vec![group, action, "--data-dir", data_dir.as_str()];
        full.extend_from_slice(args);
        self.cmd().args(full).assert()
    }

    fn check(&self, user: &str, slug: &str, target: &[&str]) -> assert_cmd::assert::Assert {
        let data_dir = self.data_dir_str();
        let mut full = vec![
            "check",
            "--data-dir",
            data_dir.as_str(),
            "--user",
            user,
            "--slug",
            slug,
        ];
        full.extend_from_slice(target);
        self.cmd().args(full).assert()
    }

    fn info_json(&self) -> Value {
        let output = self
            .cmd()
            .args(["info", "--data-dir", &self.data_dir_str(), "--json"])
            .output()
            .expect("failed to run command");

        serde_json::from_slice(&output.stdout).expect("failed to parse JSON")
    }
}

fn add_user(ctx: &TestContext, name: &str) {
    let email = format!("{name}@example.com");
    ctx.run("user", "add", &["--name", name, "--email", &email])
        .success();
}

fn add_org(ctx: &TestContext, name: &str) {
    ctx.run("org", "add", &["--name", name]).success();
}

fn add_project(ctx: &TestContext, namespace: &str, name: &str) {
    ctx.run("project", "add", &["--namespace", namespace, "--name", name])
        .success();
}

fn add_permission(ctx: &TestContext, slug: &str) {
    ctx.run(
        "permission",
        "add",
        &["--slug", slug, "--name", slug, "--description", "test right"],
    )
    .success();
}

fn list_json(ctx: &TestContext, key: &str) -> Vec<Value> {
    ctx.info_json()[key]
        .as_array()
        .unwrap_or_else(|| panic!("{key} not an array"))
        .clone()
}

fn find_by_field<'a>(items: &'a [Value], field: &str, value: &str) -> &'a Value {
    items
        .iter()
        .find(|item| item[field] == value)
        .expect("item not found")
}

fn team_id(ctx: &TestContext, name: &str) -> String {
    let teams = list_json(ctx, "teams");
    find_by_field(&teams, "name", name)["id"]
        .as_str()
        .expect("id not a string")
        .to_string()
}

fn open_store(ctx: &TestContext) -> SqliteStore {
    let db_path = ctx.data_dir().join("gatehouse.db");
    SqliteStore::new(&db_path).expect("open store")
}

/// Organization `acme` with project `widgets`, user `alice` and a `devs`
/// team granting `deploy` on widgets.
fn acme_with_devs() -> (TestContext, String) {
    let ctx = TestContext::initialized();
    add_org(&ctx, "acme");
    add_project(&ctx, "acme", "widgets");
    add_user(&ctx, "alice");
    add_user(&ctx, "bob");
    add_permission(&ctx, "deploy");

    ctx.run("team", "add", &["--name", "devs", "--org", "acme"])
        .success();
    let devs = team_id(&ctx, "devs");
    ctx.run("team", "member", &["--team-id", &devs, "--user", "alice"])
        .success();
    ctx.run("team", "grant", &["--team-id", &devs, "--slug", "deploy"])
        .success();
    ctx.run("team", "link", &["--team-id", &devs, "--project", "acme/widgets"])
        .success();

    (ctx, devs)
}

#[test]
fn test_init_creates_database() {
    let ctx = TestContext::new();
    ctx.init()
        .success()
        .stdout(predicate::str::contains("Initialized database"));

    assert!(ctx.data_dir().join("gatehouse.db").exists());
    assert_eq!(open_store(&ctx).list_users("", 10).expect("list").len(), 0);
}

#[test]
fn test_init_twice_fails() {
    let ctx = TestContext::initialized();
    ctx.init()
        .failure()
        .stderr(predicate::str::contains("Already initialized"));
}

#[test]
fn test_commands_require_init() {
    let ctx = TestContext::new();
    ctx.run("user", "add", &["--name", "alice"])
        .failure()
        .stderr(predicate::str::contains("gatehouse init"));
}

#[test]
fn test_user_add_lowercases_email_domain() {
    let ctx = TestContext::initialized();
    ctx.run(
        "user",
        "add",
        &["--name", "alice", "--email", "Alice@Example.COM", "--staff"],
    )
    .success()
    .stdout(predicate::str::contains("Created user \"alice\""));

    let users = list_json(&ctx, "users");
    let alice = find_by_field(&users, "name", "alice");
    assert_eq!(alice["email"], "Alice@example.com");
    assert_eq!(alice["is_staff"], true);
    assert_eq!(alice["is_superuser"], false);
}

#[test]
fn test_user_and_org_share_namespace_names() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "acme");
    ctx.run("org", "add", &["--name", "acme"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_user_remove_requires_yes() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");

    ctx.run("user", "remove", &["--name", "alice"])
        .failure()
        .stderr(predicate::str::contains("--yes"));

    ctx.run("user", "remove", &["--name", "alice", "--yes"])
        .success();
    assert!(list_json(&ctx, "users").is_empty());
}

#[test]
fn test_org_add_provisions_owners_team() {
    let ctx = TestContext::initialized();
    add_org(&ctx, "acme");

    let teams = list_json(&ctx, "teams");
    assert_eq!(teams.len(), 1);
    let owners = &teams[0];
    assert_eq!(owners["name"], "Owners");
    assert_eq!(owners["scope"], "organization");
    assert_eq!(owners["is_owner_team"], true);
    assert_eq!(owners["is_all_projects"], true);
    assert!(owners["members"].as_array().expect("members").is_empty());
}

#[test]
fn test_project_in_user_namespace_gets_owner_team() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");
    add_project(&ctx, "alice", "dotfiles");

    let teams = list_json(&ctx, "teams");
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0]["name"], "Owners");
    assert_eq!(teams[0]["scope"], "project");
    assert_eq!(teams[0]["members"], serde_json::json!(["alice"]));
}

#[test]
fn test_project_in_org_namespace_gets_no_project_team() {
    let ctx = TestContext::initialized();
    add_org(&ctx, "acme");
    add_project(&ctx, "acme", "widgets");

    let teams = list_json(&ctx, "teams");
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0]["scope"], "organization");
}

#[test]
fn test_duplicate_project_name_rejected() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");
    add_project(&ctx, "alice", "dotfiles");

    ctx.run("project", "add", &["--namespace", "alice", "--name", "dotfiles"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_invalid_project_name_rejected() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");

    ctx.run("project", "add", &["--namespace", "alice", "--name", "has space"])
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn test_check_user_namespace_is_self_only() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");
    add_user(&ctx, "bob");
    add_project(&ctx, "alice", "dotfiles");

    ctx.check("alice", "anything", &["--namespace", "alice"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("bob", "anything", &["--namespace", "alice"])
        .success()
        .stdout(predicate::str::contains("denied"));

    ctx.check("alice", "anything", &["--project", "alice/dotfiles"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("bob", "anything", &["--project", "alice/dotfiles"])
        .success()
        .stdout(predicate::str::contains("denied"));
}

#[test]
fn test_check_through_linked_org_team() {
    let (ctx, _) = acme_with_devs();

    ctx.check("alice", "deploy", &["--project", "acme/widgets"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("alice", "delete", &["--project", "acme/widgets"])
        .success()
        .stdout(predicate::str::contains("denied"));
    ctx.check("bob", "deploy", &["--project", "acme/widgets"])
        .success()
        .stdout(predicate::str::contains("denied"));

    // Without a project only all-projects teams apply.
    ctx.check("alice", "deploy", &["--namespace", "acme"])
        .success()
        .stdout(predicate::str::contains("denied"));
}

#[test]
fn test_org_owners_team_grants_everything() {
    let ctx = TestContext::initialized();
    add_org(&ctx, "acme");
    add_project(&ctx, "acme", "widgets");
    add_user(&ctx, "carol");

    let owners = team_id(&ctx, "Owners");
    ctx.run("team", "member", &["--team-id", &owners, "--user", "carol"])
        .success();

    ctx.check("carol", "not-in-catalog", &["--project", "acme/widgets"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("carol", "not-in-catalog", &["--namespace", "acme"])
        .success()
        .stdout(predicate::str::contains("allowed"));
}

#[test]
fn test_link_foreign_project_rejected() {
    let (ctx, devs) = acme_with_devs();
    add_org(&ctx, "beta");
    add_project(&ctx, "beta", "gadgets");

    ctx.run("team", "link", &["--team-id", &devs, "--project", "beta/gadgets"])
        .failure()
        .stderr(predicate::str::contains("does not belong"));
}

#[test]
fn test_move_then_repair_team() {
    let (ctx, devs) = acme_with_devs();
    add_org(&ctx, "beta");

    ctx.run("project", "move", &["--project", "acme/widgets", "--to", "beta"])
        .success();

    // The stale link no longer grants anything.
    ctx.check("alice", "deploy", &["--project", "beta/widgets"])
        .success()
        .stdout(predicate::str::contains("denied"));

    ctx.run("team", "check", &["--team-id", &devs])
        .success()
        .stdout(predicate::str::contains("inconsistent"))
        .stdout(predicate::str::contains("beta/widgets"));

    ctx.run("team", "repair", &["--team-id", &devs])
        .success()
        .stdout(predicate::str::contains("1 link(s) removed"));

    ctx.run("team", "check", &["--team-id", &devs])
        .success()
        .stdout(predicate::str::diff("consistent\n"));

    let teams = list_json(&ctx, "teams");
    let team = find_by_field(&teams, "name", "devs");
    assert!(team["projects"].as_array().expect("projects").is_empty());
}

#[test]
fn test_org_repair_covers_all_teams() {
    let (ctx, _) = acme_with_devs();
    add_org(&ctx, "beta");
    ctx.run("team", "add", &["--name", "qa", "--org", "acme"])
        .success();
    let qa = team_id(&ctx, "qa");
    ctx.run("team", "link", &["--team-id", &qa, "--project", "acme/widgets"])
        .success();

    ctx.run("project", "move", &["--project", "acme/widgets", "--to", "beta"])
        .success();

    ctx.run("org", "repair", &["--name", "acme"])
        .success()
        .stdout(predicate::str::contains("2 link(s) removed"));

    ctx.run("org", "repair", &["--name", "acme"])
        .success()
        .stdout(predicate::str::contains("0 link(s) removed"));
}

#[test]
fn test_all_projects_team_covers_namespace_and_projects() {
    let ctx = TestContext::initialized();
    add_org(&ctx, "acme");
    add_project(&ctx, "acme", "widgets");
    add_user(&ctx, "alice");
    add_permission(&ctx, "deploy");

    ctx.run(
        "team",
        "add",
        &["--name", "ops", "--org", "acme", "--all-projects"],
    )
    .success();
    let ops = team_id(&ctx, "ops");
    ctx.run("team", "member", &["--team-id", &ops, "--user", "alice"])
        .success();
    ctx.run("team", "grant", &["--team-id", &ops, "--slug", "deploy"])
        .success();

    let teams = list_json(&ctx, "teams");
    assert_eq!(find_by_field(&teams, "name", "ops")["is_all_projects"], true);

    ctx.check("alice", "deploy", &["--namespace", "acme"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("alice", "deploy", &["--project", "acme/widgets"])
        .success()
        .stdout(predicate::str::contains("allowed"));
    ctx.check("alice", "delete", &["--namespace", "acme"])
        .success()
        .stdout(predicate::str::contains("denied"));
}

#[test]
fn test_all_projects_rejected_for_project_team() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");
    add_project(&ctx, "alice", "dotfiles");

    ctx.run(
        "team",
        "add",
        &["--name", "ops", "--project", "alice/dotfiles", "--all-projects"],
    )
    .failure();

    let result = gatehouse::cli::run_team_add(
        ctx.data_dir_str(),
        "ops".to_string(),
        None,
        Some("alice/dotfiles".to_string()),
        false,
        true,
    );
    let err = result.expect_err("project team with --all-projects");
    assert!(err.to_string().contains("only applies to organization teams"));

    let teams = list_json(&ctx, "teams");
    assert!(teams.iter().all(|team| team["name"] != "ops"));
}

#[test]
fn test_user_email_goes_through_log_mailer() {
    let ctx = TestContext::initialized();
    add_user(&ctx, "alice");
    ctx.run("user", "add", &["--name", "bob"]).success();

    ctx.run(
        "user",
        "email",
        &["--name", "alice", "--subject", "Welcome", "--message", "Hi there"],
    )
    .success()
    .stdout(predicate::str::contains("Queued mail to \"alice\" <alice@example.com>"))
    .stderr(predicate::str::contains("Welcome"));

    ctx.run(
        "user",
        "email",
        &["--name", "bob", "--subject", "Welcome", "--message", "Hi there"],
    )
    .failure()
    .stderr(predicate::str::contains("no email address"));
}

#[test]
fn test_grant_unknown_slug_fails() {
    let (ctx, devs) = acme_with_devs();
    ctx.run("team", "grant", &["--team-id", &devs, "--slug", "missing"])
        .failure()
        .stderr(predicate::str::contains("Permission not found"));
}

#[test]
fn test_team_add_requires_scope() {
    let ctx = TestContext::initialized();
    ctx.run("team", "add", &["--name", "devs"]).failure();
}

#[test]
fn test_info_summary() {
    let (ctx, _) = acme_with_devs();
    ctx.cmd()
        .args(["info", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Users:          2"))
        .stdout(predicate::str::contains("Teams:          2"));
}
