//! # Gatehouse
//!
//! Team-based permission resolution for a source-hosting platform, usable
//! both as a standalone admin binary and as a library.
//!
//! Users and organizations own projects. Access to a project is granted
//! through teams scoped either to the project or to its organization.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! gatehouse = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use gatehouse::access::{Target, has_permission};
//! use gatehouse::store::{SqliteStore, Store};
//! use gatehouse::types::{Organization, Project, User};
//!
//! let store = SqliteStore::new("./data/gatehouse.db")?;
//! store.initialize()?;
//!
//! let acme = Organization::new("acme");
//! store.create_organization(&acme)?; // also creates the "Owners" team
//!
//! let widgets = Project::new(&acme.id, "widgets", "");
//! store.create_project(&widgets)?;
//!
//! let alice = User::new("alice", "alice@example.com");
//! store.create_user(&alice)?;
//! let owners = store.list_organization_teams(&acme.id)?.remove(0);
//! store.add_team_member(&owners.id, &alice.id)?;
//!
//! assert!(has_permission(&store, &alice, "deploy", Target::Project(&widgets))?);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod access;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod consistency;
pub mod error;
pub mod notify;
pub mod provision;
pub mod store;
pub mod types;
