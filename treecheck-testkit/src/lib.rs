//! treecheck test kit - sandboxes, triggers and scenarios.
//!
//! This crate wires the `treecheck-core` verification engine to concrete
//! collaborators so that export-style operations can be tested end to end.
//!
//! # Key Types
//!
//! - [`Sandbox`]: Temporary repository seeded with the greek baseline tree
//! - [`HarnessConfig`]: Settings loaded from `treecheck.toml`
//! - [`ExportTrigger`] / [`CommandTrigger`]: Operations under test
//! - [`Scenario`]: Defines an export and its expected output and disk state
//!
//! # Available Clients
//!
//! | Client | Description |
//! |--------|-------------|
//! | `Client::Reference` | In-process export that copies the repository subtree |
//! | `Client::External` | Imports the sandbox into a real repository, then runs `<client> export <url> <target>` (feature: `external-client` for tests) |
//!
//! # Example
//!
//! ```no_run
//! use treecheck_testkit::{standard, Client, Sandbox};
//!
//! let sandbox = Sandbox::build("export_greek_tree").unwrap();
//! let result = standard::export_greek_tree()
//!     .run(&sandbox, &Client::Reference)
//!     .unwrap();
//! assert!(result.passed(), "{:?}", result);
//! ```

mod config;
mod sandbox;
mod trigger;
mod scenario;
mod integration;

pub use config::{HarnessConfig, CONFIG_FILE_NAME};
pub use sandbox::{Sandbox, SandboxError};
pub use trigger::{Client, CommandTrigger, ExportError, ExportTrigger};
pub use scenario::{standard, Scenario, ScenarioBuilder};

/// Re-export treecheck_core for convenience in tests.
pub use treecheck_core;
