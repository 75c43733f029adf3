//! Command-line interface for `tidytree`.
//!
//! ```text
//! tidytree analyze  [REPO]                      scan statistics
//! tidytree propose  [REPO] [--format json]      plan + confidence + advisories
//! tidytree apply    [REPO] [--execute] [--yes]  reviewed, logged moves
//! tidytree rollback [REPO] [-n N] [--execute]   LIFO undo from the audit log
//! ```
//!
//! # Module Structure
//!
//! - [`command`] - clap definitions (source of truth for flags)
//! - [`dispatch`] - handlers wiring the library pipeline to the terminal
//! - [`prompt`] - y/n/a/q approval loop used by `apply`
//! - [`report`] - the `propose` report in text and JSON form

pub mod command;
pub mod dispatch;
pub mod prompt;
pub mod report;

pub use command::{Cli, Command, GlobalOptions};
pub use dispatch::dispatch;
