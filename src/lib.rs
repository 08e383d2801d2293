//! # paperbase
//!
//! A plain-text record store: people, leads, projects, and outreach live as
//! Markdown files under convention-based directories, edited by humans and a
//! conversational agent. This crate is the deterministic core around that
//! store:
//!
//! - **Status blocks** (`status`): parse/validate the `## Status` section and
//!   its lead/project lifecycle machines
//! - **Staleness reports** (`report`): age classification and the status table
//! - **Scheduling** (`schedule`): `@reminder`/`@calendar`/`@imessage` tags,
//!   time-expression resolution, and an idempotency ledger so rescans never
//!   duplicate external actions
//! - **Move audit** (`audit`): provenance of tasks carried across weekly plans
//!
//! ## Library usage
//!
//! ```no_run
//! use paperbase::config::StoreConfig;
//! use paperbase::layout::StoreLayout;
//! use paperbase::report::{build_report, render_table};
//!
//! let layout = StoreLayout::new(std::path::Path::new("."));
//! let config = StoreConfig::load(&layout.config_file()).unwrap();
//! let today = chrono::Local::now().date_naive();
//! let report = build_report(&layout, &config, today);
//! print!("{}", render_table(&report));
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod layout;
pub mod record;
pub mod report;
pub mod schedule;
pub mod status;

pub use error::{PaperbaseError, PaperbaseResult};

/// Open a store: derive its layout and load its config (defaults when the
/// config file is absent).
pub fn open_store(
    root: &std::path::Path,
) -> PaperbaseResult<(layout::StoreLayout, config::StoreConfig)> {
    let layout = layout::StoreLayout::new(root);
    let config = config::StoreConfig::load(&layout.config_file())?;
    Ok((layout, config))
}
