//! Store layout: the convention-based directories a paperbase root contains.
//!
//! Category directory names are part of the external contract — the
//! conversational agent and the humans editing the store both navigate by
//! them. Tool state (the ledger) lives under a hidden `.paperbase/` dir so it
//! never shows up as a record.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use crate::record::RecordKind;

/// Errors from resolving or creating the store layout.
#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(paperbase::layout::create_dir),
        help("Check that the store root exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list weekly plans: {path}")]
    #[diagnostic(
        code(paperbase::layout::weeks_read),
        help("Run `pbase init` to create the weeks/ directory.")
    )]
    WeeksRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// Directory layout rooted at a store directory.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    pub root: PathBuf,
    /// `root/people/`
    pub people_dir: PathBuf,
    /// `root/active_leads/` (records move to `archive/` on no-conversion)
    pub leads_dir: PathBuf,
    /// `root/projects/` (records move to `done/` on completion)
    pub projects_dir: PathBuf,
    /// `root/outreach/`
    pub outreach_dir: PathBuf,
    /// `root/weeks/` — weekly plan files, "week of <date>.md"
    pub weeks_dir: PathBuf,
    /// `root/.paperbase/` — tool state, not records
    pub state_dir: PathBuf,
}

impl StoreLayout {
    /// Derive the layout from a store root.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            people_dir: root.join("people"),
            leads_dir: root.join("active_leads"),
            projects_dir: root.join("projects"),
            outreach_dir: root.join("outreach"),
            weeks_dir: root.join("weeks"),
            state_dir: root.join(".paperbase"),
        }
    }

    /// Create every directory of the layout, including the terminal
    /// subdirectories. Idempotent.
    pub fn ensure_dirs(&self) -> LayoutResult<()> {
        for dir in [
            &self.people_dir,
            &self.leads_dir.join("archive"),
            &self.projects_dir.join("done"),
            &self.outreach_dir,
            &self.weeks_dir,
            &self.state_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| LayoutError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// The category root for a record kind.
    pub fn category_dir(&self, kind: RecordKind) -> &Path {
        match kind {
            RecordKind::Person => &self.people_dir,
            RecordKind::Lead => &self.leads_dir,
            RecordKind::Project => &self.projects_dir,
            RecordKind::Outreach => &self.outreach_dir,
        }
    }

    /// Path of the idempotency ledger file.
    pub fn ledger_file(&self) -> PathBuf {
        self.state_dir.join("ledger.json")
    }

    /// Path of the store config file.
    pub fn config_file(&self) -> PathBuf {
        self.root.join("paperbase.toml")
    }

    /// Weekly plan files in filename sort order. Files in `weeks/` that do
    /// not look like weekly plans are ignored.
    pub fn week_files(&self) -> LayoutResult<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.weeks_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LayoutError::WeeksRead {
                    path: self.weeks_dir.display().to_string(),
                    source: e,
                });
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                let name = p.file_name().unwrap_or_default().to_string_lossy();
                if is_week_file(&name) {
                    true
                } else {
                    tracing::debug!(file = %name, "ignoring non-week file in weeks/");
                    false
                }
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Path relative to the store root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

static RE_WEEK_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)week of .*\d{4}-\d{2}-\d{2}\.md$").unwrap()
});

/// Whether a file name follows the "week of <date>" convention.
pub fn is_week_file(name: &str) -> bool {
    RE_WEEK_FILE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_derives_from_root() {
        let layout = StoreLayout::new(Path::new("/store"));
        assert_eq!(layout.people_dir, PathBuf::from("/store/people"));
        assert_eq!(layout.leads_dir, PathBuf::from("/store/active_leads"));
        assert_eq!(layout.projects_dir, PathBuf::from("/store/projects"));
        assert_eq!(layout.weeks_dir, PathBuf::from("/store/weeks"));
        assert_eq!(
            layout.ledger_file(),
            PathBuf::from("/store/.paperbase/ledger.json")
        );
    }

    #[test]
    fn ensure_dirs_creates_terminal_subdirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        assert!(layout.leads_dir.join("archive").is_dir());
        assert!(layout.projects_dir.join("done").is_dir());
        assert!(layout.state_dir.is_dir());
        // Idempotent.
        layout.ensure_dirs().unwrap();
    }

    #[test]
    fn week_file_names() {
        assert!(is_week_file("week of 2025-08-11.md"));
        assert!(is_week_file("Week of 2025-08-18.md"));
        assert!(!is_week_file("scratch.md"));
        assert!(!is_week_file("week of someday.md"));
    }

    #[test]
    fn week_files_sorted_and_filtered() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        layout.ensure_dirs().unwrap();
        for name in [
            "week of 2025-08-18.md",
            "week of 2025-08-11.md",
            "notes.md",
        ] {
            std::fs::write(layout.weeks_dir.join(name), "x").unwrap();
        }
        let files = layout.week_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["week of 2025-08-11.md", "week of 2025-08-18.md"]);
    }

    #[test]
    fn missing_weeks_dir_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        assert!(layout.week_files().unwrap().is_empty());
    }
}
