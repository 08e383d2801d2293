//! Records: the Markdown files that make up the store.
//!
//! A record's kind is inferred from the category directory it lives in, and
//! moving a file between directories is the sole state-transition mechanism.
//! Nothing about a record is persisted outside its own text.

use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading record files.
#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error("failed to read record: {path}")]
    #[diagnostic(
        code(paperbase::record::read),
        help("Check that the file exists, is readable, and is valid UTF-8.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// What category directory a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Person,
    Lead,
    Project,
    Outreach,
}

impl RecordKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Lead => "Active Lead",
            Self::Project => "Project",
            Self::Outreach => "Outreach",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "person" | "people" => Some(Self::Person),
            "lead" | "leads" | "active lead" => Some(Self::Lead),
            "project" | "projects" => Some(Self::Project),
            "outreach" => Some(Self::Outreach),
            _ => None,
        }
    }

    /// Whether records of this kind carry a `## Status` block.
    pub fn has_status_block(&self) -> bool {
        matches!(self, Self::Lead | Self::Project)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// A record file loaded into memory.
#[derive(Debug, Clone)]
pub struct Record {
    pub path: PathBuf,
    pub kind: RecordKind,
    /// First heading line, or the file stem when there is none.
    pub title: String,
    pub body: String,
}

impl Record {
    /// Load a record from disk.
    pub fn load(path: &Path, kind: RecordKind) -> RecordResult<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| RecordError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let title = extract_title(&body)
            .unwrap_or_else(|| path.file_stem().unwrap_or_default().to_string_lossy().into_owned());
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            title,
            body,
        })
    }
}

/// The text of the first Markdown heading, if any.
pub fn extract_title(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim_start();
        let rest = trimmed.strip_prefix('#')?;
        let title = rest.trim_start_matches('#').trim();
        if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        }
    })
}

/// Collect `.md` files under `dir` recursively, pruning `archive/` and
/// `done/` subtrees. Exclusion is positional: a record outside those
/// directories is collected no matter what its status block says.
///
/// A missing directory yields an empty list; the caller decides whether that
/// is worth a warning. Results are sorted for deterministic reports.
pub fn collect_markdown(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(dir, &mut files);
    files.sort();
    files
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            if name == "archive" || name == "done" {
                continue;
            }
            walk(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_first_heading() {
        assert_eq!(
            extract_title("# Acme Corp\n\nNotes.\n"),
            Some("Acme Corp".to_string())
        );
        assert_eq!(
            extract_title("intro line\n## Deep Heading\n"),
            Some("Deep Heading".to_string())
        );
        assert_eq!(extract_title("no heading here\n"), None);
    }

    #[test]
    fn load_falls_back_to_file_stem() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("acme-corp.md");
        std::fs::write(&path, "just notes, no heading\n").unwrap();
        let record = Record::load(&path, RecordKind::Lead).unwrap();
        assert_eq!(record.title, "acme-corp");
        assert_eq!(record.kind, RecordKind::Lead);
    }

    #[test]
    fn collect_prunes_archive_and_done() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("archive")).unwrap();
        std::fs::create_dir_all(root.join("done")).unwrap();
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::write(root.join("a.md"), "x").unwrap();
        std::fs::write(root.join("nested/b.md"), "x").unwrap();
        std::fs::write(root.join("archive/old.md"), "x").unwrap();
        std::fs::write(root.join("done/finished.md"), "x").unwrap();
        std::fs::write(root.join("notes.txt"), "x").unwrap();

        let files = collect_markdown(root);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }

    #[test]
    fn collect_missing_dir_is_empty() {
        assert!(collect_markdown(Path::new("/nonexistent/leads")).is_empty());
    }
}
