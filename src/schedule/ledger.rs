//! The idempotency ledger: a persisted map from tag identity to the external
//! action it already produced.
//!
//! Identity is solely the tag id — an explicit `id=` argument, or a stable
//! hash derived from the tag's arguments with `at` excluded, so rescheduling
//! or line shifts do not mint a new identity. Entries are written only after
//! the external call succeeds and are never auto-deleted.
//!
//! A ledger that fails to parse loads as empty (with a loud warning): the
//! cost of forgetting is a duplicate reminder, not data loss.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::tag::{ScheduleTag, TagKind};

/// Errors from persisting the ledger.
#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error("failed to write ledger: {path}")]
    #[diagnostic(
        code(paperbase::ledger::write),
        help("Check write permissions on the store's state directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode ledger: {message}")]
    #[diagnostic(code(paperbase::ledger::encode))]
    Encode { message: String },
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// One executed external action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub tag_id: String,
    pub kind: TagKind,
    /// Hash over all normalized arguments, including `at`. Collaborators can
    /// compare it to detect content drift; this ledger never does.
    pub content_hash: String,
    pub external_ref: String,
    /// Local timestamp of the successful external call.
    pub created_at: String,
}

/// File-backed tag → external-ref map. Single-process by design; the only
/// write discipline is whole-file replace via temp file + rename.
#[derive(Debug)]
pub struct IdempotencyLedger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
}

impl IdempotencyLedger {
    /// Load the ledger at `path`. A missing file is an empty ledger; an
    /// unparseable one fails closed to empty.
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Vec<LedgerEntry>>(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "ledger is unparseable; treating as empty (duplicate \
                         external actions are now possible)"
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Load history from `history_path` but persist to `save_path`.
    ///
    /// Dry runs use this to consult the real ledger (so skips are reported
    /// truthfully) without ever writing it.
    pub fn load_with_save_path(history_path: &Path, save_path: &Path) -> Self {
        let mut ledger = Self::load(history_path);
        ledger.path = save_path.to_path_buf();
        ledger
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Whether the tag's external action still needs to happen.
    ///
    /// False iff an entry with the same tag id exists — other fields are
    /// ignored, so editing a tag's message after its first successful run
    /// neither duplicates nor updates the external object.
    pub fn should_execute(&self, tag: &ScheduleTag) -> bool {
        let id = tag_identity(tag);
        !self.entries.iter().any(|e| e.tag_id == id)
    }

    /// Record a successful external action and persist atomically.
    ///
    /// Call this only after the backend reported success; a failed external
    /// call must leave no trace here.
    pub fn record(
        &mut self,
        tag: &ScheduleTag,
        external_ref: &str,
        now: NaiveDateTime,
    ) -> LedgerResult<()> {
        self.entries.push(LedgerEntry {
            tag_id: tag_identity(tag),
            kind: tag.kind,
            content_hash: content_hash(tag),
            external_ref: external_ref.to_string(),
            created_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        self.save()
    }

    /// Whole-file replace: write a sibling temp file, then rename over the
    /// target so an interrupted write can never leave a half-ledger.
    fn save(&self) -> LedgerResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| LedgerError::Encode { message: e.to_string() })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| LedgerError::Write {
            path: tmp.display().to_string(),
            source: e,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| LedgerError::Write {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }
}

/// The stable identity of a tag.
///
/// An explicit `id=` wins. Otherwise: a truncated sha256 over the kind and
/// the sorted arguments minus `at` — rescheduling must not create a new
/// identity, and neither must moving the tag to another file.
pub fn tag_identity(tag: &ScheduleTag) -> String {
    if let Some(id) = tag.explicit_id() {
        return format!("id:{id}");
    }
    let mut hasher = Sha256::new();
    hasher.update(tag.kind.as_label().as_bytes());
    for (key, value) in &tag.args {
        if key == "at" {
            continue;
        }
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    format!("sha:{}", &digest[..12])
}

/// Hash over every normalized argument, `at` included.
pub fn content_hash(tag: &ScheduleTag) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tag.kind.as_label().as_bytes());
    for (key, value) in &tag.args {
        hasher.update(b"\n");
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}
