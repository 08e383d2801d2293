//! Scheduling: turn inline tags into external actions, exactly once.
//!
//! The pipeline is scan → resolve time → ledger gate → backend call → record.
//! Everything that can go wrong with a single tag (bad time expression,
//! malformed arguments, a failed external call) is accumulated in the
//! [`ProcessSummary`] and never aborts the rest of the document. The ledger
//! is written only after the backend reports success, so a failed action is
//! naturally retried on the next invocation.

pub mod backend;
pub mod ledger;
pub mod tag;
pub mod timeexpr;

use std::path::Path;

use chrono::NaiveDateTime;
use miette::Diagnostic;
use thiserror::Error;

pub use backend::{
    BackendError, DryRunBackend, EventRequest, MessageRequest, OsascriptBackend,
    ReminderRequest, SchedulingBackend,
};
pub use ledger::{IdempotencyLedger, LedgerEntry, LedgerError};
pub use tag::{ScanOutcome, ScanWarning, ScheduleTag, TagKind};
pub use timeexpr::TimeError;

/// Errors that stop a whole scheduling run (per-tag problems do not).
#[derive(Debug, Error, Diagnostic)]
pub enum ScheduleError {
    #[error("failed to read document: {path}")]
    #[diagnostic(
        code(paperbase::schedule::read),
        help("Check the --file path; it should point at a markdown document.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;

/// Store-level fallbacks applied when a tag omits the field.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDefaults {
    pub reminder_list: Option<String>,
    pub calendar: Option<String>,
}

/// One tag that could not be executed this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFailure {
    pub line: usize,
    pub message: String,
}

/// One successfully executed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedAction {
    pub message: String,
    pub external_ref: String,
}

/// What happened to a document's tags in one run.
#[derive(Debug, Default)]
pub struct ProcessSummary {
    /// Tags of the requested kind that were considered.
    pub scanned: usize,
    pub executed: Vec<ExecutedAction>,
    /// Tag identities skipped because the ledger already had them.
    pub skipped: Vec<String>,
    pub warnings: Vec<ScanWarning>,
    pub failures: Vec<TagFailure>,
}

/// Process one document file for tags of `kind`.
pub fn process_file(
    path: &Path,
    kind: TagKind,
    now: NaiveDateTime,
    defaults: &ScheduleDefaults,
    ledger: &mut IdempotencyLedger,
    backend: &mut dyn SchedulingBackend,
) -> ScheduleResult<ProcessSummary> {
    let text = std::fs::read_to_string(path).map_err(|e| ScheduleError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), kind = %kind, "scanning document");
    process_text(&text, kind, now, defaults, ledger, backend)
}

/// Process already-loaded document text for tags of `kind`.
pub fn process_text(
    text: &str,
    kind: TagKind,
    now: NaiveDateTime,
    defaults: &ScheduleDefaults,
    ledger: &mut IdempotencyLedger,
    backend: &mut dyn SchedulingBackend,
) -> ScheduleResult<ProcessSummary> {
    let outcome = tag::scan(text);
    let mut summary = ProcessSummary {
        warnings: outcome.warnings,
        ..Default::default()
    };

    for tag in outcome.tags.iter().filter(|t| t.kind == kind) {
        summary.scanned += 1;
        let identity = ledger::tag_identity(tag);
        if !ledger.should_execute(tag) {
            tracing::debug!(tag_id = %identity, "already executed; skipping");
            summary.skipped.push(identity);
            continue;
        }
        match dispatch(tag, now, defaults, backend) {
            Ok(external_ref) => {
                ledger.record(tag, &external_ref, now)?;
                summary.executed.push(ExecutedAction {
                    message: tag.get("message").unwrap_or_default().to_string(),
                    external_ref,
                });
            }
            Err(message) => {
                tracing::warn!(line = tag.line, "{message}");
                summary.failures.push(TagFailure {
                    line: tag.line,
                    message,
                });
            }
        }
    }
    Ok(summary)
}

/// Build the backend request for one tag and execute it.
///
/// Errors are plain strings: they end up as per-tag failure notes in the
/// summary, not as typed errors that would stop the batch.
fn dispatch(
    tag: &ScheduleTag,
    now: NaiveDateTime,
    defaults: &ScheduleDefaults,
    backend: &mut dyn SchedulingBackend,
) -> Result<String, String> {
    match tag.kind {
        TagKind::Reminder => {
            let message = tag.get("message").unwrap_or_default().to_string();
            let at = timeexpr::resolve(tag.get("at").unwrap_or_default(), now)
                .map_err(|e| e.to_string())?;
            let priority = tag
                .get("priority")
                .map(|p| p.trim().parse::<u8>().map_err(|_| format!("invalid priority: {p}")))
                .transpose()?;
            let flagged = tag.get("flagged").map(parse_bool).transpose()?;
            let note = Some(descriptive_note(&message, tag.get("note")));
            backend
                .create_reminder(&ReminderRequest {
                    message,
                    at,
                    list: tag
                        .get("list")
                        .map(str::to_string)
                        .or_else(|| defaults.reminder_list.clone()),
                    note,
                    priority,
                    flagged,
                })
                .map_err(|e| e.to_string())
        }
        TagKind::Calendar => {
            let message = tag.get("message").unwrap_or_default().to_string();
            let at = timeexpr::resolve(tag.get("at").unwrap_or_default(), now)
                .map_err(|e| e.to_string())?;
            let duration =
                timeexpr::parse_duration(tag.get("duration")).map_err(|e| e.to_string())?;
            let note = Some(descriptive_note(&message, tag.get("note")));
            backend
                .create_event(&EventRequest {
                    message,
                    at,
                    duration,
                    calendar: tag
                        .get("calendar")
                        .map(str::to_string)
                        .or_else(|| defaults.calendar.clone()),
                    location: tag.get("location").map(str::to_string),
                    note,
                })
                .map_err(|e| e.to_string())
        }
        TagKind::Imessage => backend
            .send_message(&MessageRequest {
                to: tag.get("to").unwrap_or_default().to_string(),
                message: tag.get("message").unwrap_or_default().to_string(),
            })
            .map_err(|e| e.to_string()),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(format!("invalid boolean value: {other}")),
    }
}

/// Compose the body of a reminder/event: a low-activation-energy first step,
/// then the task itself.
fn descriptive_note(message: &str, note: Option<&str>) -> String {
    let first_step = suggest_first_step(message, note);
    format!("{first_step} Then: {message}.")
}

/// A concrete smallest step inferred from the task wording. Heuristic only.
fn suggest_first_step(message: &str, note: Option<&str>) -> String {
    let t = message.to_lowercase();
    let contains_any =
        |keys: &[&str]| keys.iter().any(|k| t.contains(k));

    if contains_any(&["focus block", "draft", "write", "outline", "edit"]) {
        return "Open the task file and write the first sentence.".into();
    }
    if contains_any(&["sign up", "signup", "register", "rsvp"]) {
        return "Open the signup link and pick the first available slot.".into();
    }
    if contains_any(&["follow up", "follow-up"]) {
        return "Open the thread and type a one-sentence nudge; send.".into();
    }
    if contains_any(&["schedule", "book", "set up meeting"]) {
        return "Open your calendar and propose two times.".into();
    }
    if contains_any(&["pay", "invoice", "transfer"]) {
        return "Open your payment app and search the recipient.".into();
    }
    if contains_any(&["review", "proofread", "skim"]) {
        return "Open the doc and read the first screen; add one comment.".into();
    }
    if let Some(note) = note {
        if note.contains('/') || note.ends_with(".md") || note.ends_with(".txt") {
            return format!("Open {note}.");
        }
    }
    "Start a 2-minute timer and take the tiniest next step.".into()
}
