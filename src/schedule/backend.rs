//! The external scheduling collaborator.
//!
//! The core never talks to Reminders/Calendar/Messages directly; it hands a
//! request to a [`SchedulingBackend`] and records the returned reference in
//! the ledger — after success, never before. [`OsascriptBackend`] is the thin
//! macOS adapter; [`DryRunBackend`] prints and fabricates references, which
//! also makes it the test double.

use std::fmt::Write as _;
use std::io::Write as _;
use std::process::{Command, Stdio};

use chrono::{Duration, NaiveDateTime};
use miette::Diagnostic;
use thiserror::Error;

/// Errors from the external scheduling backend.
#[derive(Debug, Error, Diagnostic)]
pub enum BackendError {
    #[error("external {action} action failed: {message}")]
    #[diagnostic(
        code(paperbase::backend::external_action),
        help(
            "The ledger was not updated; re-running the command will retry \
             this action."
        )
    )]
    External { action: String, message: String },

    #[error("failed to launch osascript")]
    #[diagnostic(
        code(paperbase::backend::launch),
        help("The osascript binary only exists on macOS; use --dry-run elsewhere.")
    )]
    Launch {
        #[source]
        source: std::io::Error,
    },
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A reminder to create.
#[derive(Debug, Clone)]
pub struct ReminderRequest {
    pub message: String,
    pub at: NaiveDateTime,
    pub list: Option<String>,
    pub note: Option<String>,
    /// 1 (high), 5 (medium), 9 (low) — the Reminders scale.
    pub priority: Option<u8>,
    pub flagged: Option<bool>,
}

/// A calendar event to create.
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub message: String,
    pub at: NaiveDateTime,
    pub duration: Duration,
    pub calendar: Option<String>,
    pub location: Option<String>,
    pub note: Option<String>,
}

/// An instant message to send.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    pub to: String,
    pub message: String,
}

/// The collaborator seam. Implementations perform exactly one external action
/// per call and return an opaque reference for the ledger.
pub trait SchedulingBackend {
    fn create_reminder(&mut self, req: &ReminderRequest) -> BackendResult<String>;
    fn create_event(&mut self, req: &EventRequest) -> BackendResult<String>;
    fn send_message(&mut self, req: &MessageRequest) -> BackendResult<String>;
}

// ── Dry-run ─────────────────────────────────────────────────────────────

/// Prints what would happen and fabricates references. Used for `--dry-run`
/// and as the recording double in tests.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    /// Human-readable descriptions of every action, in call order.
    pub actions: Vec<String>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn note(&mut self, description: String) -> String {
        tracing::info!("[dry-run] {description}");
        self.actions.push(description);
        format!("dry-run-{}", self.actions.len())
    }
}

impl SchedulingBackend for DryRunBackend {
    fn create_reminder(&mut self, req: &ReminderRequest) -> BackendResult<String> {
        let mut desc = format!(
            "reminder \"{}\" @ {}",
            req.message,
            req.at.format("%Y-%m-%d %H:%M")
        );
        if let Some(list) = &req.list {
            write!(desc, " list={list}").ok();
        }
        Ok(self.note(desc))
    }

    fn create_event(&mut self, req: &EventRequest) -> BackendResult<String> {
        let end = req.at + req.duration;
        let mut desc = format!(
            "event \"{}\" {} - {}",
            req.message,
            req.at.format("%Y-%m-%d %H:%M"),
            end.format("%H:%M")
        );
        if let Some(cal) = &req.calendar {
            write!(desc, " calendar={cal}").ok();
        }
        Ok(self.note(desc))
    }

    fn send_message(&mut self, req: &MessageRequest) -> BackendResult<String> {
        let desc = format!("imessage to={} \"{}\"", req.to, req.message);
        Ok(self.note(desc))
    }
}

// ── osascript ───────────────────────────────────────────────────────────

/// macOS adapter: generates AppleScript and pipes it to `osascript`.
#[derive(Debug, Default)]
pub struct OsascriptBackend;

impl OsascriptBackend {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, action: &str, script: &str) -> BackendResult<String> {
        let mut child = Command::new("osascript")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BackendError::Launch { source: e })?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(script.as_bytes())
                .map_err(|e| BackendError::External {
                    action: action.to_string(),
                    message: format!("writing script: {e}"),
                })?;
        }
        let output = child.wait_with_output().map_err(|e| BackendError::External {
            action: action.to_string(),
            message: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(BackendError::External {
                action: action.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            Ok(format!("osascript:{action}"))
        } else {
            Ok(stdout)
        }
    }
}

/// Escape for inclusion in an AppleScript string literal.
fn esc(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// AppleScript-friendly date literal, e.g.
/// `Saturday, August 16, 2025 at 09:30:00 AM`.
fn applescript_date(ts: NaiveDateTime) -> String {
    ts.format("%A, %B %d, %Y at %I:%M:%S %p").to_string()
}

impl SchedulingBackend for OsascriptBackend {
    fn create_reminder(&mut self, req: &ReminderRequest) -> BackendResult<String> {
        let mut props = format!(
            "name:\"{}\", remind me date:date \"{}\"",
            esc(&req.message),
            applescript_date(req.at)
        );
        if let Some(note) = &req.note {
            write!(props, ", body:\"{}\"", esc(note)).ok();
        }
        if let Some(priority) = req.priority {
            write!(props, ", priority:{priority}").ok();
        }
        if let Some(flagged) = req.flagged {
            write!(props, ", flagged:{flagged}").ok();
        }
        let script = match &req.list {
            // Create the list on demand when it does not exist yet.
            Some(list) => format!(
                "tell application \"Reminders\"\n\
                 \ttry\n\
                 \t\ttell list \"{list}\"\n\
                 \t\t\tmake new reminder with properties {{{props}}}\n\
                 \t\tend tell\n\
                 \ton error\n\
                 \t\tmake new list with properties {{name:\"{list}\"}}\n\
                 \t\ttell list \"{list}\"\n\
                 \t\t\tmake new reminder with properties {{{props}}}\n\
                 \t\tend tell\n\
                 \tend try\n\
                 end tell",
                list = esc(list),
            ),
            None => format!(
                "tell application \"Reminders\"\n\
                 \tmake new reminder with properties {{{props}}}\n\
                 end tell"
            ),
        };
        self.run("reminder", &script)
    }

    fn create_event(&mut self, req: &EventRequest) -> BackendResult<String> {
        let end = req.at + req.duration;
        let mut props = format!(
            "summary:\"{}\", start date:startDate, end date:endDate",
            esc(&req.message)
        );
        if let Some(location) = &req.location {
            write!(props, ", location:\"{}\"", esc(location)).ok();
        }
        if let Some(note) = &req.note {
            write!(props, ", description:\"{}\"", esc(note)).ok();
        }
        let body = match &req.calendar {
            Some(name) => format!(
                "\ttell calendar \"{}\"\n\
                 \t\tmake new event with properties {{{props}}}\n\
                 \tend tell\n",
                esc(name)
            ),
            None => format!(
                "\ttell first calendar\n\
                 \t\tmake new event with properties {{{props}}}\n\
                 \tend tell\n"
            ),
        };
        let script = format!(
            "set startDate to date \"{}\"\n\
             set endDate to date \"{}\"\n\
             tell application \"Calendar\"\n\
             {body}end tell",
            applescript_date(req.at),
            applescript_date(end),
        );
        self.run("event", &script)
    }

    fn send_message(&mut self, req: &MessageRequest) -> BackendResult<String> {
        let script = format!(
            "tell application \"Messages\"\n\
             \tset targetService to 1st account whose service type = iMessage\n\
             \tset targetBuddy to participant \"{}\" of targetService\n\
             \tsend \"{}\" to targetBuddy\n\
             end tell",
            esc(&req.to),
            esc(&req.message),
        );
        self.run("imessage", &script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 16)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn dry_run_records_and_fabricates_refs() {
        let mut backend = DryRunBackend::new();
        let r1 = backend
            .create_reminder(&ReminderRequest {
                message: "Follow up".into(),
                at: at(),
                list: Some("Work".into()),
                note: None,
                priority: None,
                flagged: None,
            })
            .unwrap();
        let r2 = backend
            .send_message(&MessageRequest {
                to: "Dana".into(),
                message: "hi".into(),
            })
            .unwrap();
        assert_eq!(r1, "dry-run-1");
        assert_eq!(r2, "dry-run-2");
        assert_eq!(backend.actions.len(), 2);
        assert!(backend.actions[0].contains("list=Work"));
    }

    #[test]
    fn applescript_date_format() {
        assert_eq!(
            applescript_date(at()),
            "Saturday, August 16, 2025 at 09:30:00 AM"
        );
    }

    #[test]
    fn escaping_quotes_and_backslashes() {
        assert_eq!(esc(r#"say "hi" \ bye"#), r#"say \"hi\" \\ bye"#);
    }
}
