//! Status blocks: the structured `## Status` section embedded in record files.
//!
//! A status block is a bullet list of `- **Field:** value` lines. It is the
//! persisted wire format for lifecycle state, so parsing degrades softly
//! (a malformed block yields a [`ParseFailure`], never a panic or abort) and
//! serialization refuses to write a block that violates the lifecycle
//! invariants. Unknown bullet lines survive a parse/serialize round-trip
//! verbatim.

pub mod lead;
pub mod project;

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use miette::Diagnostic;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use lead::LeadStage;
pub use project::ProjectState;

use crate::record::RecordKind;

// ── Errors ──────────────────────────────────────────────────────────────

/// Soft failure while locating or reading a status block.
///
/// Callers degrade to "unknown status" / "No Date" rather than aborting a
/// batch scan.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ParseFailure {
    #[error("no status block found")]
    #[diagnostic(
        code(paperbase::status::missing_block),
        help("Add a `## Status` section with `- **Field:** value` bullet lines.")
    )]
    MissingBlock,

    #[error("status block is missing required fields: {}", .fields.join(", "))]
    #[diagnostic(
        code(paperbase::status::missing_fields),
        help("Each field is one bullet line, e.g. `- **Last Updated:** 2025-08-11`.")
    )]
    MissingFields { fields: Vec<String> },

    #[error("unrecognized lead stage: \"{value}\"")]
    #[diagnostic(
        code(paperbase::status::unknown_stage),
        help(
            "Valid stages: Qualification, Proposal Sent, Negotiation, \
             Needs Follow-Up, Archived - No Conversion."
        )
    )]
    UnknownStage { value: String },

    #[error("unrecognized project status: \"{value}\"")]
    #[diagnostic(
        code(paperbase::status::unknown_state),
        help(
            "Valid statuses: Planning, In Progress, On Hold, Awaiting Feedback, \
             Blocked, Done."
        )
    )]
    UnknownState { value: String },

    #[error("{kind} records do not carry a status block")]
    #[diagnostic(
        code(paperbase::status::not_applicable),
        help("Only lead and project records have a `## Status` section.")
    )]
    NotApplicable { kind: String },
}

pub type ParseResult<T> = std::result::Result<T, ParseFailure>;

/// A lifecycle invariant violated by the field combination.
///
/// Unlike [`ParseFailure`] this is blocking: persisting an inconsistent block
/// would corrupt the record, so serialization refuses outright.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ValidationError {
    #[error("lead has an archive reason but is not archived (stage: {stage})")]
    #[diagnostic(
        code(paperbase::status::reason_without_archive),
        help("Clear `Reason (if Archived)` or move the stage to Archived - No Conversion.")
    )]
    ReasonWithoutArchive { stage: LeadStage },

    #[error("archived lead is missing its archive reason")]
    #[diagnostic(
        code(paperbase::status::archive_without_reason),
        help("Archived - No Conversion requires a `Reason (if Archived)` field.")
    )]
    ArchiveWithoutReason,

    #[error("project has a completion date but is not Done (status: {state})")]
    #[diagnostic(
        code(paperbase::status::completion_without_done),
        help("Clear `Completion Date (if Done)` or set the status to Done.")
    )]
    CompletionWithoutDone { state: ProjectState },

    #[error("Done project is missing its completion date")]
    #[diagnostic(
        code(paperbase::status::done_without_completion),
        help("A Done project records when it finished in `Completion Date (if Done)`.")
    )]
    DoneWithoutCompletion,

    #[error("Done project still names a next milestone: \"{milestone}\"")]
    #[diagnostic(
        code(paperbase::status::milestone_on_done),
        help("Set `Next Milestone` to N/A when the project is Done.")
    )]
    MilestoneOnDone { milestone: String },

    #[error("project is not Done but its next milestone is N/A")]
    #[diagnostic(
        code(paperbase::status::milestone_na_on_active),
        help("Name the next milestone, or set the status to Done with a completion date.")
    )]
    MilestoneNaOnActive { state: ProjectState },
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

// ── Date fields ─────────────────────────────────────────────────────────

/// A date-valued field. Only `YYYY-MM-DD` parses; anything else is kept as
/// the raw text and treated as unparseable by staleness math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateField {
    Date(NaiveDate),
    Unparsed(String),
}

impl DateField {
    /// Parse a field value. Never fails; a non-ISO value is carried raw.
    /// Only strict `YYYY-MM-DD` counts — chrono alone would also accept
    /// unpadded forms like `2025-8-1`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if RE_ISO_DATE.is_match(trimmed) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return Self::Date(date);
            }
        }
        Self::Unparsed(trimmed.to_string())
    }

    /// The parsed date, if the field held one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

// ── Wire field labels ───────────────────────────────────────────────────

const LABEL_STAGE: &str = "Stage";
const LABEL_NEXT_STEP: &str = "Next Step";
const LABEL_LAST_UPDATED: &str = "Last Updated";
const LABEL_REASON: &str = "Reason (if Archived)";
const LABEL_CURRENT_STATUS: &str = "Current Status";
const LABEL_NEXT_MILESTONE: &str = "Next Milestone";
const LABEL_DUE_DATE: &str = "Due Date";
const LABEL_COMPLETION: &str = "Completion Date (if Done)";

static RE_FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-\s*\*\*([^*]+?):\*\*\s*(.*)$").unwrap()
});

static RE_ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Normalize a field label for comparison: lowercase, whitespace collapsed.
fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Whether a field value means "no value".
fn is_na(value: &str) -> bool {
    let t = value.trim();
    t.is_empty() || t.eq_ignore_ascii_case("n/a")
}

// ── Block section extraction ────────────────────────────────────────────

/// The raw lines of the `## Status` section: everything after the heading up
/// to the next heading or end of document.
fn status_section(text: &str) -> Option<Vec<&str>> {
    let mut lines = text.lines();
    // Locate the heading: any `#` depth, text exactly "Status" modulo
    // case/whitespace.
    loop {
        let line = lines.next()?;
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix('#') {
            let title = rest.trim_start_matches('#').trim();
            if title.eq_ignore_ascii_case("status") {
                break;
            }
        }
    }
    let mut section = Vec::new();
    for line in lines {
        if line.trim_start().starts_with('#') {
            break;
        }
        section.push(line);
    }
    Some(section)
}

/// Split a status section into known fields and verbatim leftover lines.
///
/// `known` maps normalized labels to slots; anything else (including bullet
/// lines with unrecognized labels) lands in `extra` untouched so a
/// round-trip never drops it.
struct RawBlock {
    fields: Vec<(String, String)>,
    extra: Vec<String>,
}

fn split_fields(section: &[&str], known: &[&str]) -> RawBlock {
    let known_norm: Vec<String> = known.iter().map(|l| normalize_label(l)).collect();
    let mut fields = Vec::new();
    let mut extra = Vec::new();
    for line in section {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = RE_FIELD_LINE.captures(line) {
            let label = normalize_label(&caps[1]);
            if known_norm.iter().any(|k| *k == label) {
                fields.push((label, caps[2].trim().to_string()));
                continue;
            }
        }
        extra.push((*line).to_string());
    }
    RawBlock { fields, extra }
}

impl RawBlock {
    fn take(&mut self, label: &str) -> Option<String> {
        let norm = normalize_label(label);
        let idx = self.fields.iter().position(|(l, _)| *l == norm)?;
        Some(self.fields.remove(idx).1)
    }
}

// ── Lead block ──────────────────────────────────────────────────────────

/// Parsed status block of a lead record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadStatusBlock {
    pub stage: LeadStage,
    /// Free text; "N/A" is a legal value.
    pub next_step: String,
    pub last_updated: DateField,
    /// Present iff the lead is archived (enforced on write, not on read).
    pub reason: Option<String>,
    /// Unrecognized lines, preserved verbatim.
    pub extra: Vec<String>,
}

impl LeadStatusBlock {
    /// Parse the `## Status` section of a lead document.
    pub fn parse(text: &str) -> ParseResult<Self> {
        let section = status_section(text).ok_or(ParseFailure::MissingBlock)?;
        let mut raw = split_fields(
            &section,
            &[LABEL_STAGE, LABEL_NEXT_STEP, LABEL_LAST_UPDATED, LABEL_REASON],
        );

        let stage_value = raw.take(LABEL_STAGE);
        let next_step = raw.take(LABEL_NEXT_STEP);
        let last_updated = raw.take(LABEL_LAST_UPDATED);
        let reason = raw.take(LABEL_REASON).filter(|v| !is_na(v));

        let mut missing = Vec::new();
        if stage_value.is_none() {
            missing.push(LABEL_STAGE.to_string());
        }
        if next_step.is_none() {
            missing.push(LABEL_NEXT_STEP.to_string());
        }
        if last_updated.is_none() {
            missing.push(LABEL_LAST_UPDATED.to_string());
        }
        if !missing.is_empty() {
            return Err(ParseFailure::MissingFields { fields: missing });
        }

        let stage_value = stage_value.unwrap_or_default();
        let stage = LeadStage::from_label(&stage_value)
            .ok_or(ParseFailure::UnknownStage { value: stage_value })?;

        Ok(Self {
            stage,
            next_step: next_step.unwrap_or_default(),
            last_updated: DateField::parse(&last_updated.unwrap_or_default()),
            reason,
            extra: raw.extra,
        })
    }

    /// Check the lead invariants: `reason` present ⟺ archived.
    pub fn validate(&self) -> ValidationResult<()> {
        match (self.stage.is_terminal(), &self.reason) {
            (true, None) => Err(ValidationError::ArchiveWithoutReason),
            (false, Some(_)) => Err(ValidationError::ReasonWithoutArchive { stage: self.stage }),
            _ => Ok(()),
        }
    }

    /// Render the canonical block text. Refuses invalid field combinations.
    pub fn serialize(&self) -> ValidationResult<String> {
        self.validate()?;
        let mut out = String::from("## Status\n\n");
        push_field(&mut out, LABEL_STAGE, self.stage.as_label());
        push_field(&mut out, LABEL_NEXT_STEP, &self.next_step);
        push_field(&mut out, LABEL_LAST_UPDATED, &self.last_updated.to_string());
        if let Some(reason) = &self.reason {
            push_field(&mut out, LABEL_REASON, reason);
        }
        for line in &self.extra {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

// ── Project block ───────────────────────────────────────────────────────

/// Parsed status block of a project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatusBlock {
    pub state: ProjectState,
    /// Free text; must be "N/A" exactly when the project is Done.
    pub next_milestone: String,
    pub due_date: Option<DateField>,
    /// Present iff the project is Done (enforced on write, not on read).
    pub completion_date: Option<DateField>,
    pub last_updated: DateField,
    /// Unrecognized lines, preserved verbatim.
    pub extra: Vec<String>,
}

impl ProjectStatusBlock {
    /// Parse the `## Status` section of a project document.
    pub fn parse(text: &str) -> ParseResult<Self> {
        let section = status_section(text).ok_or(ParseFailure::MissingBlock)?;
        let mut raw = split_fields(
            &section,
            &[
                LABEL_CURRENT_STATUS,
                LABEL_NEXT_MILESTONE,
                LABEL_DUE_DATE,
                LABEL_COMPLETION,
                LABEL_LAST_UPDATED,
            ],
        );

        let state_value = raw.take(LABEL_CURRENT_STATUS);
        let next_milestone = raw.take(LABEL_NEXT_MILESTONE);
        let due_date = raw.take(LABEL_DUE_DATE).filter(|v| !is_na(v));
        let completion_date = raw.take(LABEL_COMPLETION).filter(|v| !is_na(v));
        let last_updated = raw.take(LABEL_LAST_UPDATED);

        let mut missing = Vec::new();
        if state_value.is_none() {
            missing.push(LABEL_CURRENT_STATUS.to_string());
        }
        if next_milestone.is_none() {
            missing.push(LABEL_NEXT_MILESTONE.to_string());
        }
        if last_updated.is_none() {
            missing.push(LABEL_LAST_UPDATED.to_string());
        }
        if !missing.is_empty() {
            return Err(ParseFailure::MissingFields { fields: missing });
        }

        let state_value = state_value.unwrap_or_default();
        let state = ProjectState::from_label(&state_value)
            .ok_or(ParseFailure::UnknownState { value: state_value })?;

        Ok(Self {
            state,
            next_milestone: next_milestone.unwrap_or_default(),
            due_date: due_date.map(|v| DateField::parse(&v)),
            completion_date: completion_date.map(|v| DateField::parse(&v)),
            last_updated: DateField::parse(&last_updated.unwrap_or_default()),
            extra: raw.extra,
        })
    }

    /// Check the project invariants: completion date ⟺ Done, milestone N/A ⟺ Done.
    pub fn validate(&self) -> ValidationResult<()> {
        let done = self.state.is_terminal();
        match (done, &self.completion_date) {
            (true, None) => return Err(ValidationError::DoneWithoutCompletion),
            (false, Some(_)) => {
                return Err(ValidationError::CompletionWithoutDone { state: self.state });
            }
            _ => {}
        }
        match (done, is_na(&self.next_milestone)) {
            (true, false) => Err(ValidationError::MilestoneOnDone {
                milestone: self.next_milestone.clone(),
            }),
            (false, true) => Err(ValidationError::MilestoneNaOnActive { state: self.state }),
            _ => Ok(()),
        }
    }

    /// Render the canonical block text. Refuses invalid field combinations.
    pub fn serialize(&self) -> ValidationResult<String> {
        self.validate()?;
        let mut out = String::from("## Status\n\n");
        push_field(&mut out, LABEL_CURRENT_STATUS, self.state.as_label());
        push_field(&mut out, LABEL_NEXT_MILESTONE, &self.next_milestone);
        if let Some(due) = &self.due_date {
            push_field(&mut out, LABEL_DUE_DATE, &due.to_string());
        }
        if let Some(done) = &self.completion_date {
            push_field(&mut out, LABEL_COMPLETION, &done.to_string());
        }
        push_field(&mut out, LABEL_LAST_UPDATED, &self.last_updated.to_string());
        for line in &self.extra {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

fn push_field(out: &mut String, label: &str, value: &str) {
    out.push_str("- **");
    out.push_str(label);
    out.push_str(":** ");
    out.push_str(value);
    out.push('\n');
}

// ── Kind dispatch ───────────────────────────────────────────────────────

/// A parsed status block of either flavor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusBlock {
    Lead(LeadStatusBlock),
    Project(ProjectStatusBlock),
}

impl StatusBlock {
    /// Parse the status block appropriate to the record kind.
    pub fn parse(text: &str, kind: RecordKind) -> ParseResult<Self> {
        match kind {
            RecordKind::Lead => LeadStatusBlock::parse(text).map(Self::Lead),
            RecordKind::Project => ProjectStatusBlock::parse(text).map(Self::Project),
            RecordKind::Person | RecordKind::Outreach => Err(ParseFailure::NotApplicable {
                kind: kind.as_label().to_string(),
            }),
        }
    }

    /// The `Last Updated` field, whichever flavor.
    pub fn last_updated(&self) -> &DateField {
        match self {
            Self::Lead(b) => &b.last_updated,
            Self::Project(b) => &b.last_updated,
        }
    }

    /// The lifecycle label shown in reports.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Lead(b) => b.stage.as_label(),
            Self::Project(b) => b.state.as_label(),
        }
    }

    /// The next-action field shown in reports.
    pub fn next_action(&self) -> &str {
        match self {
            Self::Lead(b) => &b.next_step,
            Self::Project(b) => &b.next_milestone,
        }
    }

    /// Check the flavor's invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        match self {
            Self::Lead(b) => b.validate(),
            Self::Project(b) => b.validate(),
        }
    }

    /// Render the canonical block text.
    pub fn serialize(&self) -> ValidationResult<String> {
        match self {
            Self::Lead(b) => b.serialize(),
            Self::Project(b) => b.serialize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead_doc() -> &'static str {
        "# Acme Corp\n\nSome intro notes.\n\n## Status\n\n\
         - **Stage:** Negotiation\n\
         - **Next Step:** Send revised pricing\n\
         - **Last Updated:** 2025-08-01\n\n\
         ## Notes\n\nMet at the conference.\n"
    }

    #[test]
    fn parse_lead_block() {
        let block = LeadStatusBlock::parse(lead_doc()).unwrap();
        assert_eq!(block.stage, LeadStage::Negotiation);
        assert_eq!(block.next_step, "Send revised pricing");
        assert_eq!(
            block.last_updated.as_date(),
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert!(block.reason.is_none());
        assert!(block.extra.is_empty());
    }

    #[test]
    fn heading_match_is_case_and_whitespace_insensitive() {
        let doc = "#   STATUS\n- **Stage:** Qualification\n- **Next Step:** Call\n- **Last Updated:** 2025-01-02\n";
        assert!(LeadStatusBlock::parse(doc).is_ok());
    }

    #[test]
    fn missing_block_is_soft() {
        let err = LeadStatusBlock::parse("# Just a title\n\nNo status here.\n").unwrap_err();
        assert!(matches!(err, ParseFailure::MissingBlock));
    }

    #[test]
    fn missing_fields_are_named() {
        let doc = "## Status\n- **Stage:** Negotiation\n";
        match LeadStatusBlock::parse(doc) {
            Err(ParseFailure::MissingFields { fields }) => {
                assert_eq!(fields, vec!["Next Step", "Last Updated"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_kept_raw() {
        let doc = "## Status\n- **Stage:** Negotiation\n- **Next Step:** Call\n- **Last Updated:** May 9, 2025\n";
        let block = LeadStatusBlock::parse(doc).unwrap();
        assert_eq!(block.last_updated, DateField::Unparsed("May 9, 2025".into()));
        assert!(block.last_updated.as_date().is_none());
    }

    #[test]
    fn unpadded_date_is_not_iso() {
        assert_eq!(DateField::parse("2025-8-1"), DateField::Unparsed("2025-8-1".into()));
        assert_eq!(
            DateField::parse("2025-08-01"),
            DateField::Date(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
        );
    }

    #[test]
    fn unknown_bullet_lines_survive_roundtrip() {
        let doc = "## Status\n\
                   - **Stage:** Qualification\n\
                   - **Next Step:** Intro call\n\
                   - **Owner:** sam\n\
                   - **Last Updated:** 2025-08-01\n";
        let block = LeadStatusBlock::parse(doc).unwrap();
        assert_eq!(block.extra, vec!["- **Owner:** sam"]);
        let text = block.serialize().unwrap();
        assert!(text.contains("- **Owner:** sam"));
        let reparsed = LeadStatusBlock::parse(&text).unwrap();
        assert_eq!(reparsed, block);
    }

    #[test]
    fn lead_roundtrip() {
        let block = LeadStatusBlock {
            stage: LeadStage::ArchivedNoConversion,
            next_step: "N/A".into(),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()),
            reason: Some("Went with a competitor".into()),
            extra: vec![],
        };
        let text = block.serialize().unwrap();
        assert_eq!(LeadStatusBlock::parse(&text).unwrap(), block);
    }

    #[test]
    fn project_roundtrip() {
        let block = ProjectStatusBlock {
            state: ProjectState::InProgress,
            next_milestone: "Ship beta".into(),
            due_date: Some(DateField::Date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())),
            completion_date: None,
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()),
            extra: vec![],
        };
        let text = block.serialize().unwrap();
        assert_eq!(ProjectStatusBlock::parse(&text).unwrap(), block);
    }

    #[test]
    fn done_project_roundtrip() {
        let block = ProjectStatusBlock {
            state: ProjectState::Done,
            next_milestone: "N/A".into(),
            due_date: None,
            completion_date: Some(DateField::Date(
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            )),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            extra: vec![],
        };
        let text = block.serialize().unwrap();
        assert_eq!(ProjectStatusBlock::parse(&text).unwrap(), block);
    }

    #[test]
    fn completion_without_done_is_rejected() {
        let block = ProjectStatusBlock {
            state: ProjectState::InProgress,
            next_milestone: "Ship beta".into(),
            due_date: None,
            completion_date: Some(DateField::Date(
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            )),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()),
            extra: vec![],
        };
        assert!(matches!(
            block.serialize(),
            Err(ValidationError::CompletionWithoutDone { .. })
        ));
    }

    #[test]
    fn done_without_completion_is_rejected() {
        let block = ProjectStatusBlock {
            state: ProjectState::Done,
            next_milestone: "N/A".into(),
            due_date: None,
            completion_date: None,
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()),
            extra: vec![],
        };
        assert!(matches!(
            block.serialize(),
            Err(ValidationError::DoneWithoutCompletion)
        ));
    }

    #[test]
    fn milestone_invariant_enforced_both_ways() {
        let done_with_milestone = ProjectStatusBlock {
            state: ProjectState::Done,
            next_milestone: "One more thing".into(),
            due_date: None,
            completion_date: Some(DateField::Date(
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            )),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            extra: vec![],
        };
        assert!(matches!(
            done_with_milestone.validate(),
            Err(ValidationError::MilestoneOnDone { .. })
        ));

        let active_without_milestone = ProjectStatusBlock {
            state: ProjectState::Planning,
            next_milestone: "n/a".into(),
            due_date: None,
            completion_date: None,
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            extra: vec![],
        };
        assert!(matches!(
            active_without_milestone.validate(),
            Err(ValidationError::MilestoneNaOnActive { .. })
        ));
    }

    #[test]
    fn archive_reason_invariant() {
        let archived_no_reason = LeadStatusBlock {
            stage: LeadStage::ArchivedNoConversion,
            next_step: "N/A".into(),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            reason: None,
            extra: vec![],
        };
        assert!(matches!(
            archived_no_reason.validate(),
            Err(ValidationError::ArchiveWithoutReason)
        ));

        let active_with_reason = LeadStatusBlock {
            stage: LeadStage::Qualification,
            next_step: "Call".into(),
            last_updated: DateField::Date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            reason: Some("gone cold".into()),
            extra: vec![],
        };
        assert!(matches!(
            active_with_reason.validate(),
            Err(ValidationError::ReasonWithoutArchive { .. })
        ));
    }

    #[test]
    fn na_reason_reads_as_absent() {
        let doc = "## Status\n- **Stage:** Qualification\n- **Next Step:** Call\n\
                   - **Last Updated:** 2025-08-01\n- **Reason (if Archived):** N/A\n";
        let block = LeadStatusBlock::parse(doc).unwrap();
        assert!(block.reason.is_none());
    }

    #[test]
    fn person_records_have_no_block() {
        let err = StatusBlock::parse("# Dana\n", RecordKind::Person).unwrap_err();
        assert!(matches!(err, ParseFailure::NotApplicable { .. }));
    }
}
