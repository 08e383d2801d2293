//! Tag scanning: `@reminder(...)`, `@calendar(...)`, `@imessage(...)`.
//!
//! Tags are key="value" argument lists embedded in free Markdown. Values may
//! contain escaped quotes, commas, and parentheses, so extraction is a small
//! character state machine rather than a regex. One malformed tag never stops
//! the scan: it becomes a [`ScanWarning`] and scanning continues.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of external action a tag requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Reminder,
    Calendar,
    Imessage,
}

impl TagKind {
    pub const ALL: [TagKind; 3] = [Self::Reminder, Self::Calendar, Self::Imessage];

    /// The literal that opens an invocation, e.g. `@reminder(`.
    pub fn opener(&self) -> &'static str {
        match self {
            Self::Reminder => "@reminder(",
            Self::Calendar => "@calendar(",
            Self::Imessage => "@imessage(",
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Reminder => "reminder",
            Self::Calendar => "calendar",
            Self::Imessage => "imessage",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reminder" => Some(Self::Reminder),
            "calendar" => Some(Self::Calendar),
            "imessage" | "message" => Some(Self::Imessage),
            _ => None,
        }
    }

    /// Keys a tag of this kind must carry to be actionable.
    pub fn required_keys(&self) -> &[&'static str] {
        match self {
            Self::Reminder | Self::Calendar => &["message", "at"],
            Self::Imessage => &["to", "message"],
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One parsed tag invocation. Ephemeral: rebuilt on every scan, never
/// persisted — only its ledger entry survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTag {
    pub kind: TagKind,
    /// Sorted key → unquoted value. BTreeMap keeps normalization stable for
    /// identity hashing.
    pub args: BTreeMap<String, String>,
    /// 1-based line of the invocation in the source document.
    pub line: usize,
}

impl ScheduleTag {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// The explicit idempotency id, if the author gave one.
    pub fn explicit_id(&self) -> Option<&str> {
        self.get("id")
    }
}

/// A non-fatal problem found while scanning. The offending tag is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Result of scanning one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Valid tags, in order of first appearance.
    pub tags: Vec<ScheduleTag>,
    pub warnings: Vec<ScanWarning>,
}

/// Scan a document for tag invocations of every kind.
///
/// Deterministic and restartable: scanning the same text always yields the
/// same sequence, ordered by appearance.
pub fn scan(text: &str) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for (idx, line) in text.lines().enumerate() {
        scan_line(line, idx + 1, &mut outcome);
    }
    outcome
}

/// Scan one line left to right, taking the earliest opener of any kind so
/// mixed-kind lines yield tags in textual order.
fn scan_line(line: &str, line_no: usize, outcome: &mut ScanOutcome) {
    let mut rest = line;
    loop {
        let earliest = TagKind::ALL
            .iter()
            .filter_map(|k| rest.find(k.opener()).map(|i| (i, *k)))
            .min_by_key(|(i, _)| *i);
        let Some((start, kind)) = earliest else {
            return;
        };
        let body = &rest[start + kind.opener().len()..];
        match extract_params(body) {
            Some((params_text, consumed)) => {
                match build_tag(kind, params_text, line_no) {
                    Ok(tag) => outcome.tags.push(tag),
                    Err(message) => outcome.warnings.push(ScanWarning { line: line_no, message }),
                }
                rest = &body[consumed..];
            }
            None => {
                outcome.warnings.push(ScanWarning {
                    line: line_no,
                    message: format!("unterminated @{}(...) invocation", kind.as_label()),
                });
                return;
            }
        }
    }
}

/// Extract the parameter text up to the balancing close paren.
///
/// Quote-aware and paren-balanced, so `message="Follow up (Battery)"` works.
/// Returns the parameter slice and the byte offset just past the close paren,
/// or `None` when the invocation never terminates.
fn extract_params(body: &str) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    let mut in_quotes = false;
    let mut escape = false;
    for (i, ch) in body.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' => escape = true,
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some((&body[..i], i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a comma-separated key=value list, respecting quoted strings.
fn split_kvlist(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    for ch in s.chars() {
        if escape {
            buf.push(ch);
            escape = false;
            continue;
        }
        match ch {
            '\\' => {
                buf.push(ch);
                escape = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                buf.push(ch);
            }
            ',' if !in_quotes => {
                parts.push(buf.trim().to_string());
                buf.clear();
            }
            _ => buf.push(ch),
        }
    }
    if !buf.trim().is_empty() {
        parts.push(buf.trim().to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Strip surrounding quotes and resolve escape sequences.
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let inner = &s[1..s.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        out
    } else {
        s.to_string()
    }
}

/// Turn raw parameter text into a validated tag, or a warning message.
fn build_tag(kind: TagKind, params_text: &str, line: usize) -> Result<ScheduleTag, String> {
    let pairs = split_kvlist(params_text);
    let mut args = BTreeMap::new();
    let mut pairs_iter = pairs.iter();

    // Shorthand: a first positional quoted string is the message.
    let mut first_consumed = false;
    if let Some(first) = pairs.first() {
        if !first.contains('=') && first.starts_with('"') && first.ends_with('"') {
            args.insert("message".to_string(), unquote(first));
            first_consumed = true;
        }
    }
    if first_consumed {
        pairs_iter.next();
    }

    for pair in pairs_iter {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!(
                "invalid parameter segment (expected key=value): {pair}"
            ));
        };
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("invalid parameter key: {key:?}"));
        }
        args.insert(key.to_string(), unquote(value));
    }

    let missing: Vec<&str> = kind
        .required_keys()
        .iter()
        .copied()
        .filter(|k| !args.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(format!(
            "@{} tag is missing required keys: {}",
            kind.as_label(),
            missing.join(", ")
        ));
    }

    Ok(ScheduleTag { kind, args, line })
}
