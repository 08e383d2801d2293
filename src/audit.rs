//! Move audit: how often incomplete tasks get carried between weekly plans.
//!
//! When a task is rolled into a new weekly file, the convention is to append
//! a provenance annotation: `(moved from week of 2025-08-04)`, growing a
//! comma-separated source list on each further move. The audit counts those
//! sources per task. The comma heuristic is an accepted approximation — a
//! comma inside a source label overcounts (see the tests).

use std::path::PathBuf;

use crate::layout::StoreLayout;

/// An incomplete task line and how often it has been relocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedTask {
    /// The task line, leading whitespace stripped.
    pub text: String,
    /// Weekly files this task has appeared in, counting the current one;
    /// 0 when it has never been moved.
    pub move_count: u32,
}

/// Audit results for one weekly file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSection {
    /// File name relative to the store root.
    pub file: String,
    pub moved_multiple: Vec<MovedTask>,
    pub moved_once: Vec<MovedTask>,
    pub not_moved: Vec<MovedTask>,
}

/// The audit over all weekly files, in filename sort order.
#[derive(Debug, Default)]
pub struct AuditReport {
    pub sections: Vec<AuditSection>,
    /// Files that could not be read; the audit continues past them.
    pub warnings: Vec<String>,
}

/// Audit the store's weekly plan files.
pub fn audit_store(layout: &StoreLayout) -> Result<AuditReport, crate::layout::LayoutError> {
    let files = layout.week_files()?;
    let rel: Vec<(PathBuf, String)> = files
        .into_iter()
        .map(|p| {
            let display = layout.relative(&p).display().to_string();
            (p, display)
        })
        .collect();
    Ok(audit_files(&rel))
}

/// Audit an ordered list of `(path, display_name)` weekly files.
pub fn audit_files(files: &[(PathBuf, String)]) -> AuditReport {
    let mut report = AuditReport::default();
    for (path, name) in files {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "skipping unreadable weekly file");
                report.warnings.push(format!("{name}: {e}"));
                continue;
            }
        };
        report.sections.push(audit_text(name, &text));
    }
    report
}

/// Classify the incomplete tasks of one weekly document.
pub fn audit_text(file: &str, text: &str) -> AuditSection {
    let mut section = AuditSection {
        file: file.to_string(),
        ..Default::default()
    };
    for line in text.lines() {
        let trimmed = line.trim_start();
        if !is_incomplete_task(trimmed) || is_structural(trimmed) {
            continue;
        }
        let task = MovedTask {
            text: trimmed.trim_end().to_string(),
            move_count: move_count(trimmed),
        };
        match provenance_entries(trimmed) {
            0 => section.not_moved.push(task),
            1 => section.moved_once.push(task),
            _ => section.moved_multiple.push(task),
        }
    }
    section
}

/// Has an open checkbox and no completed one.
fn is_incomplete_task(line: &str) -> bool {
    line.contains("[ ]") && !line.contains("[x]") && !line.contains("[X]")
}

/// Headings and horizontal rules are structure, not tasks.
fn is_structural(line: &str) -> bool {
    if line.starts_with('#') {
        return true;
    }
    let bare: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    bare.len() >= 3
        && (bare.chars().all(|c| c == '-')
            || bare.chars().all(|c| c == '*')
            || bare.chars().all(|c| c == '_'))
}

/// How many weekly files the annotation says this task came from.
///
/// The heuristic counts commas across the whole line, so a comma anywhere
/// else inflates the count.
fn provenance_entries(line: &str) -> u32 {
    if !line.contains("(moved from") {
        return 0;
    }
    line.matches(',').count() as u32 + 1
}

/// Reported move count: source files plus the current one; 0 if never moved.
fn move_count(line: &str) -> u32 {
    match provenance_entries(line) {
        0 => 0,
        n => n + 1,
    }
}

/// Render the audit as a per-file text report.
pub fn render(report: &AuditReport) -> String {
    let mut out = String::from("Task Movement Audit\n");
    if report.sections.is_empty() {
        out.push_str("\nNo weekly plan files found.\n");
        return out;
    }
    for section in &report.sections {
        out.push_str(&format!("\n=== {} ===\n", section.file));
        let groups = [
            ("moved multiple times", &section.moved_multiple),
            ("moved once", &section.moved_once),
            ("not yet moved", &section.not_moved),
        ];
        for (label, tasks) in groups {
            if tasks.is_empty() {
                continue;
            }
            out.push_str(&format!("  {label}:\n"));
            for task in tasks {
                if task.move_count > 0 {
                    out.push_str(&format!("    [moves: {}] {}\n", task.move_count, task.text));
                } else {
                    out.push_str(&format!("    {}\n", task.text));
                }
            }
        }
        if section.moved_multiple.is_empty()
            && section.moved_once.is_empty()
            && section.not_moved.is_empty()
        {
            out.push_str("  no open tasks\n");
        }
    }
    out
}
