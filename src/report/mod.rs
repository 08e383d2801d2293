//! Staleness reporting: one table row per active lead and project.
//!
//! Per-file problems degrade — a record whose status block is missing,
//! malformed, or undated still gets a row (status "Unknown" / staleness
//! "No Date") and the scan continues. Terminal records are excluded by
//! position (`archive/`, `done/`), not by what their status block claims.

pub mod dump;

use chrono::NaiveDate;

use crate::config::StoreConfig;
use crate::layout::StoreLayout;
use crate::record::{collect_markdown, Record, RecordKind};
use crate::status::StatusBlock;

/// Age classification of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Updated within the threshold.
    Fresh,
    /// Updated, but longer ago than the threshold.
    Stale,
    /// No status block, or no parseable `Last Updated` date.
    NoDate,
}

impl Staleness {
    /// The table label; stale rows show the threshold that tripped them.
    pub fn label(&self, threshold_days: u32) -> String {
        match self {
            Self::Fresh => "Fresh".to_string(),
            Self::Stale => format!(">{threshold_days}d old"),
            Self::NoDate => "No Date".to_string(),
        }
    }
}

/// Classify a record's age as of `today`.
pub fn classify(
    last_updated: Option<NaiveDate>,
    today: NaiveDate,
    threshold_days: u32,
) -> Staleness {
    match last_updated {
        Some(date) => {
            let age = (today - date).num_days();
            if age > i64::from(threshold_days) {
                Staleness::Stale
            } else {
                Staleness::Fresh
            }
        }
        None => Staleness::NoDate,
    }
}

/// One row of the status table.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub title: String,
    pub kind: RecordKind,
    /// Lifecycle label, or "Unknown" when the block did not parse.
    pub status: String,
    pub staleness: Staleness,
    pub next_action: String,
    pub last_updated: String,
}

/// The full report over a store.
#[derive(Debug)]
pub struct StatusReport {
    pub date: NaiveDate,
    pub threshold_days: u32,
    pub rows: Vec<ReportRow>,
    /// Per-file degradations, for the log.
    pub warnings: Vec<String>,
}

/// Scan the active leads and projects of a store and build the report.
pub fn build_report(layout: &StoreLayout, config: &StoreConfig, today: NaiveDate) -> StatusReport {
    let mut report = StatusReport {
        date: today,
        threshold_days: config.stale_threshold_days,
        rows: Vec::new(),
        warnings: Vec::new(),
    };

    for kind in [RecordKind::Lead, RecordKind::Project] {
        for path in collect_markdown(layout.category_dir(kind)) {
            let display = layout.relative(&path).display().to_string();
            let record = match Record::load(&path, kind) {
                Ok(record) => record,
                Err(e) => {
                    report.warnings.push(format!("{display}: {e}"));
                    report.rows.push(ReportRow {
                        title: display,
                        kind,
                        status: "Unknown".to_string(),
                        staleness: Staleness::NoDate,
                        next_action: String::new(),
                        last_updated: String::new(),
                    });
                    continue;
                }
            };
            report.rows.push(row_for(&record, &display, today, config, &mut report.warnings));
        }
    }
    report
}

fn row_for(
    record: &Record,
    name: &str,
    today: NaiveDate,
    config: &StoreConfig,
    warnings: &mut Vec<String>,
) -> ReportRow {
    match StatusBlock::parse(&record.body, record.kind) {
        Ok(block) => {
            let last = block.last_updated();
            ReportRow {
                title: record.title.clone(),
                kind: record.kind,
                status: block.status_label().to_string(),
                staleness: classify(last.as_date(), today, config.stale_threshold_days),
                next_action: block.next_action().to_string(),
                last_updated: last.to_string(),
            }
        }
        Err(failure) => {
            tracing::debug!(file = name, "status block degraded: {failure}");
            warnings.push(format!("{name}: {failure}"));
            ReportRow {
                title: record.title.clone(),
                kind: record.kind,
                status: "Unknown".to_string(),
                staleness: Staleness::NoDate,
                next_action: String::new(),
                last_updated: String::new(),
            }
        }
    }
}

/// Render the report as an aligned text table.
pub fn render_table(report: &StatusReport) -> String {
    let mut out = format!("Status Report - {}\n\n", report.date.format("%Y-%m-%d"));
    if report.rows.is_empty() {
        out.push_str("No active leads or projects found.\n");
        return out;
    }

    let headers = [
        "Title",
        "Kind",
        "Status",
        "Staleness",
        "Next Action",
        "Last Updated",
    ];
    let cells: Vec<[String; 6]> = report
        .rows
        .iter()
        .map(|row| {
            [
                row.title.clone(),
                row.kind.as_label().to_string(),
                row.status.clone(),
                row.staleness.label(report.threshold_days),
                row.next_action.clone(),
                row.last_updated.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{h:<width$}", width = widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(&header_line);
    out.push('\n');
    out.push_str(&"-".repeat(header_line.chars().count()));
    out.push('\n');

    for row in &cells {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
