//! End-to-end tests over a real store directory: layout, reports, dumps,
//! and the move audit working together on tempdir fixtures.

use chrono::NaiveDate;

use paperbase::audit;
use paperbase::config::StoreConfig;
use paperbase::layout::StoreLayout;
use paperbase::record::RecordKind;
use paperbase::report::{build_report, dump::dump_category, render_table, Staleness};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 12).unwrap()
}

/// A populated store with the full directory convention.
fn fixture_store() -> (tempfile::TempDir, StoreLayout) {
    let tmp = tempfile::TempDir::new().unwrap();
    let layout = StoreLayout::new(tmp.path());
    layout.ensure_dirs().unwrap();

    std::fs::write(
        layout.leads_dir.join("acme.md"),
        "# Acme Corp\n\nIntro from Dana.\n\n## Status\n\n\
         - **Stage:** Proposal Sent\n\
         - **Next Step:** Wait for redlines\n\
         - **Last Updated:** 2025-08-10\n",
    )
    .unwrap();
    std::fs::write(
        layout.leads_dir.join("archive/ghosted.md"),
        "# Ghosted Inc\n\n## Status\n\n\
         - **Stage:** Archived - No Conversion\n\
         - **Next Step:** N/A\n\
         - **Last Updated:** 2025-05-01\n\
         - **Reason (if Archived):** No response after three follow-ups\n",
    )
    .unwrap();
    std::fs::write(
        layout.projects_dir.join("site-redesign.md"),
        "# Site Redesign\n\n## Status\n\n\
         - **Current Status:** Blocked\n\
         - **Next Milestone:** Content inventory\n\
         - **Due Date:** 2025-09-15\n\
         - **Last Updated:** 2025-07-20\n",
    )
    .unwrap();
    std::fs::write(
        layout.projects_dir.join("done/launch.md"),
        "# Launch\n\n## Status\n\n\
         - **Current Status:** Done\n\
         - **Next Milestone:** N/A\n\
         - **Completion Date (if Done):** 2025-06-30\n\
         - **Last Updated:** 2025-06-30\n",
    )
    .unwrap();
    std::fs::write(
        layout.people_dir.join("dana.md"),
        "# Dana\n\nIntroduced us to Acme.\n",
    )
    .unwrap();
    std::fs::write(
        layout.weeks_dir.join("week of 2025-08-11.md"),
        "# Week of 2025-08-11\n\n## Tasks\n\n\
         - [x] Send invoice\n\
         - [ ] Draft proposal (moved from week of 2025-08-04, week of 2025-08-11)\n\
         - [ ] Ping Sean (moved from week of 2025-08-04)\n\
         - [ ] New outreach batch\n",
    )
    .unwrap();

    (tmp, layout)
}

#[test]
fn report_covers_active_records_only() {
    let (_tmp, layout) = fixture_store();
    let report = build_report(&layout, &StoreConfig::default(), today());

    let titles: Vec<&str> = report.rows.iter().map(|r| r.title.as_str()).collect();
    assert!(titles.contains(&"Acme Corp"));
    assert!(titles.contains(&"Site Redesign"));
    // Terminal directories are invisible to the report.
    assert!(!titles.contains(&"Ghosted Inc"));
    assert!(!titles.contains(&"Launch"));

    let acme = report.rows.iter().find(|r| r.title == "Acme Corp").unwrap();
    assert_eq!(acme.kind, RecordKind::Lead);
    assert_eq!(acme.status, "Proposal Sent");
    assert_eq!(acme.staleness, Staleness::Fresh);

    let site = report.rows.iter().find(|r| r.title == "Site Redesign").unwrap();
    assert_eq!(site.staleness, Staleness::Stale);
    assert_eq!(site.next_action, "Content inventory");
}

#[test]
fn report_renders_with_custom_threshold() {
    let (_tmp, layout) = fixture_store();
    let config = StoreConfig {
        stale_threshold_days: 30,
        ..Default::default()
    };
    let report = build_report(&layout, &config, today());
    // At 30 days, the July project is back inside the window.
    let site = report.rows.iter().find(|r| r.title == "Site Redesign").unwrap();
    assert_eq!(site.staleness, Staleness::Fresh);

    let table = render_table(&report);
    assert!(table.contains("Status Report - 2025-08-12"));
    assert!(table.contains("Site Redesign"));
}

#[test]
fn dump_people_emits_full_text_between_markers() {
    let (_tmp, layout) = fixture_store();
    let mut buf = Vec::new();
    let count = dump_category(&layout, RecordKind::Person, &mut buf).unwrap();
    assert_eq!(count, 1);

    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("--- START FILE: people/dana.md ---"));
    assert!(text.contains("Introduced us to Acme."));
    assert!(text.contains("--- END FILE: people/dana.md ---"));
}

#[test]
fn audit_classifies_week_tasks() {
    let (_tmp, layout) = fixture_store();
    let report = audit::audit_store(&layout).unwrap();
    assert_eq!(report.sections.len(), 1);

    let section = &report.sections[0];
    assert!(section.file.ends_with("week of 2025-08-11.md"));
    assert_eq!(section.moved_multiple.len(), 1);
    assert_eq!(section.moved_multiple[0].move_count, 3);
    assert_eq!(section.moved_once.len(), 1);
    assert_eq!(section.moved_once[0].move_count, 2);
    // The completed invoice task is not audited.
    assert_eq!(section.not_moved.len(), 1);
    assert!(section.not_moved[0].text.contains("New outreach batch"));

    let rendered = audit::render(&report);
    assert!(rendered.contains("moved multiple times"));
    assert!(rendered.contains("[moves: 3]"));
}

#[test]
fn one_broken_record_does_not_abort_the_scan() {
    let (_tmp, layout) = fixture_store();
    std::fs::write(layout.leads_dir.join("broken.md"), "no heading, no block").unwrap();

    let report = build_report(&layout, &StoreConfig::default(), today());
    // The broken record degrades to a row, siblings are unaffected.
    let broken = report.rows.iter().find(|r| r.title == "broken").unwrap();
    assert_eq!(broken.status, "Unknown");
    assert_eq!(broken.staleness, Staleness::NoDate);
    assert!(report.rows.iter().any(|r| r.title == "Acme Corp"));
    assert_eq!(report.warnings.len(), 1);
}
