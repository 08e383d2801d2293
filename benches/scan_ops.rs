//! Micro-benchmarks for the hot text-scanning paths: status-block parsing
//! and tag extraction. These run over every record on every report, so
//! regressions here are felt directly at the CLI.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use paperbase::schedule::tag;
use paperbase::status::LeadStatusBlock;

fn lead_doc() -> String {
    let mut doc = String::from(
        "# Acme Corp\n\nLong intro notes about the lead, how we met, and what \
         they care about.\n\n## Status\n\n\
         - **Stage:** Negotiation\n\
         - **Next Step:** Send revised pricing\n\
         - **Last Updated:** 2025-08-01\n\n## Notes\n\n",
    );
    for i in 0..50 {
        doc.push_str(&format!("- call note {i}: discussed scope and timing\n"));
    }
    doc
}

fn week_doc() -> String {
    let mut doc = String::from("# Week of 2025-08-11\n\n## Tasks\n\n");
    for i in 0..30 {
        doc.push_str(&format!("- [ ] routine task {i} with no tags\n"));
    }
    doc.push_str(
        "- [ ] Ping Sean @reminder(message=\"Follow up with Sean\", at=\"2025-08-16 09:30\", list=\"Work\")\n\
         - [ ] Focus @calendar(message=\"Focus block (PRD, part 2)\", at=\"tomorrow 10:00\", duration=\"90m\")\n",
    );
    doc
}

fn bench_status_parse(c: &mut Criterion) {
    let doc = lead_doc();
    c.bench_function("status_parse_lead", |b| {
        b.iter(|| LeadStatusBlock::parse(black_box(&doc)).unwrap())
    });
}

fn bench_tag_scan(c: &mut Criterion) {
    let doc = week_doc();
    c.bench_function("tag_scan_week", |b| b.iter(|| tag::scan(black_box(&doc))));
}

criterion_group!(benches, bench_status_parse, bench_tag_scan);
criterion_main!(benches);
