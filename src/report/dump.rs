//! Bulk content dump: every record of a category, delimited by explicit
//! file markers, for consumption by a downstream summarizer.

use std::io::Write;

use crate::layout::StoreLayout;
use crate::record::{collect_markdown, RecordKind};

/// Write every record of `kind` to `out`, each between START/END markers
/// naming the file relative to the store root. Returns the number of files
/// dumped. A file that fails to read is noted inline and does not stop the
/// dump.
pub fn dump_category(
    layout: &StoreLayout,
    kind: RecordKind,
    out: &mut dyn Write,
) -> std::io::Result<usize> {
    let files = collect_markdown(layout.category_dir(kind));
    if files.is_empty() {
        writeln!(
            out,
            "No .md files found in '{}'.",
            layout.relative(layout.category_dir(kind)).display()
        )?;
        return Ok(0);
    }
    for path in &files {
        let rel = layout.relative(path).display();
        writeln!(out, "\n--- START FILE: {rel} ---\n")?;
        match std::fs::read_to_string(path) {
            Ok(content) => out.write_all(content.as_bytes())?,
            Err(e) => {
                tracing::warn!(file = %rel, error = %e, "failed to read record");
                writeln!(out, "Error reading file: {e}")?;
            }
        }
        writeln!(out, "\n--- END FILE: {rel} ---")?;
    }
    Ok(files.len())
}
