use std::path::Path;

use crate::error::{Error, Result};
use crate::models::ExportRow;

pub const CSV_HEADER: &str = "Owner ID,Owner Name,Owner Email,Repo ID,Repo Name,Status,Stars Count";

/// Render the header plus one line per row.
pub fn render(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\r\n",
            row.owner_id,
            escape(&row.owner_name),
            escape(&row.owner_email),
            row.repo_id,
            escape(&row.repo_name),
            row.status,
            row.stars_count,
        ));
    }

    out
}

pub fn write_file<P: AsRef<Path>>(path: P, rows: &[ExportRow]) -> Result<()> {
    std::fs::write(&path, render(rows)).map_err(|e| {
        Error::Export(format!(
            "failed to write {}: {e}",
            path.as_ref().display()
        ))
    })
}

// Quote a field when it contains a delimiter, quote, or line break; embedded
// quotes are doubled.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
