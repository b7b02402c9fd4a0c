//! CSV piece list.
//!
//! Two columns, `Color` and `1 x 1`, one row per colour in service
//! order, then a `Total` row. Fields containing commas, quotes or line
//! breaks are quoted (RFC 4180).

use std::fmt::Write;

use brickify_pipeline::PieceTable;

/// Serialize the piece table.
#[must_use]
pub fn to_csv(pieces: &PieceTable) -> String {
    let mut out = String::from("Color,1 x 1\r\n");
    for entry in pieces.entries() {
        let _ = write!(out, "{},{}\r\n", quote(&entry.label), entry.count);
    }
    let _ = write!(out, "Total,{}\r\n", pieces.total_pieces());
    out
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
