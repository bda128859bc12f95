use crate::{SubtreeRecord, short_hash};
use std::io::{self, Write};

const HEADER: [&str; 4] = ["Prefix", "Remote URL", "Subtree Split", "Local Commit"];

/// Write records as a fixed-width table, header first.
///
/// Columns are 20, 55, 20 and 12 characters wide. Longer values are not cut,
/// they push the rest of the row to the right.
pub fn write_table<W: Write>(out: &mut W, records: &[SubtreeRecord]) -> io::Result<()> {
    write_row(out, HEADER)?;
    for record in records {
        write_row(
            out,
            [
                record.prefix.as_str(),
                record.remote_url.as_str(),
                short_hash(&record.upstream_commit),
                short_hash(&record.local_commit),
            ],
        )?;
    }
    Ok(())
}

/// Write records as tab-separated lines with full hashes.
pub fn write_porcelain<W: Write>(out: &mut W, records: &[SubtreeRecord]) -> io::Result<()> {
    for r in records {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            r.prefix, r.remote_url, r.upstream_commit, r.local_commit
        )?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: [&str; 4]) -> io::Result<()> {
    let [prefix, remote, split, local] = cells;
    let line = format!("{prefix:<20} {remote:<55} {split:<20} {local:<12}");
    writeln!(out, "{}", line.trim_end())
}
