use std::io::{self, Write};

use fdpeek_common::{DescriptorRecord, ProcessHandle};

/// Print the process line and the column header.
pub fn write_header(out: &mut impl Write, pid: ProcessHandle) -> io::Result<()> {
    writeln!(out, "Open files for process ID {pid}:")?;
    writeln!(out, "{:<5} {:<10} {:<20}", "FD", "Type", "File Path")
}

pub fn write_row(out: &mut impl Write, record: &DescriptorRecord) -> io::Result<()> {
    writeln!(out, "{:<5} {:<10} {:<20}", record.id, record.kind, record.target)
}

/// Write the whole report, rows in the order given. Returns the row count.
pub fn render(
    out: &mut impl Write,
    pid: ProcessHandle,
    records: impl IntoIterator<Item = DescriptorRecord>,
) -> io::Result<usize> {
    write_header(out, pid)?;
    let mut rows = 0;
    for record in records {
        write_row(out, &record)?;
        rows += 1;
    }
    out.flush()?;
    Ok(rows)
}
