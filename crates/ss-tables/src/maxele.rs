//! maxele.63-format output for solver-ecosystem consumers.
//!
//! Three comment lines (the second carrying the record length), then
//! one `id value` line per node.

use std::io::{BufRead, Write};

use ss_core::Real;

use crate::mesh::parse_field;
use crate::{TablesError, TablesResult};

/// Write `(node id, value)` pairs in maxele.63 format.
pub fn write_maxele63<W: Write>(mut writer: W, values: &[(u32, Real)]) -> TablesResult<()> {
    writeln!(writer, "!  ")?;
    writeln!(writer, "!  {}", values.len())?;
    writeln!(writer, "!  ")?;
    for (id, value) in values {
        writeln!(writer, "{id}    {value}")?;
    }
    Ok(())
}

/// Read a maxele.63 back into `(node id, value)` pairs.
pub fn read_maxele63<R: BufRead>(reader: R) -> TablesResult<Vec<(u32, Real)>> {
    let mut lines = reader.lines();

    let mut next_line = |line: usize| -> TablesResult<String> {
        match lines.next() {
            Some(Ok(l)) => Ok(l),
            Some(Err(e)) => Err(TablesError::Io(e)),
            None => Err(TablesError::Malformed {
                what: "maxele.63",
                line,
                detail: "unexpected end of file".into(),
            }),
        }
    };

    next_line(1)?;
    let meta = next_line(2)?;
    let count: usize = parse_field(
        meta.split_whitespace().nth(1),
        "maxele.63",
        2,
        "record count",
    )?;
    next_line(3)?;

    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let line_no = 4 + i;
        let line = next_line(line_no)?;
        let mut parts = line.split_whitespace();
        let id: u32 = parse_field(parts.next(), "maxele.63", line_no, "node id")?;
        let value: Real = parse_field(parts.next(), "maxele.63", line_no, "value")?;
        values.push((id, value));
    }
    Ok(values)
}
