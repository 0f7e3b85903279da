//! ADCIRC fort.14 mesh reading.
//!
//! Only the header and the node block are consumed: the node count
//! fixes the canonical row order for every downstream table, and the
//! coordinates feed the materializer. The element connectivity that
//! follows the node block belongs to the solver, not to this pipeline.

use std::io::BufRead;

use ss_pipeline::{Mesh, NodeCoord};

use crate::{TablesError, TablesResult};

/// Read the mesh title line, size line and node block from a fort.14.
///
/// Node lines are `id x y depth` with ids numbered 1..=n in order; an
/// out-of-order id is a hard error because every dense table in the
/// pipeline assumes that ordering.
pub fn read_mesh<R: BufRead>(reader: R) -> TablesResult<Mesh> {
    let mut lines = reader.lines();

    // Line 1: grid title, unused.
    next_line(&mut lines, "fort.14", 1)?;

    let size_line = next_line(&mut lines, "fort.14", 2)?;
    let mut parts = size_line.split_whitespace();
    let _element_count: usize = parse_field(parts.next(), "fort.14", 2, "element count")?;
    let node_count: usize = parse_field(parts.next(), "fort.14", 2, "node count")?;

    let mut coords = Vec::with_capacity(node_count);
    for i in 0..node_count {
        let line_no = 3 + i;
        let line = next_line(&mut lines, "fort.14", line_no)?;
        let mut parts = line.split_whitespace();
        let id: u32 = parse_field(parts.next(), "fort.14", line_no, "node id")?;
        if id != (i + 1) as u32 {
            return Err(TablesError::NodeOrder {
                expected: (i + 1) as u32,
                found: id,
            });
        }
        let lon: f64 = parse_field(parts.next(), "fort.14", line_no, "longitude")?;
        let lat: f64 = parse_field(parts.next(), "fort.14", line_no, "latitude")?;
        let depth: f64 = parse_field(parts.next(), "fort.14", line_no, "depth")?;
        coords.push(NodeCoord { lon, lat, depth });
    }

    Ok(Mesh { coords })
}

fn next_line<B: BufRead>(
    lines: &mut std::io::Lines<B>,
    what: &'static str,
    line: usize,
) -> TablesResult<String> {
    match lines.next() {
        Some(Ok(l)) => Ok(l),
        Some(Err(e)) => Err(TablesError::Io(e)),
        None => Err(TablesError::Malformed {
            what,
            line,
            detail: "unexpected end of file".into(),
        }),
    }
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    what: &'static str,
    line: usize,
    name: &str,
) -> TablesResult<T> {
    let raw = field.ok_or_else(|| TablesError::Malformed {
        what,
        line,
        detail: format!("missing {name}"),
    })?;
    raw.parse().map_err(|_| TablesError::Malformed {
        what,
        line,
        detail: format!("unparseable {name}: {raw:?}"),
    })
}
