use std::io::Write;

use crate::io::error::Error;
use crate::model::cell::UnitCell;
use crate::model::net::Net;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Writes a simplified net in Systre CGD format: one NODE line per vertex
/// with its coordination number and fractional position, one EDGE line per
/// edge with the second endpoint displaced into its periodic image. Edge
/// midpoints are appended as comments.
pub fn write<W: Write>(
    writer: &mut W,
    net: &Net,
    cell: &UnitCell,
    name: Option<&str>,
) -> Result<(), Error> {
    let indent = "  ";
    let (a, b, c, alpha, beta, gamma) = cell.parameters();

    writeln!(writer, "# CGD file generated by mofid {}", VERSION)?;
    writeln!(writer, "CRYSTAL")?;
    writeln!(writer, "{}NAME {}", indent, name.unwrap_or("unknown"))?;
    writeln!(writer, "{}GROUP P1", indent)?;
    writeln!(
        writer,
        "{}CELL {:.5} {:.5} {:.5} {:.4} {:.4} {:.4}",
        indent, a, b, c, alpha, beta, gamma
    )?;

    for (idx, vertex) in net.vertices.iter().enumerate() {
        let frac = cell.to_fractional(vertex.position);
        writeln!(
            writer,
            "{}NODE {} {} {:.5} {:.5} {:.5}",
            indent,
            idx + 1,
            net.degree(idx),
            frac[0],
            frac[1],
            frac[2]
        )?;
    }

    let mut centers = String::new();
    for edge in &net.edges {
        let begin = cell.to_fractional(net.vertices[edge.u].position);
        let mut end = cell.to_fractional(net.vertices[edge.v].position);
        for axis in 0..3 {
            end[axis] += edge.shift.0[axis] as f64;
        }
        writeln!(
            writer,
            "{}EDGE  {:.5} {:.5} {:.5}   {:.5} {:.5} {:.5}",
            indent, begin[0], begin[1], begin[2], end[0], end[1], end[2]
        )?;
        centers.push_str(&format!(
            "# EDGE_CENTER  {:.5} {:.5} {:.5}\n",
            (begin[0] + end[0]) / 2.0,
            (begin[1] + end[1]) / 2.0,
            (begin[2] + end[2]) / 2.0
        ));
    }

    write!(writer, "{}", centers)?;
    writeln!(writer, "END")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fragment::FragmentKind;
    use crate::model::net::{NetEdge, NetVertex};
    use crate::model::types::CellShift;

    fn cubic(a: f64) -> UnitCell {
        UnitCell::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]).unwrap()
    }

    fn loop_net() -> Net {
        Net {
            vertices: vec![NetVertex {
                fragment: 0,
                kind: FragmentKind::Node,
                position: [5.0, 5.0, 5.0],
            }],
            edges: vec![NetEdge {
                u: 0,
                v: 0,
                shift: CellShift::new(1, 0, 0),
            }],
        }
    }

    #[test]
    fn writes_nodes_edges_and_trailer() {
        let mut out = Vec::new();
        write(&mut out, &loop_net(), &cubic(10.0), Some("toy")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("CRYSTAL"));
        assert!(text.contains("NAME toy"));
        assert!(text.contains("GROUP P1"));
        assert!(text.contains("CELL 10.00000 10.00000 10.00000 90.0000 90.0000 90.0000"));
        assert!(text.contains("NODE 1 2 0.50000 0.50000 0.50000"));
        assert!(text.contains("EDGE  0.50000 0.50000 0.50000   1.50000 0.50000 0.50000"));
        assert!(text.contains("# EDGE_CENTER  1.00000 0.50000 0.50000"));
        assert!(text.trim_end().ends_with("END"));
    }

    #[test]
    fn one_line_per_vertex_and_edge() {
        let net = Net {
            vertices: vec![
                NetVertex {
                    fragment: 0,
                    kind: FragmentKind::Node,
                    position: [0.0, 0.0, 0.0],
                },
                NetVertex {
                    fragment: 1,
                    kind: FragmentKind::Linker,
                    position: [5.0, 0.0, 0.0],
                },
            ],
            edges: vec![
                NetEdge {
                    u: 0,
                    v: 1,
                    shift: CellShift::ZERO,
                },
                NetEdge {
                    u: 0,
                    v: 1,
                    shift: CellShift::new(-1, 0, 0),
                },
            ],
        };

        let mut out = Vec::new();
        write(&mut out, &net, &cubic(10.0), None).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches("NODE ").count(), 2);
        assert_eq!(text.matches("EDGE ").count(), 2);
        assert!(text.contains("NAME unknown"));
    }
}
