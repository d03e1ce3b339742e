use std::io::BufRead;

use crate::io::{error::Error, util, Format};
use crate::model::atom::Atom;
use crate::model::cell::UnitCell;
use crate::model::structure::Structure;

const CELL_KEYS: [&str; 6] = [
    "_cell_length_a",
    "_cell_length_b",
    "_cell_length_c",
    "_cell_angle_alpha",
    "_cell_angle_beta",
    "_cell_angle_gamma",
];

/// Reads a P1 crystal structure from CIF: cell parameters and the
/// `_atom_site` loop with fractional coordinates. Bonds are not read; the
/// pipeline perceives them from distances.
pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let lines = collect_lines(reader)?;

    let name = scan_name(&lines);
    let cell = scan_cell(&lines)?;
    let atoms = scan_atoms(&lines, &cell)?;

    Ok(Structure {
        name,
        atoms,
        cell,
        bonds: None,
    })
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|v| (i + 1, v))
                .map_err(|e| Error::Io { source: e })
        })
        .collect()
}

fn scan_name(lines: &[(usize, String)]) -> Option<String> {
    lines.iter().find_map(|(_, line)| {
        let trimmed = line.trim();
        trimmed
            .strip_prefix("data_")
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    })
}

fn scan_cell(lines: &[(usize, String)]) -> Result<UnitCell, Error> {
    let mut values = [None; 6];

    for (ln, line) in lines {
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else {
            continue;
        };
        let key = key.to_ascii_lowercase();
        let Some(slot) = CELL_KEYS.iter().position(|&k| k == key) else {
            continue;
        };
        let value = parts.next().ok_or_else(|| {
            Error::parse(Format::Cif, *ln, format!("missing value for {}", key))
        })?;
        let value = util::strip_esd(value).parse::<f64>().map_err(|_| {
            Error::parse(Format::Cif, *ln, format!("invalid value for {}", key))
        })?;
        values[slot] = Some(value);
    }

    for (slot, value) in values.iter().enumerate() {
        if value.is_none() {
            return Err(Error::parse(
                Format::Cif,
                lines.last().map(|(ln, _)| *ln).unwrap_or(1),
                format!("missing {}", CELL_KEYS[slot]),
            ));
        }
    }

    let v = values.map(Option::unwrap);
    Ok(UnitCell::from_parameters(v[0], v[1], v[2], v[3], v[4], v[5])?)
}

fn scan_atoms(lines: &[(usize, String)], cell: &UnitCell) -> Result<Vec<Atom>, Error> {
    let mut i = 0;
    while i < lines.len() {
        if !lines[i].1.trim().eq_ignore_ascii_case("loop_") {
            i += 1;
            continue;
        }

        let mut headers = Vec::new();
        let mut j = i + 1;
        while j < lines.len() {
            let header = lines[j].1.trim();
            if !header.starts_with('_') {
                break;
            }
            headers.push(
                header
                    .split_whitespace()
                    .next()
                    .unwrap_or(header)
                    .to_ascii_lowercase(),
            );
            j += 1;
        }

        if headers.iter().any(|h| h == "_atom_site_fract_x") {
            return parse_atom_loop(lines, j, &headers, cell);
        }
        i = j.max(i + 1);
    }

    Err(Error::parse(
        Format::Cif,
        lines.last().map(|(ln, _)| *ln).unwrap_or(1),
        "missing _atom_site loop with fractional coordinates",
    ))
}

fn parse_atom_loop(
    lines: &[(usize, String)],
    start: usize,
    headers: &[String],
    cell: &UnitCell,
) -> Result<Vec<Atom>, Error> {
    let column = |name: &str| headers.iter().position(|h| h == name);

    let fx = column("_atom_site_fract_x").expect("checked by caller");
    let fy = column("_atom_site_fract_y").ok_or_else(|| {
        Error::parse(Format::Cif, lines[start.min(lines.len() - 1)].0, "missing _atom_site_fract_y")
    })?;
    let fz = column("_atom_site_fract_z").ok_or_else(|| {
        Error::parse(Format::Cif, lines[start.min(lines.len() - 1)].0, "missing _atom_site_fract_z")
    })?;
    let symbol = column("_atom_site_type_symbol");
    let label = column("_atom_site_label");

    // CIF rows may wrap; gather a token stream and chunk by column count.
    let mut tokens: Vec<(usize, &str)> = Vec::new();
    let mut k = start;
    while k < lines.len() {
        let (ln, raw) = &lines[k];
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            k += 1;
            continue;
        }
        if trimmed.starts_with('_')
            || trimmed.eq_ignore_ascii_case("loop_")
            || trimmed.to_ascii_lowercase().starts_with("data_")
        {
            break;
        }
        for token in trimmed.split_whitespace() {
            tokens.push((*ln, token));
        }
        k += 1;
    }

    if tokens.is_empty() || tokens.len() % headers.len() != 0 {
        let line = tokens.last().map(|(ln, _)| *ln).unwrap_or(lines[start.min(lines.len() - 1)].0);
        return Err(Error::parse(
            Format::Cif,
            line,
            "atom site loop does not fill its columns",
        ));
    }

    let mut atoms = Vec::with_capacity(tokens.len() / headers.len());
    for row in tokens.chunks(headers.len()) {
        let line = row[0].0;
        let coordinate = |col: usize| -> Result<f64, Error> {
            util::strip_esd(row[col].1).parse::<f64>().map_err(|_| {
                Error::parse(
                    Format::Cif,
                    line,
                    format!("invalid fractional coordinate '{}'", row[col].1),
                )
            })
        };
        let frac = [coordinate(fx)?, coordinate(fy)?, coordinate(fz)?];

        let element = symbol
            .and_then(|col| util::guess_element_symbol(row[col].1))
            .or_else(|| label.and_then(|col| util::guess_element_symbol(row[col].1)))
            .ok_or_else(|| Error::parse(Format::Cif, line, "unable to infer element"))?;

        atoms.push(Atom::new(element, cell.to_cartesian(frac)));
    }

    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    const ZINC_OXIDE_CIF: &str = "\
data_toy_mof
_cell_length_a    10.0
_cell_length_b    10.0
_cell_length_c    10.0(2)
_cell_angle_alpha 90
_cell_angle_beta  90
_cell_angle_gamma 90

loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 Zn 0.0 0.0 0.0
O1  O  0.2 0.0 0.0
O2  O  0.0 0.2(1) 0.0
";

    #[test]
    fn reads_cell_atoms_and_name() {
        let structure = read(ZINC_OXIDE_CIF.as_bytes()).unwrap();

        assert_eq!(structure.name.as_deref(), Some("toy_mof"));
        assert_eq!(structure.atom_count(), 3);
        assert!(!structure.has_explicit_bonds());

        let (a, b, c, alpha, ..) = structure.cell.parameters();
        assert!((a - 10.0).abs() < 1e-9);
        assert!((b - 10.0).abs() < 1e-9);
        assert!((c - 10.0).abs() < 1e-9);
        assert!((alpha - 90.0).abs() < 1e-9);

        assert_eq!(structure.atoms[0].element, Element::Zn);
        assert_eq!(structure.atoms[1].element, Element::O);
        let p = structure.atoms[1].position;
        assert!((p[0] - 2.0).abs() < 1e-9);
        let p = structure.atoms[2].position;
        assert!((p[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn element_falls_back_to_label() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_length_c 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Cu2A 0.5 0.5 0.5
";
        let structure = read(cif.as_bytes()).unwrap();
        assert_eq!(structure.atoms[0].element, Element::Cu);
    }

    #[test]
    fn missing_cell_parameter_is_reported() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
";
        let err = read(cif.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("_cell_length_c"));
    }

    #[test]
    fn bad_coordinate_reports_its_line() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_length_c 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 bogus 0.0 0.0
";
        let err = read(cif.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid fractional coordinate"));
        assert!(msg.contains("line ~12"));
    }

    #[test]
    fn degenerate_cell_is_rejected() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_length_c 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 180
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 0.0 0.0 0.0
";
        let err = read(cif.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidCell(_)));
    }

    #[test]
    fn missing_atom_loop_is_reported() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_length_c 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
";
        let err = read(cif.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("_atom_site"));
    }

    #[test]
    fn wrapped_rows_parse_by_token_count() {
        let cif = "\
_cell_length_a 5
_cell_length_b 5
_cell_length_c 5
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Zn1 0.0
0.0 0.0
O1 0.5 0.5 0.5
";
        let structure = read(cif.as_bytes()).unwrap();
        assert_eq!(structure.atom_count(), 2);
        assert_eq!(structure.atoms[1].element, Element::O);
    }
}
