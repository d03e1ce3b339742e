use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = collect_hints(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

fn collect_hints(err: &Error) -> Option<Vec<String>> {
    let mut hints = Vec::new();

    if let Some(io_err) = err.downcast_ref::<mofid::io::Error>() {
        collect_io_hints(io_err, &mut hints);
    } else if let Some(ident_err) = err.downcast_ref::<mofid::IdentError>() {
        collect_ident_hints(ident_err, &mut hints);
    } else {
        collect_fallback_hints(err, &mut hints);
    }

    if hints.is_empty() { None } else { Some(hints) }
}

fn collect_io_hints(err: &mofid::io::Error, hints: &mut Vec<String>) {
    use mofid::io::Error as IoError;

    match err {
        IoError::Io { source } => match source.kind() {
            io::ErrorKind::NotFound => {
                hints.push("File or directory not found".into());
                hints.push("Check the path spelling and ensure the file exists".into());
            }
            io::ErrorKind::PermissionDenied => {
                hints.push("Permission denied accessing the file".into());
                hints.push("Check file permissions with `ls -la`".into());
            }
            _ => {
                hints.push("I/O operation failed".into());
                hints.push("Check file path, permissions, and disk space".into());
            }
        },

        IoError::Parse { line, .. } => {
            hints.push(format!("Parser encountered an issue near line {}", line));
            hints.push("Inspect the file around that line for malformed entries".into());
            hints.push("CIF input needs _cell_* parameters and an _atom_site loop".into());
        }

        IoError::InvalidCell(_) => {
            hints.push("The declared unit cell has no volume".into());
            hints.push("Check _cell_length_* and _cell_angle_* values".into());
        }
    }
}

fn collect_ident_hints(err: &mofid::IdentError, hints: &mut Vec<String>) {
    use mofid::IdentError;

    match err {
        IdentError::TableParse(_) | IdentError::TableInvalid(_) => {
            hints.push("A custom --chem or --nets table failed to load".into());
            hints.push("Validate the TOML structure against the embedded defaults".into());
        }

        IdentError::NoMetalAtoms => {
            hints.push("The structure contains no atoms classified as metals".into());
            hints.push("MOF decomposition needs at least one metal node".into());
            hints.push("Adjust the metal set via --chem for unusual chemistry".into());
        }

        IdentError::DegenerateCell(_) | IdentError::NonFiniteCoordinate { .. } => {
            hints.push("The input geometry is malformed".into());
            hints.push("Check cell parameters and atom coordinates".into());
        }

        IdentError::InvalidBond { .. } => {
            hints.push("An explicit bond references the structure inconsistently".into());
            hints.push("Check bond atom indices and image shifts".into());
        }

        IdentError::EmptyStructure => {
            hints.push("The input contains no atoms".into());
            hints.push("Verify the file is not empty or truncated".into());
        }
    }
}

fn collect_fallback_hints(err: &Error, hints: &mut Vec<String>) {
    let msg = err.to_string().to_lowercase();

    if msg.contains("terminal") || msg.contains("stdin") {
        hints.push("Input appears to be from a terminal".into());
        hints.push("Provide an input file or pipe data to stdin".into());
    } else if msg.contains("no such file") || msg.contains("not found") {
        hints.push("Check that the file path is correct".into());
    }
}
