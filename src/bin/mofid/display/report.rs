use std::io::{self, Write};

use mofid::{IdentificationRecord, Structure};

/// Prints the identification record to stdout, one fragment per line, the
/// topology label last. Diagnostics go to stderr so piped output stays
/// clean.
pub fn print_record(record: &IdentificationRecord) {
    let mut stdout = io::stdout().lock();

    for identity in &record.fragments {
        let _ = writeln!(
            stdout,
            "{:<7} x{:<3} {}",
            identity.kind.to_string(),
            identity.multiplicity,
            identity.identifier
        );
    }
    let _ = writeln!(
        stdout,
        "topology    {} ({})",
        record.topology.code, record.topology.signature
    );
    if record.is_partial() {
        let _ = writeln!(
            stdout,
            "partial     record is incomplete; see warnings"
        );
    }
    let _ = stdout.flush();

    let mut stderr = io::stderr().lock();
    for diagnostic in &record.diagnostics {
        let _ = writeln!(stderr, "warning: {}", diagnostic);
    }
}

/// One-line structure summary for interactive runs.
pub fn print_structure_info(structure: &Structure) {
    let (a, b, c, alpha, beta, gamma) = structure.cell.parameters();
    let mut stderr = io::stderr().lock();
    let _ = writeln!(
        stderr,
        "      {} atoms · cell {:.3} {:.3} {:.3} Å / {:.1}° {:.1}° {:.1}°{}",
        structure.atom_count(),
        a,
        b,
        c,
        alpha,
        beta,
        gamma,
        structure
            .name
            .as_deref()
            .map(|n| format!(" · {}", n))
            .unwrap_or_default()
    );
}
