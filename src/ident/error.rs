//! Error type of the identification pipeline.
//!
//! Only unrecoverable conditions surface here; recoverable findings are
//! collected as [`Diagnostic`](crate::Diagnostic) values on the final record
//! instead.

use thiserror::Error;

use crate::model::cell::DegenerateCellError;

/// Fatal failures that abort processing of the current structure.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse a configuration table (chem or nets TOML).
    #[error("failed to parse configuration table: {0}")]
    TableParse(#[from] toml::de::Error),

    /// A configuration table parsed but holds invalid content.
    #[error("invalid configuration table: {0}")]
    TableInvalid(String),

    /// The unit cell has zero or near-zero volume.
    #[error("malformed structure: {0}")]
    DegenerateCell(#[from] DegenerateCellError),

    /// An atom coordinate is NaN or infinite.
    #[error("malformed structure: coordinate of atom {atom} is not finite")]
    NonFiniteCoordinate { atom: usize },

    /// An explicit bond references the structure inconsistently.
    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond {
        i: usize,
        j: usize,
        detail: String,
    },

    /// The input structure contains no atoms.
    #[error("input structure contains no atoms")]
    EmptyStructure,

    /// No metal atoms were found, so the structure has no node fragments and
    /// cannot be a MOF.
    #[error("no metal atoms present: structure does not decompose into nodes and linkers")]
    NoMetalAtoms,
}

impl Error {
    /// Creates an [`InvalidBond`](Error::InvalidBond) error.
    pub fn invalid_bond(i: usize, j: usize, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: details.into(),
        }
    }

    /// Creates a [`TableInvalid`](Error::TableInvalid) error.
    pub fn table_invalid(details: impl Into<String>) -> Self {
        Self::TableInvalid(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bond_message() {
        let err = Error::invalid_bond(3, 7, "atom index out of bounds");
        assert_eq!(
            err.to_string(),
            "invalid bond between atoms 3 and 7: atom index out of bounds"
        );
    }

    #[test]
    fn degenerate_cell_is_malformed_structure() {
        let cell_err = crate::model::cell::UnitCell::from_vectors([
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
        .unwrap_err();
        let err: Error = cell_err.into();
        assert!(err.to_string().starts_with("malformed structure:"));
    }

    #[test]
    fn no_metal_message_names_decomposition() {
        let err = Error::NoMetalAtoms;
        assert!(err.to_string().contains("no metal atoms"));
    }
}
