//! Crystallographic I/O: CIF input and Systre CGD output.

use std::fmt;
use std::io::{BufRead, Write};

mod cgd;
mod cif;
pub mod error;
pub mod util;

pub use error::Error;

use crate::model::cell::UnitCell;
use crate::model::net::Net;
use crate::model::structure::Structure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Cif,
    Cgd,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Cif => write!(f, "CIF"),
            Format::Cgd => write!(f, "CGD"),
        }
    }
}

/// Reads a P1 crystal structure from CIF.
pub fn read_cif<R: BufRead>(reader: R) -> Result<Structure, Error> {
    cif::read(reader)
}

/// Writes a simplified net in Systre CGD format.
pub fn write_cgd<W: Write>(
    writer: &mut W,
    net: &Net,
    cell: &UnitCell,
    name: Option<&str>,
) -> Result<(), Error> {
    cgd::write(writer, net, cell, name)
}
