//! A pure Rust library for identifying metal-organic framework crystal
//! structures. It decomposes a periodic structure into its chemical building
//! blocks — metal-containing nodes and organic linkers — and emits canonical,
//! comparable identifiers for each block together with a classification of
//! the framework's underlying topology.
//!
//! # Features
//!
//! - **Bond perception** — Distance-based bonding from covalent radii with
//!   full periodic-image handling, or caller-supplied explicit bond lists
//! - **Node/linker partitioning** — Metal–nonmetal bond cutting with
//!   configurable attachment rules for bridging oxygens, hydroxyls, and
//!   coordinated solvent
//! - **Canonical identifiers** — Deterministic fragment identifiers with
//!   multiplicity merging, through a pluggable canonicalization backend
//! - **Topology assignment** — Contraction of the framework to its
//!   simplified net and signature lookup against a reference table (pcu,
//!   dia, srs, …)
//! - **Crystallographic I/O** — CIF input and Systre CGD net export
//!
//! # Quick Start
//!
//! The main entry point is the [`identify`] function, which takes a
//! [`Structure`] and [`IdentConfig`] and produces an
//! [`IdentificationRecord`]:
//!
//! ```
//! use mofid::{identify, Atom, Element, IdentConfig, Structure, UnitCell};
//!
//! // A toy primitive-cubic MOF: one zinc at the origin octahedrally bonded
//! // to six oxygens, each oxygen continuing into a three-carbon strut that
//! // reaches the oxygen of the next cell over.
//! let cell = UnitCell::from_vectors([
//!     [10.0, 0.0, 0.0],
//!     [0.0, 10.0, 0.0],
//!     [0.0, 0.0, 10.0],
//! ])?;
//! let mut structure = Structure::new(cell);
//! structure.atoms.push(Atom::new(Element::Zn, [0.0, 0.0, 0.0]));
//! for axis in 0..3 {
//!     for sign in [1.0, -1.0] {
//!         let mut p = [0.0; 3];
//!         p[axis] = 2.0 * sign;
//!         structure.atoms.push(Atom::new(Element::O, p));
//!     }
//!     for step in 0..3 {
//!         let mut p = [0.0; 3];
//!         p[axis] = 3.5 + 1.5 * step as f64;
//!         structure.atoms.push(Atom::new(Element::C, p));
//!     }
//! }
//!
//! let record = identify(&structure, &IdentConfig::default())?;
//!
//! // One node (zinc plus its six oxygens)...
//! assert_eq!(record.nodes().count(), 1);
//!
//! // ...and one unique linker, seen three times (one strut per axis).
//! let linker = record.linkers().next().unwrap();
//! assert_eq!(linker.multiplicity, 3);
//!
//! // The six-connected net of a primitive cubic framework.
//! assert_eq!(record.topology.code, "pcu");
//! assert!(record.diagnostics.is_empty());
//! # Ok::<(), mofid::IdentError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — CIF reading and Systre CGD export
//! - [`identify`] / [`identify_with`] — the full pipeline
//! - [`decompose`] — fragments and the contracted net without
//!   canonicalization
//!
//! # Data Types
//!
//! ## Input
//!
//! - [`Structure`] — atoms, unit cell, optional explicit bonds
//! - [`Atom`], [`Element`], [`BondOrder`], [`ExplicitBond`]
//! - [`UnitCell`] — lattice vectors with fractional ↔ Cartesian conversion
//! - [`CellShift`] — integer periodic image offset
//!
//! ## Output
//!
//! - [`IdentificationRecord`] — identifiers, topology label, diagnostics
//! - [`FragmentIdentity`], [`TopologyLabel`], [`Diagnostic`]
//! - [`Decomposition`], [`Fragment`], [`Net`]
//!
//! ## Configuration
//!
//! - [`IdentConfig`] — tables, bonding policy, capping rule
//! - [`Canonicalizer`] — pluggable canonicalization backend

mod ident;
mod model;

pub mod io;

pub use model::atom::Atom;
pub use model::cell::{DegenerateCellError, UnitCell};
pub use model::fragment::{Fragment, FragmentGraph, FragmentKind};
pub use model::net::{Net, NetEdge, NetVertex};
pub use model::record::{Diagnostic, FragmentIdentity, IdentificationRecord, TopologyLabel};
pub use model::structure::{ExplicitBond, Structure};
pub use model::types::{BondOrder, CellShift, Element, ParseElementError};

pub use ident::{
    decompose, identify, identify_with, simplify_net, BondingPolicy, CanonError, Canonicalizer,
    CappingRule, Decomposition, IdentConfig, MorganCanonicalizer,
};

pub use ident::Error as IdentError;
