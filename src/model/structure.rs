use super::atom::Atom;
use super::cell::UnitCell;
use super::types::{BondOrder, CellShift};

/// A bond supplied by the caller, bypassing distance-based perception.
///
/// The image shift states which periodic copy of atom `j` the bond reaches;
/// when `None`, the pipeline resolves it to the minimum-image offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitBond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    pub shift: Option<CellShift>,
}

impl ExplicitBond {
    pub fn new(i: usize, j: usize, order: BondOrder) -> Self {
        Self {
            i,
            j,
            order,
            shift: None,
        }
    }

    pub fn with_shift(i: usize, j: usize, order: BondOrder, shift: CellShift) -> Self {
        Self {
            i,
            j,
            order,
            shift: Some(shift),
        }
    }
}

/// A periodic crystal structure: atoms, unit cell, and an optional explicit
/// bond list. Input to the identification pipeline; never mutated by it.
#[derive(Debug, Clone)]
pub struct Structure {
    pub name: Option<String>,
    pub atoms: Vec<Atom>,
    pub cell: UnitCell,
    pub bonds: Option<Vec<ExplicitBond>>,
}

impl Structure {
    pub fn new(cell: UnitCell) -> Self {
        Self {
            name: None,
            atoms: Vec::new(),
            cell,
            bonds: None,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn has_explicit_bonds(&self) -> bool {
        self.bonds.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    #[test]
    fn structure_starts_empty() {
        let cell =
            UnitCell::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
                .unwrap();
        let s = Structure::new(cell);
        assert_eq!(s.atom_count(), 0);
        assert!(!s.has_explicit_bonds());
        assert!(s.name.is_none());
    }

    #[test]
    fn explicit_bond_constructors() {
        let plain = ExplicitBond::new(0, 1, BondOrder::Single);
        assert!(plain.shift.is_none());

        let shifted = ExplicitBond::with_shift(0, 1, BondOrder::Double, CellShift::new(1, 0, 0));
        assert_eq!(shifted.shift, Some(CellShift::new(1, 0, 0)));
        assert_eq!(shifted.order, BondOrder::Double);
    }

    #[test]
    fn structure_with_bonds() {
        let cell =
            UnitCell::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
                .unwrap();
        let mut s = Structure::new(cell);
        s.atoms.push(Atom::new(Element::Cu, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::O, [2.0, 0.0, 0.0]));
        s.bonds = Some(vec![ExplicitBond::new(0, 1, BondOrder::Single)]);
        assert!(s.has_explicit_bonds());
        assert_eq!(s.atom_count(), 2);
    }
}
