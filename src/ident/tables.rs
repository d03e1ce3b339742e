//! Shared classification tables: element metal/nonmetal assignment, bridging
//! species, bond cutoff overrides, and the net signature reference.
//!
//! Defaults are embedded from `resources/` and parsed once; custom TOML
//! overrides replace the whole table for one pipeline invocation. Tables are
//! read-only after loading, so they can be shared across parallel workers.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use std::sync::OnceLock;

use super::error::Error;
use crate::model::types::Element;

const DEFAULT_CHEM_TOML: &str = include_str!("../../resources/default.chem.toml");
const DEFAULT_NETS_TOML: &str = include_str!("../../resources/default.nets.toml");

static DEFAULT_CHEM: OnceLock<ChemTable> = OnceLock::new();
static DEFAULT_NETS: OnceLock<NetTable> = OnceLock::new();

/// Element counts of a small species, used to match bridging formulas.
pub type Composition = BTreeMap<Element, usize>;

#[derive(Debug, Clone, Deserialize)]
struct RawChemTable {
    classification: RawClassification,
    #[serde(default)]
    bridging: RawBridging,
    #[serde(default)]
    cutoffs: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawClassification {
    nonmetals: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBridging {
    #[serde(default)]
    attach_elements: Vec<String>,
    #[serde(default = "default_true")]
    single_atoms: bool,
    #[serde(default)]
    formulas: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RawBridging {
    fn default() -> Self {
        Self {
            attach_elements: Vec::new(),
            single_atoms: true,
            formulas: Vec::new(),
        }
    }
}

/// Element classification used by the graph builder and the partitioner.
#[derive(Debug, Clone)]
pub struct ChemTable {
    nonmetals: HashSet<Element>,
    attach_elements: HashSet<Element>,
    bridging_single_atoms: bool,
    bridging_formulas: Vec<Composition>,
    cutoffs: HashMap<(Element, Element), f64>,
}

impl ChemTable {
    /// Every element not in the nonmetal set is a metal.
    #[inline]
    pub fn is_metal(&self, element: Element) -> bool {
        !self.nonmetals.contains(&element)
    }

    /// Nonmetal elements pulled onto the node side when bonded to a metal.
    #[inline]
    pub fn is_attach_element(&self, element: Element) -> bool {
        self.attach_elements.contains(&element)
    }

    /// Whether a detached species of this composition counts as node
    /// material when coordinated to a metal.
    pub fn is_bridging(&self, composition: &Composition) -> bool {
        if self.bridging_single_atoms
            && composition.values().sum::<usize>() == 1
        {
            return true;
        }
        self.bridging_formulas.iter().any(|f| f == composition)
    }

    /// Per-pair cutoff override, if configured. Symmetric in its arguments.
    pub fn cutoff_override(&self, a: Element, b: Element) -> Option<f64> {
        self.cutoffs.get(&pair_key(a, b)).copied()
    }

    /// Largest configured cutoff override, used to bound the image search.
    pub fn max_cutoff_override(&self) -> Option<f64> {
        self.cutoffs.values().copied().fold(None, |acc, v| {
            Some(acc.map_or(v, |a: f64| a.max(v)))
        })
    }

    fn from_raw(raw: RawChemTable) -> Result<Self, Error> {
        let nonmetals = parse_elements(&raw.classification.nonmetals)?;
        let attach_elements = parse_elements(&raw.bridging.attach_elements)?;

        let bridging_formulas = raw
            .bridging
            .formulas
            .iter()
            .map(|f| parse_formula(f))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cutoffs = HashMap::new();
        for (key, value) in &raw.cutoffs {
            let (a, b) = parse_pair_key(key)?;
            if *value <= 0.0 {
                return Err(Error::table_invalid(format!(
                    "cutoff for '{}' must be positive, got {}",
                    key, value
                )));
            }
            cutoffs.insert(pair_key(a, b), *value);
        }

        Ok(Self {
            nonmetals,
            attach_elements,
            bridging_single_atoms: raw.bridging.single_atoms,
            bridging_formulas,
            cutoffs,
        })
    }
}

fn pair_key(a: Element, b: Element) -> (Element, Element) {
    if a <= b { (a, b) } else { (b, a) }
}

fn parse_elements(symbols: &[String]) -> Result<HashSet<Element>, Error> {
    symbols
        .iter()
        .map(|s| {
            Element::from_str(s)
                .map_err(|e| Error::table_invalid(e.to_string()))
        })
        .collect()
}

fn parse_pair_key(key: &str) -> Result<(Element, Element), Error> {
    let mut parts = key.splitn(2, '-');
    let (Some(a), Some(b)) = (parts.next(), parts.next()) else {
        return Err(Error::table_invalid(format!(
            "cutoff key '{}' is not of the form 'El1-El2'",
            key
        )));
    };
    let a = Element::from_str(a.trim()).map_err(|e| Error::table_invalid(e.to_string()))?;
    let b = Element::from_str(b.trim()).map_err(|e| Error::table_invalid(e.to_string()))?;
    Ok((a, b))
}

/// Parses a plain molecular formula like `"H2O"` into element counts.
fn parse_formula(formula: &str) -> Result<Composition, Error> {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = Composition::new();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_uppercase() {
            return Err(Error::table_invalid(format!(
                "invalid formula '{}'",
                formula
            )));
        }
        let mut symbol = String::from(chars[i]);
        i += 1;
        if i < chars.len() && chars[i].is_ascii_lowercase() {
            symbol.push(chars[i]);
            i += 1;
        }

        let mut count = 0usize;
        while i < chars.len() && chars[i].is_ascii_digit() {
            count = count * 10 + chars[i].to_digit(10).unwrap() as usize;
            i += 1;
        }
        let count = if count == 0 { 1 } else { count };

        let element = Element::from_str(&symbol)
            .map_err(|e| Error::table_invalid(e.to_string()))?;
        *out.entry(element).or_insert(0) += count;
    }

    if out.is_empty() {
        return Err(Error::table_invalid(format!(
            "empty formula '{}'",
            formula
        )));
    }
    Ok(out)
}

#[derive(Debug, Clone, Deserialize)]
struct RawNetTable {
    #[serde(default)]
    nets: Vec<RawNetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawNetEntry {
    signature: String,
    label: String,
}

/// Read-only mapping from net signature to topology label.
#[derive(Debug, Clone)]
pub struct NetTable {
    entries: HashMap<String, String>,
}

impl NetTable {
    pub fn lookup(&self, signature: &str) -> Option<&str> {
        self.entries.get(signature).map(String::as_str)
    }

    fn from_raw(raw: RawNetTable) -> Self {
        Self {
            entries: raw
                .nets
                .into_iter()
                .map(|e| (e.signature, e.label))
                .collect(),
        }
    }
}

pub fn load_chem(custom_toml: Option<&str>) -> Result<ChemTable, Error> {
    match custom_toml {
        Some(toml) => ChemTable::from_raw(toml::from_str(toml)?),
        None => Ok(default_chem().clone()),
    }
}

pub fn load_nets(custom_toml: Option<&str>) -> Result<NetTable, Error> {
    match custom_toml {
        Some(toml) => Ok(NetTable::from_raw(toml::from_str(toml)?)),
        None => Ok(default_nets().clone()),
    }
}

pub fn default_chem() -> &'static ChemTable {
    DEFAULT_CHEM.get_or_init(|| {
        let raw = toml::from_str(DEFAULT_CHEM_TOML)
            .expect("Failed to parse embedded default chem table. This is a library bug.");
        ChemTable::from_raw(raw)
            .expect("Embedded default chem table is invalid. This is a library bug.")
    })
}

pub fn default_nets() -> &'static NetTable {
    DEFAULT_NETS.get_or_init(|| {
        NetTable::from_raw(
            toml::from_str(DEFAULT_NETS_TOML)
                .expect("Failed to parse embedded default nets table. This is a library bug."),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chem_classifies_common_elements() {
        let chem = default_chem();
        assert!(chem.is_metal(Element::Zn));
        assert!(chem.is_metal(Element::Cu));
        assert!(chem.is_metal(Element::Zr));
        assert!(chem.is_metal(Element::Na));
        assert!(!chem.is_metal(Element::C));
        assert!(!chem.is_metal(Element::O));
        assert!(!chem.is_metal(Element::H));
        assert!(!chem.is_metal(Element::Te));
    }

    #[test]
    fn default_chem_bridging_rules() {
        let chem = default_chem();
        assert!(chem.is_attach_element(Element::O));
        assert!(!chem.is_attach_element(Element::N));

        assert!(chem.is_bridging(&parse_formula("Cl").unwrap()));
        assert!(chem.is_bridging(&parse_formula("OH").unwrap()));
        assert!(chem.is_bridging(&parse_formula("H2O").unwrap()));
        assert!(chem.is_bridging(&parse_formula("O3").unwrap()));
        assert!(!chem.is_bridging(&parse_formula("C6H6").unwrap()));
    }

    #[test]
    fn custom_chem_table_parses() {
        let custom = r#"
            [classification]
            nonmetals = ["H", "C", "O"]

            [bridging]
            attach_elements = ["O", "N"]
            single_atoms = false
            formulas = ["OH"]

            [cutoffs]
            "Zn-O" = 2.6
        "#;
        let chem = load_chem(Some(custom)).unwrap();
        assert!(chem.is_metal(Element::N));
        assert!(!chem.is_metal(Element::C));
        assert!(chem.is_attach_element(Element::N));
        assert!(!chem.is_bridging(&parse_formula("Cl").unwrap()));
        assert_eq!(chem.cutoff_override(Element::O, Element::Zn), Some(2.6));
        assert_eq!(chem.cutoff_override(Element::Zn, Element::O), Some(2.6));
        assert_eq!(chem.max_cutoff_override(), Some(2.6));
    }

    #[test]
    fn errors_on_invalid_chem_toml() {
        assert!(load_chem(Some("not valid [[[toml")).is_err());
    }

    #[test]
    fn errors_on_unknown_element_symbol() {
        let custom = r#"
            [classification]
            nonmetals = ["Xx"]
        "#;
        let result = load_chem(Some(custom));
        assert!(matches!(result, Err(Error::TableInvalid(_))));
    }

    #[test]
    fn errors_on_nonpositive_cutoff() {
        let custom = r#"
            [classification]
            nonmetals = ["H"]

            [cutoffs]
            "Zn-O" = 0.0
        "#;
        assert!(matches!(load_chem(Some(custom)), Err(Error::TableInvalid(_))));
    }

    #[test]
    fn formula_parser_counts_atoms() {
        let water = parse_formula("H2O").unwrap();
        assert_eq!(water.get(&Element::H), Some(&2));
        assert_eq!(water.get(&Element::O), Some(&1));

        let acetate = parse_formula("C2H3O2").unwrap();
        assert_eq!(acetate.get(&Element::C), Some(&2));
        assert_eq!(acetate.get(&Element::O), Some(&2));

        assert!(parse_formula("h2o").is_err());
        assert!(parse_formula("").is_err());
    }

    #[test]
    fn default_nets_resolve_known_signatures() {
        let nets = default_nets();
        assert_eq!(nets.lookup("3;v=1;deg=[6]"), Some("pcu"));
        assert_eq!(nets.lookup("3;v=2;deg=[4,4]"), Some("dia"));
        assert_eq!(nets.lookup("9;v=9;deg=[9]"), None);
    }

    #[test]
    fn custom_net_table_overrides_defaults() {
        let custom = r#"
            [[nets]]
            signature = "3;v=1;deg=[6]"
            label = "alpha-Po"
        "#;
        let nets = load_nets(Some(custom)).unwrap();
        assert_eq!(nets.lookup("3;v=1;deg=[6]"), Some("alpha-Po"));
        assert_eq!(nets.lookup("3;v=2;deg=[4,4]"), None);
    }
}
