//! Configuration for the identification pipeline.
//!
//! All shared tables are passed in explicitly, so independent structures can
//! be processed in parallel without any process-wide state.

/// Main configuration for [`identify`](super::identify).
///
/// # Examples
///
/// ```
/// use mofid::{IdentConfig, BondingPolicy, CappingRule};
///
/// // Default configuration (covalent radii + 0.45 Å tolerance, hydrogen caps)
/// let default = IdentConfig::default();
///
/// // Looser bonding, open valences at the cut points
/// let custom = IdentConfig {
///     bonding: BondingPolicy { tolerance: 0.6, ..Default::default() },
///     capping: CappingRule::Bare,
///     ..Default::default()
/// };
/// # let _ = (default, custom);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentConfig {
    /// Custom element classification table in TOML format.
    ///
    /// If `None`, uses the embedded `default.chem.toml` (InChI metal
    /// definition, oxygen attachment, OH/H2O/O3 bridging species).
    pub chem: Option<String>,

    /// Custom net signature table in TOML format.
    ///
    /// If `None`, uses the embedded `default.nets.toml`.
    pub nets: Option<String>,

    /// Distance-based bond perception settings.
    pub bonding: BondingPolicy,

    /// How cut bonds are terminated before canonicalization.
    pub capping: CappingRule,
}

/// Settings for distance-based bond perception.
#[derive(Debug, Clone, PartialEq)]
pub struct BondingPolicy {
    /// Added to the covalent radius sum of each pair, Å. Distances at or
    /// above the resulting cutoff never bond.
    pub tolerance: f64,

    /// Pairs closer than this are reported as overlapping and never bonded, Å.
    pub min_distance: f64,
}

impl Default for BondingPolicy {
    fn default() -> Self {
        Self {
            tolerance: 0.45,
            min_distance: 0.40,
        }
    }
}

/// Termination of cut bonds when a fragment is isolated for
/// canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CappingRule {
    /// One explicit hydrogen per attachment point.
    #[default]
    Hydrogen,
    /// Leave the valence open, for canonicalizers that accept radicals.
    Bare,
}
