use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

use super::types::CellShift;

const MIN_CELL_VOLUME: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("degenerate unit cell (volume {volume:.3e} Å³)")]
pub struct DegenerateCellError {
    pub volume: f64,
}

/// Periodic unit cell defined by three lattice vectors.
///
/// Construction rejects degenerate cells (zero or near-zero volume), so a
/// `UnitCell` held by a [`Structure`](super::structure::Structure) is always
/// invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl UnitCell {
    /// Builds a cell from three lattice vectors given as rows `[a, b, c]`,
    /// each in Å.
    pub fn from_vectors(vectors: [[f64; 3]; 3]) -> Result<Self, DegenerateCellError> {
        let matrix = Matrix3::from_columns(&[
            Vector3::from(vectors[0]),
            Vector3::from(vectors[1]),
            Vector3::from(vectors[2]),
        ]);
        Self::from_matrix(matrix)
    }

    /// Builds a cell from the six crystallographic parameters: lengths in Å,
    /// angles in degrees. Uses the standard orientation with `a` along x and
    /// `b` in the xy plane.
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, DegenerateCellError> {
        let (cos_a, cos_b, cos_g) = (
            alpha.to_radians().cos(),
            beta.to_radians().cos(),
            gamma.to_radians().cos(),
        );
        let sin_g = gamma.to_radians().sin();

        if sin_g.abs() < f64::EPSILON {
            return Err(DegenerateCellError { volume: 0.0 });
        }

        let cx = c * cos_b;
        let cy = c * (cos_a - cos_b * cos_g) / sin_g;
        let cz_sq = c * c - cx * cx - cy * cy;
        if cz_sq <= 0.0 {
            return Err(DegenerateCellError { volume: 0.0 });
        }

        Self::from_vectors([
            [a, 0.0, 0.0],
            [b * cos_g, b * sin_g, 0.0],
            [cx, cy, cz_sq.sqrt()],
        ])
    }

    fn from_matrix(matrix: Matrix3<f64>) -> Result<Self, DegenerateCellError> {
        let volume = matrix.determinant().abs();
        if !volume.is_finite() || volume < MIN_CELL_VOLUME {
            return Err(DegenerateCellError { volume });
        }
        let inverse = matrix
            .try_inverse()
            .ok_or(DegenerateCellError { volume })?;
        Ok(Self { matrix, inverse })
    }

    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    /// The lattice vectors as rows `[a, b, c]`.
    pub fn vectors(&self) -> [[f64; 3]; 3] {
        let (a, b, c) = self.columns();
        [[a.x, a.y, a.z], [b.x, b.y, b.z], [c.x, c.y, c.z]]
    }

    /// Cell parameters `(a, b, c, α, β, γ)` with lengths in Å and angles in
    /// degrees.
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let (a, b, c) = self.columns();
        let angle = |u: &Vector3<f64>, v: &Vector3<f64>| {
            (u.dot(v) / (u.norm() * v.norm())).clamp(-1.0, 1.0).acos().to_degrees()
        };
        (
            a.norm(),
            b.norm(),
            c.norm(),
            angle(&b, &c),
            angle(&c, &a),
            angle(&a, &b),
        )
    }

    pub fn to_cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let v = self.matrix * Vector3::from(frac);
        [v.x, v.y, v.z]
    }

    pub fn to_fractional(&self, cart: [f64; 3]) -> [f64; 3] {
        let v = self.inverse * Vector3::from(cart);
        [v.x, v.y, v.z]
    }

    /// Cartesian displacement produced by an integer image shift.
    pub fn shift_vector(&self, shift: CellShift) -> [f64; 3] {
        self.to_cartesian([
            shift.0[0] as f64,
            shift.0[1] as f64,
            shift.0[2] as f64,
        ])
    }

    /// Wraps a Cartesian position back into the [0, 1)³ fractional cell.
    pub fn wrap(&self, cart: [f64; 3]) -> [f64; 3] {
        let f = self.to_fractional(cart);
        self.to_cartesian([
            f[0].rem_euclid(1.0),
            f[1].rem_euclid(1.0),
            f[2].rem_euclid(1.0),
        ])
    }

    /// Perpendicular width of the cell along each lattice direction. Bounds
    /// how many periodic images must be searched for a given cutoff radius.
    pub fn perpendicular_widths(&self) -> [f64; 3] {
        let (a, b, c) = self.columns();
        let volume = self.volume();
        [
            volume / b.cross(&c).norm(),
            volume / c.cross(&a).norm(),
            volume / a.cross(&b).norm(),
        ]
    }

    fn columns(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            self.matrix.column(0).into_owned(),
            self.matrix.column(1).into_owned(),
            self.matrix.column(2).into_owned(),
        )
    }
}
