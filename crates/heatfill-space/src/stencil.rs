//! Neighbour offset stencils within a squared radius.

use heatfill_core::{Coord, SpaceError};
use smallvec::smallvec;

/// Ordered set of non-zero integer offsets `o` with `‖o‖² ≤ radius_sq`.
///
/// Offsets are produced by scanning the hypercube of half-width
/// `ceil(sqrt(radius_sq))` in lexicographic order (first axis slowest)
/// and keeping those inside the radius. The sequence is a pure function
/// of `(ndim, radius_sq)`; equation assembly merges contributions in
/// exactly this order.
///
/// # Examples
///
/// ```
/// use heatfill_space::Stencil;
///
/// let s = Stencil::new(2, 1).unwrap();
/// let offsets: Vec<Vec<i32>> = s.iter().map(|o| o.to_vec()).collect();
/// assert_eq!(offsets, vec![vec![-1, 0], vec![0, -1], vec![0, 1], vec![1, 0]]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Stencil {
    ndim: usize,
    radius_sq: u32,
    half_width: i32,
    offsets: Vec<Coord>,
    norms: Vec<f64>,
}

impl Stencil {
    /// Generate the stencil for `ndim` dimensions and squared radius
    /// `radius_sq`.
    ///
    /// A radius of zero yields an empty stencil.
    pub fn new(ndim: usize, radius_sq: u32) -> Result<Self, SpaceError> {
        if ndim == 0 {
            return Err(SpaceError::ZeroDimensional);
        }
        let half_width = ceil_sqrt(radius_sq) as i32;
        let limit = i64::from(radius_sq);

        let mut offsets = Vec::new();
        let mut norms = Vec::new();
        let mut cursor: Coord = smallvec![-half_width; ndim];
        loop {
            let len_sq: i64 = cursor.iter().map(|&c| i64::from(c) * i64::from(c)).sum();
            if len_sq > 0 && len_sq <= limit {
                norms.push((len_sq as f64).sqrt());
                offsets.push(cursor.clone());
            }
            if !advance(&mut cursor, half_width) {
                break;
            }
        }

        Ok(Self {
            ndim,
            radius_sq,
            half_width,
            offsets,
            norms,
        })
    }

    /// Number of offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// `true` when no offset lies within the radius.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Dimensionality of every offset.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Squared radius the stencil was generated for.
    pub fn radius_sq(&self) -> u32 {
        self.radius_sq
    }

    /// Half-width of the scanned hypercube, `ceil(sqrt(radius_sq))`.
    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    /// The `i`-th offset.
    pub fn offset(&self, i: usize) -> &[i32] {
        &self.offsets[i]
    }

    /// Euclidean length of the `i`-th offset.
    pub fn norm(&self, i: usize) -> f64 {
        self.norms[i]
    }

    /// Iterate offsets in stencil order.
    pub fn iter(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.offsets.iter().map(|o| o.as_slice())
    }
}

/// Smallest `h` with `h * h >= n`.
fn ceil_sqrt(n: u32) -> u32 {
    let n = u64::from(n);
    let mut h = (n as f64).sqrt() as u64;
    while h * h < n {
        h += 1;
    }
    while h > 0 && (h - 1) * (h - 1) >= n {
        h -= 1;
    }
    h as u32
}

/// Odometer increment over `[-h, h]^d`, last axis fastest.
/// Returns `false` once every position has been visited.
fn advance(cursor: &mut [i32], h: i32) -> bool {
    for c in cursor.iter_mut().rev() {
        if *c < h {
            *c += 1;
            return true;
        }
        *c = -h;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;

    #[test]
    fn ceil_sqrt_is_exact() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(2), 2);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(9), 3);
        assert_eq!(ceil_sqrt(u32::MAX), 65536);
    }

    #[test]
    fn one_dimensional_radius_one() {
        let s = Stencil::new(1, 1).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.offset(0), &[-1]);
        assert_eq!(s.offset(1), &[1]);
        assert_eq!(s.norm(0), 1.0);
    }

    #[test]
    fn two_dimensional_radius_two_adds_diagonals() {
        let s = Stencil::new(2, 2).unwrap();
        assert_eq!(s.len(), 8);
        assert_eq!(s.half_width(), 2);
        assert_eq!(s.offset(0), &[-1, -1]);
        assert_eq!(s.offset(7), &[1, 1]);
        assert!((s.norm(0) - 2f64.sqrt()).abs() < 1e-15);
        compliance::assert_stencil_invariants(&s);
    }

    #[test]
    fn two_dimensional_radius_four_reaches_distance_two() {
        let s = Stencil::new(2, 4).unwrap();
        // 3x3 block minus centre, plus the four axis offsets at distance 2.
        assert_eq!(s.len(), 12);
        assert!(s.iter().any(|o| o == [0, 2]));
        assert!(!s.iter().any(|o| o == [1, 2]));
        compliance::assert_stencil_invariants(&s);
    }

    #[test]
    fn zero_radius_is_empty() {
        let s = Stencil::new(3, 0).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.half_width(), 0);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(Stencil::new(0, 1).unwrap_err(), SpaceError::ZeroDimensional);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(Stencil::new(3, 3).unwrap(), Stencil::new(3, 3).unwrap());
    }
}
