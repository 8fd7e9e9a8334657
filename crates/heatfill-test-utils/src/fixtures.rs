//! Reusable grid fixtures with known solutions.
//!
//! - [`parabola_line`]: 1-D Poisson problem with unit source, zero ends.
//! - [`ramp_line`]: 1-D Laplace problem between 0 and 1.
//! - [`strip_2d`]: a 2-D grid fixed everywhere except interior lines
//!   along one axis, reducing to the 1-D parabola.

use ndarray::{ArrayD, ArrayViewD, Dimension, IxDyn};

/// A grid and its fixed mask.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub grid: ArrayD<f64>,
    pub fixed: ArrayD<bool>,
}

/// Closed-form solution of [`parabola_line`]: `4.5²/2 − (i − 4.5)²/2`
/// for a line of ten cells, generalized to `n` cells.
pub fn parabola(i: usize, n: usize) -> f64 {
    let mid = (n as f64 - 1.0) / 2.0;
    let d = i as f64 - mid;
    0.5 * mid * mid - 0.5 * d * d
}

/// `n` cells, ends fixed at 0, interior unknown and seeded with 1.0.
pub fn parabola_line(n: usize) -> Fixture {
    let mut grid = ArrayD::zeros(IxDyn(&[n]));
    let mut fixed = ArrayD::from_elem(IxDyn(&[n]), false);
    for i in 1..n.saturating_sub(1) {
        grid[[i]] = 1.0;
    }
    if n > 0 {
        fixed[[0]] = true;
        fixed[[n - 1]] = true;
    }
    Fixture { grid, fixed }
}

/// `n` cells, ends fixed at 0 and 1, interior unknown and zero.
pub fn ramp_line(n: usize) -> Fixture {
    let mut grid = ArrayD::zeros(IxDyn(&[n]));
    let mut fixed = ArrayD::from_elem(IxDyn(&[n]), false);
    if n > 0 {
        grid[[n - 1]] = 1.0;
        fixed[[0]] = true;
        fixed[[n - 1]] = true;
    }
    Fixture { grid, fixed }
}

/// `n × n` grid, all fixed at 0 except positions `1..n-1` along `axis`
/// (every position along the other axis), which are unknown and seeded
/// with 1.0.
pub fn strip_2d(n: usize, axis: usize) -> Fixture {
    let mut grid = ArrayD::zeros(IxDyn(&[n, n]));
    let mut fixed = ArrayD::from_elem(IxDyn(&[n, n]), true);
    for i in 1..n.saturating_sub(1) {
        for j in 0..n {
            let ix = if axis == 0 { [i, j] } else { [j, i] };
            grid[ix] = 1.0;
            fixed[ix] = false;
        }
    }
    Fixture { grid, fixed }
}

/// Panic with the first position where `actual` and `expected` differ by
/// more than `tol`.
pub fn assert_close(actual: ArrayViewD<'_, f64>, expected: ArrayViewD<'_, f64>, tol: f64) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for ((ix, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!(
            (a - e).abs() <= tol,
            "mismatch at {:?}: got {a}, expected {e} (tol {tol})",
            ix.slice()
        );
    }
}
