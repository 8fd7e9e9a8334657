//! Writing solved unknowns back into a copy of the grid.

use heatfill_core::SpaceError;
use heatfill_space::UnknownIndexMap;
use ndarray::{ArrayD, ArrayViewD, IxDyn};

/// Copy `grid` into a standard-layout array and overwrite every unknown
/// cell with its solved value. Fixed cells keep their input values.
pub fn scatter(
    grid: ArrayViewD<'_, f64>,
    map: &UnknownIndexMap,
    solution: &[f64],
) -> Result<ArrayD<f64>, SpaceError> {
    if grid.shape() != map.shape() {
        return Err(SpaceError::ShapeMismatch {
            expected: map.shape().to_vec(),
            actual: grid.shape().to_vec(),
        });
    }
    if solution.len() != map.unknown_count() {
        return Err(SpaceError::ShapeMismatch {
            expected: vec![map.unknown_count()],
            actual: vec![solution.len()],
        });
    }
    let mut flat: Vec<f64> = grid.iter().copied().collect();
    for (&cell, &value) in map.unknown_to_domain().iter().zip(solution) {
        flat[cell] = value;
    }
    ArrayD::from_shape_vec(IxDyn(map.shape()), flat).map_err(|_| SpaceError::ShapeMismatch {
        expected: map.shape().to_vec(),
        actual: grid.shape().to_vec(),
    })
}
