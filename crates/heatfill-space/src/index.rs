//! Mapping between dense grid positions and compacted unknown indices.

use heatfill_core::SpaceError;
use ndarray::{ArrayViewD, Dimension};

/// Largest number of unknown cells a single solve can address.
///
/// Unknown indices are stored as `i32` (with `-1` marking fixed cells),
/// so the count must stay below `2^31`.
pub const MAX_UNKNOWNS: usize = i32::MAX as usize;

/// Reject unknown counts that do not fit the 31-bit index space.
pub fn check_capacity(unknowns: usize) -> Result<(), SpaceError> {
    if unknowns > MAX_UNKNOWNS {
        return Err(SpaceError::CapacityExceeded {
            unknowns,
            max: MAX_UNKNOWNS,
        });
    }
    Ok(())
}

/// Row-major (C order) element strides for `shape`.
pub fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Bidirectional map between grid cells and unknown-variable indices.
///
/// Unknown cells (mask `false`) are numbered `0..K` in row-major
/// enumeration order, so identical masks always yield identical
/// numbering. Fixed cells map to `-1`.
///
/// # Examples
///
/// ```
/// use heatfill_space::UnknownIndexMap;
/// use ndarray::{arr1, ArrayD};
///
/// let mask: ArrayD<bool> = arr1(&[true, false, false, true]).into_dyn();
/// let map = UnknownIndexMap::build(mask.view()).unwrap();
/// assert_eq!(map.unknown_count(), 2);
/// assert_eq!(map.domain_to_unknown(), &[-1, 0, 1, -1]);
/// assert_eq!(map.unknown_to_domain(), &[1, 2]);
/// ```
#[derive(Clone, Debug)]
pub struct UnknownIndexMap {
    shape: Vec<usize>,
    strides: Vec<usize>,
    domain_to_unknown: Vec<i32>,
    unknown_to_domain: Vec<usize>,
    coords: Vec<i32>,
}

impl UnknownIndexMap {
    /// Build the map from a fixed mask (`true` = fixed).
    ///
    /// The unknown count is checked against [`MAX_UNKNOWNS`] before any
    /// map storage is allocated.
    pub fn build(mask: ArrayViewD<'_, bool>) -> Result<Self, SpaceError> {
        let ndim = mask.ndim();
        if ndim == 0 {
            return Err(SpaceError::ZeroDimensional);
        }
        let shape = mask.shape().to_vec();
        if let Some((axis, &len)) = shape
            .iter()
            .enumerate()
            .find(|(_, len)| **len > i32::MAX as usize)
        {
            return Err(SpaceError::DimensionTooLarge { axis, len });
        }

        let unknowns = mask.iter().filter(|&&fixed| !fixed).count();
        check_capacity(unknowns)?;

        let strides = row_major_strides(&shape);
        let mut domain_to_unknown = Vec::with_capacity(mask.len());
        let mut unknown_to_domain = Vec::with_capacity(unknowns);
        let mut coords = Vec::with_capacity(unknowns * ndim);
        let mut next: i32 = 0;

        // indexed_iter walks the logical row-major order regardless of
        // the view's memory layout, so `flat` matches `strides`.
        for (flat, (index, &fixed)) in mask.indexed_iter().enumerate() {
            if fixed {
                domain_to_unknown.push(-1);
                continue;
            }
            domain_to_unknown.push(next);
            next += 1;
            unknown_to_domain.push(flat);
            coords.extend(index.slice().iter().map(|&i| i as i32));
        }

        Ok(Self {
            shape,
            strides,
            domain_to_unknown,
            unknown_to_domain,
            coords,
        })
    }

    /// Number of unknown cells `K`.
    pub fn unknown_count(&self) -> usize {
        self.unknown_to_domain.len()
    }

    /// Total number of grid cells.
    pub fn cell_count(&self) -> usize {
        self.domain_to_unknown.len()
    }

    /// Grid shape the map was built for.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of grid dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Row-major strides of the grid.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Dense view of the map: `-1` at fixed cells, unknown index otherwise.
    pub fn domain_to_unknown(&self) -> &[i32] {
        &self.domain_to_unknown
    }

    /// Row-major flat position of every unknown, in unknown-index order.
    pub fn unknown_to_domain(&self) -> &[usize] {
        &self.unknown_to_domain
    }

    /// Unknown index of the cell at row-major position `flat`.
    ///
    /// Returns `None` for fixed cells and out-of-range positions.
    pub fn index_of(&self, flat: usize) -> Option<u32> {
        self.domain_to_unknown
            .get(flat)
            .and_then(|&i| u32::try_from(i).ok())
    }

    /// Row-major flat position of unknown `unknown`.
    ///
    /// # Panics
    ///
    /// Panics if `unknown >= unknown_count()`.
    pub fn unknown_to_flat(&self, unknown: usize) -> usize {
        self.unknown_to_domain[unknown]
    }

    /// Grid coordinate of unknown `unknown`.
    ///
    /// # Panics
    ///
    /// Panics if `unknown >= unknown_count()`.
    pub fn coord(&self, unknown: usize) -> &[i32] {
        let ndim = self.ndim();
        &self.coords[unknown * ndim..(unknown + 1) * ndim]
    }

    /// Row-major flat position of `coord`, or `None` if it lies outside
    /// the grid or has the wrong dimensionality.
    pub fn flat_of(&self, coord: &[i32]) -> Option<usize> {
        if coord.len() != self.ndim() {
            return None;
        }
        let mut flat = 0usize;
        for ((&c, &len), &stride) in coord.iter().zip(&self.shape).zip(&self.strides) {
            if c < 0 || c as usize >= len {
                return None;
            }
            flat += c as usize * stride;
        }
        Some(flat)
    }

    /// Row-major flat position of the cell at `coord(unknown) + offset`,
    /// or `None` if that cell lies outside the grid.
    pub fn neighbour_flat(&self, unknown: usize, offset: &[i32]) -> Option<usize> {
        debug_assert_eq!(offset.len(), self.ndim());
        let mut flat = 0usize;
        for (axis, &o) in offset.iter().enumerate() {
            let c = i64::from(self.coords[unknown * self.ndim() + axis]) + i64::from(o);
            if c < 0 || c >= self.shape[axis] as i64 {
                return None;
            }
            flat += c as usize * self.strides[axis];
        }
        Some(flat)
    }
}
