//! Invariant checks shared by the index-map and stencil test modules.

use crate::index::UnknownIndexMap;
use crate::stencil::Stencil;
use indexmap::IndexSet;

/// Assert that the map is a bijection between unknown cells and `0..K`,
/// numbered in row-major order.
pub fn assert_index_bijection(map: &UnknownIndexMap) {
    let k = map.unknown_count();
    let mut seen: IndexSet<usize> = IndexSet::with_capacity(k);
    for (flat, &idx) in map.domain_to_unknown().iter().enumerate() {
        if idx < 0 {
            continue;
        }
        let idx = idx as usize;
        assert!(idx < k, "index {idx} at cell {flat} out of range 0..{k}");
        assert!(seen.insert(idx), "index {idx} assigned twice");
        assert_eq!(map.unknown_to_flat(idx), flat, "round trip failed for {idx}");
        assert_eq!(map.flat_of(map.coord(idx)), Some(flat));
    }
    assert_eq!(seen.len(), k, "not every unknown index was assigned");
    // Insertion order equals cell order, so indices must appear ascending.
    assert!(seen.iter().copied().eq(0..k), "numbering is not row-major");
}

/// Assert stencil offsets are unique, non-zero, inside the radius,
/// lexicographically ascending and closed under negation.
pub fn assert_stencil_invariants(stencil: &Stencil) {
    let offsets: IndexSet<Vec<i32>> = stencil.iter().map(|o| o.to_vec()).collect();
    assert_eq!(offsets.len(), stencil.len(), "duplicate offsets");
    for (i, o) in offsets.iter().enumerate() {
        assert_eq!(o.len(), stencil.ndim());
        let len_sq: i64 = o.iter().map(|&c| i64::from(c) * i64::from(c)).sum();
        assert!(len_sq > 0, "zero offset present");
        assert!(len_sq <= i64::from(stencil.radius_sq()), "{o:?} outside radius");
        let negated: Vec<i32> = o.iter().map(|c| -c).collect();
        assert!(offsets.contains(&negated), "{o:?} has no opposite");
        if i > 0 {
            assert!(offsets[i - 1] < *o, "offsets not in lexicographic order");
        }
    }
}
