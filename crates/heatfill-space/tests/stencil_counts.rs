use heatfill_space::Stencil;
use proptest::prelude::*;

fn brute_force_count(ndim: usize, radius_sq: u32) -> usize {
    let side = 9usize; // [-4, 4] per axis
    let total = side.pow(ndim as u32);
    (0..total)
        .filter(|&flat| {
            let mut idx = flat;
            let mut len_sq = 0i64;
            for _ in 0..ndim {
                let c = (idx % side) as i64 - 4;
                idx /= side;
                len_sq += c * c;
            }
            len_sq > 0 && len_sq <= i64::from(radius_sq)
        })
        .count()
}

#[test]
fn axis_neighbours_only_at_radius_one() {
    for ndim in 1..=5 {
        let s = Stencil::new(ndim, 1).unwrap();
        assert_eq!(s.len(), 2 * ndim, "ndim {ndim}");
        for o in s.iter() {
            assert_eq!(o.iter().filter(|&&c| c != 0).count(), 1);
        }
    }
}

#[test]
fn full_unit_cube_when_radius_equals_dimension() {
    for ndim in 1..=3 {
        let s = Stencil::new(ndim, ndim as u32).unwrap();
        assert_eq!(s.len(), 3usize.pow(ndim as u32) - 1, "ndim {ndim}");
    }
}

#[test]
fn four_dimensions_radius_four_adds_distance_two_axes() {
    let s = Stencil::new(4, 4).unwrap();
    assert_eq!(s.len(), 3usize.pow(4) - 1 + 8);
}

#[test]
fn offsets_come_in_opposite_pairs_at_mirrored_positions() {
    let s = Stencil::new(3, 5).unwrap();
    let n = s.len();
    for i in 0..n {
        let mirrored: Vec<i32> = s.offset(n - 1 - i).iter().map(|c| -c).collect();
        assert_eq!(s.offset(i), mirrored.as_slice());
    }
}

proptest! {
    #[test]
    fn count_matches_brute_force(ndim in 1usize..=3, radius_sq in 0u32..=10) {
        let s = Stencil::new(ndim, radius_sq).unwrap();
        prop_assert_eq!(s.len(), brute_force_count(ndim, radius_sq));
        for i in 0..s.len() {
            let len_sq: i32 = s.offset(i).iter().map(|c| c * c).sum();
            prop_assert!((s.norm(i) - f64::from(len_sq).sqrt()).abs() < 1e-12);
        }
    }
}
