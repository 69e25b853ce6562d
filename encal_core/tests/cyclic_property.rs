use encal_core::cyclic;
use proptest::prelude::*;

proptest! {
    #[test]
    fn subtract_stays_in_the_half_open_band(a in 0i32..16384, b in 0i32..16384) {
        let d = cyclic::subtract(a, b, 16384);
        prop_assert!((-8192..8192).contains(&d));
    }

    #[test]
    fn modulo_stays_non_negative(a in -16384i32..=16384) {
        let m = cyclic::modulo(a, 16384);
        prop_assert!((0..16384).contains(&m));
    }

    #[test]
    fn average2_is_symmetric_and_in_range(a in 0i32..16384, b in 0i32..16384) {
        let m = cyclic::average2(a, b, 16384);
        prop_assert_eq!(m, cyclic::average2(b, a, 16384));
        prop_assert!((0..16384).contains(&m));
    }

    // Rotating a cluster of readings rotates its average, give or take the
    // one count lost to truncating division.
    #[test]
    fn average_rotates_with_its_data(
        reference in 0i32..16384,
        offsets in proptest::collection::vec(-2000i32..2000, 0..11),
        k in 0i32..16384,
    ) {
        let cyc = 16384;
        let wrap = |v: i32| v.rem_euclid(cyc) as u16;
        let data: Vec<u16> = std::iter::once(reference)
            .chain(offsets.iter().map(|o| reference + o))
            .map(wrap)
            .collect();
        let rotated: Vec<u16> = data.iter().map(|&v| wrap(i32::from(v) + k)).collect();

        let base = cyclic::average(&data, cyc);
        let shifted = cyclic::average(&rotated, cyc);
        let expected = (base + k) % cyc;
        let distance = cyclic::subtract(shifted, expected, cyc).abs();
        prop_assert!(distance <= 1, "shifted={} expected={}", shifted, expected);
    }
}

#[test]
fn average_rotation_is_exact_when_the_sum_divides_evenly() {
    let cyc = 16384;
    let data = [100u16, 102, 104, 106];
    assert_eq!(cyclic::average(&data, cyc), 103);
    for k in [0, 1, 4000, 16280, 16383] {
        let rotated: Vec<u16> = data
            .iter()
            .map(|&v| (i32::from(v) + k).rem_euclid(cyc) as u16)
            .collect();
        assert_eq!(cyclic::average(&rotated, cyc), (103 + k) % cyc);
    }
}
