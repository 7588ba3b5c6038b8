use super::*;

#[test]
fn create_is_case_insensitive() {
    let f = Filter::create("Bilinear", 1.0).unwrap();
    assert_eq!(f.kind(), FilterKind::Bilinear);
    assert_eq!(Filter::create("LANCZOS3", 2.0).unwrap().radius(), 6.0);
}

#[test]
fn create_rejects_unknown_names_and_bad_widths() {
    assert!(matches!(
        Filter::create("sharpest", 1.0),
        Err(WarpError::Validation(_))
    ));
    assert!(Filter::create("box", 0.0).is_err());
    assert!(Filter::create("box", f64::NAN).is_err());
    assert!(Filter::create("box", -1.0).is_err());
}

#[test]
fn bilinear_at_pixel_centre_is_single_tap() {
    let f = Filter::new(FilterKind::Bilinear, 1.0).unwrap();
    let taps = f.weights(3.5);
    let nonzero: Vec<(i32, f32)> = taps
        .weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w > 0.0)
        .map(|(i, w)| (taps.first + i as i32, *w))
        .collect();
    assert_eq!(nonzero, vec![(3, 1.0)]);
}

#[test]
fn bilinear_between_centres_splits_evenly() {
    let f = Filter::new(FilterKind::Bilinear, 1.0).unwrap();
    let taps = f.weights(4.0);
    assert_eq!(taps.first, 3);
    assert_eq!(taps.weights.as_slice(), &[0.5, 0.5]);
}

#[test]
fn box_picks_the_pixel_containing_the_coordinate() {
    let f = Filter::new(FilterKind::Box, 1.0).unwrap();
    for c in [2.0, 2.25, 2.5, 2.99] {
        let taps = f.weights(c);
        let picked: Vec<i32> = taps
            .weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(i, _)| taps.first + i as i32)
            .collect();
        assert_eq!(picked, vec![2], "center {c}");
    }
}

#[test]
fn weights_are_normalized_for_every_kind() {
    for kind in FilterKind::ALL {
        for width in [0.5, 1.0, 2.5] {
            let f = Filter::new(kind, width).unwrap();
            for c in [-3.3, 0.0, 0.5, 7.77, 100.01] {
                let sum: f32 = f.weights(c).weights.iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "{kind:?} w={width} c={c} sum={sum}");
            }
        }
    }
}

#[test]
fn kernels_are_symmetric() {
    for kind in FilterKind::ALL {
        let f = Filter::new(kind, 1.0).unwrap();
        for x in [0.1, 0.4, 0.9, 1.3, 2.2] {
            assert!((f.weight(x) - f.weight(-x)).abs() < 1e-12 || kind == FilterKind::Box);
        }
    }
}

#[test]
fn support_rounds_radius_up() {
    assert_eq!(Filter::new(FilterKind::Box, 1.0).unwrap().support(), 1);
    assert_eq!(Filter::new(FilterKind::Gaussian, 1.0).unwrap().support(), 2);
    assert_eq!(Filter::new(FilterKind::Cubic, 1.5).unwrap().support(), 3);
}
