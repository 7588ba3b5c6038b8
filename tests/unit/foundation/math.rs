use super::*;

#[test]
fn floor_and_ceil_saturate() {
    assert_eq!(floor_i32(-0.5), -1);
    assert_eq!(ceil_i32(-0.5), 0);
    assert_eq!(floor_i32(2.0), 2);
    assert_eq!(ceil_i32(2.0), 2);
    assert_eq!(floor_i32(f64::INFINITY), i32::MAX);
    assert_eq!(ceil_i32(f64::NEG_INFINITY), i32::MIN);
}

#[test]
fn quadratic_roots() {
    let mut r = [0.0; 2];
    // (x - 1)(x - 3)
    let n = solve_quadratic(1.0, -4.0, 3.0, &mut r);
    assert_eq!(n, 2);
    let (lo, hi) = (r[0].min(r[1]), r[0].max(r[1]));
    assert!((lo - 1.0).abs() < 1e-12);
    assert!((hi - 3.0).abs() < 1e-12);

    assert_eq!(solve_quadratic(1.0, 0.0, 1.0, &mut r), 0);
    assert_eq!(solve_quadratic(0.0, 2.0, -4.0, &mut r), 1);
    assert!((r[0] - 2.0).abs() < 1e-12);
    assert_eq!(solve_quadratic(0.0, 0.0, 1.0, &mut r), 0);
}

#[test]
fn zero_rotation_is_identity() {
    let m = rotation_xyz_degrees([0.0, 0.0, 0.0]);
    assert_eq!(m, Matrix3::identity());
}

#[test]
fn rotation_about_y_turns_forward_to_right() {
    let m = rotation_xyz_degrees([0.0, 90.0, 0.0]);
    let v = m * Vector3::new(0.0, 0.0, 1.0);
    assert!((v.x - 1.0).abs() < 1e-12);
    assert!(v.y.abs() < 1e-12);
    assert!(v.z.abs() < 1e-12);
}
