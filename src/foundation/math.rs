use nalgebra::{Matrix3, Rotation3, Vector3};

/// Floor to `i32`, saturating at the integer range. NaN maps to 0.
#[inline]
pub(crate) fn floor_i32(v: f64) -> i32 {
    v.floor() as i32
}

/// Ceil to `i32`, saturating at the integer range. NaN maps to 0.
#[inline]
pub(crate) fn ceil_i32(v: f64) -> i32 {
    v.ceil() as i32
}

/// Real roots of `a*x^2 + b*x + c = 0`, degrading to the linear case when `a == 0`.
///
/// Returns the number of roots written into `roots`.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64, roots: &mut [f64; 2]) -> usize {
    const EPS: f64 = 1e-12;
    if a.abs() < EPS {
        if b.abs() < EPS {
            return 0;
        }
        roots[0] = -c / b;
        return 1;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return 0;
    }
    if disc == 0.0 {
        roots[0] = -b / (2.0 * a);
        return 1;
    }
    // Numerically stable form.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    roots[0] = q / a;
    roots[1] = if q != 0.0 { c / q } else { -b / a - roots[0] };
    2
}

/// Rotation matrix applying X, then Y, then Z rotations (angles in degrees).
pub(crate) fn rotation_xyz_degrees(rotation: [f64; 3]) -> Matrix3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation[0].to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation[1].to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), rotation[2].to_radians());
    (rz * ry * rx).into_inner()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
