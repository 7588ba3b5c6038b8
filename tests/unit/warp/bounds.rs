use super::*;

#[test]
fn accumulator_skips_non_finite_points() {
    let mut acc = BoundsAccumulator::new();
    acc.add(Point::new(f64::NAN, 1.0));
    acc.add(Point::new(1.0, f64::INFINITY));
    assert!(acc.is_empty());
    assert_eq!(acc.to_box(), Box2i::EMPTY);
    acc.add(Point::new(1.25, -2.5));
    acc.add(Point::new(3.0, 4.75));
    assert_eq!(acc.count(), 2);
    assert_eq!(
        acc.to_box(),
        Box2i::new(Vec2i::new(1, -3), Vec2i::new(3, 5))
    );
}

#[test]
fn boundary_visits_each_position_once() {
    let b = Box2i::new(Vec2i::new(0, 0), Vec2i::new(3, 2));
    let mut pts = Vec::new();
    for_each_boundary_point(b, |p| pts.push((p.x as i32, p.y as i32)));
    let mut sorted = pts.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), pts.len());
    // Perimeter of a 4x3 grid of positions.
    assert_eq!(pts.len(), 10);
}

#[test]
fn single_point_and_single_row_boxes() {
    let mut n = 0;
    for_each_boundary_point(Box2i::new(Vec2i::new(5, 5), Vec2i::new(5, 5)), |_| n += 1);
    assert_eq!(n, 1);
    n = 0;
    for_each_boundary_point(Box2i::new(Vec2i::new(0, 5), Vec2i::new(4, 5)), |_| n += 1);
    assert_eq!(n, 5);
    n = 0;
    for_each_boundary_point(Box2i::EMPTY, |_| n += 1);
    assert_eq!(n, 0);
}

#[test]
fn single_point_box_stays_a_point() {
    let b = Box2i::new(Vec2i::new(7, -2), Vec2i::new(7, -2));
    let acc = accumulate_boundary(b, |p| Point::new(p.x * 0.5 + 0.3, p.y * 2.0));
    let r = acc.rect().unwrap();
    assert_eq!(r.x0, r.x1);
    assert_eq!(r.y0, r.y1);
    let out = sample_boundary(b, |p| Point::new(p.x + 3.0, p.y - 1.0));
    assert_eq!(out, Box2i::new(Vec2i::new(10, -3), Vec2i::new(10, -3)));
}

#[test]
fn empty_box_warps_to_empty() {
    assert!(sample_boundary(Box2i::EMPTY, |p| p).is_empty());
}

#[test]
fn radial_points_include_centre_when_inside() {
    let r = Rect::new(-1.0, -1.0, 1.0, 1.0);
    let pts = radial_critical_points(r, Point::ZERO);
    assert_eq!(pts.len(), 9);
    assert!(pts.contains(&Point::new(0.0, -1.0)));
    assert!(pts.contains(&Point::ZERO));

    let off = radial_critical_points(Rect::new(2.0, 2.0, 3.0, 3.0), Point::ZERO);
    assert_eq!(off.len(), 8);
    assert!(off.contains(&Point::new(2.0, 2.0)));
}

#[test]
fn radial_bounds_capture_barrel_bulge() {
    // Barrel-like mapping: edge midpoints move outward more than corners.
    let map = |p: Point| {
        let r2 = p.x * p.x + p.y * p.y;
        let s = 1.0 + 0.5 * (1.0 - r2 / 2.0);
        Point::new(p.x * s, p.y * s)
    };
    let r = Rect::new(-1.0, -1.0, 1.0, 1.0);
    let rb = radial_bounds(r, Point::ZERO, map).rect().unwrap();
    assert!((rb.x1 - 1.25).abs() < 1e-12);
    assert!((rb.y0 + 1.25).abs() < 1e-12);
}
