//! Bounding-box inference for warped regions.

use smallvec::SmallVec;

use crate::foundation::core::{Box2i, Point, Rect, Vec2i};
use crate::foundation::math::{ceil_i32, floor_i32};

/// Running float bounding box of warped points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsAccumulator {
    min: Point,
    max: Point,
    count: usize,
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsAccumulator {
    /// Nothing accumulated yet.
    pub fn new() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            count: 0,
        }
    }

    /// Include `p`. Non-finite points are skipped.
    pub fn add(&mut self, p: Point) {
        if !p.x.is_finite() || !p.y.is_finite() {
            return;
        }
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.count += 1;
    }

    /// Number of points included.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Return `true` when no finite point has been added.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Exact float bounds, `None` when empty.
    pub fn rect(&self) -> Option<Rect> {
        (!self.is_empty()).then(|| Rect::from_points(self.min, self.max))
    }

    /// Integer box from floor of the minimum and ceiling of the maximum.
    pub fn to_box(&self) -> Box2i {
        if self.is_empty() {
            return Box2i::EMPTY;
        }
        Box2i::new(
            Vec2i::new(floor_i32(self.min.x), floor_i32(self.min.y)),
            Vec2i::new(ceil_i32(self.max.x), ceil_i32(self.max.y)),
        )
    }
}

/// Call `f` with every integer position on the boundary of `b`: each column of the top and
/// bottom edges and each row of the left and right edges, corners included. Nothing is visited
/// for an empty box.
pub fn for_each_boundary_point(b: Box2i, mut f: impl FnMut(Point)) {
    if b.is_empty() {
        return;
    }
    let (x0, x1, y0, y1) = (b.min.x, b.max.x, b.min.y, b.max.y);
    for x in x0..=x1 {
        f(Point::new(f64::from(x), f64::from(y0)));
        if y1 != y0 {
            f(Point::new(f64::from(x), f64::from(y1)));
        }
    }
    if y1 - y0 > 1 {
        for y in (y0 + 1)..y1 {
            f(Point::new(f64::from(x0), f64::from(y)));
            if x1 != x0 {
                f(Point::new(f64::from(x1), f64::from(y)));
            }
        }
    }
}

/// Accumulate the warped boundary of `b`.
pub fn accumulate_boundary(b: Box2i, warp: impl Fn(Point) -> Point) -> BoundsAccumulator {
    let mut acc = BoundsAccumulator::new();
    for_each_boundary_point(b, |p| acc.add(warp(p)));
    acc
}

/// Default box warp: bounds of the warped boundary samples of `b`.
///
/// Exact for warps that are monotonic along each axis. A warp with an interior extremum can map
/// interior points outside the result; this is a known limitation of boundary sampling.
pub fn sample_boundary(b: Box2i, warp: impl Fn(Point) -> Point) -> Box2i {
    let acc = accumulate_boundary(b, warp);
    let out = acc.to_box();
    if out.is_empty() && !b.is_empty() {
        tracing::trace!(?b, "box warp produced no finite boundary point");
    }
    out
}

/// Points where a radially symmetric mapping about `centre` can attain its extremes over `r`:
/// the four corners, the point of each edge nearest to `centre`, and `centre` itself when it
/// lies inside.
pub fn radial_critical_points(r: Rect, centre: Point) -> SmallVec<[Point; 9]> {
    let cx = centre.x.clamp(r.x0, r.x1);
    let cy = centre.y.clamp(r.y0, r.y1);
    let mut pts: SmallVec<[Point; 9]> = SmallVec::new();
    pts.extend([
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x0, r.y1),
        Point::new(r.x1, r.y1),
        Point::new(cx, r.y0),
        Point::new(cx, r.y1),
        Point::new(r.x0, cy),
        Point::new(r.x1, cy),
    ]);
    if r.contains(centre) {
        pts.push(centre);
    }
    pts
}

/// Bounds of a radial mapping over `r`, evaluated at [`radial_critical_points`].
pub fn radial_bounds(r: Rect, centre: Point, map: impl Fn(Point) -> Point) -> BoundsAccumulator {
    let mut acc = BoundsAccumulator::new();
    for p in radial_critical_points(r, centre) {
        acc.add(map(p));
    }
    acc
}

#[cfg(test)]
#[path = "../../tests/unit/warp/bounds.rs"]
mod tests;
