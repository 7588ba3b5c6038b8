//! Lens-model registry.
//!
//! Every model is radially symmetric in a normalized space whose origin is the display-window
//! centre and whose unit is half the display-window diagonal.

use crate::{
    cache::fingerprint::StableHasher,
    foundation::core::{Box2i, Point, Rect},
    foundation::error::{WarpError, WarpResult},
    lens::{
        fisheye::FisheyeCoefficients,
        params::{Direction, ParamDesc, ParamValue},
        poly3::Poly3Coefficients,
        standard::StandardCoefficients,
    },
    warp::bounds::{BoundsAccumulator, radial_critical_points},
};

/// Coefficients must keep the radial mapping strictly increasing out to this radius.
const MONOTONIC_RADIUS: f64 = 1.5;
const MONOTONIC_STEPS: u32 = 64;
const NEWTON_TOLERANCE: f64 = 1e-12;
const EDGE_STEPS: u32 = 32;

/// A radially symmetric coefficient set: `r -> radial(r)` maps undistorted to distorted radii.
pub(crate) trait RadialProfile {
    fn params(&self) -> &'static [ParamDesc];
    fn get(&self, name: &str) -> Option<f64>;
    /// Store `v` into `name`; `false` when no such coefficient exists.
    fn set(&mut self, name: &str, v: f64) -> bool;
    fn radial(&self, r: f64) -> f64;
    fn radial_derivative(&self, r: f64) -> f64;
    fn is_identity(&self) -> bool;
    fn max_iterations(&self) -> u32 {
        20
    }
}

/// Registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ModelInfo {
    /// Identifier accepted by [`create`].
    pub id: i32,
    /// Serialized model name.
    pub name: &'static str,
}

const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: 0,
        name: "standard",
    },
    ModelInfo {
        id: 1,
        name: "poly3",
    },
    ModelInfo {
        id: 2,
        name: "fisheye",
    },
];

/// Available lens models, ordered by identifier.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}

/// A model with every coefficient at its declared default.
pub fn create(id: i32) -> WarpResult<LensModel> {
    match id {
        0 => Ok(LensModel::Standard(StandardCoefficients::default())),
        1 => Ok(LensModel::Poly3(Poly3Coefficients::default())),
        2 => Ok(LensModel::Fisheye(FisheyeCoefficients::default())),
        _ => Err(WarpError::validation(format!("unknown lens model id {id}"))),
    }
}

/// A lens model together with its coefficients.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum LensModel {
    /// Brown-Conrady radial polynomial.
    Standard(StandardCoefficients),
    /// Single-coefficient cubic.
    Poly3(Poly3Coefficients),
    /// Equidistant fisheye.
    Fisheye(FisheyeCoefficients),
}

impl Default for LensModel {
    fn default() -> Self {
        LensModel::Standard(StandardCoefficients::default())
    }
}

impl LensModel {
    fn profile(&self) -> &dyn RadialProfile {
        match self {
            LensModel::Standard(c) => c,
            LensModel::Poly3(c) => c,
            LensModel::Fisheye(c) => c,
        }
    }

    fn profile_mut(&mut self) -> &mut dyn RadialProfile {
        match self {
            LensModel::Standard(c) => c,
            LensModel::Poly3(c) => c,
            LensModel::Fisheye(c) => c,
        }
    }

    /// Registry identifier.
    pub fn id(&self) -> i32 {
        match self {
            LensModel::Standard(_) => 0,
            LensModel::Poly3(_) => 1,
            LensModel::Fisheye(_) => 2,
        }
    }

    /// Registry name.
    pub fn name(&self) -> &'static str {
        MODELS[self.id() as usize].name
    }

    /// Ordered coefficient declarations.
    pub fn parameters(&self) -> &'static [ParamDesc] {
        self.profile().params()
    }

    fn desc(&self, name: &str) -> WarpResult<&'static ParamDesc> {
        self.parameters()
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| {
                WarpError::validation(format!(
                    "lens model '{}' has no parameter '{name}'",
                    self.name()
                ))
            })
    }

    /// Current value of a coefficient.
    pub fn get(&self, name: &str) -> WarpResult<ParamValue> {
        let desc = self.desc(name)?;
        let v = self.profile().get(name).ok_or_else(|| {
            WarpError::evaluation(format!("lens parameter '{name}' is declared but not stored"))
        })?;
        Ok(desc.value(v))
    }

    /// Set one coefficient. On error the model is unchanged.
    pub fn set(&mut self, name: &str, value: ParamValue) -> WarpResult<()> {
        let v = self.desc(name)?.check(value)?;
        let mut next = *self;
        next.profile_mut().set(name, v);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Check every coefficient against its range and reject coefficient sets whose radial
    /// mapping folds back on itself within the working radius.
    pub fn validate(&self) -> WarpResult<()> {
        let profile = self.profile();
        for desc in profile.params() {
            let v = profile.get(desc.name).ok_or_else(|| {
                WarpError::evaluation(format!(
                    "lens parameter '{}' is declared but not stored",
                    desc.name
                ))
            })?;
            desc.check(ParamValue::Float(v))?;
        }
        for i in 0..=MONOTONIC_STEPS {
            let r = MONOTONIC_RADIUS * f64::from(i) / f64::from(MONOTONIC_STEPS);
            let d = profile.radial_derivative(r);
            if d.is_nan() || d <= 0.0 {
                return Err(WarpError::validation(format!(
                    "lens model '{}' coefficients fold the image at radius {r:.3}",
                    self.name()
                )));
            }
        }
        Ok(())
    }

    /// Return `true` when both directions are the identity.
    pub fn is_identity(&self) -> bool {
        self.profile().is_identity()
    }

    /// Map a normalized undistorted point to its distorted position.
    pub fn distort(&self, p: Point) -> Point {
        let r = p.x.hypot(p.y);
        if r == 0.0 {
            return p;
        }
        let s = self.profile().radial(r) / r;
        Point::new(p.x * s, p.y * s)
    }

    /// Map a normalized distorted point back to its undistorted position.
    ///
    /// Inverts the radial mapping with Newton's method over the radii where coefficients are
    /// validated to be monotonic, `[0, 1.5]`. A distorted radius at or beyond the image of that
    /// range has no invertible preimage; it maps to the limiting radius 1.5 along the same ray.
    pub fn undistort(&self, p: Point) -> Point {
        let rd = p.x.hypot(p.y);
        if rd == 0.0 || self.is_identity() {
            return p;
        }
        let r = invert_radial(self.profile(), rd);
        let s = r / rd;
        Point::new(p.x * s, p.y * s)
    }

    /// [`LensModel::distort`] or [`LensModel::undistort`].
    pub fn map(&self, direction: Direction, p: Point) -> Point {
        match direction {
            Direction::Distort => self.distort(p),
            Direction::Undistort => self.undistort(p),
        }
    }

    /// Pixel box containing the image of `b` under `direction`.
    ///
    /// `b` is in pixel-edge coordinates relative to the display-window origin of a
    /// `width x height` format. The mapping is evaluated at the radial critical points of the
    /// box and along each edge, and the result is padded by one pixel.
    pub fn bounds(&self, direction: Direction, b: Box2i, width: u32, height: u32) -> Box2i {
        if b.is_empty() || width == 0 || height == 0 {
            return Box2i::EMPTY;
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let centre = Point::new(w * 0.5, h * 0.5);
        let scale = w.hypot(h) * 0.5;
        let to_norm = |x: f64, y: f64| Point::new((x - centre.x) / scale, (y - centre.y) / scale);

        let r = Rect::from_points(
            to_norm(f64::from(b.min.x), f64::from(b.min.y)),
            to_norm(f64::from(b.max.x), f64::from(b.max.y)),
        );
        let mut acc = BoundsAccumulator::new();
        let mut add = |p: Point| {
            let q = self.map(direction, p);
            acc.add(Point::new(q.x * scale + centre.x, q.y * scale + centre.y));
        };
        for p in radial_critical_points(r, Point::ZERO) {
            add(p);
        }
        for i in 1..EDGE_STEPS {
            let t = f64::from(i) / f64::from(EDGE_STEPS);
            let x = r.x0 + (r.x1 - r.x0) * t;
            let y = r.y0 + (r.y1 - r.y0) * t;
            add(Point::new(x, r.y0));
            add(Point::new(x, r.y1));
            add(Point::new(r.x0, y));
            add(Point::new(r.x1, y));
        }
        acc.to_box().expanded(1)
    }

    /// Append the model identifier and every coefficient.
    pub fn hash(&self, h: &mut StableHasher) {
        h.write_str("lens");
        h.write_i32(self.id());
        let profile = self.profile();
        for desc in profile.params() {
            h.write_str(desc.name);
            h.write_f64(profile.get(desc.name).unwrap_or(f64::NAN));
        }
    }
}

fn invert_radial(profile: &dyn RadialProfile, rd: f64) -> f64 {
    let limit = profile.radial(MONOTONIC_RADIUS);
    if rd.partial_cmp(&limit) != Some(std::cmp::Ordering::Less) {
        return MONOTONIC_RADIUS;
    }
    let mut r = rd.min(MONOTONIC_RADIUS);
    for _ in 0..profile.max_iterations() {
        let f = profile.radial(r) - rd;
        if f.abs() < NEWTON_TOLERANCE {
            break;
        }
        let d = profile.radial_derivative(r);
        let next = r - f / d;
        if !next.is_finite() {
            break;
        }
        r = next.clamp(0.0, MONOTONIC_RADIUS);
    }
    r
}

#[cfg(test)]
#[path = "../../tests/unit/lens/model.rs"]
mod tests;
