//! Panoramic unwrap: fills a longitude/latitude image from a fisheye input.
//!
//! Output pixels map to directions on the sphere, which are rotated and then projected
//! through an equidistant fisheye with optional polynomial distortion into input pixels.

use std::sync::Arc;

use nalgebra::{Matrix3, Vector3};

use crate::{
    cache::fingerprint::{Fingerprint, StableHasher},
    foundation::core::{Box2i, Format, Point, Vec2},
    foundation::error::{WarpError, WarpResult},
    foundation::math::{rotation_xyz_degrees, solve_quadratic},
    image::source::{AffectedOutputs, ImageOutput, ImageSource},
    nodes::{NodeParams, ParamState},
    warp::function::WarpFunction,
    warp::processor::{WarpProcessor, WarpVariant},
    warp::resample::ResampleSettings,
};

/// Radial distortion `pr + linear pr + quadratic pr^2 + cubic pr^3` applied to the projected
/// radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatLongDistortion {
    /// First-order term.
    pub linear: f64,
    /// Second-order term.
    pub quadratic: f64,
    /// Third-order term.
    pub cubic: f64,
}

/// Parameters of [`LatLong`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatLongParams {
    /// `false` passes the input through.
    pub enabled: bool,
    /// Output format; the longitude/latitude grid spans its display window.
    pub format: Format,
    /// Fisheye centre in input pixels.
    pub centre: Point,
    /// Fisheye radius in input pixels, per axis. The image circle is the ellipse with these
    /// semi-axes, so `(r, r)` is a circle of radius `r`.
    pub radius: Vec2,
    /// Field of view covered by the fisheye circle, degrees in `(0, 360]`.
    pub fov: f64,
    /// Camera rotation about X, Y then Z, degrees.
    pub rotation: [f64; 3],
    /// Radial distortion of the projection.
    pub distortion: LatLongDistortion,
    /// Clamp the distorted radius at the point where the distortion curve turns back.
    pub prevent_inversion: bool,
}

impl Default for LatLongParams {
    fn default() -> Self {
        Self {
            enabled: true,
            format: Format::default(),
            centre: Point::new(960.0, 540.0),
            radius: Vec2::new(540.0, 540.0),
            fov: 180.0,
            rotation: [0.0; 3],
            distortion: LatLongDistortion::default(),
            prevent_inversion: true,
        }
    }
}

impl NodeParams for LatLongParams {
    fn validate(&self) -> WarpResult<()> {
        self.format.validate()?;
        if !(self.fov > 0.0 && self.fov <= 360.0) {
            return Err(WarpError::validation(format!(
                "latlong fov must be in (0, 360], got {}",
                self.fov
            )));
        }
        let finite = [
            self.centre.x,
            self.centre.y,
            self.radius.x,
            self.radius.y,
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.distortion.linear,
            self.distortion.quadratic,
            self.distortion.cubic,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(WarpError::validation("latlong parameters must be finite"));
        }
        Ok(())
    }
}

/// Parameter identifiers of [`LatLong`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatLongParam {
    /// [`LatLongParams::enabled`].
    Enabled,
    /// [`LatLongParams::format`].
    Format,
    /// [`LatLongParams::centre`].
    Centre,
    /// [`LatLongParams::radius`].
    Radius,
    /// [`LatLongParams::fov`].
    Fov,
    /// [`LatLongParams::rotation`].
    Rotation,
    /// [`LatLongParams::distortion`].
    Distortion,
    /// [`LatLongParams::prevent_inversion`].
    PreventInversion,
}

/// Warp built from one [`LatLongParams`] snapshot.
#[derive(Clone, Debug)]
pub struct LatLongWarp {
    params: Arc<LatLongParams>,
    rotation: Matrix3<f64>,
    fov_rad: f64,
    turning_point: f64,
}

impl LatLongWarp {
    /// Precompute the rotation matrix and the distortion turning point.
    pub fn new(params: Arc<LatLongParams>) -> Self {
        let d = params.distortion;
        let mut turning_point = f64::INFINITY;
        if params.prevent_inversion {
            // Roots of d/dpr (pr + l pr + q pr^2 + c pr^3).
            let mut roots = [0.0; 2];
            let n = solve_quadratic(3.0 * d.cubic, 2.0 * d.quadratic, 1.0 + d.linear, &mut roots);
            for r in &roots[..n] {
                if *r > 0.0 && *r < turning_point {
                    turning_point = *r;
                }
            }
        }
        Self {
            rotation: rotation_xyz_degrees(params.rotation),
            fov_rad: params.fov.to_radians(),
            turning_point,
            params,
        }
    }

    /// Output format.
    pub fn format(&self) -> Format {
        self.params.format
    }

    /// Radius beyond which the distortion is clamped; infinite when it never turns back.
    pub fn turning_point(&self) -> f64 {
        self.turning_point
    }

    fn distort_radius(&self, pr: f64) -> f64 {
        let d = self.params.distortion;
        let pr = pr.min(self.turning_point);
        pr + d.linear * pr + d.quadratic * pr * pr + d.cubic * pr * pr * pr
    }
}

impl WarpFunction for LatLongWarp {
    /// `p` is in output pixels. Longitude spans `[-180, 180)` degrees across the display window
    /// and latitude `[-90, 90)` down it. At the poles of the projection `atan2` resolves to 0.
    fn warp_point(&self, p: Point) -> Point {
        let dw = self.params.format.display_window;
        let u = (p.x - f64::from(dw.min.x)) / f64::from(dw.width());
        let v = (p.y - f64::from(dw.min.y)) / f64::from(dw.height());
        let longitude = std::f64::consts::TAU * (u - 0.5);
        let latitude = std::f64::consts::PI * (v - 0.5);

        let r = latitude.cos();
        let dir = self.rotation
            * Vector3::new(r * longitude.sin(), latitude.sin(), r * longitude.cos());

        let theta = dir.y.atan2(dir.x);
        let phi = dir.z.clamp(-1.0, 1.0).acos();
        let pr = self.distort_radius(2.0 * phi / self.fov_rad);

        let c = self.params.centre;
        let radius = self.params.radius;
        Point::new(
            c.x + pr * theta.cos() * radius.x,
            c.y + pr * theta.sin() * radius.y,
        )
    }

    fn hash_params(&self, h: &mut StableHasher) {
        let p = &self.params;
        h.write_str("latlong");
        h.write(&p.format);
        h.write(&p.centre);
        h.write(&p.radius);
        h.write_f64(p.fov);
        for r in p.rotation {
            h.write_f64(r);
        }
        h.write_f64(p.distortion.linear);
        h.write_f64(p.distortion.quadratic);
        h.write_f64(p.distortion.cubic);
        h.write_bool(p.prevent_inversion);
    }
}

/// Panoramic unwrap variant. Its output format and data window come from its own `format`
/// parameter, not from the input.
#[derive(Debug)]
pub struct LatLong {
    params: ParamState<LatLongParams>,
}

impl LatLong {
    /// Variant with validated parameters.
    pub fn new(params: LatLongParams) -> WarpResult<Self> {
        Ok(Self {
            params: ParamState::new(params)?,
        })
    }

    /// Current parameter snapshot.
    pub fn params(&self) -> Arc<LatLongParams> {
        self.params.get()
    }

    /// Replace every parameter.
    pub fn set_params(&self, params: LatLongParams) -> WarpResult<()> {
        self.params.set(params)
    }

    /// Edit a copy of the parameters and publish it if it validates.
    pub fn update(&self, f: impl FnOnce(&mut LatLongParams)) -> WarpResult<()> {
        self.params.update(|p| {
            f(p);
            Ok(())
        })
    }

    /// Toggle the node.
    pub fn set_enabled(&self, enabled: bool) -> WarpResult<()> {
        self.update(|p| p.enabled = enabled)
    }
}

impl WarpVariant for LatLong {
    type Param = LatLongParam;
    type Warp = LatLongWarp;

    fn enabled(&self) -> bool {
        self.params.get().enabled
    }

    fn warp(&self, _input: &dyn ImageSource) -> WarpResult<Option<LatLongWarp>> {
        let params = self.params.get();
        Ok(params.enabled.then(|| LatLongWarp::new(params)))
    }

    fn warped_data_window(&self, warp: &LatLongWarp, _input: &dyn ImageSource) -> WarpResult<Box2i> {
        Ok(warp.format().display_window)
    }

    fn format(&self, warp: &LatLongWarp, _input: &dyn ImageSource) -> WarpResult<Format> {
        Ok(warp.format())
    }

    fn hash_format(&self, warp: &LatLongWarp, _input: &dyn ImageSource) -> WarpResult<Fingerprint> {
        Ok(Fingerprint::of(&warp.format()))
    }

    fn hash_data_window(
        &self,
        warp: &LatLongWarp,
        _input: &dyn ImageSource,
    ) -> WarpResult<Fingerprint> {
        let mut h = StableHasher::new();
        h.write_str("latlong.data_window");
        h.write(&warp.format());
        Ok(h.finish())
    }

    fn param_affects(&self, param: LatLongParam) -> AffectedOutputs {
        match param {
            LatLongParam::Enabled => AffectedOutputs::ALL,
            LatLongParam::Format => AffectedOutputs::of(&[
                ImageOutput::Format,
                ImageOutput::DataWindow,
                ImageOutput::ChannelData,
            ]),
            LatLongParam::Centre
            | LatLongParam::Radius
            | LatLongParam::Fov
            | LatLongParam::Rotation
            | LatLongParam::Distortion
            | LatLongParam::PreventInversion => AffectedOutputs::of(&[ImageOutput::ChannelData]),
        }
    }

    fn upstream_affects(&self, output: ImageOutput) -> AffectedOutputs {
        match output {
            ImageOutput::Format => AffectedOutputs::NONE,
            ImageOutput::DataWindow | ImageOutput::ChannelData => {
                AffectedOutputs::of(&[ImageOutput::ChannelData])
            }
            ImageOutput::ChannelNames => AffectedOutputs::of(&[ImageOutput::ChannelNames]),
        }
    }
}

/// Panoramic unwrap node reading from `input`.
pub fn lat_long(
    input: Arc<dyn ImageSource>,
    params: LatLongParams,
    settings: ResampleSettings,
) -> WarpResult<WarpProcessor<LatLong>> {
    WarpProcessor::with_settings(LatLong::new(params)?, input, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/lat_long.rs"]
mod tests;
