//! Lens distortion and undistortion through a pluggable [`LensModel`].

use std::sync::Arc;

use crate::{
    cache::fingerprint::StableHasher,
    foundation::core::{Box2i, Point, Vec2i},
    foundation::error::WarpResult,
    image::source::{AffectedOutputs, ImageOutput, ImageSource},
    lens::model::{LensModel, create},
    lens::params::{Direction, ParamValue},
    nodes::{NodeParams, ParamState},
    warp::function::WarpFunction,
    warp::processor::{WarpProcessor, WarpVariant},
    warp::resample::ResampleSettings,
};

/// Parameters of [`LensDistort`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LensDistortParams {
    /// `false` passes the input through.
    pub enabled: bool,
    /// `distort` applies the lens to an ideal image; `undistort` removes it.
    pub mode: Direction,
    /// Active model and its coefficients.
    pub lens: LensModel,
}

impl Default for LensDistortParams {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Direction::Distort,
            lens: LensModel::default(),
        }
    }
}

impl NodeParams for LensDistortParams {
    fn validate(&self) -> WarpResult<()> {
        self.lens.validate()
    }
}

/// Parameter identifiers of [`LensDistort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LensDistortParam {
    /// [`LensDistortParams::enabled`].
    Enabled,
    /// [`LensDistortParams::mode`].
    Mode,
    /// The model selector.
    Model,
    /// Any coefficient of the active model.
    Coefficient,
}

/// Pixel-space lens mapping for one format.
#[derive(Clone, Copy, Debug)]
pub struct LensWarp {
    lens: LensModel,
    direction: Direction,
    origin: Vec2i,
    width: u32,
    height: u32,
    centre: Point,
    scale: f64,
}

impl LensWarp {
    /// `direction` is the mapping applied to output points; `display_window` defines the
    /// normalization.
    pub fn new(lens: LensModel, direction: Direction, display_window: Box2i) -> Self {
        let (width, height) = (display_window.width(), display_window.height());
        let (w, h) = (f64::from(width), f64::from(height));
        Self {
            lens,
            direction,
            origin: display_window.min,
            width,
            height,
            centre: Point::new(
                f64::from(display_window.min.x) + w * 0.5,
                f64::from(display_window.min.y) + h * 0.5,
            ),
            scale: w.hypot(h) * 0.5,
        }
    }

    /// Bounds of `b` under `direction`, in absolute pixel-edge coordinates.
    pub fn bounds(&self, direction: Direction, b: Box2i) -> Box2i {
        self.lens
            .bounds(
                direction,
                b.translated(-self.origin.x, -self.origin.y),
                self.width,
                self.height,
            )
            .translated(self.origin.x, self.origin.y)
    }
}

impl WarpFunction for LensWarp {
    fn warp_point(&self, p: Point) -> Point {
        let n = Point::new(
            (p.x - self.centre.x) / self.scale,
            (p.y - self.centre.y) / self.scale,
        );
        let q = self.lens.map(self.direction, n);
        Point::new(
            q.x * self.scale + self.centre.x,
            q.y * self.scale + self.centre.y,
        )
    }

    fn warp_box(&self, b: Box2i) -> Box2i {
        self.bounds(self.direction, b)
    }

    fn hash_params(&self, h: &mut StableHasher) {
        h.write_str("lens_distort");
        self.lens.hash(h);
        h.write_bool(self.direction == Direction::Distort);
        h.write(&self.origin);
        h.write_u32(self.width);
        h.write_u32(self.height);
    }
}

/// Lens distortion variant. Format passes through; the data window is the input data window
/// mapped through the lens.
#[derive(Debug)]
pub struct LensDistort {
    params: ParamState<LensDistortParams>,
}

impl LensDistort {
    /// Variant with validated parameters.
    pub fn new(params: LensDistortParams) -> WarpResult<Self> {
        Ok(Self {
            params: ParamState::new(params)?,
        })
    }

    /// Current parameter snapshot.
    pub fn params(&self) -> Arc<LensDistortParams> {
        self.params.get()
    }

    /// Replace every parameter.
    pub fn set_params(&self, params: LensDistortParams) -> WarpResult<()> {
        self.params.set(params)
    }

    /// Switch to model `id`, discarding the old coefficients in favour of the new model's
    /// defaults.
    #[tracing::instrument(skip(self))]
    pub fn set_model(&self, id: i32) -> WarpResult<()> {
        let lens = create(id)?;
        self.params.update(|p| {
            p.lens = lens;
            Ok(())
        })?;
        tracing::debug!(model = lens.name(), "lens model rebuilt with defaults");
        Ok(())
    }

    /// Set one coefficient of the active model. Out-of-range values are rejected and leave
    /// the parameters unchanged.
    pub fn set_coefficient(&self, name: &str, value: ParamValue) -> WarpResult<()> {
        self.params.update(|p| p.lens.set(name, value))
    }

    /// Choose between distorting and undistorting.
    pub fn set_mode(&self, mode: Direction) -> WarpResult<()> {
        self.params.update(|p| {
            p.mode = mode;
            Ok(())
        })
    }

    /// Toggle the node.
    pub fn set_enabled(&self, enabled: bool) -> WarpResult<()> {
        self.params.update(|p| {
            p.enabled = enabled;
            Ok(())
        })
    }
}

fn is_active(p: &LensDistortParams) -> bool {
    p.enabled && !p.lens.is_identity()
}

impl WarpVariant for LensDistort {
    type Param = LensDistortParam;
    type Warp = LensWarp;

    /// Disabled when switched off or when the active model is the identity.
    fn enabled(&self) -> bool {
        is_active(&self.params.get())
    }

    fn warp(&self, input: &dyn ImageSource) -> WarpResult<Option<LensWarp>> {
        let p = self.params.get();
        if !is_active(&p) {
            return Ok(None);
        }
        let format = input.format()?;
        // Distorting reads the undistorted input, and vice versa.
        Ok(Some(LensWarp::new(
            p.lens,
            p.mode.inverse(),
            format.display_window,
        )))
    }

    fn warped_data_window(&self, warp: &LensWarp, input: &dyn ImageSource) -> WarpResult<Box2i> {
        let dw = input.data_window()?;
        if dw.is_empty() {
            return Ok(Box2i::EMPTY);
        }
        let edges = Box2i::new(dw.min, Vec2i::new(dw.max.x + 1, dw.max.y + 1));
        Ok(warp.bounds(warp.direction.inverse(), edges))
    }

    fn param_affects(&self, param: LensDistortParam) -> AffectedOutputs {
        match param {
            LensDistortParam::Enabled => AffectedOutputs::ALL,
            LensDistortParam::Mode | LensDistortParam::Model | LensDistortParam::Coefficient => {
                AffectedOutputs::of(&[ImageOutput::DataWindow, ImageOutput::ChannelData])
            }
        }
    }
}

/// Lens distortion node reading from `input`.
pub fn lens_distort(
    input: Arc<dyn ImageSource>,
    params: LensDistortParams,
    settings: ResampleSettings,
) -> WarpResult<WarpProcessor<LensDistort>> {
    WarpProcessor::with_settings(LensDistort::new(params)?, input, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/lens_distort.rs"]
mod tests;
