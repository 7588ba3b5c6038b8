//! Affine transform node.

use std::sync::Arc;

use crate::{
    cache::fingerprint::StableHasher,
    foundation::core::{Affine, Box2i, Point, Vec2, Vec2i},
    foundation::error::{WarpError, WarpResult},
    image::source::{AffectedOutputs, ImageOutput, ImageSource},
    nodes::{NodeParams, ParamState},
    warp::bounds::BoundsAccumulator,
    warp::function::WarpFunction,
    warp::processor::{WarpProcessor, WarpVariant},
    warp::resample::ResampleSettings,
};

/// Parameters of [`Transform`], composed as
/// `T(translate) * T(pivot) * R(rotate) * S(scale) * T(-pivot)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformParams {
    /// `false` passes the input through.
    pub enabled: bool,
    /// Offset in pixels.
    pub translate: Vec2,
    /// Rotation in degrees.
    pub rotate: f64,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Centre of rotation and scale, in pixels.
    pub pivot: Vec2,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            enabled: true,
            translate: Vec2::ZERO,
            rotate: 0.0,
            scale: Vec2::new(1.0, 1.0),
            pivot: Vec2::ZERO,
        }
    }
}

impl TransformParams {
    /// Forward matrix from input to output pixels.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translate)
            * Affine::translate(self.pivot)
            * Affine::rotate(self.rotate.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.pivot)
    }
}

impl NodeParams for TransformParams {
    fn validate(&self) -> WarpResult<()> {
        let a = self.to_affine();
        if !a.is_finite() {
            return Err(WarpError::validation("transform parameters must be finite"));
        }
        if a.determinant().abs() < 1e-12 {
            return Err(WarpError::validation("transform matrix is singular"));
        }
        Ok(())
    }
}

/// Parameter identifiers of [`Transform`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformParam {
    /// [`TransformParams::enabled`].
    Enabled,
    /// [`TransformParams::translate`].
    Translate,
    /// [`TransformParams::rotate`].
    Rotate,
    /// [`TransformParams::scale`].
    Scale,
    /// [`TransformParams::pivot`].
    Pivot,
}

/// Inverse-mapping warp of an affine transform.
#[derive(Clone, Copy, Debug)]
pub struct AffineWarp {
    forward: Affine,
    inverse: Affine,
}

impl AffineWarp {
    /// Warp that places the input at `forward`. `forward` must be invertible.
    pub fn new(forward: Affine) -> Self {
        Self {
            forward,
            inverse: forward.inverse(),
        }
    }

    /// Input-to-output matrix.
    pub fn forward(&self) -> Affine {
        self.forward
    }
}

fn corner_bounds(a: Affine, b: Box2i) -> Box2i {
    if b.is_empty() {
        return Box2i::EMPTY;
    }
    let (x0, y0) = (f64::from(b.min.x), f64::from(b.min.y));
    let (x1, y1) = (f64::from(b.max.x), f64::from(b.max.y));
    let mut acc = BoundsAccumulator::new();
    for p in [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x0, y1),
        Point::new(x1, y1),
    ] {
        acc.add(a * p);
    }
    acc.to_box()
}

impl WarpFunction for AffineWarp {
    fn warp_point(&self, p: Point) -> Point {
        self.inverse * p
    }

    /// Exact: an affine map sends a box to a parallelogram whose extremes are its corners.
    fn warp_box(&self, b: Box2i) -> Box2i {
        corner_bounds(self.inverse, b)
    }

    fn hash_params(&self, h: &mut StableHasher) {
        h.write_str("transform");
        for c in self.forward.as_coeffs() {
            h.write_f64(c);
        }
    }
}

/// Affine transform variant.
#[derive(Debug)]
pub struct Transform {
    params: ParamState<TransformParams>,
}

impl Transform {
    /// Variant with validated parameters.
    pub fn new(params: TransformParams) -> WarpResult<Self> {
        Ok(Self {
            params: ParamState::new(params)?,
        })
    }

    /// Current parameter snapshot.
    pub fn params(&self) -> Arc<TransformParams> {
        self.params.get()
    }

    /// Replace every parameter; singular matrices are rejected.
    pub fn set_params(&self, params: TransformParams) -> WarpResult<()> {
        self.params.set(params)
    }
}

impl WarpVariant for Transform {
    type Param = TransformParam;
    type Warp = AffineWarp;

    fn enabled(&self) -> bool {
        self.params.get().enabled
    }

    fn warp(&self, _input: &dyn ImageSource) -> WarpResult<Option<AffineWarp>> {
        let p = self.params.get();
        Ok(p.enabled.then(|| AffineWarp::new(p.to_affine())))
    }

    fn warped_data_window(&self, warp: &AffineWarp, input: &dyn ImageSource) -> WarpResult<Box2i> {
        let dw = input.data_window()?;
        if dw.is_empty() {
            return Ok(Box2i::EMPTY);
        }
        let edges = Box2i::new(dw.min, Vec2i::new(dw.max.x + 1, dw.max.y + 1));
        let out = corner_bounds(warp.forward, edges);
        // Back to inclusive pixel indices.
        Ok(Box2i::new(
            out.min,
            Vec2i::new(out.max.x - 1, out.max.y - 1),
        ))
    }

    fn param_affects(&self, param: TransformParam) -> AffectedOutputs {
        match param {
            TransformParam::Enabled => AffectedOutputs::ALL,
            TransformParam::Translate
            | TransformParam::Rotate
            | TransformParam::Scale
            | TransformParam::Pivot => {
                AffectedOutputs::of(&[ImageOutput::DataWindow, ImageOutput::ChannelData])
            }
        }
    }

    fn upstream_affects(&self, output: ImageOutput) -> AffectedOutputs {
        match output {
            ImageOutput::Format => AffectedOutputs::of(&[ImageOutput::Format]),
            ImageOutput::DataWindow => {
                AffectedOutputs::of(&[ImageOutput::DataWindow, ImageOutput::ChannelData])
            }
            ImageOutput::ChannelNames => AffectedOutputs::of(&[ImageOutput::ChannelNames]),
            ImageOutput::ChannelData => AffectedOutputs::of(&[ImageOutput::ChannelData]),
        }
    }
}

/// Affine transform node reading from `input`.
pub fn transform(
    input: Arc<dyn ImageSource>,
    params: TransformParams,
    settings: ResampleSettings,
) -> WarpResult<WarpProcessor<Transform>> {
    WarpProcessor::with_settings(Transform::new(params)?, input, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/nodes/transform.rs"]
mod tests;
