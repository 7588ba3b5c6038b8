//! Tilewarp warps images tile by tile inside a pull-based compositing graph.
//!
//! Every node exposes its outputs (format, data window, channel names and 64x64 channel tiles)
//! through [`ImageSource`], together with content hashes that stand in for the data when
//! caching. A [`WarpProcessor`] turns any [`WarpVariant`] into such a node:
//!
//! - the variant supplies a [`WarpFunction`] that maps output positions back into the input
//! - the processor infers the input region a tile needs and resamples it with a [`Filter`]
//! - hashes are derived from the variant parameters and the upstream hashes alone
//!
//! Three variants ship with the crate: [`LatLong`] (fisheye to equirectangular),
//! [`LensDistort`] (parametric lens models) and [`Transform`] (affine).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod filter;
mod foundation;
mod image;
mod lens;
mod nodes;
mod sample;
mod warp;

pub use crate::foundation::core::{
    Affine, Box2i, Format, Point, Rect, TILE_PIXELS, TILE_SIZE, Vec2, Vec2i, tile_bound,
    tile_origin, tiles_in,
};
pub use crate::foundation::error::{WarpError, WarpResult};

pub use crate::cache::fingerprint::{Fingerprint, StableHash, StableHasher};
pub use crate::cache::tile_cache::{CacheStats, CachedImage, TileCache};
pub use crate::filter::kernel::{Filter, FilterKind, Taps};
pub use crate::image::memory::MemoryImage;
pub use crate::image::render::{RenderThreading, render_channel, render_image};
pub use crate::image::source::{
    AffectedOutputs, ImageNode, ImageOutput, ImageSource, NodeInput, TileData,
};
pub use crate::sample::sampler::{BoundingMode, Sampler, SamplerWindow};
pub use crate::warp::bounds::{
    BoundsAccumulator, accumulate_boundary, for_each_boundary_point, radial_bounds,
    radial_critical_points, sample_boundary,
};
pub use crate::warp::function::WarpFunction;
pub use crate::warp::processor::{WarpParam, WarpProcessor, WarpVariant};
pub use crate::warp::resample::{
    ResampleSettings, compute_channel_tile, hash_channel_tile, tile_edge_box, tile_sample_window,
};

pub use crate::lens::fisheye::FisheyeCoefficients;
pub use crate::lens::model::{LensModel, ModelInfo, create as create_lens_model, list_models};
pub use crate::lens::params::{Direction, ParamDesc, ParamKind, ParamValue};
pub use crate::lens::poly3::Poly3Coefficients;
pub use crate::lens::standard::StandardCoefficients;

pub use crate::nodes::NodeParams;
pub use crate::nodes::lat_long::{
    LatLong, LatLongDistortion, LatLongParam, LatLongParams, LatLongWarp, lat_long,
};
pub use crate::nodes::lens_distort::{
    LensDistort, LensDistortParam, LensDistortParams, LensWarp, lens_distort,
};
pub use crate::nodes::transform::{
    AffineWarp, Transform, TransformParam, TransformParams, transform,
};
