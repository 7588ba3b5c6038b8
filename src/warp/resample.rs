//! Per-tile warped resampling.

use crate::{
    cache::fingerprint::{Fingerprint, StableHasher},
    filter::kernel::{Filter, FilterKind},
    foundation::core::{Box2i, Point, TILE_PIXELS, TILE_SIZE, Vec2i},
    foundation::error::WarpResult,
    image::source::{ImageSource, TileData},
    sample::sampler::{BoundingMode, SamplerWindow},
    warp::function::WarpFunction,
};

/// How warped coordinates are reconstructed from the input.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleSettings {
    /// Reconstruction filter; `None` reads the nearest pixel.
    pub filter: Option<FilterKind>,
    /// Filter support multiplier.
    pub filter_width: f64,
    /// Treatment of reads outside the input.
    pub bounding_mode: BoundingMode,
}

impl Default for ResampleSettings {
    fn default() -> Self {
        Self {
            filter: Some(FilterKind::Bilinear),
            filter_width: 1.0,
            bounding_mode: BoundingMode::Black,
        }
    }
}

impl ResampleSettings {
    /// Reject unusable filter widths.
    pub fn validate(&self) -> WarpResult<()> {
        self.filter().map(|_| ())
    }

    /// Build the configured filter.
    pub fn filter(&self) -> WarpResult<Option<Filter>> {
        self.filter
            .map(|kind| Filter::new(kind, self.filter_width))
            .transpose()
    }
}

/// Output-space box of the tile at `tile_origin`, in pixel-edge coordinates.
///
/// The far edge is `origin + TILE_SIZE` so that every pixel centre of the tile lies inside.
pub fn tile_edge_box(tile_origin: Vec2i) -> Box2i {
    Box2i::new(
        tile_origin,
        Vec2i::new(tile_origin.x + TILE_SIZE, tile_origin.y + TILE_SIZE),
    )
}

/// Input window a tile reads: the warped tile box grown by the filter's support.
pub fn tile_sample_window<W: WarpFunction + ?Sized>(
    warp: &W,
    input_data_window: Box2i,
    tile_origin: Vec2i,
    settings: &ResampleSettings,
) -> WarpResult<SamplerWindow> {
    let filter = settings.filter()?;
    let warped = warp.warp_box(tile_edge_box(tile_origin));
    if warped.is_empty() {
        tracing::trace!(?tile_origin, "warped tile box is empty");
    }
    let support = filter.map_or(0, |f| f.support());
    Ok(SamplerWindow::new(
        warped.expanded(support),
        input_data_window,
        filter,
        settings.bounding_mode,
    ))
}

/// Resample one output tile of `channel` through `warp`.
///
/// Always returns exactly `TILE_SIZE * TILE_SIZE` samples; a tile whose sample window reads
/// nothing is all zeros.
pub fn compute_channel_tile<W: WarpFunction + ?Sized>(
    warp: &W,
    input: &dyn ImageSource,
    channel: &str,
    tile_origin: Vec2i,
    settings: &ResampleSettings,
) -> WarpResult<TileData> {
    let window = tile_sample_window(warp, input.data_window()?, tile_origin, settings)?;
    let mut out = vec![0.0f32; TILE_PIXELS];
    if window.region().is_empty() {
        return Ok(out.into());
    }

    let sampler = window.open(input, channel)?;
    for j in 0..TILE_SIZE {
        let y = f64::from(tile_origin.y + j) + 0.5;
        let row = (j * TILE_SIZE) as usize;
        for i in 0..TILE_SIZE {
            let p = Point::new(f64::from(tile_origin.x + i) + 0.5, y);
            let q = warp.warp_point(p);
            out[row + i as usize] = sampler.sample(q.x, q.y);
        }
    }
    Ok(out.into())
}

/// Cache key of [`compute_channel_tile`]: channel, tile origin, sample window, warp parameters,
/// filter, bounding mode and the upstream tiles read. Reads no pixels.
pub fn hash_channel_tile<W: WarpFunction + ?Sized>(
    warp: &W,
    input: &dyn ImageSource,
    channel: &str,
    tile_origin: Vec2i,
    settings: &ResampleSettings,
) -> WarpResult<Fingerprint> {
    let window = tile_sample_window(warp, input.data_window()?, tile_origin, settings)?;
    let mut h = StableHasher::new();
    h.write_str("warp.channel_tile");
    h.write(channel);
    h.write(&tile_origin);
    h.write(&window.sample_box());
    warp.hash_params(&mut h);
    window.hash(input, channel, &mut h)?;
    Ok(h.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/warp/resample.rs"]
mod tests;
