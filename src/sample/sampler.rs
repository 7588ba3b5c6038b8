//! Windowed, filtered reads over a tiled image.

use std::collections::HashMap;

use crate::{
    cache::fingerprint::StableHasher,
    filter::kernel::Filter,
    foundation::core::{Box2i, TILE_SIZE, Vec2i, tile_origin, tiles_in},
    foundation::error::WarpResult,
    foundation::math::floor_i32,
    image::source::{ImageSource, TileData},
};

/// What a read outside the valid region returns.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BoundingMode {
    /// `0.0` outside.
    #[default]
    Black,
    /// Nearest edge pixel.
    Clamp,
    /// Wrap around the input data window.
    Periodic,
}

impl BoundingMode {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            BoundingMode::Black => "black",
            BoundingMode::Clamp => "clamp",
            BoundingMode::Periodic => "periodic",
        }
    }

    fn tag(self) -> u8 {
        match self {
            BoundingMode::Black => 0,
            BoundingMode::Clamp => 1,
            BoundingMode::Periodic => 2,
        }
    }
}

/// Map one axis coordinate into `[lo, hi]` according to `mode`, where `[d0, d1]` is the data
/// window span on that axis. `None` means the read yields `0.0`.
fn map_coord(i: i32, lo: i32, hi: i32, d0: i32, d1: i32, mode: BoundingMode) -> Option<i32> {
    match mode {
        BoundingMode::Black => (lo..=hi).contains(&i).then_some(i),
        BoundingMode::Clamp => Some(i.clamp(lo, hi)),
        BoundingMode::Periodic => {
            let len = i64::from(d1) - i64::from(d0) + 1;
            let wrapped = (i64::from(d0) + (i64::from(i) - i64::from(d0)).rem_euclid(len)) as i32;
            (lo..=hi).contains(&wrapped).then_some(wrapped)
        }
    }
}

/// Per-axis span of pixels a window may read.
fn axis_span(s0: i32, s1: i32, d0: i32, d1: i32, mode: BoundingMode) -> (i32, i32) {
    match mode {
        BoundingMode::Black => (s0.max(d0), s1.min(d1)),
        BoundingMode::Clamp => (s0.clamp(d0, d1), s1.clamp(d0, d1)),
        BoundingMode::Periodic => {
            if d0 <= s0 && s1 <= d1 {
                (s0, s1)
            } else {
                (d0, d1)
            }
        }
    }
}

/// The geometry and policy of a sampler: which input pixels it may read and how coordinates
/// outside them are treated. Owns no pixel data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerWindow {
    sample_box: Box2i,
    data_window: Box2i,
    region: Box2i,
    filter: Option<Filter>,
    mode: BoundingMode,
}

impl SamplerWindow {
    /// Window over `sample_box` of an input whose defined pixels are `data_window`.
    pub fn new(
        sample_box: Box2i,
        data_window: Box2i,
        filter: Option<Filter>,
        mode: BoundingMode,
    ) -> Self {
        let region = if sample_box.is_empty() || data_window.is_empty() {
            Box2i::EMPTY
        } else {
            let (x0, x1) = axis_span(
                sample_box.min.x,
                sample_box.max.x,
                data_window.min.x,
                data_window.max.x,
                mode,
            );
            let (y0, y1) = axis_span(
                sample_box.min.y,
                sample_box.max.y,
                data_window.min.y,
                data_window.max.y,
                mode,
            );
            Box2i::new(Vec2i::new(x0, y0), Vec2i::new(x1, y1))
        };
        Self {
            sample_box,
            data_window,
            region,
            filter,
            mode,
        }
    }

    /// The box requested by the caller.
    pub fn sample_box(&self) -> Box2i {
        self.sample_box
    }

    /// Input pixels actually read. Empty when nothing can contribute.
    pub fn region(&self) -> Box2i {
        self.region
    }

    /// Reconstruction filter, `None` for nearest-pixel lookup.
    pub fn filter(&self) -> Option<Filter> {
        self.filter
    }

    /// Boundary policy.
    pub fn mode(&self) -> BoundingMode {
        self.mode
    }

    /// Append everything a sampler over this window depends on: policy, filter, region and the
    /// hashes of the upstream tiles it covers. Reads no pixels.
    pub fn hash(
        &self,
        source: &dyn ImageSource,
        channel: &str,
        h: &mut StableHasher,
    ) -> WarpResult<()> {
        h.write_u8(self.mode.tag());
        match self.filter {
            Some(f) => {
                h.write_str(f.kind().name());
                h.write_f64(f.scaled_width());
            }
            None => h.write_str("nearest"),
        }
        h.write(&self.region);
        h.write(&self.data_window);
        for origin in tiles_in(&self.region) {
            h.write(&source.hash_channel_tile(channel, origin)?);
        }
        Ok(())
    }

    /// Fetch the upstream tiles covering the region.
    pub fn open(self, source: &dyn ImageSource, channel: &str) -> WarpResult<Sampler> {
        let mut tiles = HashMap::new();
        for origin in tiles_in(&self.region) {
            tiles.insert(origin, source.channel_tile(channel, origin)?);
        }
        Ok(Sampler {
            window: self,
            tiles,
        })
    }
}

/// Filtered reads at real-valued coordinates over a prefetched input region.
///
/// Pixel `i` has its centre at `i + 0.5`. Reads never touch pixels outside
/// [`SamplerWindow::region`].
#[derive(Clone, Debug)]
pub struct Sampler {
    window: SamplerWindow,
    tiles: HashMap<Vec2i, TileData>,
}

impl Sampler {
    /// Open a sampler over `sample_box` of `channel`.
    pub fn new(
        source: &dyn ImageSource,
        channel: &str,
        sample_box: Box2i,
        filter: Option<Filter>,
        mode: BoundingMode,
    ) -> WarpResult<Self> {
        let window = SamplerWindow::new(sample_box, source.data_window()?, filter, mode);
        window.open(source, channel)
    }

    /// Geometry and policy.
    pub fn window(&self) -> &SamplerWindow {
        &self.window
    }

    /// Boundary-mapped read of the pixel `(x, y)`.
    pub fn pixel(&self, x: i32, y: i32) -> f32 {
        let r = &self.window.region;
        if r.is_empty() {
            return 0.0;
        }
        let dw = &self.window.data_window;
        let mode = self.window.mode;
        let Some(px) = map_coord(x, r.min.x, r.max.x, dw.min.x, dw.max.x, mode) else {
            return 0.0;
        };
        let Some(py) = map_coord(y, r.min.y, r.max.y, dw.min.y, dw.max.y, mode) else {
            return 0.0;
        };
        let origin = tile_origin(Vec2i::new(px, py));
        match self.tiles.get(&origin) {
            Some(tile) => tile[((py - origin.y) * TILE_SIZE + (px - origin.x)) as usize],
            None => 0.0,
        }
    }

    /// Reconstructed value at `(x, y)`. Non-finite coordinates read as `0.0`.
    pub fn sample(&self, x: f64, y: f64) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        let Some(filter) = self.window.filter else {
            return self.pixel(floor_i32(x), floor_i32(y));
        };

        let tx = filter.weights(x);
        let ty = filter.weights(y);
        let mut acc = 0.0f32;
        for (j, wy) in ty.weights.iter().enumerate() {
            if *wy == 0.0 {
                continue;
            }
            let py = ty.first + j as i32;
            let mut row = 0.0f32;
            for (i, wx) in tx.weights.iter().enumerate() {
                if *wx == 0.0 {
                    continue;
                }
                row += wx * self.pixel(tx.first + i as i32, py);
            }
            acc += wy * row;
        }
        acc
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sample/sampler.rs"]
mod tests;
