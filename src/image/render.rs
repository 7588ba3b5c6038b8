//! Pulling whole regions out of a tiled [`ImageSource`].

use rayon::prelude::*;

use crate::{
    foundation::core::{Box2i, TILE_SIZE, Vec2i, tile_bound, tiles_in},
    foundation::error::{WarpError, WarpResult},
    image::memory::MemoryImage,
    image::source::{ImageSource, TileData},
};

#[derive(Clone, Debug, Default)]
/// Threading controls for region rendering.
pub struct RenderThreading {
    /// Compute tiles on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

/// Render `channel` over `region` into a row-major buffer of `region.area()` samples.
#[tracing::instrument(skip(source, threading))]
pub fn render_channel(
    source: &dyn ImageSource,
    channel: &str,
    region: Box2i,
    threading: &RenderThreading,
) -> WarpResult<Vec<f32>> {
    let pool = render_pool(threading, &region)?;
    render_channel_on(source, channel, region, pool.as_ref())
}

/// Render every channel of `source` over its data window.
///
/// A parallel render shares one pool across all channels.
#[tracing::instrument(skip_all)]
pub fn render_image(
    source: &dyn ImageSource,
    threading: &RenderThreading,
) -> WarpResult<MemoryImage> {
    let format = source.format()?;
    let data_window = source.data_window()?;
    let names = source.channel_names()?;
    let pool = render_pool(threading, &data_window)?;
    let mut channels = Vec::with_capacity(names.len());
    for name in names.iter() {
        let data = render_channel_on(source, name, data_window, pool.as_ref())?;
        channels.push((name.clone(), data));
    }
    tracing::debug!(
        channels = channels.len(),
        width = data_window.width(),
        height = data_window.height(),
        "rendered image"
    );
    MemoryImage::new(format, data_window, channels)
}

/// A pool only when the region spans more than one tile.
fn render_pool(
    threading: &RenderThreading,
    region: &Box2i,
) -> WarpResult<Option<rayon::ThreadPool>> {
    if threading.parallel && tiles_in(region).len() > 1 {
        build_thread_pool(threading.threads).map(Some)
    } else {
        Ok(None)
    }
}

#[tracing::instrument(skip(source, pool), fields(tiles))]
fn render_channel_on(
    source: &dyn ImageSource,
    channel: &str,
    region: Box2i,
    pool: Option<&rayon::ThreadPool>,
) -> WarpResult<Vec<f32>> {
    let origins = tiles_in(&region);
    tracing::Span::current().record("tiles", origins.len());

    let tiles: Vec<WarpResult<TileData>> = match pool {
        Some(pool) => pool.install(|| {
            origins
                .par_iter()
                .map(|o| source.channel_tile(channel, *o))
                .collect()
        }),
        None => origins
            .iter()
            .map(|o| source.channel_tile(channel, *o))
            .collect(),
    };

    let len = usize::try_from(region.area())
        .map_err(|_| WarpError::evaluation(format!("render region {region:?} is too large")))?;
    let mut out = vec![0.0f32; len];
    let out_w = region.width() as usize;
    for (origin, tile) in origins.iter().zip(tiles) {
        let tile = tile?;
        blit_tile(&mut out, out_w, &region, *origin, &tile);
    }
    Ok(out)
}

fn blit_tile(out: &mut [f32], out_w: usize, region: &Box2i, origin: Vec2i, tile: &[f32]) {
    let overlap = tile_bound(origin).intersect(region);
    if overlap.is_empty() {
        return;
    }
    let row_len = overlap.width() as usize;
    for y in overlap.min.y..=overlap.max.y {
        let src = ((y - origin.y) * TILE_SIZE + (overlap.min.x - origin.x)) as usize;
        let dst = (y - region.min.y) as usize * out_w + (overlap.min.x - region.min.x) as usize;
        out[dst..dst + row_len].copy_from_slice(&tile[src..src + row_len]);
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> WarpResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(WarpError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WarpError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/image/render.rs"]
mod tests;
