use std::collections::HashSet;
use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;

use super::*;
use crate::cache::fingerprint::Fingerprint;
use crate::foundation::core::Format;

fn ramp() -> MemoryImage {
    let dw = Box2i::new(Vec2i::new(-5, 3), Vec2i::new(140, 70));
    MemoryImage::from_fn(Format::new(200, 100), dw, &["R", "G"], |c, x, y| {
        (c as i32 * 100_000 + x * 100 + y) as f32
    })
    .unwrap()
}

#[test]
fn render_image_reproduces_source() {
    let src = ramp();
    let out = render_image(&src, &RenderThreading::default()).unwrap();
    assert_eq!(out.channel("R").unwrap(), src.channel("R").unwrap());
    assert_eq!(out.channel("G").unwrap(), src.channel("G").unwrap());
}

#[test]
fn parallel_matches_serial() {
    let src = ramp();
    let region = Box2i::new(Vec2i::new(-70, -10), Vec2i::new(200, 90));
    let serial = render_channel(&src, "G", region, &RenderThreading::default()).unwrap();
    let parallel = render_channel(
        &src,
        "G",
        region,
        &RenderThreading {
            parallel: true,
            threads: Some(3),
        },
    )
    .unwrap();
    assert_eq!(serial, parallel);
    assert_eq!(serial.len() as u64, region.area());
}

#[test]
fn zero_threads_is_rejected() {
    let src = ramp();
    let err = render_channel(
        &src,
        "R",
        Box2i::new(Vec2i::new(0, 0), Vec2i::new(200, 200)),
        &RenderThreading {
            parallel: true,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, WarpError::Validation(_)));
}

#[test]
fn empty_region_renders_nothing() {
    let src = ramp();
    let out = render_channel(&src, "R", Box2i::EMPTY, &RenderThreading::default()).unwrap();
    assert!(out.is_empty());
}

/// Records the thread every tile is computed on.
struct ThreadLog {
    inner: MemoryImage,
    threads: Mutex<HashSet<ThreadId>>,
}

impl ImageSource for ThreadLog {
    fn format(&self) -> WarpResult<Format> {
        self.inner.format()
    }

    fn data_window(&self) -> WarpResult<Box2i> {
        self.inner.data_window()
    }

    fn channel_names(&self) -> WarpResult<Arc<[String]>> {
        self.inner.channel_names()
    }

    fn channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<TileData> {
        self.threads.lock().insert(std::thread::current().id());
        self.inner.channel_tile(channel, tile_origin)
    }

    fn hash_format(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_format()
    }

    fn hash_data_window(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_data_window()
    }

    fn hash_channel_names(&self) -> WarpResult<Fingerprint> {
        self.inner.hash_channel_names()
    }

    fn hash_channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<Fingerprint> {
        self.inner.hash_channel_tile(channel, tile_origin)
    }
}

#[test]
fn render_image_shares_one_pool_across_channels() {
    let src = ThreadLog {
        inner: ramp(),
        threads: Mutex::new(HashSet::new()),
    };
    let out = render_image(
        &src,
        &RenderThreading {
            parallel: true,
            threads: Some(1),
        },
    )
    .unwrap();
    assert_eq!(out.channel("G").unwrap(), src.inner.channel("G").unwrap());

    // A pool per channel would spawn a fresh worker for each of R and G.
    let threads = src.threads.lock();
    assert_eq!(threads.len(), 1);
    assert!(!threads.contains(&std::thread::current().id()));
}

#[test]
fn render_image_rejects_zero_threads() {
    let err = render_image(
        &ramp(),
        &RenderThreading {
            parallel: true,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, WarpError::Validation(_)));
}
