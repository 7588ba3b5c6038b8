use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::{
    cache::fingerprint::Fingerprint,
    filter::kernel::FilterKind,
    foundation::core::Format,
    image::memory::MemoryImage,
};

struct Recording {
    inner: MemoryImage,
    reads: Mutex<Vec<Vec2i>>,
}

impl Recording {
    fn new(inner: MemoryImage) -> Self {
        Self {
            inner,
            reads: Mutex::new(Vec::new()),
        }
    }
}

impl ImageSource for Recording {
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
        self.reads.lock().push(tile_origin);
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

fn grid(w: i32, h: i32) -> MemoryImage {
    let dw = Box2i::new(Vec2i::new(0, 0), Vec2i::new(w - 1, h - 1));
    MemoryImage::from_fn(Format::new(w as u32, h as u32), dw, &["Y"], |_, x, y| {
        (x * 10 + y) as f32
    })
    .unwrap()
}

fn full(img: &MemoryImage) -> Box2i {
    img.data_window().unwrap()
}

#[test]
fn nearest_reads_the_containing_pixel() {
    let img = grid(10, 10);
    let s = Sampler::new(&img, "Y", full(&img), None, BoundingMode::Black).unwrap();
    assert_eq!(s.sample(3.7, 2.2), 32.0);
    assert_eq!(s.sample(0.0, 0.0), 0.0);
    assert_eq!(s.sample(f64::NAN, 1.0), 0.0);
}

#[test]
fn bilinear_interpolates_between_centres() {
    let img = grid(10, 10);
    let f = Filter::new(FilterKind::Bilinear, 1.0).unwrap();
    let s = Sampler::new(&img, "Y", full(&img), Some(f), BoundingMode::Black).unwrap();
    assert_eq!(s.sample(4.0, 2.5), 37.0);
    assert_eq!(s.sample(4.5, 2.5), 42.0);
}

#[test]
fn bounding_modes_outside_the_data_window() {
    let img = grid(10, 10);
    let sample_box = Box2i::new(Vec2i::new(-8, 0), Vec2i::new(9, 9));

    let black = Sampler::new(&img, "Y", sample_box, None, BoundingMode::Black).unwrap();
    assert_eq!(black.sample(-3.5, 2.5), 0.0);

    let clamp = Sampler::new(&img, "Y", sample_box, None, BoundingMode::Clamp).unwrap();
    assert_eq!(clamp.sample(-3.5, 2.5), 2.0);

    let periodic = Sampler::new(&img, "Y", sample_box, None, BoundingMode::Periodic).unwrap();
    assert_eq!(periodic.sample(-3.5, 2.5), 62.0);
    assert_eq!(periodic.pixel(13, 12), 32.0);
}

#[test]
fn clamp_with_window_beside_the_data_reads_the_edge() {
    let img = grid(10, 10);
    let sample_box = Box2i::new(Vec2i::new(20, 0), Vec2i::new(30, 5));
    let s = Sampler::new(&img, "Y", sample_box, None, BoundingMode::Clamp).unwrap();
    assert_eq!(
        s.window().region(),
        Box2i::new(Vec2i::new(9, 0), Vec2i::new(9, 5))
    );
    assert_eq!(s.sample(25.5, 3.5), 93.0);
}

#[test]
fn only_tiles_of_the_region_are_fetched() {
    let src = Recording::new(grid(200, 200));
    let sample_box = Box2i::new(Vec2i::new(70, 70), Vec2i::new(80, 80));
    let s = Sampler::new(&src, "Y", sample_box, None, BoundingMode::Black).unwrap();
    assert_eq!(*src.reads.lock(), vec![Vec2i::new(64, 64)]);
    // Outside the region, even though inside the data window.
    assert_eq!(s.pixel(10, 10), 0.0);
    assert_eq!(s.pixel(75, 72), 752.0);
}

#[test]
fn hashing_reads_no_pixels_and_tracks_the_window() {
    let src = Recording::new(grid(200, 200));
    let dw = src.data_window().unwrap();
    let a = SamplerWindow::new(
        Box2i::new(Vec2i::new(0, 0), Vec2i::new(100, 100)),
        dw,
        None,
        BoundingMode::Black,
    );
    let b = SamplerWindow::new(a.sample_box(), dw, None, BoundingMode::Clamp);

    let digest = |w: &SamplerWindow| {
        let mut h = StableHasher::new();
        w.hash(&src, "Y", &mut h).unwrap();
        h.finish()
    };
    assert_eq!(digest(&a), digest(&a));
    assert_ne!(digest(&a), digest(&b));
    assert!(src.reads.lock().is_empty());
}

#[test]
fn empty_sample_box_reads_nothing() {
    let src = Recording::new(grid(10, 10));
    let s = Sampler::new(&src, "Y", Box2i::EMPTY, None, BoundingMode::Clamp).unwrap();
    assert!(s.window().region().is_empty());
    assert_eq!(s.sample(3.5, 3.5), 0.0);
    assert!(src.reads.lock().is_empty());
}
