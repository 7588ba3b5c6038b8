use super::*;
use crate::image::memory::MemoryImage;

fn fp(n: u64) -> Fingerprint {
    Fingerprint { hi: n, lo: !n }
}

fn tile(v: f32) -> TileData {
    vec![v; 4].into()
}

#[test]
fn evicts_least_recently_used() {
    let mut c = TileCache::new(2);
    c.insert(fp(1), tile(1.0));
    c.insert(fp(2), tile(2.0));
    assert!(c.get(fp(1)).is_some());
    c.insert(fp(3), tile(3.0));

    assert_eq!(c.len(), 2);
    assert!(c.get(fp(2)).is_none());
    assert_eq!(c.get(fp(1)).unwrap()[0], 1.0);
    assert_eq!(c.get(fp(3)).unwrap()[0], 3.0);
    assert_eq!(c.stats().evictions, 1);
}

#[test]
fn counts_hits_and_misses() {
    let mut c = TileCache::new(4);
    assert!(c.get(fp(7)).is_none());
    c.insert(fp(7), tile(0.5));
    assert!(c.get(fp(7)).is_some());
    assert_eq!(
        c.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            evictions: 0
        }
    );
    c.clear();
    assert!(c.is_empty());
    assert_eq!(c.stats(), CacheStats::default());
}

#[test]
fn zero_capacity_is_clamped_to_one() {
    assert_eq!(TileCache::new(0).capacity(), 1);
}

#[test]
fn cached_image_serves_repeat_requests_from_cache() {
    let dw = Box2i::new(Vec2i::new(0, 0), Vec2i::new(9, 9));
    let img = MemoryImage::constant(Format::new(16, 16), dw, &["Y"], 0.25).unwrap();
    let cached = CachedImage::with_cache(img, TileCache::new(8));

    let a = cached.channel_tile("Y", Vec2i::new(0, 0)).unwrap();
    let b = cached.channel_tile("Y", Vec2i::new(0, 0)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cached.stats().hits, 1);
    assert_eq!(cached.stats().misses, 1);
    assert_eq!(
        cached.hash_channel_tile("Y", Vec2i::new(0, 0)).unwrap(),
        cached.inner().hash_channel_tile("Y", Vec2i::new(0, 0)).unwrap()
    );
}
