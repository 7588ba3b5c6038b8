use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{Box2i, Format, Point, Vec2, Vec2i};

const XXH3_SEED: u64 = 0x5f3c_9a17_e4b2_d860;

/// 128-bit cache key.
///
/// Two computations with equal fingerprints must produce bit-identical output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl Fingerprint {
    /// Fingerprint of a single value.
    pub fn of<T: StableHash + ?Sized>(v: &T) -> Self {
        let mut h = StableHasher::new();
        v.stable_hash(&mut h);
        h.finish()
    }
}

/// Order-sensitive hasher used for every cache key in the crate.
pub struct StableHasher {
    inner: Xxh3,
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StableHasher {
    /// Fresh hasher with the crate seed.
    pub fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    /// Append a byte (typically a variant tag).
    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    /// Append a boolean.
    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    /// Append a `u32`.
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append an `i32`.
    pub fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append a `u64`.
    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append an `i64`.
    pub fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Append an `f32` by bit pattern.
    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    /// Append an `f64` by bit pattern.
    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    /// Append a length-prefixed string.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    /// Append any [`StableHash`] value.
    pub fn write<T: StableHash + ?Sized>(&mut self, v: &T) {
        v.stable_hash(self);
    }

    /// Finish into a 128-bit fingerprint.
    pub fn finish(self) -> Fingerprint {
        let v = self.inner.digest128();
        Fingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Values that can be appended to a [`StableHasher`].
pub trait StableHash {
    /// Append `self` to `h`.
    fn stable_hash(&self, h: &mut StableHasher);
}

impl StableHash for Fingerprint {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_u64(self.hi);
        h.write_u64(self.lo);
    }
}

impl StableHash for str {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_str(self);
    }
}

impl StableHash for Vec2i {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_i32(self.x);
        h.write_i32(self.y);
    }
}

impl StableHash for Box2i {
    fn stable_hash(&self, h: &mut StableHasher) {
        // All empty boxes hash alike.
        if self.is_empty() {
            h.write_u8(0);
            return;
        }
        h.write_u8(1);
        self.min.stable_hash(h);
        self.max.stable_hash(h);
    }
}

impl StableHash for Format {
    fn stable_hash(&self, h: &mut StableHasher) {
        self.display_window.stable_hash(h);
    }
}

impl StableHash for Point {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_f64(self.x);
        h.write_f64(self.y);
    }
}

impl StableHash for Vec2 {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_f64(self.x);
        h.write_f64(self.y);
    }
}

impl StableHash for [f32] {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_u64(self.len() as u64);
        for v in self {
            h.write_f32(*v);
        }
    }
}

impl StableHash for [String] {
    fn stable_hash(&self, h: &mut StableHasher) {
        h.write_u64(self.len() as u64);
        for s in self {
            h.write_str(s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
