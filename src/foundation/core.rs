use crate::foundation::error::{WarpError, WarpResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Side length of every image tile, shared by the whole pipeline.
pub const TILE_SIZE: i32 = 64;

/// Number of samples in one channel tile.
pub const TILE_PIXELS: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// Integer 2D position in pixel space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Vec2i {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Vec2i {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer box with **inclusive** bounds.
///
/// [`Box2i::EMPTY`] is the uninitialized state (min > max); extending it by a point makes it a
/// single-pixel box. Once initialized `min <= max` holds componentwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Box2i {
    /// Inclusive minimum corner.
    pub min: Vec2i,
    /// Inclusive maximum corner.
    pub max: Vec2i,
}

impl Default for Box2i {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box2i {
    /// The empty box.
    pub const EMPTY: Self = Self {
        min: Vec2i::new(i32::MAX, i32::MAX),
        max: Vec2i::new(i32::MIN, i32::MIN),
    };

    /// Create a box from inclusive corners. An inverted box is normalized to [`Box2i::EMPTY`].
    pub fn new(min: Vec2i, max: Vec2i) -> Self {
        let b = Self { min, max };
        if b.is_empty() { Self::EMPTY } else { b }
    }

    /// Box covering `width x height` pixels starting at `origin`.
    pub fn from_origin_size(origin: Vec2i, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self::new(
            origin,
            Vec2i::new(
                origin.x.saturating_add(width as i32 - 1),
                origin.y.saturating_add(height as i32 - 1),
            ),
        )
    }

    /// Return `true` when the box contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    fn span_x(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (i64::from(self.max.x) - i64::from(self.min.x) + 1) as u64
    }

    fn span_y(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (i64::from(self.max.y) - i64::from(self.min.y) + 1) as u64
    }

    /// Width in pixels (0 when empty). Saturates at `u32::MAX` for a box spanning every `i32`.
    pub fn width(&self) -> u32 {
        u32::try_from(self.span_x()).unwrap_or(u32::MAX)
    }

    /// Height in pixels (0 when empty). Saturates at `u32::MAX` for a box spanning every `i32`.
    pub fn height(&self) -> u32 {
        u32::try_from(self.span_y()).unwrap_or(u32::MAX)
    }

    /// Number of pixels covered, saturating at `u64::MAX`.
    pub fn area(&self) -> u64 {
        self.span_x().saturating_mul(self.span_y())
    }

    /// Return `true` when `(x, y)` lies inside the box.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Return `true` when `other` is fully inside this box. Empty boxes are contained everywhere.
    pub fn contains_box(&self, other: &Box2i) -> bool {
        other.is_empty()
            || (self.contains(other.min.x, other.min.y) && self.contains(other.max.x, other.max.y))
    }

    /// Grow the box so that it contains `(x, y)`.
    pub fn extend_by(&mut self, x: i32, y: i32) {
        self.min.x = self.min.x.min(x);
        self.min.y = self.min.y.min(y);
        self.max.x = self.max.x.max(x);
        self.max.y = self.max.y.max(y);
    }

    /// Intersection with `other`.
    pub fn intersect(&self, other: &Box2i) -> Box2i {
        Box2i::new(
            Vec2i::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Vec2i::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        )
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Box2i) -> Box2i {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Box2i::new(
            Vec2i::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vec2i::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Grow every side by `n` pixels. Empty boxes stay empty.
    pub fn expanded(&self, n: i32) -> Box2i {
        if self.is_empty() {
            return *self;
        }
        Box2i::new(
            Vec2i::new(self.min.x.saturating_sub(n), self.min.y.saturating_sub(n)),
            Vec2i::new(self.max.x.saturating_add(n), self.max.y.saturating_add(n)),
        )
    }

    /// Shift the box by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Box2i {
        if self.is_empty() {
            return *self;
        }
        Box2i {
            min: Vec2i::new(self.min.x.saturating_add(dx), self.min.y.saturating_add(dy)),
            max: Vec2i::new(self.max.x.saturating_add(dx), self.max.y.saturating_add(dy)),
        }
    }
}

/// Output image format: the display window that defines the image's nominal extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Format {
    /// Inclusive display window.
    pub display_window: Box2i,
}

impl Default for Format {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl Format {
    /// Format with origin `(0, 0)` and the given size. A zero dimension yields an empty
    /// display window, which [`Format::validate`] rejects.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            display_window: Box2i::from_origin_size(Vec2i::default(), width, height),
        }
    }

    /// Create a validated format from an explicit display window.
    pub fn from_display_window(display_window: Box2i) -> WarpResult<Self> {
        let f = Self { display_window };
        f.validate()?;
        Ok(f)
    }

    /// Width of the display window.
    pub fn width(&self) -> u32 {
        self.display_window.width()
    }

    /// Height of the display window.
    pub fn height(&self) -> u32 {
        self.display_window.height()
    }

    /// Reject empty display windows.
    pub fn validate(&self) -> WarpResult<()> {
        if self.display_window.is_empty() {
            return Err(WarpError::validation("format display window must be non-empty"));
        }
        Ok(())
    }
}

/// Origin of the tile containing pixel `p`.
pub fn tile_origin(p: Vec2i) -> Vec2i {
    Vec2i::new(
        p.x.div_euclid(TILE_SIZE) * TILE_SIZE,
        p.y.div_euclid(TILE_SIZE) * TILE_SIZE,
    )
}

/// Pixel bounds of the tile starting at `origin`.
pub fn tile_bound(origin: Vec2i) -> Box2i {
    Box2i {
        min: origin,
        max: Vec2i::new(origin.x + TILE_SIZE - 1, origin.y + TILE_SIZE - 1),
    }
}

/// Origins of all tiles overlapping `b`, in row-major order.
pub fn tiles_in(b: &Box2i) -> Vec<Vec2i> {
    if b.is_empty() {
        return Vec::new();
    }
    let first = tile_origin(b.min);
    let last = tile_origin(b.max);
    let mut out = Vec::new();
    let mut y = first.y;
    loop {
        let mut x = first.x;
        loop {
            out.push(Vec2i::new(x, y));
            match x.checked_add(TILE_SIZE) {
                Some(next) if next <= last.x => x = next,
                _ => break,
            }
        }
        match y.checked_add(TILE_SIZE) {
            Some(next) if next <= last.y => y = next,
            _ => break,
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
