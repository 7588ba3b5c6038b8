//! Reconstruction filter kernels.
//!
//! Pixel `i` has its centre at `i + 0.5`. A filter evaluated at a real coordinate `c` covers
//! every pixel whose centre lies within [`Filter::radius`] of `c`.

use smallvec::SmallVec;

use crate::foundation::error::{WarpError, WarpResult};
use crate::foundation::math::{ceil_i32, floor_i32};

/// Named reconstruction filters.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Nearest pixel (box of width 1).
    Box,
    /// Triangle filter; bilinear interpolation at width 1.
    #[default]
    Bilinear,
    /// Catmull-Rom cubic.
    Cubic,
    /// Mitchell-Netravali cubic (B = C = 1/3).
    Mitchell,
    /// Three-lobe Lanczos.
    Lanczos3,
    /// Gaussian with sigma 0.5.
    Gaussian,
}

impl FilterKind {
    /// Every filter, in declaration order.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Box,
        FilterKind::Bilinear,
        FilterKind::Cubic,
        FilterKind::Mitchell,
        FilterKind::Lanczos3,
        FilterKind::Gaussian,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Box => "box",
            FilterKind::Bilinear => "bilinear",
            FilterKind::Cubic => "cubic",
            FilterKind::Mitchell => "mitchell",
            FilterKind::Lanczos3 => "lanczos3",
            FilterKind::Gaussian => "gaussian",
        }
    }

    /// Look a filter up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> WarpResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| WarpError::validation(format!("unknown filter '{name}'")))
    }

    fn base_radius(self) -> f64 {
        match self {
            FilterKind::Box => 0.5,
            FilterKind::Bilinear => 1.0,
            FilterKind::Cubic | FilterKind::Mitchell => 2.0,
            FilterKind::Lanczos3 => 3.0,
            FilterKind::Gaussian => 1.5,
        }
    }

    fn eval(self, x: f64) -> f64 {
        match self {
            // Half-open so that exactly one pixel is picked at a pixel boundary.
            FilterKind::Box => {
                if x > -0.5 && x <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            FilterKind::Bilinear => (1.0 - x.abs()).max(0.0),
            FilterKind::Cubic => bicubic(x, 0.0, 0.5),
            FilterKind::Mitchell => bicubic(x, 1.0 / 3.0, 1.0 / 3.0),
            FilterKind::Lanczos3 => {
                if x.abs() >= 3.0 {
                    0.0
                } else {
                    sinc(x) * sinc(x / 3.0)
                }
            }
            FilterKind::Gaussian => {
                if x.abs() >= 1.5 {
                    0.0
                } else {
                    (-2.0 * x * x).exp()
                }
            }
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        return 1.0;
    }
    let px = std::f64::consts::PI * x;
    px.sin() / px
}

fn bicubic(x: f64, b: f64, c: f64) -> f64 {
    let x = x.abs();
    let x2 = x * x;
    let x3 = x2 * x;
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x3 + (6.0 * b + 30.0 * c) * x2 + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

/// Normalized tap weights for one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Taps {
    /// Pixel index of the first weight.
    pub first: i32,
    /// Weights for pixels `first, first + 1, ...`; they sum to 1.
    pub weights: SmallVec<[f32; 16]>,
}

/// A filter kernel scaled by a support width multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    scaled_width: f64,
}

impl Filter {
    /// Factory entry point: look the kernel up by name and scale its support by
    /// `scaled_width` (1.0 is the kernel's natural size).
    pub fn create(name: &str, scaled_width: f64) -> WarpResult<Self> {
        Self::new(FilterKind::from_name(name)?, scaled_width)
    }

    /// Build a filter from a known kind.
    pub fn new(kind: FilterKind, scaled_width: f64) -> WarpResult<Self> {
        if !scaled_width.is_finite() || scaled_width <= 0.0 {
            return Err(WarpError::validation(format!(
                "filter width must be finite and > 0, got {scaled_width}"
            )));
        }
        Ok(Self { kind, scaled_width })
    }

    /// Kernel kind.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Support multiplier.
    pub fn scaled_width(&self) -> f64 {
        self.scaled_width
    }

    /// Support radius in pixels.
    pub fn radius(&self) -> f64 {
        self.kind.base_radius() * self.scaled_width
    }

    /// Support radius rounded up to whole pixels.
    pub fn support(&self) -> i32 {
        ceil_i32(self.radius())
    }

    /// Inclusive range of pixel indices whose centres lie within the radius of `center`.
    pub fn tap_range(&self, center: f64) -> (i32, i32) {
        let r = self.radius();
        (ceil_i32(center - 0.5 - r), floor_i32(center - 0.5 + r))
    }

    /// Kernel weight at a signed distance `offset` (pixels) from the sample position.
    pub fn weight(&self, offset: f64) -> f64 {
        self.kind.eval(offset / self.scaled_width)
    }

    /// Normalized weights for reconstructing at `center`.
    ///
    /// Falls back to the nearest pixel when every weight in range is zero.
    pub fn weights(&self, center: f64) -> Taps {
        let (first, last) = self.tap_range(center);
        let mut weights = SmallVec::<[f32; 16]>::new();
        let mut sum = 0.0f64;
        let mut raw = SmallVec::<[f64; 16]>::new();
        for i in first..=last {
            let w = self.weight(f64::from(i) + 0.5 - center);
            raw.push(w);
            sum += w;
        }
        if sum.abs() < 1e-12 {
            weights.push(1.0);
            return Taps {
                first: floor_i32(center),
                weights,
            };
        }
        weights.extend(raw.into_iter().map(|w| (w / sum) as f32));
        Taps { first, weights }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/kernel.rs"]
mod tests;
