use crate::{
    cache::fingerprint::StableHasher,
    foundation::core::{Box2i, Point},
    warp::bounds::sample_boundary,
};

/// A mapping from output pixel space to input pixel space.
///
/// Both spaces put pixel `i` at `[i, i + 1)`, so pixel centres sit at `i + 0.5`.
/// Implementations must be pure and deterministic, and must return finite points for finite
/// input.
pub trait WarpFunction: Send + Sync {
    /// Input-space location that output point `p` reads from.
    fn warp_point(&self, p: Point) -> Point;

    /// Input-space box containing the image of output box `b`.
    ///
    /// The default samples the boundary of `b` (see [`sample_boundary`]). Override when a
    /// tighter closed form is known.
    fn warp_box(&self, b: Box2i) -> Box2i {
        sample_boundary(b, |p| self.warp_point(p))
    }

    /// Append every parameter that influences [`WarpFunction::warp_point`] or
    /// [`WarpFunction::warp_box`].
    fn hash_params(&self, h: &mut StableHasher);
}

#[cfg(test)]
#[path = "../../tests/unit/warp/function.rs"]
mod tests;
