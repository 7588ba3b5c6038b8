use std::sync::Arc;

use crate::{
    cache::fingerprint::Fingerprint,
    foundation::core::{Box2i, Format, Vec2i},
    foundation::error::WarpResult,
};

/// One channel tile: exactly `TILE_SIZE * TILE_SIZE` samples, row-major.
pub type TileData = Arc<[f32]>;

/// The tiled image contract every node input and output satisfies.
///
/// Each quantity has a compute method and a matching hash method. The hash methods summarize
/// parameters and upstream hashes only; they never read pixels. Implementations must be
/// usable from many threads at once.
pub trait ImageSource: Send + Sync {
    /// Output format.
    fn format(&self) -> WarpResult<Format>;

    /// Region containing defined pixel data.
    fn data_window(&self) -> WarpResult<Box2i>;

    /// Ordered channel names.
    fn channel_names(&self) -> WarpResult<Arc<[String]>>;

    /// Channel data for the tile whose origin is `tile_origin`.
    fn channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<TileData>;

    /// Cache key for [`ImageSource::format`].
    fn hash_format(&self) -> WarpResult<Fingerprint>;

    /// Cache key for [`ImageSource::data_window`].
    fn hash_data_window(&self) -> WarpResult<Fingerprint>;

    /// Cache key for [`ImageSource::channel_names`].
    fn hash_channel_names(&self) -> WarpResult<Fingerprint>;

    /// Cache key for [`ImageSource::channel_tile`].
    fn hash_channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<Fingerprint>;

    /// A channel tile together with its cache key, both taken from one parameter snapshot.
    ///
    /// Sources whose parameters can change concurrently must override this so the key always
    /// describes the returned data. The default suits immutable sources.
    fn channel_tile_with_hash(
        &self,
        channel: &str,
        tile_origin: Vec2i,
    ) -> WarpResult<(Fingerprint, TileData)> {
        let key = self.hash_channel_tile(channel, tile_origin)?;
        let tile = self.channel_tile(channel, tile_origin)?;
        Ok((key, tile))
    }
}

/// The four per-image output quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageOutput {
    /// Image format.
    Format,
    /// Data window.
    DataWindow,
    /// Channel name list.
    ChannelNames,
    /// Per-tile channel data.
    ChannelData,
}

impl ImageOutput {
    /// Every output, in declaration order.
    pub const ALL: [ImageOutput; 4] = [
        ImageOutput::Format,
        ImageOutput::DataWindow,
        ImageOutput::ChannelNames,
        ImageOutput::ChannelData,
    ];

    fn bit(self) -> u8 {
        match self {
            ImageOutput::Format => 1,
            ImageOutput::DataWindow => 1 << 1,
            ImageOutput::ChannelNames => 1 << 2,
            ImageOutput::ChannelData => 1 << 3,
        }
    }
}

/// Set of outputs invalidated by a change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AffectedOutputs(u8);

impl AffectedOutputs {
    /// No outputs.
    pub const NONE: Self = Self(0);
    /// All outputs.
    pub const ALL: Self = Self(0b1111);

    /// Build a set from a list.
    pub fn of(outputs: &[ImageOutput]) -> Self {
        let mut s = Self::NONE;
        for o in outputs {
            s.insert(*o);
        }
        s
    }

    /// Add an output.
    pub fn insert(&mut self, o: ImageOutput) {
        self.0 |= o.bit();
    }

    /// Membership test.
    pub fn contains(self, o: ImageOutput) -> bool {
        self.0 & o.bit() != 0
    }

    /// Return `true` when nothing is affected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterate members in [`ImageOutput::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = ImageOutput> {
        ImageOutput::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

/// Something that changed upstream of a node: one of its input image's outputs, or one of its
/// own parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeInput<P> {
    /// An output of the input image.
    Upstream(ImageOutput),
    /// A node parameter.
    Param(P),
}

/// Host-facing node contract on top of [`ImageSource`].
pub trait ImageNode: ImageSource {
    /// Parameter identifiers of this node.
    type Param: Copy + Eq + std::fmt::Debug;

    /// `false` means the node passes its input through untouched.
    fn enabled(&self) -> bool;

    /// Outputs invalidated when `input` changes.
    ///
    /// Conservative: a true dependency is never omitted.
    fn affects(&self, input: NodeInput<Self::Param>) -> AffectedOutputs;
}

#[cfg(test)]
#[path = "../../tests/unit/image/source.rs"]
mod tests;
