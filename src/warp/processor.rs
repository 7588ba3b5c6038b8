//! Generic node plumbing shared by every warp variant.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    cache::fingerprint::{Fingerprint, StableHasher},
    filter::kernel::FilterKind,
    foundation::core::{Box2i, Format, Vec2i},
    foundation::error::WarpResult,
    image::source::{
        AffectedOutputs, ImageNode, ImageOutput, ImageSource, NodeInput, TileData,
    },
    sample::sampler::BoundingMode,
    warp::function::WarpFunction,
    warp::resample::{self, ResampleSettings},
};

/// A concrete warp: parameters plus the hooks that turn them into a [`WarpFunction`].
pub trait WarpVariant: Send + Sync {
    /// Parameter identifiers.
    type Param: Copy + Eq + Debug;
    /// Immutable warp built from one parameter snapshot.
    type Warp: WarpFunction;

    /// Whether the variant currently alters its input.
    fn enabled(&self) -> bool;

    /// Build the warp for `input`, or `None` when disabled. Both answers come from the same
    /// parameter snapshot.
    fn warp(&self, input: &dyn ImageSource) -> WarpResult<Option<Self::Warp>>;

    /// Output data window.
    fn warped_data_window(&self, warp: &Self::Warp, input: &dyn ImageSource)
    -> WarpResult<Box2i>;

    /// Output format. Passes the input format through by default.
    fn format(&self, _warp: &Self::Warp, input: &dyn ImageSource) -> WarpResult<Format> {
        input.format()
    }

    /// Cache key of [`WarpVariant::format`].
    fn hash_format(&self, _warp: &Self::Warp, input: &dyn ImageSource) -> WarpResult<Fingerprint> {
        input.hash_format()
    }

    /// Cache key of [`WarpVariant::warped_data_window`].
    ///
    /// The default covers the warp parameters and the input's format and data window.
    fn hash_data_window(
        &self,
        warp: &Self::Warp,
        input: &dyn ImageSource,
    ) -> WarpResult<Fingerprint> {
        let mut h = StableHasher::new();
        h.write_str("warp.data_window");
        warp.hash_params(&mut h);
        h.write(&input.hash_format()?);
        h.write(&input.hash_data_window()?);
        Ok(h.finish())
    }

    /// Outputs invalidated by one of the variant's parameters.
    fn param_affects(&self, param: Self::Param) -> AffectedOutputs;

    /// Outputs invalidated by a change of the input while enabled.
    ///
    /// The default assumes the warp depends on the input's format and data window.
    fn upstream_affects(&self, output: ImageOutput) -> AffectedOutputs {
        match output {
            ImageOutput::Format => AffectedOutputs::of(&[
                ImageOutput::Format,
                ImageOutput::DataWindow,
                ImageOutput::ChannelData,
            ]),
            ImageOutput::DataWindow => {
                AffectedOutputs::of(&[ImageOutput::DataWindow, ImageOutput::ChannelData])
            }
            ImageOutput::ChannelNames => AffectedOutputs::of(&[ImageOutput::ChannelNames]),
            ImageOutput::ChannelData => AffectedOutputs::of(&[ImageOutput::ChannelData]),
        }
    }
}

/// Parameters of a [`WarpProcessor`]: the shared resample settings plus the variant's own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarpParam<P> {
    /// Filter kind or width.
    Filter,
    /// Boundary policy.
    BoundingMode,
    /// A variant parameter.
    Variant(P),
}

/// An image node that resamples its input through a [`WarpVariant`].
///
/// Channel names always pass through. When the variant is disabled every output, and every
/// hash, is the input's.
pub struct WarpProcessor<V> {
    variant: V,
    input: Arc<dyn ImageSource>,
    settings: RwLock<Arc<ResampleSettings>>,
}

impl<V: WarpVariant> WarpProcessor<V> {
    /// Node reading from `input` with default resample settings.
    pub fn new(variant: V, input: Arc<dyn ImageSource>) -> Self {
        Self {
            variant,
            input,
            settings: RwLock::new(Arc::new(ResampleSettings::default())),
        }
    }

    /// Node with explicit resample settings.
    pub fn with_settings(
        variant: V,
        input: Arc<dyn ImageSource>,
        settings: ResampleSettings,
    ) -> WarpResult<Self> {
        settings.validate()?;
        Ok(Self {
            variant,
            input,
            settings: RwLock::new(Arc::new(settings)),
        })
    }

    /// The variant, for parameter access.
    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Upstream image.
    pub fn input(&self) -> &Arc<dyn ImageSource> {
        &self.input
    }

    /// Current resample settings snapshot.
    pub fn settings(&self) -> Arc<ResampleSettings> {
        self.settings.read().clone()
    }

    /// Validate and publish new resample settings.
    pub fn set_settings(&self, settings: ResampleSettings) -> WarpResult<()> {
        settings.validate()?;
        tracing::debug!(?settings, "resample settings updated");
        *self.settings.write() = Arc::new(settings);
        Ok(())
    }

    /// Change the reconstruction filter.
    pub fn set_filter(&self, filter: Option<FilterKind>, width: f64) -> WarpResult<()> {
        let mut s = *self.settings();
        s.filter = filter;
        s.filter_width = width;
        self.set_settings(s)
    }

    /// Change the boundary policy.
    pub fn set_bounding_mode(&self, mode: BoundingMode) -> WarpResult<()> {
        let mut s = *self.settings();
        s.bounding_mode = mode;
        self.set_settings(s)
    }

    /// The warp for the current parameters, `None` when disabled.
    pub fn warp(&self) -> WarpResult<Option<V::Warp>> {
        self.variant.warp(self.input.as_ref())
    }
}

impl<V: WarpVariant> ImageSource for WarpProcessor<V> {
    fn format(&self) -> WarpResult<Format> {
        match self.warp()? {
            Some(w) => self.variant.format(&w, self.input.as_ref()),
            None => self.input.format(),
        }
    }

    fn data_window(&self) -> WarpResult<Box2i> {
        match self.warp()? {
            Some(w) => self.variant.warped_data_window(&w, self.input.as_ref()),
            None => self.input.data_window(),
        }
    }

    fn channel_names(&self) -> WarpResult<Arc<[String]>> {
        self.input.channel_names()
    }

    fn channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<TileData> {
        let settings = self.settings();
        match self.warp()? {
            Some(w) => resample::compute_channel_tile(
                &w,
                self.input.as_ref(),
                channel,
                tile_origin,
                &settings,
            ),
            None => self.input.channel_tile(channel, tile_origin),
        }
    }

    fn hash_format(&self) -> WarpResult<Fingerprint> {
        match self.warp()? {
            Some(w) => self.variant.hash_format(&w, self.input.as_ref()),
            None => self.input.hash_format(),
        }
    }

    fn hash_data_window(&self) -> WarpResult<Fingerprint> {
        match self.warp()? {
            Some(w) => self.variant.hash_data_window(&w, self.input.as_ref()),
            None => self.input.hash_data_window(),
        }
    }

    fn hash_channel_names(&self) -> WarpResult<Fingerprint> {
        self.input.hash_channel_names()
    }

    fn hash_channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<Fingerprint> {
        let settings = self.settings();
        match self.warp()? {
            Some(w) => resample::hash_channel_tile(
                &w,
                self.input.as_ref(),
                channel,
                tile_origin,
                &settings,
            ),
            None => self.input.hash_channel_tile(channel, tile_origin),
        }
    }

    fn channel_tile_with_hash(
        &self,
        channel: &str,
        tile_origin: Vec2i,
    ) -> WarpResult<(Fingerprint, TileData)> {
        let settings = self.settings();
        let Some(w) = self.warp()? else {
            return self.input.channel_tile_with_hash(channel, tile_origin);
        };
        let input = self.input.as_ref();
        let key = resample::hash_channel_tile(&w, input, channel, tile_origin, &settings)?;
        let tile = resample::compute_channel_tile(&w, input, channel, tile_origin, &settings)?;
        Ok((key, tile))
    }
}

impl<V: WarpVariant> ImageNode for WarpProcessor<V> {
    type Param = WarpParam<V::Param>;

    fn enabled(&self) -> bool {
        self.variant.enabled()
    }

    fn affects(&self, input: NodeInput<Self::Param>) -> AffectedOutputs {
        match input {
            NodeInput::Upstream(o) if !self.variant.enabled() => AffectedOutputs::of(&[o]),
            NodeInput::Upstream(o) => self.variant.upstream_affects(o),
            NodeInput::Param(WarpParam::Filter | WarpParam::BoundingMode) => {
                AffectedOutputs::of(&[ImageOutput::ChannelData])
            }
            NodeInput::Param(WarpParam::Variant(p)) => self.variant.param_affects(p),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/warp/processor.rs"]
mod tests;
