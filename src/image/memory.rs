use std::sync::Arc;

use crate::{
    cache::fingerprint::{Fingerprint, StableHasher},
    foundation::core::{Box2i, Format, TILE_PIXELS, TILE_SIZE, Vec2i, tile_bound},
    foundation::error::{WarpError, WarpResult},
    image::source::{ImageSource, TileData},
};

/// Planar, fully resident image.
///
/// Each channel stores `data_window.area()` samples in row-major order starting at
/// `data_window.min`. Pixels outside the data window read as `0.0`.
#[derive(Clone, Debug)]
pub struct MemoryImage {
    format: Format,
    data_window: Box2i,
    names: Arc<[String]>,
    channels: Vec<Vec<f32>>,
    content: Vec<Fingerprint>,
}

impl MemoryImage {
    /// Build an image from named planar channels.
    pub fn new(
        format: Format,
        data_window: Box2i,
        channels: Vec<(String, Vec<f32>)>,
    ) -> WarpResult<Self> {
        format.validate()?;
        let expected = usize::try_from(data_window.area())
            .map_err(|_| WarpError::evaluation("data window too large"))?;

        let mut names = Vec::with_capacity(channels.len());
        let mut planes = Vec::with_capacity(channels.len());
        let mut content = Vec::with_capacity(channels.len());
        for (name, data) in channels {
            if names.contains(&name) {
                return Err(WarpError::validation(format!(
                    "duplicate channel name '{name}'"
                )));
            }
            if data.len() != expected {
                return Err(WarpError::evaluation(format!(
                    "channel '{name}' has {} samples, expected {expected}",
                    data.len()
                )));
            }
            content.push(Fingerprint::of(data.as_slice()));
            names.push(name);
            planes.push(data);
        }

        Ok(Self {
            format,
            data_window,
            names: names.into(),
            channels: planes,
            content,
        })
    }

    /// Every channel filled with `value`.
    pub fn constant(
        format: Format,
        data_window: Box2i,
        names: &[&str],
        value: f32,
    ) -> WarpResult<Self> {
        Self::from_fn(format, data_window, names, |_, _, _| value)
    }

    /// Channels generated from `f(channel_index, x, y)`.
    pub fn from_fn(
        format: Format,
        data_window: Box2i,
        names: &[&str],
        f: impl Fn(usize, i32, i32) -> f32,
    ) -> WarpResult<Self> {
        let mut channels = Vec::with_capacity(names.len());
        for (ci, name) in names.iter().enumerate() {
            let mut data = Vec::with_capacity(data_window.area() as usize);
            if !data_window.is_empty() {
                for y in data_window.min.y..=data_window.max.y {
                    for x in data_window.min.x..=data_window.max.x {
                        data.push(f(ci, x, y));
                    }
                }
            }
            channels.push(((*name).to_string(), data));
        }
        Self::new(format, data_window, channels)
    }

    /// Convert a decoded image into `R`, `G`, `B`, `A` float channels in `[0, 1]`.
    pub fn from_dynamic_image(img: &image::DynamicImage) -> WarpResult<Self> {
        let rgba = img.to_rgba32f();
        let (w, h) = rgba.dimensions();
        let format = Format::new(w, h);
        let px = (w as usize) * (h as usize);
        let mut planes = vec![Vec::with_capacity(px); 4];
        for p in rgba.pixels() {
            for (c, plane) in planes.iter_mut().enumerate() {
                plane.push(p.0[c]);
            }
        }
        let channels = ["R", "G", "B", "A"]
            .into_iter()
            .map(str::to_string)
            .zip(planes)
            .collect();
        Self::new(format, format.display_window, channels)
    }

    /// Quantize the display window to 8-bit RGBA. Missing `A` reads as opaque.
    pub fn to_rgba8(&self) -> WarpResult<image::RgbaImage> {
        let dw = self.format.display_window;
        let r = self.channel_index("R")?;
        let g = self.channel_index("G")?;
        let b = self.channel_index("B")?;
        let a = self.names.iter().position(|n| n == "A");

        let mut out = image::RgbaImage::new(dw.width(), dw.height());
        for (px, py, p) in out.enumerate_pixels_mut() {
            let x = dw.min.x + px as i32;
            let y = dw.min.y + py as i32;
            let v = |ci: usize| quantize(self.sample_at(ci, x, y));
            p.0 = [
                v(r),
                v(g),
                v(b),
                a.map(v).unwrap_or(255),
            ];
        }
        Ok(out)
    }

    /// Samples of a named channel, row-major over the data window.
    pub fn channel(&self, name: &str) -> Option<&[f32]> {
        let ci = self.names.iter().position(|n| n == name)?;
        Some(&self.channels[ci])
    }

    /// Value of `channel` at pixel `(x, y)`; `0.0` outside the data window.
    pub fn pixel(&self, channel: &str, x: i32, y: i32) -> Option<f32> {
        let ci = self.names.iter().position(|n| n == channel)?;
        Some(self.sample_at(ci, x, y))
    }

    fn sample_at(&self, ci: usize, x: i32, y: i32) -> f32 {
        let dw = &self.data_window;
        if !dw.contains(x, y) {
            return 0.0;
        }
        let w = dw.width() as usize;
        let idx = (y - dw.min.y) as usize * w + (x - dw.min.x) as usize;
        self.channels[ci][idx]
    }

    fn channel_index(&self, channel: &str) -> WarpResult<usize> {
        self.names
            .iter()
            .position(|n| n == channel)
            .ok_or_else(|| WarpError::evaluation(format!("missing channel '{channel}'")))
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl ImageSource for MemoryImage {
    fn format(&self) -> WarpResult<Format> {
        Ok(self.format)
    }

    fn data_window(&self) -> WarpResult<Box2i> {
        Ok(self.data_window)
    }

    fn channel_names(&self) -> WarpResult<Arc<[String]>> {
        Ok(self.names.clone())
    }

    fn channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<TileData> {
        let ci = self.channel_index(channel)?;
        let mut out = vec![0.0f32; TILE_PIXELS];
        let overlap = tile_bound(tile_origin).intersect(&self.data_window);
        if overlap.is_empty() {
            return Ok(out.into());
        }

        let src = &self.channels[ci];
        let src_w = self.data_window.width() as usize;
        let row_len = overlap.width() as usize;
        for y in overlap.min.y..=overlap.max.y {
            let src_start = (y - self.data_window.min.y) as usize * src_w
                + (overlap.min.x - self.data_window.min.x) as usize;
            let dst_start = ((y - tile_origin.y) * TILE_SIZE + (overlap.min.x - tile_origin.x))
                as usize;
            out[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }
        Ok(out.into())
    }

    fn hash_format(&self) -> WarpResult<Fingerprint> {
        Ok(Fingerprint::of(&self.format))
    }

    fn hash_data_window(&self) -> WarpResult<Fingerprint> {
        Ok(Fingerprint::of(&self.data_window))
    }

    fn hash_channel_names(&self) -> WarpResult<Fingerprint> {
        Ok(Fingerprint::of(&*self.names))
    }

    fn hash_channel_tile(&self, channel: &str, tile_origin: Vec2i) -> WarpResult<Fingerprint> {
        let ci = self.channel_index(channel)?;
        let mut h = StableHasher::new();
        h.write_str("memory");
        h.write(channel);
        h.write(&self.content[ci]);
        h.write(&self.data_window);
        h.write(&tile_origin);
        Ok(h.finish())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/memory.rs"]
mod tests;
