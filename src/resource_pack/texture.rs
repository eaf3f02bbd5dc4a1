//! Texture loading and animation metadata.

use serde::Deserialize;

/// Raw texture data loaded from PNG.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Animation metadata from the `.png.mcmeta` sidecar, if any.
    pub animation: Option<AnimationMeta>,
}

/// The `animation` section of a `.png.mcmeta` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnimationMeta {
    /// Explicit frame sequence; empty means every frame in order.
    #[serde(default)]
    pub frames: Vec<AnimationFrame>,
    #[serde(default = "default_frametime")]
    pub frametime: u32,
    #[serde(default)]
    pub interpolate: bool,
    /// Frame width, defaults to the smaller image dimension.
    pub width: Option<u32>,
    /// Frame height, defaults to the smaller image dimension.
    pub height: Option<u32>,
}

fn default_frametime() -> u32 {
    1
}

/// One entry of an explicit frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnimationFrame {
    Index(u32),
    Timed { index: u32, time: Option<u32> },
}

impl AnimationFrame {
    pub fn index(&self) -> u32 {
        match *self {
            AnimationFrame::Index(index) | AnimationFrame::Timed { index, .. } => index,
        }
    }
}

#[derive(Deserialize)]
struct McMeta {
    animation: Option<AnimationMeta>,
}

/// Parse the contents of a `.png.mcmeta` file.
///
/// Returns `None` when the file has no animation section or is malformed.
pub fn parse_mcmeta(contents: &str) -> Option<AnimationMeta> {
    match serde_json::from_str::<McMeta>(contents) {
        Ok(meta) => meta.animation,
        Err(e) => {
            log::warn!("Failed to parse texture metadata: {}", e);
            None
        }
    }
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            animation: None,
        }
    }

    /// Create the missing-texture placeholder (magenta/black checkerboard).
    pub fn placeholder() -> Self {
        let size = 16;
        let mut pixels = vec![0u8; (size * size * 4) as usize];

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    pixels[idx] = 248;
                    pixels[idx + 2] = 248;
                }
                pixels[idx + 3] = 255;
            }
        }

        Self::new(size, size, pixels)
    }

    /// Attach animation metadata.
    pub fn apply_mcmeta(&mut self, meta: AnimationMeta) {
        self.animation = Some(meta);
    }

    /// Width of one animation frame.
    pub fn frame_width(&self) -> u32 {
        match &self.animation {
            Some(meta) => meta
                .width
                .unwrap_or_else(|| meta.height.map_or(self.width.min(self.height), |_| self.width)),
            None => self.width,
        }
    }

    /// Height of one animation frame.
    pub fn frame_height(&self) -> u32 {
        match &self.animation {
            Some(meta) => meta
                .height
                .unwrap_or_else(|| meta.width.map_or(self.width.min(self.height), |_| self.height)),
            None => self.height,
        }
    }

    fn frame_columns(&self) -> u32 {
        (self.width / self.frame_width().max(1)).max(1)
    }

    /// Number of frames stored in the image.
    pub fn frame_count(&self) -> u32 {
        let fw = self.frame_width().max(1);
        let fh = self.frame_height().max(1);
        ((self.width / fw) * (self.height / fh)).max(1)
    }

    /// Distinct frame indices used by the animation, in ascending order.
    pub fn unique_frames(&self) -> Vec<u32> {
        let count = self.frame_count();
        let mut frames: Vec<u32> = match &self.animation {
            Some(meta) if !meta.frames.is_empty() => meta
                .frames
                .iter()
                .map(AnimationFrame::index)
                .filter(|&i| i < count)
                .collect(),
            _ => (0..count).collect(),
        };
        frames.sort_unstable();
        frames.dedup();
        if frames.is_empty() {
            frames.push(0);
        }
        frames
    }

    /// Alpha of the pixel at (x, y) within `frame`. Out-of-range reads are 0.
    pub fn frame_alpha(&self, frame: u32, x: u32, y: u32) -> u8 {
        let fw = self.frame_width();
        let fh = self.frame_height();
        if x >= fw || y >= fh || frame >= self.frame_count() {
            return 0;
        }
        let columns = self.frame_columns();
        let px = (frame % columns) * fw + x;
        let py = (frame / columns) * fh + y;
        let idx = ((py * self.width + px) * 4 + 3) as usize;
        self.pixels.get(idx).copied().unwrap_or(0)
    }
}

/// Load a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData::new(width, height, rgba.into_raw()))
}
