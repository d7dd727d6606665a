use std::io::Cursor;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

pub const PLACEHOLDER_SIZE: u32 = 512;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Produces PNG bytes for one scene prompt.
#[async_trait]
pub trait Illustrator: Send + Sync {
    async fn illustrate(&self, scene_prompt: &str) -> Result<Vec<u8>>;
}

/// Renders a gradient whose colours are derived from an FNV-1a hash of the
/// scene prompt, so the same prompt always yields the same image.
pub struct PlaceholderIllustrator {
    size: u32,
}

impl PlaceholderIllustrator {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl Default for PlaceholderIllustrator {
    fn default() -> Self {
        Self::new(PLACEHOLDER_SIZE)
    }
}

#[async_trait]
impl Illustrator for PlaceholderIllustrator {
    async fn illustrate(&self, scene_prompt: &str) -> Result<Vec<u8>> {
        let size = self.size;
        let scene_prompt = scene_prompt.to_string();
        tokio::task::spawn_blocking(move || render_placeholder(&scene_prompt, size))
            .await
            .context("placeholder render task failed")?
    }
}

fn render_placeholder(scene_prompt: &str, size: u32) -> Result<Vec<u8>> {
    let [r0, g0, b0, r1, g1, b1, ..] = fnv1a(scene_prompt.as_bytes()).to_le_bytes();

    let span = (2 * size.saturating_sub(1)).max(1) as f32;
    let image = RgbImage::from_fn(size, size, |x, y| {
        let t = (x + y) as f32 / span;
        let mix = |from: u8, to: u8| (f32::from(from) * (1.0 - t) + f32::from(to) * t) as u8;
        Rgb([mix(r0, r1), mix(g0, g1), mix(b0, b1)])
    });

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed to encode placeholder PNG")?;
    Ok(bytes)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
