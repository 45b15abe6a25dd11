//! Synthetic pixel data for quantizer and area-snap tests
//!
//! Pixels are drawn around a set of cluster centers with a seeded RNG, so a
//! given `(centers, seed)` pair always produces the same buffer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default seed used by tests that do not care about the exact buffer
pub const DEFAULT_SEED: u64 = 0x7e3e_2024;

/// Default spread (per channel, +/-) around a cluster center
pub const DEFAULT_SPREAD: u8 = 12;

/// Configuration for pixel generation
#[derive(Debug, Clone)]
pub struct PixelGeneratorConfig {
    /// RNG seed
    pub seed: u64,
    /// Maximum per-channel deviation from the cluster center
    pub spread: u8,
    /// Shuffle the output so clusters are interleaved
    pub shuffle: bool,
}

impl Default for PixelGeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            spread: DEFAULT_SPREAD,
            shuffle: true,
        }
    }
}

/// Seeded generator of RGB pixel buffers
pub struct PixelGenerator {
    config: PixelGeneratorConfig,
    rng: StdRng,
}

impl PixelGenerator {
    pub fn new() -> Self {
        Self::with_config(PixelGeneratorConfig::default())
    }

    pub fn with_config(config: PixelGeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    // =========================================================================
    // BUFFERS
    // =========================================================================

    /// `per_cluster` pixels around each center
    pub fn clustered(&mut self, centers: &[(u8, u8, u8)], per_cluster: usize) -> Vec<(u8, u8, u8)> {
        let mut pixels = Vec::with_capacity(centers.len() * per_cluster);
        for &center in centers {
            for _ in 0..per_cluster {
                pixels.push(self.jitter(center));
            }
        }

        if self.config.shuffle {
            for i in (1..pixels.len()).rev() {
                let j = self.rng.gen_range(0..=i);
                pixels.swap(i, j);
            }
        }

        pixels
    }

    /// `count` uniformly random pixels
    pub fn noise(&mut self, count: usize) -> Vec<(u8, u8, u8)> {
        (0..count)
            .map(|_| (self.rng.gen(), self.rng.gen(), self.rng.gen()))
            .collect()
    }

    /// A solid block of one color
    pub fn solid(color: (u8, u8, u8), count: usize) -> Vec<(u8, u8, u8)> {
        vec![color; count]
    }

    fn jitter(&mut self, (r, g, b): (u8, u8, u8)) -> (u8, u8, u8) {
        let spread = self.config.spread as i16;
        let mut channel = |c: u8| {
            let delta = if spread == 0 {
                0
            } else {
                self.rng.gen_range(-spread..=spread)
            };
            (c as i16 + delta).clamp(0, 255) as u8
        };
        (channel(r), channel(g), channel(b))
    }

    // =========================================================================
    // ENCODINGS
    // =========================================================================

    /// Flatten to an RGBA byte stream (alpha 255), as a canvas would return
    pub fn to_rgba_bytes(pixels: &[(u8, u8, u8)]) -> Vec<u8> {
        pixels
            .iter()
            .flat_map(|&(r, g, b)| [r, g, b, 255])
            .collect()
    }

    /// Write pixels as a PNG of the given width (rows filled left to right)
    pub fn write_png(
        path: &Path,
        width: u32,
        pixels: &[(u8, u8, u8)],
    ) -> Result<(), image::ImageError> {
        let height = (pixels.len() as u32).div_ceil(width.max(1));
        let mut img = image::RgbImage::new(width, height);
        for (i, &(r, g, b)) in pixels.iter().enumerate() {
            let x = i as u32 % width;
            let y = i as u32 / width;
            img.put_pixel(x, y, image::Rgb([r, g, b]));
        }
        img.save(path)
    }
}

impl Default for PixelGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_pixels() {
        let centers = [(200, 30, 30), (30, 30, 200)];
        let a = PixelGenerator::new().clustered(&centers, 20);
        let b = PixelGenerator::new().clustered(&centers, 20);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_pixels_stay_near_centers() {
        let mut generator = PixelGenerator::with_config(PixelGeneratorConfig {
            shuffle: false,
            ..Default::default()
        });
        let pixels = generator.clustered(&[(100, 100, 100)], 50);
        for (r, g, b) in pixels {
            for c in [r, g, b] {
                assert!((88..=112).contains(&c));
            }
        }
    }

    #[test]
    fn test_rgba_bytes() {
        let bytes = PixelGenerator::to_rgba_bytes(&[(1, 2, 3), (4, 5, 6)]);
        assert_eq!(bytes, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
