//! Dominant color extraction
//!
//! Lloyd-style k-means over RGB pixels with a fixed iteration count. The
//! initial centroids are the first `k` pixels of the input, so the result
//! depends on pixel order. Structured images whose leading pixels are all
//! alike can collapse into a few clusters; this seeding is kept as-is.

use crate::color::model::rgb_to_hex;
use crate::core::error::Result;
use log::{debug, info};
use rayon::prelude::*;
use std::path::Path;

/// Number of k-means passes
pub const ITERATIONS: usize = 10;

/// Default palette size
pub const DEFAULT_COLOR_COUNT: usize = 5;

type Rgb = (u8, u8, u8);

fn distance_sq(a: Rgb, b: Rgb) -> u32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Index of the nearest centroid; ties go to the lowest index
fn nearest(pixel: Rgb, centroids: &[Rgb]) -> usize {
    let mut best = 0;
    let mut best_dist = u32::MAX;
    for (j, &c) in centroids.iter().enumerate() {
        let d = distance_sq(pixel, c);
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

/// Rounded mean, halves rounding up
fn rounded_mean(sum: u64, count: u64) -> u8 {
    ((2 * sum + count) / (2 * count)).min(255) as u8
}

/// Cluster `pixels` into at most `k` colors and return the centroids as hex.
///
/// Returns an empty vector for empty input or `k == 0`. With fewer pixels than
/// `k`, only as many centroids as there are pixels are produced.
pub fn quantize(pixels: &[Rgb], k: usize) -> Vec<String> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids: Vec<Rgb> = pixels.iter().take(k).copied().collect();

    for iteration in 0..ITERATIONS {
        let assignments: Vec<usize> = pixels
            .par_iter()
            .map(|&px| nearest(px, &centroids))
            .collect();

        let mut sums = vec![[0u64; 4]; centroids.len()];
        for (&(r, g, b), &c) in pixels.iter().zip(assignments.iter()) {
            let s = &mut sums[c];
            s[0] += r as u64;
            s[1] += g as u64;
            s[2] += b as u64;
            s[3] += 1;
        }

        let mut moved = 0;
        for (centroid, s) in centroids.iter_mut().zip(sums.iter()) {
            if s[3] == 0 {
                continue;
            }
            let next = (
                rounded_mean(s[0], s[3]),
                rounded_mean(s[1], s[3]),
                rounded_mean(s[2], s[3]),
            );
            if next != *centroid {
                moved += 1;
            }
            *centroid = next;
        }

        debug!("k-means pass {}: {} centroids moved", iteration + 1, moved);
    }

    centroids
        .into_iter()
        .map(|(r, g, b)| rgb_to_hex(r, g, b))
        .collect()
}

/// Quantize an RGBA byte stream (as read from a canvas); alpha is ignored
pub fn palette_from_rgba(bytes: &[u8], k: usize) -> Vec<String> {
    let pixels: Vec<Rgb> = bytes
        .chunks_exact(4)
        .map(|px| (px[0], px[1], px[2]))
        .collect();
    quantize(&pixels, k)
}

/// Decode an image file and quantize its pixels
pub fn palette_from_image<P: AsRef<Path>>(path: P, k: usize) -> Result<Vec<String>> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgba8();
    info!(
        "Quantizing {} ({}x{}) into {} colors",
        path.display(),
        img.width(),
        img.height(),
        k
    );
    Ok(palette_from_rgba(img.as_raw(), k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdb::{PixelGenerator, PixelGeneratorConfig};
    use tempfile::TempDir;

    #[test]
    fn test_empty_input() {
        for k in [0, 1, 5, 100] {
            assert!(quantize(&[], k).is_empty());
        }
    }

    #[test]
    fn test_zero_k() {
        assert!(quantize(&[(1, 2, 3)], 0).is_empty());
    }

    #[test]
    fn test_each_pixel_own_cluster() {
        let pixels = vec![(255, 0, 0), (0, 255, 0), (0, 0, 255), (18, 52, 86)];
        let result = quantize(&pixels, pixels.len());
        assert_eq!(result, vec!["#ff0000", "#00ff00", "#0000ff", "#123456"]);
    }

    #[test]
    fn test_fewer_pixels_than_k() {
        let result = quantize(&[(10, 20, 30), (40, 50, 60)], 5);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_rounded_mean() {
        // (0 + 1) / 2 = 0.5 rounds up
        let result = quantize(&[(0, 0, 0), (1, 1, 1)], 1);
        assert_eq!(result, vec!["#010101"]);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        // (10,10,10) is equidistant from both seeds
        let pixels = vec![(0, 0, 0), (20, 20, 20), (10, 10, 10)];
        let result = quantize(&pixels, 2);
        assert_eq!(result, vec!["#050505", "#141414"]);
    }

    #[test]
    fn test_first_k_seeding_is_order_dependent() {
        let a = vec![(0, 0, 0), (0, 0, 0), (255, 255, 255)];
        let b = vec![(0, 0, 0), (255, 255, 255), (0, 0, 0)];
        assert_eq!(quantize(&b, 2), vec!["#000000", "#ffffff"]);
        // Duplicate seeds: the first pass lumps everything into centroid 0
        assert_eq!(quantize(&a, 2), vec!["#ffffff", "#000000"]);
        assert_eq!(quantize(&a[..2], 2), vec!["#000000", "#000000"]);
    }

    #[test]
    fn test_recovers_separated_clusters() {
        let mut generator = PixelGenerator::with_config(PixelGeneratorConfig {
            shuffle: false,
            ..Default::default()
        });
        let red = generator.clustered(&[(220, 20, 20)], 50);
        let blue = generator.clustered(&[(20, 20, 220)], 50);
        // Put one pixel of each cluster first so both get a seed
        let mut pixels = vec![red[0], blue[0]];
        pixels.extend_from_slice(&red[1..]);
        pixels.extend_from_slice(&blue[1..]);

        let result = quantize(&pixels, 2);
        let (r0, _, b0) = crate::color::model::hex_to_rgb(&result[0]);
        let (r1, _, b1) = crate::color::model::hex_to_rgb(&result[1]);
        assert!(r0 > 200 && b0 < 40);
        assert!(b1 > 200 && r1 < 40);
    }

    #[test]
    fn test_palette_from_rgba_ignores_alpha() {
        let bytes = [255, 0, 0, 0, 255, 0, 0, 128, 255, 0, 0, 255];
        assert_eq!(palette_from_rgba(&bytes, 3), vec!["#ff0000"; 3]);
    }

    #[test]
    fn test_palette_from_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("swatch.png");
        let pixels = vec![(255, 0, 0), (0, 0, 255), (255, 0, 0), (0, 0, 255)];
        PixelGenerator::write_png(&path, 2, &pixels).unwrap();

        let result = palette_from_image(&path, 2).unwrap();
        assert_eq!(result, vec!["#ff0000", "#0000ff"]);
    }

    #[test]
    fn test_palette_from_missing_image() {
        let temp_dir = TempDir::new().unwrap();
        let err = palette_from_image(temp_dir.path().join("nope.png"), 3).unwrap_err();
        assert!(!err.is_input_error());
    }
}
