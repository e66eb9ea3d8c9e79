//! Pattern texture rasterization.
//!
//! Pixels are stored row-major (`y * width + x`). Coordinates are in texture
//! space: `x` follows U across the road and `y` follows V along it.

use image::RgbaImage;

use super::mesh::GeomContext;
use super::metrics::TimingBucket;
use crate::model::{Pattern, PatternKind, Rgba, TextureResolution};

/// Texture addressing the decal texture is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
}

/// Sampling filter the decal texture is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("texture resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },
    #[error("pattern {index} has non-positive tiling")]
    InvalidTiling { index: usize },
    #[error("pattern {index} has negative size")]
    NegativeSize { index: usize },
    #[error("pattern {index} has non-finite size, tiling or offset")]
    NonFinite { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl PatternTexture {
    /// A texture of `resolution` filled with `color`.
    #[must_use]
    pub fn filled(resolution: TextureResolution, color: Rgba) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
            pixels: vec![color; resolution.pixel_count()],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    #[must_use]
    pub const fn wrap_mode(&self) -> WrapMode {
        WrapMode::Repeat
    }

    #[must_use]
    pub const fn filter_mode(&self) -> FilterMode {
        FilterMode::Nearest
    }

    /// Packed 8-bit RGBA bytes, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    #[must_use]
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixel(x, y).unwrap_or(Rgba::TRANSPARENT_WHITE).to_rgba8())
        })
    }
}

/// Paints `patterns` in order over a transparent white texture.
pub fn rasterize_patterns(
    resolution: TextureResolution,
    patterns: &[Pattern],
) -> Result<PatternTexture, RasterError> {
    let mut ctx = GeomContext::new();
    rasterize_patterns_with_context(resolution, patterns, &mut ctx)
}

pub fn rasterize_patterns_with_context(
    resolution: TextureResolution,
    patterns: &[Pattern],
    ctx: &mut GeomContext,
) -> Result<PatternTexture, RasterError> {
    if resolution.width == 0 || resolution.height == 0 {
        return Err(RasterError::ZeroResolution {
            width: resolution.width,
            height: resolution.height,
        });
    }
    for (index, pattern) in patterns.iter().enumerate() {
        validate_pattern(index, pattern)?;
    }

    let texture = ctx.metrics.time(TimingBucket::Raster, || {
        let mut texture = PatternTexture::filled(resolution, Rgba::TRANSPARENT_WHITE);
        for pattern in patterns {
            match pattern.kind {
                PatternKind::Fill => paint_fill(&mut texture, pattern),
            }
        }
        texture
    });
    log::debug!(
        "rasterized {} patterns into {}x{}",
        patterns.len(),
        texture.width,
        texture.height
    );
    Ok(texture)
}

fn validate_pattern(index: usize, pattern: &Pattern) -> Result<(), RasterError> {
    if !(pattern.size.is_finite() && pattern.tiling.is_finite() && pattern.offset.is_finite()) {
        return Err(RasterError::NonFinite { index });
    }
    if pattern.tiling.x <= 0.0 || pattern.tiling.y <= 0.0 {
        return Err(RasterError::InvalidTiling { index });
    }
    if pattern.size.x < 0.0 || pattern.size.y < 0.0 {
        return Err(RasterError::NegativeSize { index });
    }
    Ok(())
}

/// Whether coordinate `p` along an axis of `dim` pixels falls inside the
/// pattern's repeated span. Both span ends are inclusive; a zero size covers
/// nothing.
fn covers(p: u32, dim: u32, size: f64, tiling: f64, offset: f64) -> bool {
    if size <= 0.0 {
        return false;
    }
    let dim = f64::from(dim);
    let period = dim / tiling;
    let start = dim * (offset - size / 2.0);
    let t = (dim - start + f64::from(p)) % period;
    t <= size * period
}

fn paint_fill(texture: &mut PatternTexture, pattern: &Pattern) {
    let (width, height) = (texture.width, texture.height);
    let columns: Vec<bool> = (0..width)
        .map(|x| covers(x, width, pattern.size.x, pattern.tiling.x, pattern.offset.x))
        .collect();
    let rows: Vec<bool> = (0..height)
        .map(|y| covers(y, height, pattern.size.y, pattern.tiling.y, pattern.offset.y))
        .collect();

    let color = pattern.base_color;
    for (y, _) in (0..height).zip(&rows).filter(|(_, hit)| **hit) {
        for (x, _) in (0..width).zip(&columns).filter(|(_, hit)| **hit) {
            texture.set_pixel(x, y, color);
            if pattern.symmetry_x {
                texture.set_pixel(width - 1 - x, y, color);
            }
            if pattern.symmetry_y {
                texture.set_pixel(x, height - 1 - y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2;

    const RED: Rgba = Rgba::rgb(1.0, 0.0, 0.0);

    fn filled_columns(texture: &PatternTexture, y: u32) -> Vec<u32> {
        (0..texture.width)
            .filter(|&x| texture.pixel(x, y) == Some(RED))
            .collect()
    }

    #[test]
    fn no_patterns_is_transparent_white() {
        let texture = rasterize_patterns(TextureResolution::new(4, 3), &[]).unwrap();
        assert_eq!(texture.pixels.len(), 12);
        assert!(texture.pixels.iter().all(|&p| p == Rgba::TRANSPARENT_WHITE));
    }

    #[test]
    fn full_pattern_covers_everything() {
        let pattern = Pattern::fill("all", Vec2::ONE, Vec2::ONE, Vec2::new(0.5, 0.5), RED);
        let texture = rasterize_patterns(TextureResolution::new(16, 8), &[pattern]).unwrap();
        assert!(texture.pixels.iter().all(|&p| p == RED));
    }

    #[test]
    fn empty_pattern_covers_nothing() {
        let pattern = Pattern::fill("none", Vec2::ZERO, Vec2::ONE, Vec2::new(0.5, 0.5), RED);
        let texture = rasterize_patterns(TextureResolution::new(16, 8), &[pattern]).unwrap();
        assert!(texture.pixels.iter().all(|&p| p == Rgba::TRANSPARENT_WHITE));
    }

    #[test]
    fn tiling_repeats_span() {
        let pattern = Pattern::fill(
            "dashes",
            Vec2::new(0.5, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.25, 0.5),
            RED,
        );
        let texture = rasterize_patterns(TextureResolution::new(8, 2), &[pattern]).unwrap();
        assert_eq!(filled_columns(&texture, 0), vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(filled_columns(&texture, 1), vec![0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn span_includes_trailing_pixel() {
        let pattern = Pattern::fill(
            "half",
            Vec2::new(0.5, 1.0),
            Vec2::ONE,
            Vec2::new(0.25, 0.5),
            RED,
        );
        let texture = rasterize_patterns(TextureResolution::new(8, 1), &[pattern]).unwrap();
        assert_eq!(filled_columns(&texture, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_width_covers_nothing_even_with_full_height() {
        let pattern = Pattern::fill("line", Vec2::new(0.0, 1.0), Vec2::ONE, Vec2::new(0.5, 0.5), RED);
        let texture = rasterize_patterns(TextureResolution::new(8, 4), &[pattern]).unwrap();
        assert!(texture.pixels.iter().all(|&p| p == Rgba::TRANSPARENT_WHITE));
    }

    #[test]
    fn symmetry_mirrors_columns() {
        let pattern = Pattern::fill(
            "edge",
            Vec2::new(0.25, 1.0),
            Vec2::ONE,
            Vec2::new(0.125, 0.5),
            RED,
        )
        .with_symmetry(true, false);
        let texture = rasterize_patterns(TextureResolution::new(8, 1), &[pattern]).unwrap();
        assert_eq!(filled_columns(&texture, 0), vec![0, 1, 2, 5, 6, 7]);
    }

    #[test]
    fn later_patterns_paint_over_earlier() {
        let base = Pattern::fill("base", Vec2::ONE, Vec2::ONE, Vec2::new(0.5, 0.5), Rgba::GRAY);
        let top = Pattern::fill("top", Vec2::ONE, Vec2::ONE, Vec2::new(0.5, 0.5), RED);
        let texture = rasterize_patterns(TextureResolution::new(4, 4), &[base, top]).unwrap();
        assert!(texture.pixels.iter().all(|&p| p == RED));
    }

    #[test]
    fn image_export_matches_pixels() {
        let pattern = Pattern::fill("all", Vec2::ONE, Vec2::ONE, Vec2::new(0.5, 0.5), RED);
        let texture = rasterize_patterns(TextureResolution::new(3, 2), &[pattern]).unwrap();
        let image = texture.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [255, 0, 0, 255]);
        assert_eq!(texture.to_rgba8().len(), 3 * 2 * 4);
        assert_eq!(texture.wrap_mode(), WrapMode::Repeat);
        assert_eq!(texture.filter_mode(), FilterMode::Nearest);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert_eq!(
            rasterize_patterns(TextureResolution::new(0, 4), &[]).unwrap_err(),
            RasterError::ZeroResolution { width: 0, height: 4 }
        );
        let mut pattern = Pattern::default();
        pattern.tiling = Vec2::new(0.0, 1.0);
        assert_eq!(
            rasterize_patterns(TextureResolution::new(4, 4), &[pattern.clone()]).unwrap_err(),
            RasterError::InvalidTiling { index: 0 }
        );
        pattern.tiling = Vec2::ONE;
        pattern.size = Vec2::new(-0.1, 0.5);
        assert_eq!(
            rasterize_patterns(TextureResolution::new(4, 4), &[Pattern::default(), pattern]).unwrap_err(),
            RasterError::NegativeSize { index: 1 }
        );
    }
}
