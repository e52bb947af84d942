use std::path::Path;

use ab_glyph::{Font, FontVec, Glyph, GlyphId, PxScale, ScaleFont};

use crate::config::StencilConfig;
use crate::{FireworksError, Result};

/// Fixed-size alpha buffer a burst text is rasterised into.
///
/// The buffer is sampled on a coarse grid to place particle targets; only
/// the alpha channel matters, so the mask stores one byte per pixel.
#[derive(Debug, Clone)]
pub struct TextMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl TextMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.alpha[(y * self.width + x) as usize] = value;
        }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x < self.width && y < self.height {
            self.alpha[(y * self.width + x) as usize]
        } else {
            0
        }
    }

    pub fn is_blank(&self) -> bool {
        self.alpha.iter().all(|&value| value == 0)
    }

    /// Max-blends coverage into the mask, ignoring out-of-bounds writes.
    /// Glyph outlines may overhang the buffer edges.
    fn accumulate(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = (y as u32 * self.width + x as u32) as usize;
        self.alpha[index] = self.alpha[index].max(value);
    }

    /// Walks a `stride`-spaced grid and yields, for every cell whose alpha
    /// strictly exceeds `threshold`, the cell's offset from the buffer
    /// centre. Deterministic given the mask and threshold.
    pub fn sample_offsets(&self, stride: u32, threshold: u8) -> Vec<(f32, f32)> {
        let stride = stride.max(1);
        let center_x = (self.width / 2) as f32;
        let center_y = (self.height / 2) as f32;
        let mut offsets = Vec::new();

        for x in (0..self.width).step_by(stride as usize) {
            for y in (0..self.height).step_by(stride as usize) {
                if self.alpha_at(x, y) > threshold {
                    offsets.push((x as f32 - center_x, y as f32 - center_y));
                }
            }
        }

        offsets
    }
}

/// Capability trait turning a line of text into an alpha mask. The seam
/// exists so the glyph rasteriser can be swapped for a fixed mask in tests
/// and headless environments.
pub trait TextStencil {
    fn stencil(&self, text: &str) -> TextMask;
}

/// Stencil that always yields an empty mask. Used when no font face is
/// available; bursts degrade to no-ops instead of failing the tick.
#[derive(Debug, Clone, Default)]
pub struct BlankStencil {
    config: StencilConfig,
}

impl BlankStencil {
    pub fn new(config: StencilConfig) -> Self {
        Self { config }
    }
}

impl TextStencil for BlankStencil {
    fn stencil(&self, _text: &str) -> TextMask {
        TextMask::new(self.config.width, self.config.height)
    }
}

/// Rasterises text with a real font face, centred in the mask both
/// horizontally and vertically.
pub struct FontStencil {
    font: FontVec,
    config: StencilConfig,
}

impl FontStencil {
    pub fn from_bytes(bytes: Vec<u8>, config: StencilConfig) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|err| FireworksError::Font(err.to_string()))?;
        Ok(Self { font, config })
    }

    pub fn from_file(path: &Path, config: StencilConfig) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, config)
    }

    fn layout(&self, text: &str) -> (Vec<Glyph>, f32) {
        let scaled = self.font.as_scaled(PxScale::from(self.config.font_px));
        let mut glyphs = Vec::new();
        let mut caret = 0.0_f32;
        let mut previous: Option<GlyphId> = None;

        for ch in text.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, glyph.id);
            }
            glyph.position = ab_glyph::point(caret, 0.0);
            caret += scaled.h_advance(glyph.id);
            previous = Some(glyph.id);
            glyphs.push(glyph);
        }

        (glyphs, caret)
    }
}

impl TextStencil for FontStencil {
    fn stencil(&self, text: &str) -> TextMask {
        let mut mask = TextMask::new(self.config.width, self.config.height);
        let (glyphs, line_width) = self.layout(text);
        if glyphs.is_empty() {
            return mask;
        }

        let scaled = self.font.as_scaled(PxScale::from(self.config.font_px));
        let origin_x = (self.config.width as f32 - line_width) * 0.5;
        // Centre the ascent..descent band on the buffer's middle row.
        let baseline = self.config.height as f32 * 0.5
            + (scaled.ascent() + scaled.descent()) * 0.5;

        for mut glyph in glyphs {
            glyph.position = ab_glyph::point(origin_x + glyph.position.x, baseline);
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    mask.accumulate(
                        bounds.min.x as i32 + x as i32,
                        bounds.min.y as i32 + y as i32,
                        (coverage * 255.0) as u8,
                    );
                });
            }
        }

        mask
    }
}

impl std::fmt::Debug for FontStencil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStencil")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkered_mask() -> TextMask {
        let mut mask = TextMask::new(30, 12);
        for x in (0..30).step_by(6) {
            for y in (0..12).step_by(6) {
                mask.set(x, y, 200);
            }
        }
        mask
    }

    #[test]
    fn blank_mask_yields_no_samples() {
        let mask = TextMask::new(300, 100);
        assert!(mask.is_blank());
        assert!(mask.sample_offsets(6, 128).is_empty());
    }

    #[test]
    fn blank_stencil_always_yields_a_blank_mask() {
        let stencil = BlankStencil::new(StencilConfig::default());
        assert!(stencil.stencil("ACCEPT").is_blank());
    }

    #[test]
    fn sampling_is_deterministic_and_centre_relative() {
        let mask = checkered_mask();
        let offsets = mask.sample_offsets(6, 128);
        assert_eq!(offsets, mask.sample_offsets(6, 128));
        // 5 grid columns x 2 grid rows land on lit cells.
        assert_eq!(offsets.len(), 10);
        assert!(offsets.contains(&(-15.0, -6.0)));
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let mut mask = TextMask::new(12, 12);
        mask.set(0, 0, 128);
        assert!(mask.sample_offsets(6, 128).is_empty());
        mask.set(0, 0, 129);
        assert_eq!(mask.sample_offsets(6, 128).len(), 1);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut mask = TextMask::new(4, 4);
        mask.accumulate(-1, 2, 255);
        mask.accumulate(2, 9, 255);
        assert!(mask.is_blank());
    }

    #[test]
    fn font_stencil_marks_glyph_coverage() {
        // Exercised only where a font face is installed; the stencil seam
        // keeps the rest of the suite independent of one.
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ];
        let Some(path) = candidates.iter().find(|path| Path::new(path).exists()) else {
            return;
        };

        let stencil = FontStencil::from_file(Path::new(path), StencilConfig::default()).unwrap();
        let mask = stencil.stencil("ACCEPT");
        assert!(!mask.is_blank());
        assert!(!mask.sample_offsets(6, 128).is_empty());
        assert!(stencil.stencil("").is_blank());
    }

    #[test]
    fn garbage_bytes_are_not_a_font() {
        let result = FontStencil::from_bytes(vec![0, 1, 2, 3], StencilConfig::default());
        assert!(matches!(result, Err(FireworksError::Font(_))));
    }
}
