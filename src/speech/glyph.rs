use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};

use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};

/// Overlay color for rasterized glyphs.
pub const GLYPH_COLOR: [u8; 4] = [255, 255, 255, 230];

/// Rasterized translated text, ready for the compositor to blit.
#[derive(Clone, Debug)]
pub struct GlyphImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// The most recent translation result. `image` is absent when no font is
/// configured or rasterization failed; the compositor then shows nothing but
/// the text is still observable by the host.
#[derive(Clone, Debug)]
pub struct PendingGlyph {
    pub text: String,
    pub image: Option<GlyphImage>,
    pub shown_at: Instant,
}

/// Holder for the pending glyph with its bounded display window. Expiry is
/// evaluated lazily on read so no timer thread is needed.
pub struct GlyphState {
    current: Option<PendingGlyph>,
    display_window: Duration,
}

impl GlyphState {
    pub fn new(display_window: Duration) -> Self {
        Self {
            current: None,
            display_window,
        }
    }

    /// Replace the pending glyph and restart its display window.
    pub fn set(&mut self, text: String, image: Option<GlyphImage>) {
        self.current = Some(PendingGlyph {
            text,
            image,
            shown_at: Instant::now(),
        });
    }

    /// The pending glyph, clearing it first if its window has elapsed.
    pub fn current(&mut self) -> Option<&PendingGlyph> {
        if let Some(glyph) = &self.current {
            if glyph.shown_at.elapsed() > self.display_window {
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

pub fn load_font(path: &Path) -> Result<FontVec> {
    let data =
        fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
    FontVec::try_from_vec(data).with_context(|| format!("invalid font file {}", path.display()))
}

/// Render `text` into a tight RGBA image with a simple left-to-right layout.
/// Returns `None` when nothing produced an outline (empty text, or the font
/// has no coverage for any of the characters).
pub fn rasterize_text(font: &FontVec, text: &str, px: f32, color: [u8; 4]) -> Option<GlyphImage> {
    if text.is_empty() {
        return None;
    }

    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = Vec::with_capacity(text.chars().count());
    let mut caret = 0.0f32;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        glyphs.push(id.with_scale_and_position(scale, point(caret, scaled.ascent())));
        caret += scaled.h_advance(id);
    }

    let width = caret.ceil().max(1.0) as u32;
    let height = scaled.height().ceil().max(1.0) as u32;
    let mut rgba = vec![0u8; (width as usize) * (height as usize) * 4];

    let mut outlined_any = false;
    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        outlined_any = true;
        let bounds = outlined.px_bounds();
        outlined.draw(|x, y, coverage| {
            let px_x = bounds.min.x as i32 + x as i32;
            let px_y = bounds.min.y as i32 + y as i32;
            if px_x < 0 || px_y < 0 || px_x >= width as i32 || px_y >= height as i32 {
                return;
            }
            let alpha = (coverage * color[3] as f32) as u8;
            if alpha == 0 {
                return;
            }
            let idx = ((px_y as u32 * width + px_x as u32) as usize) * 4;
            rgba[idx] = color[0];
            rgba[idx + 1] = color[1];
            rgba[idx + 2] = color[2];
            rgba[idx + 3] = rgba[idx + 3].max(alpha);
        });
    }

    if !outlined_any {
        return None;
    }

    Some(GlyphImage {
        rgba,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_restarts_the_display_window() {
        let mut state = GlyphState::new(Duration::from_secs(5));
        state.set("好".to_string(), None);

        let glyph = state.current().unwrap();
        assert_eq!(glyph.text, "好");
        assert!(glyph.shown_at.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn glyph_expires_after_its_window() {
        let mut state = GlyphState::new(Duration::ZERO);
        state.set("好".to_string(), None);
        std::thread::sleep(Duration::from_millis(5));
        assert!(state.current().is_none());
    }

    #[test]
    fn replacing_keeps_only_the_newest() {
        let mut state = GlyphState::new(Duration::from_secs(5));
        state.set("你".to_string(), None);
        state.set("好".to_string(), None);
        assert_eq!(state.current().unwrap().text, "好");
    }
}
