use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use crate::content::SpriteAtlas;

use super::raster::{blit_frame, clear};
use super::text::draw_text_clipped;
use super::{DrawCommand, DrawList, Viewport};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

pub struct Renderer {
    pixels: Pixels<'static>,
    viewport: Viewport,
    atlas: SpriteAtlas,
    warned_missing_sprite_keys: HashSet<&'static str>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, viewport: Viewport, atlas: SpriteAtlas) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        Ok(Self {
            pixels,
            viewport,
            atlas,
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    /// Maps a physical window position to frame-buffer pixels. Positions
    /// outside the buffer keep their out-of-range coordinates.
    pub fn window_to_buffer_px(&self, x: f32, y: f32) -> (f32, f32) {
        match self.pixels.window_pos_to_pixel((x, y)) {
            Ok((px, py)) => (px as f32, py as f32),
            Err((px, py)) => (px as f32, py as f32),
        }
    }

    pub fn render(&mut self, draw_list: &DrawList) -> Result<(), Error> {
        let missing = paint(
            self.pixels.frame_mut(),
            self.viewport,
            &self.atlas,
            draw_list,
        );
        for key in missing {
            if self.warned_missing_sprite_keys.insert(key) {
                warn!(sprite_key = key, "renderer_sprite_missing");
            }
        }
        self.pixels.render()
    }
}

pub(crate) fn paint(
    frame: &mut [u8],
    viewport: Viewport,
    atlas: &SpriteAtlas,
    draw_list: &DrawList,
) -> Vec<&'static str> {
    let Viewport { width, height } = viewport;
    let mut missing = Vec::new();
    clear(frame, CLEAR_COLOR);

    for command in draw_list.commands() {
        match command {
            DrawCommand::Sprite {
                sprite,
                dest,
                rotation_degrees,
            } => {
                let Some(sheet) = atlas.get(sprite.key) else {
                    if !missing.contains(&sprite.key) {
                        missing.push(sprite.key);
                    }
                    continue;
                };
                if !dest.overlaps(&viewport.rect()) {
                    continue;
                }
                blit_frame(
                    frame,
                    width,
                    height,
                    sheet,
                    sprite.frame,
                    *dest,
                    *rotation_degrees,
                );
            }
            DrawCommand::Text { text, x, y, color } => {
                draw_text_clipped(frame, width, height, *x, *y, text, *color);
            }
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SpriteSheet;
    use crate::geometry::Rect;
    use crate::SpriteRef;

    const VIEWPORT: Viewport = Viewport {
        width: 8,
        height: 8,
    };

    fn solid_sheet(color: [u8; 4]) -> SpriteSheet {
        SpriteSheet::from_rgba(2, 2, 1, color.repeat(4)).expect("sheet")
    }

    fn pixel_at(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * VIEWPORT.width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn later_commands_paint_over_earlier_ones() {
        let mut atlas = SpriteAtlas::default();
        atlas.insert("ground", solid_sheet([0, 200, 0, 255]));
        atlas.insert("player", solid_sheet([0, 0, 200, 255]));
        let mut list = DrawList::new();
        list.blit(SpriteRef::new("ground"), Rect::new(0, 0, 8, 8));
        list.blit(SpriteRef::new("player"), Rect::new(2, 2, 2, 2));

        let mut frame = vec![0u8; 8 * 8 * 4];
        let missing = paint(&mut frame, VIEWPORT, &atlas, &list);

        assert!(missing.is_empty());
        assert_eq!(pixel_at(&frame, 0, 0), [0, 200, 0, 255]);
        assert_eq!(pixel_at(&frame, 3, 3), [0, 0, 200, 255]);
    }

    #[test]
    fn unknown_sprite_is_reported_once_and_skipped() {
        let atlas = SpriteAtlas::default();
        let mut list = DrawList::new();
        list.blit(SpriteRef::new("star"), Rect::new(0, 0, 4, 4));
        list.blit(SpriteRef::new("star"), Rect::new(4, 4, 4, 4));

        let mut frame = vec![7u8; 8 * 8 * 4];
        let missing = paint(&mut frame, VIEWPORT, &atlas, &list);

        assert_eq!(missing, vec!["star"]);
        assert_eq!(pixel_at(&frame, 1, 1), CLEAR_COLOR);
    }

    #[test]
    fn text_commands_are_painted() {
        let mut list = DrawList::new();
        list.text("8", 0, 0);
        let mut frame = vec![0u8; 8 * 8 * 4];
        paint(&mut frame, VIEWPORT, &SpriteAtlas::default(), &list);
        assert_eq!(pixel_at(&frame, 0, 0), super::super::DEFAULT_TEXT_COLOR);
    }
}
