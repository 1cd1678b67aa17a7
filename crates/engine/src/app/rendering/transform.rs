use serde::Serialize;

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn half(&self) -> (i32, i32) {
        (self.width as i32 / 2, self.height as i32 / 2)
    }
}

/// Scroll window over a map. `state` keeps the scroll offset in its top-left
/// (zero or negative) and the map's pixel size in its width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Camera {
    state: Rect,
    viewport: Viewport,
}

impl Camera {
    pub fn new(map_width_px: i32, map_height_px: i32, viewport: Viewport) -> Self {
        Self {
            state: Rect::new(0, 0, map_width_px, map_height_px),
            viewport,
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        (self.state.x, self.state.y)
    }

    pub fn update(&mut self, target: &Rect) {
        let (half_width, half_height) = self.viewport.half();
        let left = -target.left() + half_width;
        let top = -target.top() + half_height;
        self.state.x = clamp_scroll(left, self.state.width, self.viewport.width as i32);
        self.state.y = clamp_scroll(top, self.state.height, self.viewport.height as i32);
    }

    pub fn apply(&self, world: &Rect) -> Rect {
        world.offset(self.state.x, self.state.y)
    }

    pub fn world_to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (x + self.state.x, y + self.state.y)
    }

    pub fn is_on_screen(&self, world: &Rect) -> bool {
        self.apply(world).overlaps(&self.viewport.rect())
    }
}

fn clamp_scroll(offset: i32, map_extent: i32, screen_extent: i32) -> i32 {
    if map_extent <= screen_extent {
        return 0;
    }
    offset.clamp(-(map_extent - screen_extent), 0)
}
