use crate::geometry::Rect;

pub const DEFAULT_TEXT_COLOR: [u8; 4] = [250, 250, 250, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub key: &'static str,
    pub frame: u32,
}

impl SpriteRef {
    pub const fn new(key: &'static str) -> Self {
        Self { key, frame: 0 }
    }

    pub const fn frame(key: &'static str, frame: u32) -> Self {
        Self { key, frame }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        sprite: SpriteRef,
        dest: Rect,
        /// Counter-clockwise, about the centre of `dest`.
        rotation_degrees: f32,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        color: [u8; 4],
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn blit(&mut self, sprite: SpriteRef, dest: Rect) {
        self.blit_rotated(sprite, dest, 0.0);
    }

    pub fn blit_rotated(&mut self, sprite: SpriteRef, dest: Rect, rotation_degrees: f32) {
        self.commands.push(DrawCommand::Sprite {
            sprite,
            dest,
            rotation_degrees,
        });
    }

    pub fn text(&mut self, text: impl Into<String>, x: i32, y: i32) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            x,
            y,
            color: DEFAULT_TEXT_COLOR,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
