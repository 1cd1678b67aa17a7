use crate::motion::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Move(Direction),
    Fire,
    DebugDump,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionInput {
    pub direction: Direction,
    pub pressed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    quit_requested: bool,
    direction_events: Vec<DirectionInput>,
    fire_presses: u32,
    debug_dump_pressed: bool,
    cursor_position_px: Option<(f32, f32)>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        direction_events: Vec<DirectionInput>,
        fire_presses: u32,
        debug_dump_pressed: bool,
        cursor_position_px: Option<(f32, f32)>,
    ) -> Self {
        Self {
            quit_requested,
            direction_events,
            fire_presses,
            debug_dump_pressed,
            cursor_position_px,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn direction_events(&self) -> &[DirectionInput] {
        &self.direction_events
    }

    pub fn fire_presses(&self) -> u32 {
        self.fire_presses
    }

    pub fn debug_dump_pressed(&self) -> bool {
        self.debug_dump_pressed
    }

    /// Last known cursor position in frame-buffer pixels. Positions outside
    /// the buffer are kept so aiming still works past the window edge.
    pub fn cursor_position_px(&self) -> Option<(f32, f32)> {
        self.cursor_position_px
    }

    pub fn with_quit_requested(mut self) -> Self {
        self.quit_requested = true;
        self
    }

    pub fn with_direction(mut self, direction: Direction, pressed: bool) -> Self {
        self.direction_events
            .push(DirectionInput { direction, pressed });
        self
    }

    pub fn with_fire_presses(mut self, presses: u32) -> Self {
        self.fire_presses = presses;
        self
    }

    pub fn with_debug_dump_pressed(mut self) -> Self {
        self.debug_dump_pressed = true;
        self
    }

    pub fn with_cursor_position_px(mut self, x: f32, y: f32) -> Self {
        self.cursor_position_px = Some((x, y));
        self
    }
}
