use super::{DrawList, InputSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// A running game screen driven by the app loop: one `update` then one
/// `render` per frame.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, dt_seconds: f64, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, draw_list: &mut DrawList);
    fn unload(&mut self) {}
}
