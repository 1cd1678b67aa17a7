mod draw_list;
mod raster;
mod renderer;
mod text;
mod transform;

pub use draw_list::{DrawCommand, DrawList, SpriteRef, DEFAULT_TEXT_COLOR};
pub use renderer::Renderer;
pub use transform::{Camera, Viewport};
