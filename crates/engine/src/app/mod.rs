mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{DirectionInput, InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    Camera, DrawCommand, DrawList, Renderer, SpriteRef, Viewport, DEFAULT_TEXT_COLOR,
};
pub use scene::{Scene, SceneCommand};
