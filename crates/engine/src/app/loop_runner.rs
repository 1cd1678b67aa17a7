use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::SpriteAtlas;
use crate::motion::Direction;

use super::metrics::{title_with_fps, MetricsAccumulator};
use super::{
    DirectionInput, DrawList, InputAction, InputSnapshot, Renderer, Scene, SceneCommand, Viewport,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub window_title: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub target_fps: u32,
    pub max_frame_delta_ms: u64,
    pub metrics_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Star Raid".to_string(),
            screen_width: 640,
            screen_height: 480,
            target_fps: 60,
            max_frame_delta_ms: 50,
            metrics_interval_ms: 1000,
        }
    }
}

impl LoopConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.screen_width.max(1),
            height: self.screen_height.max(1),
        }
    }

    pub fn max_frame_delta(&self) -> Duration {
        normalize_non_zero_duration(
            Duration::from_millis(self.max_frame_delta_ms),
            Duration::from_millis(50),
        )
    }

    pub fn metrics_interval(&self) -> Duration {
        normalize_non_zero_duration(
            Duration::from_millis(self.metrics_interval_ms),
            Duration::from_secs(1),
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    atlas: SpriteAtlas,
    mut scene: Box<dyn Scene>,
) -> Result<(), AppError> {
    let viewport = config.viewport();
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                viewport.width as f64,
                viewport.height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), viewport, atlas).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let max_frame_delta = config.max_frame_delta();
    let metrics_interval = config.metrics_interval();
    let frame_target = target_frame_duration(config.target_fps);
    info!(
        screen_width = viewport.width,
        screen_height = viewport.height,
        target_fps = config.target_fps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_interval_ms = metrics_interval.as_millis() as u64,
        "loop_config"
    );

    scene.load();

    let mut input_collector = InputCollector::default();
    let mut draw_list = DrawList::new();
    let mut last_tick_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_interval, last_tick_instant);
    let mut shutting_down = false;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window.request_redraw();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let (x, y) = renderer.window_to_buffer_px(position.x as f32, position.y as f32);
                    input_collector.set_cursor_position_px(x, y);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if shutting_down {
                        return;
                    }
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_tick_instant);
                    last_tick_instant = now;

                    let frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    let clamped = frame_dt < raw_frame_dt;
                    if clamped {
                        warn!(
                            raw_frame_ms = raw_frame_dt.as_millis() as u64,
                            max_frame_delta_ms = max_frame_delta.as_millis() as u64,
                            "sim_clamp_triggered"
                        );
                    }

                    let input_snapshot = input_collector.snapshot_for_tick();
                    let command = update_scene(scene.as_mut(), frame_dt, &input_snapshot);
                    if command == SceneCommand::Quit {
                        info!(reason = "scene_quit", "shutdown_requested");
                        shutting_down = true;
                        window_target.exit();
                        return;
                    }

                    draw_list.clear();
                    scene.render(&mut draw_list);

                    let cap_sleep = compute_cap_sleep(
                        Instant::now().saturating_duration_since(now),
                        frame_target,
                    );
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render(&draw_list) {
                        warn!(error = %error, "renderer_draw_failed");
                        shutting_down = true;
                        window_target.exit();
                        return;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt, clamped);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        window.set_title(&title_with_fps(&config.window_title, snapshot.fps));
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            clamped_frames = snapshot.clamped_frames,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Turns window events into per-tick snapshots. Presses are edge-triggered:
/// a held key or OS key repeat reports once until it is released.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    direction_is_down: [bool; 4],
    direction_events: Vec<DirectionInput>,
    fire_key_is_down: bool,
    left_mouse_is_down: bool,
    fire_presses: u32,
    debug_dump_is_down: bool,
    debug_dump_pressed_edge: bool,
    cursor_position_px: Option<(f32, f32)>,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let Some(action) = action_for_key(key_event.physical_key) else {
            return;
        };
        self.handle_action(action, key_event.state);
    }

    fn handle_action(&mut self, action: InputAction, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        match action {
            InputAction::Move(direction) => {
                let slot = &mut self.direction_is_down[direction_index(direction)];
                if *slot == is_pressed {
                    return;
                }
                *slot = is_pressed;
                self.direction_events.push(DirectionInput {
                    direction,
                    pressed: is_pressed,
                });
            }
            InputAction::Fire => {
                if is_pressed && !self.fire_key_is_down {
                    self.fire_presses = self.fire_presses.saturating_add(1);
                }
                self.fire_key_is_down = is_pressed;
            }
            InputAction::DebugDump => {
                if is_pressed && !self.debug_dump_is_down {
                    self.debug_dump_pressed_edge = true;
                }
                self.debug_dump_is_down = is_pressed;
            }
            InputAction::Quit => {
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.fire_presses = self.fire_presses.saturating_add(1);
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some((x, y));
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            std::mem::take(&mut self.direction_events),
            self.fire_presses,
            self.debug_dump_pressed_edge,
            self.cursor_position_px,
        );
        self.fire_presses = 0;
        self.debug_dump_pressed_edge = false;
        snapshot
    }
}

/// A quit request ends the loop even if the scene ignores it, but the scene
/// always sees it first.
fn update_scene(scene: &mut dyn Scene, dt: Duration, input: &InputSnapshot) -> SceneCommand {
    let command = scene.update(dt.as_secs_f64(), input);
    if input.quit_requested() {
        SceneCommand::Quit
    } else {
        command
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let action = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => InputAction::Move(Direction::Up),
        KeyCode::KeyS | KeyCode::ArrowDown => InputAction::Move(Direction::Down),
        KeyCode::KeyA | KeyCode::ArrowLeft => InputAction::Move(Direction::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => InputAction::Move(Direction::Right),
        KeyCode::Space => InputAction::Fire,
        KeyCode::KeyI => InputAction::DebugDump,
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

const fn direction_index(direction: Direction) -> usize {
    match direction {
        Direction::Left => 0,
        Direction::Right => 1,
        Direction::Up => 2,
        Direction::Down => 3,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn target_frame_duration(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(snapshot: &InputSnapshot) -> Vec<(Direction, bool)> {
        snapshot
            .direction_events()
            .iter()
            .map(|event| (event.direction, event.pressed))
            .collect()
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(50);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max_frame_delta),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn loop_config_defaults_and_partial_json() {
        let config: LoopConfig =
            serde_json::from_str(r#"{ "target_fps": 30 }"#).expect("partial config");
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.screen_width, 640);
        assert_eq!(config.max_frame_delta(), Duration::from_millis(50));
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let config = LoopConfig {
            max_frame_delta_ms: 0,
            metrics_interval_ms: 0,
            ..LoopConfig::default()
        };
        assert_eq!(config.max_frame_delta(), Duration::from_millis(50));
        assert_eq!(config.metrics_interval(), Duration::from_secs(1));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_directions() {
        assert_eq!(
            action_for_key(PhysicalKey::Code(KeyCode::KeyW)),
            Some(InputAction::Move(Direction::Up))
        );
        assert_eq!(
            action_for_key(PhysicalKey::Code(KeyCode::ArrowLeft)),
            Some(InputAction::Move(Direction::Left))
        );
        assert_eq!(
            action_for_key(PhysicalKey::Code(KeyCode::Space)),
            Some(InputAction::Fire)
        );
        assert_eq!(action_for_key(PhysicalKey::Code(KeyCode::KeyQ)), None);
    }

    #[test]
    fn direction_events_keep_arrival_order_and_drain() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Move(Direction::Left), ElementState::Pressed);
        input.handle_action(InputAction::Move(Direction::Right), ElementState::Pressed);
        input.handle_action(InputAction::Move(Direction::Right), ElementState::Released);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert_eq!(
            moves(&first),
            vec![
                (Direction::Left, true),
                (Direction::Right, true),
                (Direction::Right, false)
            ]
        );
        assert!(second.direction_events().is_empty());
    }

    #[test]
    fn key_repeat_does_not_duplicate_direction_press() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Move(Direction::Down), ElementState::Pressed);
        input.handle_action(InputAction::Move(Direction::Down), ElementState::Pressed);
        input.handle_action(InputAction::Move(Direction::Down), ElementState::Pressed);
        assert_eq!(moves(&input.snapshot_for_tick()), vec![(Direction::Down, true)]);
    }

    #[test]
    fn space_and_left_click_each_count_one_fire_per_press() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Fire, ElementState::Pressed);
        input.handle_action(InputAction::Fire, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().fire_presses(), 2);
        assert_eq!(input.snapshot_for_tick().fire_presses(), 0);

        input.handle_action(InputAction::Fire, ElementState::Released);
        input.handle_action(InputAction::Fire, ElementState::Pressed);
        assert_eq!(input.snapshot_for_tick().fire_presses(), 1);
    }

    #[test]
    fn debug_dump_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::DebugDump, ElementState::Pressed);
        assert!(input.snapshot_for_tick().debug_dump_pressed());
        input.handle_action(InputAction::DebugDump, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().debug_dump_pressed());
    }

    #[test]
    fn escape_sets_sticky_quit() {
        let mut input = InputCollector::default();
        input.handle_action(InputAction::Quit, ElementState::Pressed);
        assert!(input.snapshot_for_tick().quit_requested());
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[derive(Default)]
    struct QuitLog {
        seen_quit: bool,
    }

    impl Scene for QuitLog {
        fn load(&mut self) {}

        fn update(&mut self, _dt_seconds: f64, input: &InputSnapshot) -> SceneCommand {
            self.seen_quit |= input.quit_requested();
            SceneCommand::None
        }

        fn render(&mut self, _draw_list: &mut DrawList) {}
    }

    #[test]
    fn window_close_reaches_scene_before_loop_ends() {
        let mut collector = InputCollector::default();
        let mut scene = QuitLog::default();
        let frame = Duration::from_millis(16);

        let open = collector.snapshot_for_tick();
        assert_eq!(update_scene(&mut scene, frame, &open), SceneCommand::None);
        assert!(!scene.seen_quit);

        collector.mark_quit_requested();
        let closing = collector.snapshot_for_tick();
        assert_eq!(update_scene(&mut scene, frame, &closing), SceneCommand::Quit);
        assert!(scene.seen_quit);
    }

    #[test]
    fn snapshot_carries_cursor() {
        let mut input = InputCollector::default();
        assert_eq!(input.snapshot_for_tick().cursor_position_px(), None);
        input.set_cursor_position_px(100.0, 200.0);
        assert_eq!(
            input.snapshot_for_tick().cursor_position_px(),
            Some((100.0, 200.0))
        );
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(60).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
        assert_eq!(target_frame_duration(0), None);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(60);
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(20), target),
            Duration::ZERO
        );
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }
}
