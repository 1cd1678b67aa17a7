use engine::{
    Camera, Direction, DrawList, InputSnapshot, Mask, MapLayout, Rect, Scene, SceneCommand,
    SpriteRef, Viewport,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::actors::{Enemy, EnemyId, Player};
use super::projectile::{aim_degrees, Projectile, ProjectileHit, AIM_ORIGIN_DEGREES};
use super::sprite_keys;
use super::world::{build_obstacles, build_pickups, Obstacle, Pickup};
use crate::app::settings::GameSettings;

/// Player sprite art faces this many degrees clockwise of the aim origin.
const PLAYER_ART_ROTATION_DEGREES: f64 = 135.0;
const HUD_RIGHT_COLUMN_INSET_PX: i32 = 140;
const HUD_BOTTOM_INSET_PX: i32 = 30;
const HUD_MARGIN_PX: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum EndReason {
    Quit,
    Caught,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum GameState {
    Running,
    Terminated(EndReason),
}

#[derive(Debug, Clone)]
pub(crate) struct SceneAssets {
    pub(crate) obstacle_mask: Mask,
    pub(crate) pickup_size: (i32, i32),
}

#[derive(Debug, Serialize)]
struct DebugDump {
    state: GameState,
    player_rect: Rect,
    player_facing: Direction,
    held_directions: Vec<Direction>,
    remainder: (f64, f64),
    camera_offset: (i32, i32),
    aim_degrees: f64,
    ammo: u32,
    enemies_left: usize,
    visible_enemies: usize,
    projectiles: Vec<(f64, f64)>,
    pickups_left: usize,
}

pub(crate) struct ArcadeScene {
    settings: GameSettings,
    viewport: Viewport,
    layout: MapLayout,
    assets: SceneAssets,
    rng: StdRng,
    state: GameState,
    player: Player,
    enemies: Vec<Enemy>,
    obstacles: Vec<Obstacle>,
    pickups: Vec<Pickup>,
    projectiles: Vec<Projectile>,
    camera: Camera,
    ammo: u32,
    aim_degrees: f64,
    last_cursor_px: Option<(f32, f32)>,
    cleared_logged: bool,
}

impl ArcadeScene {
    pub(crate) fn new(
        settings: GameSettings,
        viewport: Viewport,
        layout: MapLayout,
        assets: SceneAssets,
        rng: StdRng,
    ) -> Self {
        let player = Player::new(viewport.half(), settings.player_speed, settings.animate_fps);
        let camera = Camera::new(layout.width_px, layout.height_px, viewport);
        let ammo = settings.starting_ammo;
        Self {
            settings,
            viewport,
            layout,
            assets,
            rng,
            state: GameState::Running,
            player,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            pickups: Vec::new(),
            projectiles: Vec::new(),
            camera,
            ammo,
            aim_degrees: AIM_ORIGIN_DEGREES,
            last_cursor_px: None,
            cleared_logged: false,
        }
    }

    fn spawn_enemies(&mut self) -> Vec<Enemy> {
        let spawns = self.layout.enemy_spawns.clone();
        spawns
            .into_iter()
            .zip(0u32..)
            .map(|(spawn, id)| {
                let variant = self.rng.gen_range(0..sprite_keys::ENEMY_SPRITES.len());
                let sprite = sprite_keys::ENEMY_SPRITES[variant];
                Enemy::new(
                    EnemyId(id),
                    spawn,
                    self.settings.enemy_speed,
                    self.settings.animate_fps,
                    sprite,
                )
            })
            .collect()
    }

    fn terminate(&mut self, reason: EndReason) {
        if self.state == GameState::Running {
            self.state = GameState::Terminated(reason);
        }
    }

    fn apply_input(&mut self, input: &InputSnapshot) {
        for event in input.direction_events() {
            if event.pressed {
                self.player.press(event.direction);
            } else {
                self.player.release(event.direction);
            }
        }

        if let Some(cursor) = input.cursor_position_px() {
            if self.last_cursor_px != Some(cursor) {
                self.last_cursor_px = Some(cursor);
                self.aim_at(cursor);
            }
        }

        for _ in 0..input.fire_presses() {
            self.fire();
        }

        if input.debug_dump_pressed() {
            self.debug_dump();
        }
    }

    fn aim_at(&mut self, cursor: (f32, f32)) {
        let (center_x, center_y) = self.player.rect().center();
        let (screen_x, screen_y) = self.camera.world_to_screen(center_x, center_y);
        self.aim_degrees = aim_degrees(
            f64::from(cursor.0) - f64::from(screen_x),
            f64::from(cursor.1) - f64::from(screen_y),
        );
    }

    fn fire(&mut self) {
        if self.ammo == 0 {
            debug!("fire_without_ammo");
            return;
        }
        self.ammo -= 1;
        self.projectiles.push(Projectile::new(
            self.player.rect().center(),
            self.aim_degrees,
            self.settings.projectile_speed,
        ));
        info!(
            angle_degrees = self.aim_degrees,
            ammo_left = self.ammo,
            "projectile_fired"
        );
    }

    fn debug_dump(&self) {
        let remainder = self.player.body.remainder;
        let dump = DebugDump {
            state: self.state,
            player_rect: self.player.rect(),
            player_facing: self.player.facing(),
            held_directions: self.player.held_directions().to_vec(),
            remainder: (remainder.x, remainder.y),
            camera_offset: self.camera.offset(),
            aim_degrees: self.aim_degrees,
            ammo: self.ammo,
            enemies_left: self.enemies.len(),
            visible_enemies: self.enemies.iter().filter(|enemy| enemy.visible).count(),
            projectiles: self.projectiles.iter().map(Projectile::center).collect(),
            pickups_left: self.pickups.len(),
        };
        match serde_json::to_string(&dump) {
            Ok(json) => info!(dump = %json, "debug_dump"),
            Err(error) => warn!(error = %error, "debug_dump_failed"),
        }
    }

    /// Only enemies drawn last frame move; killed ones are dropped afterwards.
    fn update_enemies(&mut self, dt_seconds: f64) {
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.visible) {
            let rerolls = enemy.update(dt_seconds, &self.obstacles, &mut self.rng);
            if rerolls > 0 {
                debug!(
                    enemy_id = enemy.id.0,
                    heading = ?enemy.heading(),
                    "enemy_heading_changed"
                );
            }
        }
        self.enemies.retain(|enemy| !enemy.killed);
    }

    fn update_projectiles(&mut self) {
        let mut in_flight = std::mem::take(&mut self.projectiles);
        in_flight.retain_mut(|projectile| {
            projectile.advance();
            match projectile.check_hit(&self.obstacles, &self.enemies) {
                ProjectileHit::None => true,
                ProjectileHit::Obstacle => false,
                ProjectileHit::Enemy(id) => {
                    if let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == id) {
                        enemy.killed = true;
                    }
                    let remaining = self.enemies.iter().filter(|enemy| !enemy.killed).count();
                    info!(enemy_id = id.0, remaining, "enemy_killed");
                    false
                }
            }
        });
        self.projectiles = in_flight;
    }

    fn player_caught(&self) -> Option<EnemyId> {
        let player = self.player.rect();
        self.enemies
            .iter()
            .filter(|enemy| enemy.visible && !enemy.killed)
            .find(|enemy| enemy.rect().overlaps(&player))
            .map(|enemy| enemy.id)
    }

    fn collect_pickups(&mut self) {
        let player = self.player.rect();
        let before = self.pickups.len();
        self.pickups.retain(|pickup| !pickup.rect.overlaps(&player));
        for _ in self.pickups.len()..before {
            self.ammo += self.settings.ammo_per_pickup;
            info!(
                ammo = self.ammo,
                pickups_left = self.pickups.len(),
                "pickup_collected"
            );
        }
    }

    fn cull_projectiles(&mut self) {
        let camera = self.camera;
        self.projectiles
            .retain(|projectile| camera.is_on_screen(&projectile.rect()));
    }

    fn sprite_on_screen(&self, draw_list: &mut DrawList, sprite: SpriteRef, world: &Rect) {
        if self.camera.is_on_screen(world) {
            draw_list.blit(sprite, self.camera.apply(world));
        }
    }

    fn render_hud(&self, draw_list: &mut DrawList) {
        let right_column = self.viewport.width as i32 - HUD_RIGHT_COLUMN_INSET_PX;
        draw_list.text(self.settings.hud_title.as_str(), HUD_MARGIN_PX, HUD_MARGIN_PX);
        draw_list.text(self.settings.hud_subtitle.as_str(), right_column, HUD_MARGIN_PX);
        draw_list.text(
            format!("Bullets left: {}", self.ammo),
            right_column,
            self.viewport.height as i32 - HUD_BOTTOM_INSET_PX,
        );
    }
}

impl Scene for ArcadeScene {
    fn load(&mut self) {
        self.state = GameState::Running;
        self.player = Player::new(
            self.viewport.half(),
            self.settings.player_speed,
            self.settings.animate_fps,
        );
        self.enemies = self.spawn_enemies();
        self.obstacles = build_obstacles(&self.layout.obstacles, self.assets.obstacle_mask.clone());
        self.pickups = build_pickups(&self.layout.pickup_spawns, self.assets.pickup_size);
        self.projectiles.clear();
        self.camera = Camera::new(self.layout.width_px, self.layout.height_px, self.viewport);
        self.camera.update(&self.player.rect());
        self.ammo = self.settings.starting_ammo;
        self.aim_degrees = AIM_ORIGIN_DEGREES;
        self.last_cursor_px = None;
        self.cleared_logged = false;

        info!(
            map_width_px = self.layout.width_px,
            map_height_px = self.layout.height_px,
            obstacles = self.obstacles.len(),
            enemies = self.enemies.len(),
            pickups = self.pickups.len(),
            ammo = self.ammo,
            "scene_loaded"
        );
    }

    fn update(&mut self, dt_seconds: f64, input: &InputSnapshot) -> SceneCommand {
        if self.state != GameState::Running {
            return SceneCommand::Quit;
        }
        if input.quit_requested() {
            self.terminate(EndReason::Quit);
            return SceneCommand::Quit;
        }

        self.apply_input(input);
        self.update_enemies(dt_seconds);
        self.player.update(dt_seconds, &self.obstacles);
        self.update_projectiles();

        if let Some(enemy_id) = self.player_caught() {
            let (x, y) = self.player.rect().center();
            info!(enemy_id = enemy_id.0, x, y, "player_caught");
            self.terminate(EndReason::Caught);
            return SceneCommand::Quit;
        }

        self.collect_pickups();
        self.camera.update(&self.player.rect());
        self.cull_projectiles();

        if self.enemies.is_empty() && !self.cleared_logged {
            self.cleared_logged = true;
            info!(ammo = self.ammo, "all_enemies_cleared");
        }

        SceneCommand::None
    }

    fn render(&mut self, draw_list: &mut DrawList) {
        for tile in &self.layout.ground {
            let sprite = SpriteRef::new(sprite_keys::ground(tile.variant));
            self.sprite_on_screen(draw_list, sprite, &tile.rect);
        }
        for obstacle in &self.obstacles {
            self.sprite_on_screen(draw_list, SpriteRef::new(sprite_keys::BLOCK), &obstacle.rect);
        }
        for pickup in &self.pickups {
            self.sprite_on_screen(draw_list, SpriteRef::new(sprite_keys::STAR), &pickup.rect);
        }

        let player = self.player.rect();
        draw_list.blit_rotated(
            SpriteRef::frame(sprite_keys::PLAYER, self.player.body.animation.frame()),
            self.camera.apply(&player),
            (self.aim_degrees + PLAYER_ART_ROTATION_DEGREES) as f32,
        );

        let camera = self.camera;
        for enemy in &mut self.enemies {
            enemy.visible = camera.is_on_screen(&enemy.rect());
            if enemy.visible && !enemy.killed {
                draw_list.blit_rotated(
                    SpriteRef::frame(enemy.sprite, enemy.body.animation.frame()),
                    camera.apply(&enemy.rect()),
                    enemy.rotation_degrees(),
                );
            }
        }

        for projectile in &self.projectiles {
            let rect = projectile.rect();
            if camera.is_on_screen(&rect) {
                draw_list.blit_rotated(
                    SpriteRef::new(sprite_keys::BULLET),
                    camera.apply(&rect),
                    projectile.angle_degrees() as f32,
                );
            }
        }

        self.render_hud(draw_list);
    }

    fn unload(&mut self) {
        info!(
            state = ?self.state,
            ammo = self.ammo,
            enemies_left = self.enemies.len(),
            "scene_unloaded"
        );
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
