use engine::{first_rect_hit, Rect, Solid};

use super::actors::{Enemy, EnemyId};

pub(crate) const PROJECTILE_SIZE_PX: i32 = 13;
/// Firing angle whose heading points along +x.
pub(crate) const AIM_ORIGIN_DEGREES: f64 = 135.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProjectileHit {
    None,
    Obstacle,
    Enemy(EnemyId),
}

/// Straight-line shot. The float centre is authoritative and the integer
/// rect follows it, truncated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Projectile {
    center: (f64, f64),
    velocity: (f64, f64),
    angle_degrees: f64,
    rect: Rect,
}

impl Projectile {
    /// `speed` is in pixels per tick.
    pub(crate) fn new(center: (i32, i32), angle_degrees: f64, speed: f64) -> Self {
        let heading = heading_radians(angle_degrees);
        let center = (f64::from(center.0), f64::from(center.1));
        Self {
            center,
            velocity: (speed * heading.cos(), speed * heading.sin()),
            angle_degrees,
            rect: rect_around(center),
        }
    }

    pub(crate) fn center(&self) -> (f64, f64) {
        self.center
    }

    pub(crate) fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn angle_degrees(&self) -> f64 {
        self.angle_degrees
    }

    pub(crate) fn advance(&mut self) {
        self.center.0 += self.velocity.0;
        self.center.1 += self.velocity.1;
        self.rect = rect_around(self.center);
    }

    pub(crate) fn check_hit<S: Solid>(&self, obstacles: &[S], enemies: &[Enemy]) -> ProjectileHit {
        if first_rect_hit(&self.rect, obstacles).is_some() {
            return ProjectileHit::Obstacle;
        }
        enemies
            .iter()
            .filter(|enemy| !enemy.killed)
            .find(|enemy| enemy.rect().overlaps(&self.rect))
            .map_or(ProjectileHit::None, |enemy| ProjectileHit::Enemy(enemy.id))
    }
}

/// Screen-space heading for a firing angle: `-(angle - 135)` degrees, so 135
/// points right and larger angles turn clockwise on screen.
pub(crate) fn heading_radians(angle_degrees: f64) -> f64 {
    -(angle_degrees - AIM_ORIGIN_DEGREES).to_radians()
}

pub(crate) fn aim_degrees(dx: f64, dy: f64) -> f64 {
    AIM_ORIGIN_DEGREES - dy.atan2(dx).to_degrees()
}

fn rect_around(center: (f64, f64)) -> Rect {
    Rect::centered_at(
        center.0 as i32,
        center.1 as i32,
        PROJECTILE_SIZE_PX,
        PROJECTILE_SIZE_PX,
    )
}
