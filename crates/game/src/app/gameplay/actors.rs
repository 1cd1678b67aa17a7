use engine::{
    advance, resolve_axis, Axis, AxisResolution, Body, Direction, Intent, Mask, Rect, Remainder,
    Solid,
};
use rand::Rng;
use serde::Serialize;

pub(crate) const ACTOR_SIZE_PX: i32 = 50;
pub(crate) const WALK_FRAMES: u32 = 4;
pub(crate) const PLAYER_MASK_INSET: Rect = Rect::new(5, 5, 40, 40);

/// Walk-cycle frame counter. Time is accumulated simulation time so the
/// cycle speed does not depend on how often frames are rendered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Animation {
    frame: u32,
    frame_count: u32,
    frame_seconds: f64,
    since_advance: f64,
    shown_facing: Direction,
}

impl Animation {
    pub(crate) fn new(frame_count: u32, fps: f64, facing: Direction) -> Self {
        let frame_seconds = if fps.is_finite() && fps > 0.0 {
            1.0 / fps
        } else {
            f64::INFINITY
        };
        Self {
            frame: 0,
            frame_count: frame_count.max(1),
            frame_seconds,
            since_advance: 0.0,
            shown_facing: facing,
        }
    }

    pub(crate) fn frame(&self) -> u32 {
        self.frame
    }

    pub(crate) fn elapse(&mut self, dt_seconds: f64) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.since_advance += dt_seconds;
        }
    }

    pub(crate) fn refresh(&mut self, facing: Direction) {
        let facing_changed = facing != self.shown_facing;
        self.shown_facing = facing;
        if facing_changed || self.since_advance > self.frame_seconds {
            self.frame = (self.frame + 1) % self.frame_count;
            self.since_advance = 0.0;
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ActorBody {
    pub(crate) rect: Rect,
    pub(crate) remainder: Remainder,
    pub(crate) speed: f64,
    pub(crate) facing: Direction,
    pub(crate) animation: Animation,
    mask: Mask,
}

impl ActorBody {
    pub(crate) fn new(
        rect: Rect,
        speed: f64,
        mask: Mask,
        facing: Direction,
        animate_fps: f64,
    ) -> Self {
        Self {
            rect,
            remainder: Remainder::default(),
            speed,
            facing,
            animation: Animation::new(WALK_FRAMES, animate_fps, facing),
            mask,
        }
    }

    pub(crate) fn step<S: Solid>(
        &mut self,
        intent: Intent,
        dt_seconds: f64,
        solids: &[S],
    ) -> Option<[AxisResolution; 2]> {
        self.animation.elapse(dt_seconds);
        let displacement = advance(intent, self.speed, dt_seconds, &mut self.remainder);
        if displacement.is_zero() {
            return None;
        }
        self.animation.refresh(self.facing);
        Some(Axis::BOTH.map(|axis| {
            resolve_axis(
                Body {
                    rect: &mut self.rect,
                    mask: &self.mask,
                    remainder: &mut self.remainder,
                },
                axis,
                displacement.get(axis),
                solids,
            )
        }))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) body: ActorBody,
    direction_stack: Vec<Direction>,
}

impl Player {
    pub(crate) fn new(center: (i32, i32), speed: f64, animate_fps: f64) -> Self {
        let rect = Rect::centered_at(center.0, center.1, ACTOR_SIZE_PX, ACTOR_SIZE_PX);
        let mask = Mask::with_solid_rect(
            ACTOR_SIZE_PX as u32,
            ACTOR_SIZE_PX as u32,
            PLAYER_MASK_INSET,
        );
        Self {
            body: ActorBody::new(rect, speed, mask, Direction::Right, animate_fps),
            direction_stack: Vec::new(),
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.body.rect
    }

    pub(crate) fn facing(&self) -> Direction {
        self.body.facing
    }

    pub(crate) fn held_directions(&self) -> &[Direction] {
        &self.direction_stack
    }

    pub(crate) fn press(&mut self, direction: Direction) {
        self.direction_stack.retain(|held| *held != direction);
        self.direction_stack.push(direction);
        self.body.facing = direction;
    }

    /// Drops `direction`; facing falls back to the newest still-held key and
    /// is kept as-is once nothing is held.
    pub(crate) fn release(&mut self, direction: Direction) {
        self.direction_stack.retain(|held| *held != direction);
        if let Some(top) = self.direction_stack.last() {
            self.body.facing = *top;
        }
    }

    pub(crate) fn intent(&self) -> Intent {
        Intent::from_directions(self.direction_stack.iter().copied())
    }

    pub(crate) fn update<S: Solid>(&mut self, dt_seconds: f64, obstacles: &[S]) -> bool {
        let intent = self.intent();
        self.body.step(intent, dt_seconds, obstacles).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub(crate) struct EnemyId(pub(crate) u32);

#[derive(Debug, Clone)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) body: ActorBody,
    pub(crate) sprite: &'static str,
    pub(crate) visible: bool,
    pub(crate) killed: bool,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        center: (i32, i32),
        speed: f64,
        animate_fps: f64,
        sprite: &'static str,
    ) -> Self {
        let rect = Rect::centered_at(center.0, center.1, ACTOR_SIZE_PX, ACTOR_SIZE_PX);
        let mask = Mask::filled(ACTOR_SIZE_PX as u32, ACTOR_SIZE_PX as u32);
        Self {
            id,
            body: ActorBody::new(rect, speed, mask, Direction::Down, animate_fps),
            sprite,
            visible: true,
            killed: false,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.body.rect
    }

    pub(crate) fn heading(&self) -> Direction {
        self.body.facing
    }

    /// Walks along the current heading. Every stepback against an obstacle
    /// picks a new heading, used from the next tick on. Returns how many
    /// times the heading was re-rolled.
    pub(crate) fn update<S: Solid, R: Rng>(
        &mut self,
        dt_seconds: f64,
        obstacles: &[S],
        rng: &mut R,
    ) -> u32 {
        let intent = self.heading().intent();
        let Some(resolutions) = self.body.step(intent, dt_seconds, obstacles) else {
            return 0;
        };
        let stepbacks: u32 = resolutions.iter().map(|axis| axis.stepbacks).sum();
        for _ in 0..stepbacks {
            self.reselect_heading(rng);
        }
        stepbacks
    }

    pub(crate) fn reselect_heading<R: Rng>(&mut self, rng: &mut R) {
        let current = self.heading();
        let others: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| *direction != current)
            .collect();
        self.body.facing = others[rng.gen_range(0..others.len())];
    }

    /// Sprite rotation for the heading; the enemy art faces up.
    pub(crate) fn rotation_degrees(&self) -> f32 {
        match self.heading() {
            Direction::Up => 0.0,
            Direction::Left => 90.0,
            Direction::Down => 180.0,
            Direction::Right => 270.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct Wall {
        rect: Rect,
        mask: Mask,
    }

    impl Wall {
        fn tile(x: i32, y: i32) -> Self {
            Self {
                rect: Rect::new(x, y, 50, 50),
                mask: Mask::filled(50, 50),
            }
        }
    }

    impl Solid for Wall {
        fn bounds(&self) -> Rect {
            self.rect
        }

        fn mask(&self) -> &Mask {
            &self.mask
        }
    }

    const NO_WALLS: [Wall; 0] = [];

    #[test]
    fn player_moves_190_pixels_in_ten_tenth_second_ticks() {
        // 10 x 5 tile map of open ground: nothing to collide with.
        let mut player = Player::new((25, 25), 190.0, 7.0);
        assert_eq!(player.rect().x, 0);
        player.press(Direction::Right);
        for _ in 0..10 {
            player.update(0.1, &NO_WALLS);
        }
        assert_eq!(player.rect().x, 190);
        assert_eq!(player.rect().y, 0);
        assert!(player.body.remainder.x.abs() < 1e-6);
    }

    #[test]
    fn direction_stack_falls_back_to_previous_key() {
        let mut player = Player::new((100, 100), 190.0, 7.0);
        player.press(Direction::Left);
        player.press(Direction::Right);
        assert_eq!(player.facing(), Direction::Right);
        assert!(player.intent().is_zero());

        player.release(Direction::Right);
        assert_eq!(player.facing(), Direction::Left);
        assert_eq!(player.intent(), Direction::Left.intent());
    }

    #[test]
    fn repressing_moves_direction_to_top_without_duplicates() {
        let mut player = Player::new((100, 100), 190.0, 7.0);
        player.press(Direction::Up);
        player.press(Direction::Left);
        player.press(Direction::Up);
        assert_eq!(player.held_directions(), &[Direction::Left, Direction::Up]);
        assert_eq!(player.facing(), Direction::Up);
    }

    #[test]
    fn empty_stack_keeps_last_facing() {
        let mut player = Player::new((100, 100), 190.0, 7.0);
        player.press(Direction::Down);
        player.release(Direction::Down);
        player.release(Direction::Left);
        assert_eq!(player.facing(), Direction::Down);
        assert!(player.intent().is_zero());
    }

    #[test]
    fn player_mask_inset_lets_sprite_edge_overlap_wall() {
        let walls = [Wall::tile(100, 0)];
        let mut player = Player::new((25, 25), 190.0, 7.0);
        player.press(Direction::Right);
        for _ in 0..60 {
            player.update(1.0 / 60.0, &walls);
        }
        // The solid 40 px sits 5 px inside the 50 px sprite.
        assert_eq!(player.rect().x, 55);
    }

    #[test]
    fn diagonal_into_wall_slides_along_free_axis() {
        let walls = [Wall::tile(50, 0), Wall::tile(50, 50), Wall::tile(50, 100)];
        let mut player = Player::new((0, 25), 190.0, 7.0);
        player.press(Direction::Right);
        player.press(Direction::Down);
        for _ in 0..30 {
            player.update(1.0 / 60.0, &walls);
        }
        // Mask right edge (x + 45) comes to rest flush with the wall at 50.
        assert_eq!(player.rect().x, 5);
        assert!(player.rect().y > 50, "y = {}", player.rect().y);
    }

    #[test]
    fn enemy_rerolls_heading_on_stepback() {
        let walls = [Wall::tile(0, 100)];
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = Enemy::new(EnemyId(1), (25, 50), 100.0, 7.0, "enemy1");
        assert_eq!(enemy.heading(), Direction::Down);

        let mut rerolls = 0;
        for _ in 0..30 {
            rerolls += enemy.update(1.0 / 60.0, &walls, &mut rng);
            if rerolls > 0 {
                break;
            }
        }
        assert!(rerolls > 0);
        assert_ne!(enemy.heading(), Direction::Down);
        assert!(!enemy.rect().overlaps(&walls[0].rect));
    }

    #[test]
    fn reselection_never_keeps_current_heading() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut enemy = Enemy::new(EnemyId(1), (0, 0), 100.0, 7.0, "enemy1");
        for _ in 0..200 {
            let before = enemy.heading();
            enemy.reselect_heading(&mut rng);
            assert_ne!(enemy.heading(), before);
        }
    }

    #[test]
    fn enemy_rotation_follows_heading() {
        let mut enemy = Enemy::new(EnemyId(1), (0, 0), 100.0, 7.0, "enemy2");
        assert_eq!(enemy.rotation_degrees(), 180.0);
        enemy.body.facing = Direction::Right;
        assert_eq!(enemy.rotation_degrees(), 270.0);
    }

    #[test]
    fn animation_advances_on_timer_or_facing_change() {
        let mut animation = Animation::new(4, 7.0, Direction::Right);
        animation.elapse(0.1);
        animation.refresh(Direction::Right);
        assert_eq!(animation.frame(), 0);

        animation.elapse(0.05);
        animation.refresh(Direction::Right);
        assert_eq!(animation.frame(), 1);

        animation.refresh(Direction::Up);
        assert_eq!(animation.frame(), 2);
        animation.refresh(Direction::Up);
        assert_eq!(animation.frame(), 2);
    }

    #[test]
    fn animation_frame_wraps() {
        let mut animation = Animation::new(4, 7.0, Direction::Right);
        for expected in [1, 2, 3, 0, 1] {
            animation.elapse(0.2);
            animation.refresh(Direction::Right);
            assert_eq!(animation.frame(), expected);
        }
    }
}
