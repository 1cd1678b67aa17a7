use engine::{SpriteSpec, GROUND_VARIANTS};

use super::actors::WALK_FRAMES;

pub(crate) const PLAYER: &str = "player";
pub(crate) const ENEMY_SPRITES: [&str; 3] = ["enemy1", "enemy2", "enemy3"];
pub(crate) const BLOCK: &str = "block";
pub(crate) const STAR: &str = "star";
pub(crate) const BULLET: &str = "bullet";
pub(crate) const GROUND: [&str; GROUND_VARIANTS as usize] = [
    "ground1", "ground2", "ground3", "ground4", "ground5", "ground6",
];

pub(crate) fn sprite_specs() -> Vec<SpriteSpec> {
    let mut specs = vec![SpriteSpec::strip(PLAYER, WALK_FRAMES)];
    specs.extend(
        ENEMY_SPRITES
            .into_iter()
            .map(|key| SpriteSpec::strip(key, WALK_FRAMES)),
    );
    specs.extend(
        [BLOCK, STAR, BULLET]
            .into_iter()
            .chain(GROUND)
            .map(SpriteSpec::single),
    );
    specs
}

/// Sheet key for a 1-based ground variant; out-of-range variants wrap.
pub(crate) fn ground(variant: u8) -> &'static str {
    let index = usize::from(variant.max(1) - 1) % GROUND.len();
    GROUND[index]
}
