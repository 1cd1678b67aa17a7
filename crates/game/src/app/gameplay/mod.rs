mod actors;
mod projectile;
mod scene;
pub(crate) mod sprite_keys;
mod world;

pub(crate) use scene::{ArcadeScene, SceneAssets};
