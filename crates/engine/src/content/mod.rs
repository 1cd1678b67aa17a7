mod map;
mod sprites;

pub use map::{
    GroundTile, MapFormatError, MapLayout, ENEMY_CELL, GROUND_VARIANTS, OBSTACLE_CELL,
    PICKUP_CELL, PICKUP_INSET_PX,
};
pub use sprites::{AssetError, SpriteAtlas, SpriteSheet, SpriteSpec};
