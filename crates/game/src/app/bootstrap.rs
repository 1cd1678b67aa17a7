use engine::{
    resolve_app_paths, AssetError, LoopConfig, MapFormatError, MapLayout, Scene, SpriteAtlas,
    StartupError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{sprite_keys, ArcadeScene, SceneAssets};
use super::settings::{GameSettings, SettingsError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) atlas: SpriteAtlas,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Map(#[from] MapFormatError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_paths_resolved");

    let settings = GameSettings::load(&paths.assets_dir)?;
    let atlas = SpriteAtlas::load(&paths.sprites_dir, &sprite_keys::sprite_specs())?;
    let assets = scene_assets(&atlas)?;

    let map_path = paths.assets_dir.join(&settings.map_file);
    let mut ground_rng = StdRng::seed_from_u64(settings.ground_seed);
    let layout = MapLayout::load(&map_path, settings.tile_size, &mut ground_rng)?;

    let enemy_seed = settings.enemy_seed.unwrap_or_else(rand::random);
    info!(
        map = %map_path.display(),
        sprites = atlas.len(),
        ground_seed = settings.ground_seed,
        enemy_seed,
        "content_loaded"
    );

    let config = settings.loop_config.clone();
    let scene = ArcadeScene::new(
        settings,
        config.viewport(),
        layout,
        assets,
        StdRng::seed_from_u64(enemy_seed),
    );

    Ok(AppWiring {
        config,
        atlas,
        scene: Box::new(scene),
    })
}

fn scene_assets(atlas: &SpriteAtlas) -> Result<SceneAssets, AssetError> {
    let block = atlas.require(sprite_keys::BLOCK)?;
    let obstacle_mask = block.frame_mask(0).ok_or(AssetError::InvalidSheet {
        width: block.width(),
        height: block.height(),
        frames: block.frame_count(),
    })?;
    let star = atlas.require(sprite_keys::STAR)?;
    Ok(SceneAssets {
        obstacle_mask,
        pickup_size: (star.frame_width() as i32, star.height() as i32),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use engine::SpriteSheet;

    use super::*;

    fn solid_sheet(width: u32, height: u32, alpha: u8) -> SpriteSheet {
        let rgba = [255, 255, 255, alpha].repeat((width * height) as usize);
        SpriteSheet::from_rgba(width, height, 1, rgba).expect("sheet")
    }

    #[test]
    fn scene_assets_read_block_mask_and_star_size() {
        let mut atlas = SpriteAtlas::default();
        atlas.insert(sprite_keys::BLOCK, solid_sheet(50, 50, 255));
        atlas.insert(sprite_keys::STAR, solid_sheet(10, 12, 255));

        let assets = scene_assets(&atlas).expect("assets");
        assert_eq!(assets.obstacle_mask.count(), 2500);
        assert_eq!(assets.pickup_size, (10, 12));
    }

    #[test]
    fn missing_block_sprite_is_reported() {
        let mut atlas = SpriteAtlas::default();
        atlas.insert(sprite_keys::STAR, solid_sheet(10, 10, 255));
        let error = scene_assets(&atlas).expect_err("no block");
        assert!(matches!(error, AssetError::UnknownSprite { .. }));
    }
}
