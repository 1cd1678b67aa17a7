use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use crate::geometry::Rect;

pub const OBSTACLE_CELL: char = '#';
pub const ENEMY_CELL: char = 'E';
pub const PICKUP_CELL: char = 'S';
pub const GROUND_VARIANTS: u8 = 6;
pub const PICKUP_INSET_PX: i32 = 20;

#[derive(Debug, Error)]
pub enum MapFormatError {
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map has no rows")]
    Empty,
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundTile {
    pub rect: Rect,
    /// 1-based sprite variant in `1..=GROUND_VARIANTS`.
    pub variant: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapLayout {
    pub tile_size: i32,
    pub obstacles: Vec<Rect>,
    /// Tile top-left corners; enemies are centred on these points.
    pub enemy_spawns: Vec<(i32, i32)>,
    pub pickup_spawns: Vec<(i32, i32)>,
    pub ground: Vec<GroundTile>,
    pub width_px: i32,
    pub height_px: i32,
}

impl MapLayout {
    pub fn load<R: Rng>(
        path: &Path,
        tile_size: i32,
        rng: &mut R,
    ) -> Result<Self, MapFormatError> {
        let text = fs::read_to_string(path).map_err(|source| MapFormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, tile_size, rng)
    }

    /// `#` is an obstacle, `E` an enemy spawn, `S` a pickup spawn and any other
    /// character plain ground. Spawn cells get ground underneath them too.
    /// Ground variants are drawn from `rng` in row-major order.
    pub fn parse<R: Rng>(
        text: &str,
        tile_size: i32,
        rng: &mut R,
    ) -> Result<Self, MapFormatError> {
        if tile_size <= 0 {
            return Err(MapFormatError::InvalidTileSize(tile_size));
        }

        let mut layout = MapLayout {
            tile_size,
            ..MapLayout::default()
        };
        let mut rows = 0;
        let mut widest = 0;

        for (row, line) in text.lines().enumerate() {
            let row = row as i32;
            let mut columns = 0;
            for (column, cell) in line.chars().enumerate() {
                let column = column as i32;
                let x = column * tile_size;
                let y = row * tile_size;
                columns = column + 1;
                match cell {
                    OBSTACLE_CELL => {
                        layout.obstacles.push(Rect::new(x, y, tile_size, tile_size));
                        continue;
                    }
                    ENEMY_CELL => layout.enemy_spawns.push((x, y)),
                    PICKUP_CELL => layout
                        .pickup_spawns
                        .push((x + PICKUP_INSET_PX, y + PICKUP_INSET_PX)),
                    _ => {}
                }
                layout.ground.push(GroundTile {
                    rect: Rect::new(x, y, tile_size, tile_size),
                    variant: rng.gen_range(1..=GROUND_VARIANTS),
                });
            }
            widest = widest.max(columns);
            rows = row + 1;
        }

        if rows == 0 {
            return Err(MapFormatError::Empty);
        }
        layout.width_px = widest * tile_size;
        layout.height_px = rows * tile_size;
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const SAMPLE: &str = "####\n#E.#\n#.S.\n####\n";

    #[test]
    fn parses_cells_into_world_positions() {
        let mut rng = StdRng::seed_from_u64(3);
        let layout = MapLayout::parse(SAMPLE, 50, &mut rng).expect("parse");

        assert_eq!(layout.obstacles.len(), 4 + 2 + 1 + 4);
        assert!(layout.obstacles.contains(&Rect::new(0, 50, 50, 50)));
        assert_eq!(layout.enemy_spawns, vec![(50, 50)]);
        assert_eq!(layout.pickup_spawns, vec![(120, 120)]);
        assert_eq!(layout.ground.len(), 5);
        assert_eq!((layout.width_px, layout.height_px), (200, 200));
    }

    #[test]
    fn ground_variants_are_seeded_and_in_range() {
        let first = MapLayout::parse(SAMPLE, 50, &mut StdRng::seed_from_u64(3)).expect("parse");
        let second = MapLayout::parse(SAMPLE, 50, &mut StdRng::seed_from_u64(3)).expect("parse");
        assert_eq!(first.ground, second.ground);
        assert!(first
            .ground
            .iter()
            .all(|tile| (1..=GROUND_VARIANTS).contains(&tile.variant)));
    }

    #[test]
    fn width_uses_widest_row_and_ignores_line_endings() {
        let text = "..\r\n.....\r\n.\r\n";
        let layout =
            MapLayout::parse(text, 50, &mut StdRng::seed_from_u64(1)).expect("parse");
        assert_eq!(layout.width_px, 250);
        assert_eq!(layout.height_px, 150);
        assert_eq!(layout.ground.len(), 8);
    }

    #[test]
    fn empty_map_is_a_format_error() {
        let error = MapLayout::parse("", 50, &mut StdRng::seed_from_u64(1)).expect_err("empty");
        assert!(matches!(error, MapFormatError::Empty));
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        let error =
            MapLayout::parse(SAMPLE, 0, &mut StdRng::seed_from_u64(1)).expect_err("tile size");
        assert!(matches!(error, MapFormatError::InvalidTileSize(0)));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("map.txt");
        let error =
            MapLayout::load(&path, 50, &mut StdRng::seed_from_u64(1)).expect_err("missing");
        assert!(matches!(error, MapFormatError::Read { path: ref p, .. } if p == &path));

        fs::write(&path, SAMPLE).expect("write map");
        let layout = MapLayout::load(&path, 50, &mut StdRng::seed_from_u64(1)).expect("load");
        assert_eq!(layout.enemy_spawns.len(), 1);
    }
}
