use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::collision::Mask;
use crate::geometry::Rect;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("sprite key '{key}' is invalid: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("sprite '{key}' is missing at {path}: {source}")]
    ResourceMissing {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sprite '{key}' at {path} could not be decoded: {source}")]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite sheet {width}x{height} cannot be split into {frames} frames")]
    InvalidSheet { width: u32, height: u32, frames: u32 },
    #[error("sprite '{key}' was not loaded")]
    UnknownSprite { key: String },
}

/// What to load: `assets/sprites/<key>.png` cut horizontally into `frames`
/// equal frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSpec {
    pub key: &'static str,
    pub frames: u32,
}

impl SpriteSpec {
    pub const fn single(key: &'static str) -> Self {
        Self { key, frames: 1 }
    }

    pub const fn strip(key: &'static str, frames: u32) -> Self {
        Self { key, frames }
    }
}

#[derive(Debug, Clone)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    frame_count: u32,
    rgba: Vec<u8>,
}

impl SpriteSheet {
    pub fn from_rgba(
        width: u32,
        height: u32,
        frame_count: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, AssetError> {
        let invalid = AssetError::InvalidSheet {
            width,
            height,
            frames: frame_count,
        };
        if frame_count == 0 || width == 0 || height == 0 || width % frame_count != 0 {
            return Err(invalid);
        }
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(invalid);
        }
        Ok(Self {
            width,
            height,
            frame_count,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_width(&self) -> u32 {
        self.width / self.frame_count
    }

    pub fn frame_rect(&self, index: u32) -> Option<Rect> {
        if index >= self.frame_count {
            return None;
        }
        let frame_width = self.frame_width() as i32;
        Some(Rect::new(
            index as i32 * frame_width,
            0,
            frame_width,
            self.height as i32,
        ))
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn frame_mask(&self, index: u32) -> Option<Mask> {
        let source = self.frame_rect(index)?;
        let mut rgba = Vec::with_capacity(source.width as usize * source.height as usize * 4);
        for y in source.top()..source.bottom() {
            for x in source.left()..source.right() {
                rgba.extend_from_slice(&self.pixel(x, y).unwrap_or_default());
            }
        }
        Some(Mask::from_rgba_alpha(
            source.width as u32,
            source.height as u32,
            &rgba,
        ))
    }
}

#[derive(Debug, Default)]
pub struct SpriteAtlas {
    sheets: HashMap<&'static str, SpriteSheet>,
}

impl SpriteAtlas {
    pub fn load(sprites_dir: &Path, specs: &[SpriteSpec]) -> Result<Self, AssetError> {
        let mut atlas = Self::default();
        for spec in specs {
            let path = sprite_path(sprites_dir, spec.key)?;
            let sheet = load_sheet(spec, &path)?;
            debug!(
                sprite_key = spec.key,
                width = sheet.width(),
                height = sheet.height(),
                frames = sheet.frame_count(),
                "sprite_loaded"
            );
            atlas.insert(spec.key, sheet);
        }
        Ok(atlas)
    }

    pub fn insert(&mut self, key: &'static str, sheet: SpriteSheet) {
        self.sheets.insert(key, sheet);
    }

    pub fn get(&self, key: &str) -> Option<&SpriteSheet> {
        self.sheets.get(key)
    }

    pub fn require(&self, key: &str) -> Result<&SpriteSheet, AssetError> {
        self.get(key).ok_or_else(|| AssetError::UnknownSprite {
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

fn sprite_path(sprites_dir: &Path, key: &str) -> Result<PathBuf, AssetError> {
    validate_sprite_key(key).map_err(|reason| AssetError::InvalidKey {
        key: key.to_string(),
        reason,
    })?;
    Ok(sprites_dir.join(format!("{key}.png")))
}

fn validate_sprite_key(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("must not be empty");
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
    {
        return Err("only lowercase ascii letters, digits and '_' are allowed");
    }
    Ok(())
}

fn load_sheet(spec: &SpriteSpec, path: &Path) -> Result<SpriteSheet, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::ResourceMissing {
        key: spec.key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        key: spec.key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    SpriteSheet::from_rgba(image.width(), image.height(), spec.frames, image.into_raw())
}
