//! Image asset catalog.
//!
//! Every image the HUD can show is named by an [`AssetId`] and loaded once
//! when the catalog is built. Decoding uses the `image` crate; each image is
//! resized to its on-screen size up front so the per-frame path only blits.
//!
//! A missing or undecodable file is logged and left out of the catalog. The
//! rasterizer skips images it cannot find, so the dependent visual simply
//! disappears while the rest of the frame still renders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use thiserror::Error;
use tracing::{debug, warn};

use crate::colors::Rgba;
use crate::config::IMG_SIZE;
use crate::personality::Personality;

/// Number of selectable steering-wheel icons.
pub const WHEEL_VARIANTS: u8 = 5;

/// Distinct images in one turn-signal sweep (played twice per cycle).
pub const SIGNAL_IMAGES: u8 = 4;

/// Turn-signal sprite size.
pub const SIGNAL_WIDTH: u32 = 360;
pub const SIGNAL_HEIGHT: u32 = 480;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetId {
    DriverFace,
    CompassInner,
    Experimental,
    /// Steering wheel icon variant; 0 is the stock wheel.
    Wheel(u8),
    Personality(Personality),
    /// Turn-signal sweep image, `0..SIGNAL_IMAGES`.
    Signal(u8),
    /// Red frame shown instead of the sweep when the blind spot is occupied.
    SignalBlocked,
}

impl AssetId {
    /// The complete catalog, in load order.
    pub fn all() -> Vec<Self> {
        let mut ids = vec![Self::DriverFace, Self::CompassInner, Self::Experimental];
        ids.extend((0..WHEEL_VARIANTS).map(Self::Wheel));
        ids.extend(Personality::ALL.iter().copied().map(Self::Personality));
        ids.extend((0..SIGNAL_IMAGES).map(Self::Signal));
        ids.push(Self::SignalBlocked);
        ids
    }

    /// File name relative to the asset directory.
    pub fn file_name(self) -> String {
        match self {
            Self::DriverFace => "img_driver_face.png".into(),
            Self::CompassInner => "images/compass_inner.png".into(),
            Self::Experimental => "img_experimental.png".into(),
            Self::Wheel(0) => "img_chffr_wheel.png".into(),
            Self::Wheel(1) => "lexus.png".into(),
            Self::Wheel(2) => "toyota.png".into(),
            Self::Wheel(3) => "frog.png".into(),
            Self::Wheel(_) => "rocket.png".into(),
            Self::Personality(p) => format!("{}.png", p.label().to_ascii_lowercase()),
            Self::Signal(i) => format!("images/frog_turn_signal_{}.png", i + 1),
            Self::SignalBlocked => "images/frog_turn_signal_1_red.png".into(),
        }
    }

    /// Size the image is scaled to at load time, `None` keeps the file's size.
    pub const fn load_size(self) -> Option<(u32, u32)> {
        match self {
            Self::DriverFace => Some((IMG_SIZE + 5, IMG_SIZE + 5)),
            Self::CompassInner | Self::Experimental | Self::Wheel(_) => Some((IMG_SIZE, IMG_SIZE)),
            Self::Signal(_) | Self::SignalBlocked => Some((SIGNAL_WIDTH, SIGNAL_HEIGHT)),
            Self::Personality(_) => None,
        }
    }
}

// =============================================================================
// Sprite
// =============================================================================

/// Decoded RGBA image.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Sprite {
    /// Build from row-major pixels; `None` when the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        (pixels.len() == (width as usize) * (height as usize)).then_some(Self { width, height, pixels })
    }

    /// Uniformly colored sprite.
    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        Self { width, height, pixels: vec![color; (width as usize) * (height as usize)] }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, `None` outside the image.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    fn decode(path: &Path, size: Option<(u32, u32)>) -> Result<Self, AssetError> {
        let img = image::open(path).map_err(|source| AssetError::Decode { path: path.to_path_buf(), source })?;
        let img = match size {
            Some((w, h)) if img.width() != w || img.height() != h => img.resize_exact(w, h, FilterType::Lanczos3),
            _ => img,
        };
        let rgba = img.to_rgba8();
        let pixels = rgba.pixels().map(|p| Rgba::new(p[0], p[1], p[2], p[3])).collect();
        Ok(Self { width: rgba.width(), height: rgba.height(), pixels })
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// =============================================================================
// Catalog
// =============================================================================

/// Loaded images keyed by [`AssetId`].
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    sprites: HashMap<AssetId, Sprite>,
}

impl AssetCatalog {
    /// Catalog with no images; every image draw is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every known asset from `dir`, skipping the ones that fail.
    pub fn load_dir(dir: &Path) -> Self {
        let mut catalog = Self::empty();
        let mut missing = 0usize;
        for id in AssetId::all() {
            match Self::load_one(dir, id) {
                Ok(sprite) => {
                    debug!(?id, w = sprite.width, h = sprite.height, "asset loaded");
                    catalog.sprites.insert(id, sprite);
                }
                Err(err) => {
                    warn!(?id, %err, "asset unavailable, visual will be omitted");
                    missing += 1;
                }
            }
        }
        if missing > 0 {
            warn!(missing, loaded = catalog.len(), "asset catalog incomplete");
        }
        catalog
    }

    fn load_one(dir: &Path, id: AssetId) -> Result<Sprite, AssetError> {
        let path = dir.join(id.file_name());
        if !path.is_file() {
            return Err(AssetError::NotFound(path));
        }
        Sprite::decode(&path, id.load_size())
    }

    pub fn insert(&mut self, id: AssetId, sprite: Sprite) {
        self.sprites.insert(id, sprite);
    }

    #[inline]
    pub fn get(&self, id: AssetId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: AssetId) -> bool {
        self.sprites.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
