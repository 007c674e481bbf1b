//! Image sources for `img` elements: `data:` URLs and local files

use crate::error::{IrshadError, Result};
use base64::Engine;
use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    /// Directory relative `src` values are resolved against
    base_dir: Option<PathBuf>,
}

impl AssetStore {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Decode the image behind `src`
    pub fn load(&self, src: &str) -> Result<RgbaImage> {
        let bytes = if let Some(rest) = src.strip_prefix("data:") {
            decode_data_url(rest)?
        } else {
            let path = self.resolve(src);
            std::fs::read(&path)
                .map_err(|e| IrshadError::Asset(format!("{}: {}", path.display(), e)))?
        };

        let img = image::load_from_memory(&bytes)
            .map_err(|e| IrshadError::Asset(format!("{}: {}", short(src), e)))?;
        Ok(img.to_rgba8())
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let src = src.strip_prefix("file://").unwrap_or(src);
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// `image/png;base64,....` → bytes
fn decode_data_url(rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| IrshadError::Asset("data URL without payload".into()))?;
    if !meta.ends_with(";base64") {
        return Err(IrshadError::Asset(format!("unsupported data URL encoding: {}", meta)));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| IrshadError::Asset(format!("base64: {}", e)))
}

fn short(src: &str) -> &str {
    match src.char_indices().nth(48) {
        Some((i, _)) => &src[..i],
        None => src,
    }
}
