//! Arabic font registry
//!
//! The registry is created once, handed to the exporter, and loads its font
//! on first use. Loading never fails the export: without a usable font the
//! handle carries no data, capture falls back to fixed metrics and vector
//! text to Helvetica. RTL stays enabled either way.

use crate::error::{IrshadError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use walkdir::WalkDir;

/// Font files tried when none is configured, in order
const ARABIC_FONT_CANDIDATES: &[&str] = &[
    "Amiri-Regular.ttf",
    "NotoNaskhArabic-Regular.ttf",
    "NotoSansArabic-Regular.ttf",
    "DejaVuSans.ttf",
    "arial.ttf",
    "Arial Unicode.ttf",
];

/// Loaded font, shared by the rasterizer and the PDF accumulator
#[derive(Debug, Clone)]
pub struct FontHandle {
    data: Option<Arc<Vec<u8>>>,
    source: Option<PathBuf>,
    rtl: bool,
}

impl FontHandle {
    /// Handle with no font data
    pub fn fallback() -> Self {
        Self {
            data: None,
            source: None,
            rtl: true,
        }
    }

    /// Wrap font bytes; `None` when they do not parse as a font
    pub fn from_bytes(data: Vec<u8>, source: Option<PathBuf>) -> Option<Self> {
        rustybuzz::Face::from_slice(&data, 0)?;
        Some(Self {
            data: Some(Arc::new(data)),
            source,
            rtl: true,
        })
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref().map(Vec::as_slice)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_fallback(&self) -> bool {
        self.data.is_none()
    }

    pub fn rtl(&self) -> bool {
        self.rtl
    }
}

pub struct FontRegistry {
    path: Option<PathBuf>,
    search_system: bool,
    handle: OnceCell<FontHandle>,
}

impl FontRegistry {
    /// Registry for `path`, or for the first Arabic-capable system font
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            search_system: true,
            handle: OnceCell::new(),
        }
    }

    /// Registry that never looks beyond `path`
    pub fn with_path_only(path: Option<PathBuf>) -> Self {
        Self {
            path,
            search_system: false,
            handle: OnceCell::new(),
        }
    }

    /// Registry already holding `handle`
    pub fn preloaded(handle: FontHandle) -> Self {
        Self {
            path: None,
            search_system: false,
            handle: OnceCell::new_with(Some(handle)),
        }
    }

    /// Load on first call, then return the same handle
    pub async fn get(&self) -> &FontHandle {
        self.handle.get_or_init(|| self.load()).await
    }

    async fn load(&self) -> FontHandle {
        let mut candidates: Vec<PathBuf> = self.path.iter().cloned().collect();
        if self.search_system && self.path.is_none() {
            candidates.extend(find_system_font());
        }

        for path in candidates {
            match tokio::fs::read(&path).await {
                Ok(bytes) => match FontHandle::from_bytes(bytes, Some(path.clone())) {
                    Some(handle) => {
                        log::info!("font loaded: {}", path.display());
                        return handle;
                    }
                    None => log::warn!("not a usable font: {}", path.display()),
                },
                Err(e) => log::warn!("font {} unreadable: {}", path.display(), e),
            }
        }

        log::warn!("no Arabic font available, using fallback metrics");
        FontHandle::fallback()
    }
}

/// Reject a font file that cannot be read or shaped with
pub fn check_font_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).map_err(|_| IrshadError::FileNotFound(path.display().to_string()))?;
    match rustybuzz::Face::from_slice(&bytes, 0) {
        Some(_) => Ok(()),
        None => Err(IrshadError::Font(format!("{}: not a TrueType/OpenType font", path.display()))),
    }
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
    }

    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".fonts"));
    }
    dirs
}

fn find_system_font() -> Option<PathBuf> {
    let files: Vec<PathBuf> = system_font_dirs()
        .into_iter()
        .filter(|d| d.is_dir())
        .flat_map(|d| {
            WalkDir::new(d)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
        })
        .collect();

    ARABIC_FONT_CANDIDATES.iter().find_map(|name| {
        files
            .iter()
            .find(|p| {
                p.file_name()
                    .map(|f| f.to_string_lossy().eq_ignore_ascii_case(name))
                    .unwrap_or(false)
            })
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_font_falls_back() {
        let registry = FontRegistry::with_path_only(Some(PathBuf::from("/nonexistent/font.ttf")));
        let handle = registry.get().await;
        assert!(handle.is_fallback());
        assert!(handle.rtl());
    }

    #[tokio::test]
    async fn test_garbage_font_falls_back() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").expect("write");

        let registry = FontRegistry::with_path_only(Some(path));
        assert!(registry.get().await.is_fallback());
    }

    #[test]
    fn test_check_font_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("notes.ttf");
        std::fs::write(&path, b"plain text").expect("write");

        assert!(matches!(check_font_file(&path), Err(IrshadError::Font(_))));
        assert!(matches!(
            check_font_file(&dir.path().join("missing.ttf")),
            Err(IrshadError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_loaded_once() {
        let registry = FontRegistry::with_path_only(None);
        let first = registry.get().await as *const FontHandle;
        let second = registry.get().await as *const FontHandle;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_preloaded() {
        let registry = FontRegistry::preloaded(FontHandle::fallback());
        assert!(registry.get().await.source().is_none());
    }
}
