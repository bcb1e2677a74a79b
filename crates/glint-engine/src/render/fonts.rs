use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::{Font, FontId};

/// Parsed fonts, ready for glyph rasterization.
///
/// Fonts live on the CPU only; nothing is uploaded until glyphs are needed.
#[derive(Default)]
pub struct FontStore {
    fonts: Vec<fontdue::Font>,
    by_path: HashMap<PathBuf, Font>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses a TrueType or OpenType font. Loading the same path twice
    /// returns the same font.
    pub fn load(&mut self, path: &Path) -> Result<Font> {
        if let Some(font) = self.by_path.get(path) {
            return Ok(*font);
        }

        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        let font = self
            .parse(&bytes)
            .with_context(|| format!("failed to parse font {}", path.display()))?;
        self.by_path.insert(path.to_path_buf(), font);

        log::debug!("loaded font {} as {:?}", path.display(), font.id);
        Ok(font)
    }

    fn parse(&mut self, bytes: &[u8]) -> Result<Font> {
        let parsed = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| anyhow!(e))?;
        let font = Font {
            id: FontId(self.fonts.len() as u32),
            units_per_em: parsed.units_per_em(),
        };
        self.fonts.push(parsed);
        Ok(font)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped_font() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts/DejaVuSans.ttf")
    }

    #[test]
    fn loads_font_once_per_path() {
        let mut store = FontStore::new();
        let first = store.load(&shipped_font()).unwrap();
        let again = store.load(&shipped_font()).unwrap();

        assert_eq!(first.id, FontId(0));
        assert_eq!(again, first);
        assert!(first.units_per_em > 0.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let dir = std::env::temp_dir().join(format!("glint-fonts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let mut store = FontStore::new();
        let err = store.load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse font"));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut store = FontStore::new();
        let err = store.load(Path::new("/definitely/not/here.ttf")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read font"));
    }
}
