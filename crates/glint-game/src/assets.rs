use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};

use glint_engine::render::{Font, RenderBackend, Texture};

use crate::settings::Settings;

/// The level's font, and its textures keyed by the path written in the settings.
#[derive(Debug, Default)]
pub struct Assets {
    font: Font,
    textures: HashMap<String, Texture>,
}

impl Assets {
    /// Loads the level's font and every texture it names, relative to
    /// `assets_dir`, then finalises the backend's resource upload.
    pub fn load<R: RenderBackend + ?Sized>(backend: &mut R, settings: &Settings) -> Result<Self> {
        let level = &settings.level;
        let font = backend
            .load_font(&settings.assets_dir.join(&level.font))
            .with_context(|| format!("failed to load font \"{}\"", level.font))?;

        let mut names = BTreeSet::new();
        names.insert(level.tile_texture.as_str());
        for tilter in &level.tilters {
            names.insert(tilter.base_texture.as_str());
            names.insert(tilter.mirror_texture.as_str());
        }

        let mut textures = HashMap::with_capacity(names.len());
        for name in names {
            let path = settings.assets_dir.join(name);
            let texture = backend
                .load_texture(&path)
                .with_context(|| format!("failed to load texture \"{name}\""))?;
            textures.insert(name.to_string(), texture);
        }

        backend
            .finish_resource_load()
            .context("failed to finish resource load")?;

        log::info!("loaded {} texture(s) from {}", textures.len(), settings.assets_dir.display());
        Ok(Self { font, textures })
    }

    pub fn font(&self) -> Font {
        self.font
    }

    pub fn texture(&self, name: &str) -> Result<Texture> {
        self.textures
            .get(name)
            .copied()
            .with_context(|| format!("texture \"{name}\" was not loaded"))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
