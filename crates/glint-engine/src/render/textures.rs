use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{Texture, TextureId};

/// Decoded RGBA8 pixels waiting for upload.
struct Staged {
    id: TextureId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

struct Uploaded {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Texture registry.
///
/// Loading decodes on the CPU and stages the pixels; `upload` moves every
/// staged image to the GPU in one go. Id 0 is the blank white texture, staged
/// at construction.
pub struct TextureStore {
    next_id: u32,
    by_path: HashMap<PathBuf, Texture>,
    staged: Vec<Staged>,
    uploaded: HashMap<TextureId, Uploaded>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            by_path: HashMap::new(),
            staged: vec![Staged {
                id: TextureId::BLANK,
                width: 1,
                height: 1,
                pixels: vec![255; 4],
            }],
            uploaded: HashMap::new(),
        }
    }

    /// Decodes `path` and stages it. Loading the same path twice returns the same texture.
    pub fn load(&mut self, path: &Path) -> Result<Texture> {
        if let Some(texture) = self.by_path.get(path) {
            return Ok(*texture);
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read texture {}", path.display()))?;
        let image = image::load_from_memory(&bytes)
            .with_context(|| format!("failed to decode texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        anyhow::ensure!(width > 0 && height > 0, "texture {} is empty", path.display());

        let texture = Texture {
            id: TextureId(self.next_id),
            width,
            height,
        };
        self.next_id += 1;

        self.staged.push(Staged {
            id: texture.id,
            width,
            height,
            pixels: image.into_raw(),
        });
        self.by_path.insert(path.to_path_buf(), texture);

        log::debug!("staged texture {} as {:?} ({width}x{height})", path.display(), texture.id);
        Ok(texture)
    }

    pub fn pending_uploads(&self) -> usize {
        self.staged.len()
    }

    pub fn is_uploaded(&self, id: TextureId) -> bool {
        self.uploaded.contains_key(&id)
    }

    pub(crate) fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.uploaded.get(&id).map(|u| &u.bind_group)
    }

    /// Creates GPU textures for everything staged since the last upload.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) {
        for staged in self.staged.drain(..) {
            let size = wgpu::Extent3d {
                width: staged.width,
                height: staged.height,
                depth_or_array_layers: 1,
            };

            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("glint sprite texture"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &staged.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * staged.width),
                    rows_per_image: Some(staged.height),
                },
                size,
            );

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("glint sprite texture bind group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });

            self.uploaded.insert(
                staged.id,
                Uploaded {
                    _texture: texture,
                    bind_group,
                },
            );
        }
    }
}
