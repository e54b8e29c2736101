// src/ui/texture.rs

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use crate::editor::host::{TextureError, TextureLoader};

/// Decoded wall texture, uploaded to the GPU on the first frame that has a
/// context.
#[derive(Default)]
pub struct WallTexture {
    pending: Option<(String, ColorImage)>,
    handle: Option<TextureHandle>,
}

pub type SharedTexture = Arc<RwLock<WallTexture>>;

impl WallTexture {
    pub fn handle(&mut self, ctx: &egui::Context) -> Option<TextureHandle> {
        if let Some((name, image)) = self.pending.take() {
            self.handle = Some(ctx.load_texture(name, image, TextureOptions::LINEAR));
        }
        self.handle.clone()
    }
}

/// Decodes the texture file with `image` at viewer startup.
pub struct ImageTextureLoader {
    slot: SharedTexture,
}

impl ImageTextureLoader {
    pub fn new(slot: SharedTexture) -> Self {
        Self { slot }
    }
}

impl TextureLoader for ImageTextureLoader {
    fn load(&mut self, path: &Path) -> Result<(), TextureError> {
        let decoded = image::open(path).map_err(|err| TextureError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.slot.write().pending = Some((path.display().to_string(), image));
        Ok(())
    }
}
