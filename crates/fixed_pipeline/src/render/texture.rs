//! Textures and the slots that attach them to a property

use std::fmt;

use super::context::{Capability, RenderContext, TextureName, TextureTarget};

/// Anything that may own an object name inside a context
pub trait HasHardwareHandle {
    /// Current object name, `None` when nothing is resident on the GPU
    fn hardware_handle(&self) -> Option<TextureName>;
}

/// A texture a property can bind to a fixed-function unit
///
/// Both methods operate on whatever unit is currently active; selecting the
/// unit is the binder's job.
pub trait BindableTexture: HasHardwareHandle + fmt::Debug {
    /// Bind the texture to the active unit, uploading it first if needed
    fn render_bind_or_load(&mut self, context: &mut dyn RenderContext);

    /// Release the GPU resources held by this texture
    fn release_graphics_resources(&mut self, context: &mut dyn RenderContext);
}

/// A 2D texture created lazily on first bind
#[derive(Debug, Clone)]
pub struct Texture2D {
    label: String,
    width: u32,
    height: u32,
    name: Option<TextureName>,
    uploads: u32,
}

impl Texture2D {
    /// Create a texture description; nothing is allocated until first bind
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            name: None,
            uploads: 0,
        }
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Texel dimensions (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// How many times the texture has been uploaded
    pub fn upload_count(&self) -> u32 {
        self.uploads
    }
}

impl HasHardwareHandle for Texture2D {
    fn hardware_handle(&self) -> Option<TextureName> {
        self.name
    }
}

impl BindableTexture for Texture2D {
    fn render_bind_or_load(&mut self, context: &mut dyn RenderContext) {
        let name = match self.name {
            Some(name) => name,
            None => {
                let name = context.create_texture();
                self.uploads += 1;
                log::debug!(
                    "Uploading texture '{}' ({}x{}) as object {}",
                    self.label,
                    self.width,
                    self.height,
                    name.get()
                );
                self.name = Some(name);
                name
            }
        };

        context.bind_texture(TextureTarget::Texture2D, name);
        context.enable(Capability::Texture(TextureTarget::Texture2D));
    }

    fn release_graphics_resources(&mut self, context: &mut dyn RenderContext) {
        if let Some(name) = self.name.take() {
            log::debug!("Releasing texture '{}' (object {})", self.label, name.get());
            context.delete_texture(name);
        }
    }
}

/// One entry of a property's ordered texture list
#[derive(Debug)]
pub struct TextureSlot {
    texture: Box<dyn BindableTexture>,
    /// Caller-assigned unit used by fixed-unit binding; may be out of range
    assigned_unit: Option<i32>,
    /// Unit handed out by the context pool for the current cycle
    allocated_unit: Option<u32>,
}

impl TextureSlot {
    /// Slot bound to a caller-chosen unit
    pub fn with_unit(unit: i32, texture: Box<dyn BindableTexture>) -> Self {
        Self {
            texture,
            assigned_unit: Some(unit),
            allocated_unit: None,
        }
    }

    /// Slot without a fixed unit, for pool allocation
    pub fn unassigned(texture: Box<dyn BindableTexture>) -> Self {
        Self {
            texture,
            assigned_unit: None,
            allocated_unit: None,
        }
    }

    /// The attached texture
    pub fn texture(&self) -> &dyn BindableTexture {
        self.texture.as_ref()
    }

    /// Mutable access to the attached texture
    pub fn texture_mut(&mut self) -> &mut dyn BindableTexture {
        self.texture.as_mut()
    }

    /// Detach the texture from the slot
    pub fn into_texture(self) -> Box<dyn BindableTexture> {
        self.texture
    }

    /// Replace the attached texture, returning the previous one
    pub fn replace_texture(&mut self, texture: Box<dyn BindableTexture>) -> Box<dyn BindableTexture> {
        std::mem::replace(&mut self.texture, texture)
    }

    /// Unit assigned by the caller
    pub fn assigned_unit(&self) -> Option<i32> {
        self.assigned_unit
    }

    /// Set or clear the caller-assigned unit
    pub fn set_assigned_unit(&mut self, unit: Option<i32>) {
        self.assigned_unit = unit;
    }

    /// Unit currently held from the context pool
    pub fn allocated_unit(&self) -> Option<u32> {
        self.allocated_unit
    }

    pub(crate) fn set_allocated_unit(&mut self, unit: Option<u32>) {
        self.allocated_unit = unit;
    }

    pub(crate) fn take_allocated_unit(&mut self) -> Option<u32> {
        self.allocated_unit.take()
    }

    /// The assigned unit if it lies inside `[0, max_units)`
    pub fn unit_in_range(&self, max_units: u32) -> Option<u32> {
        self.assigned_unit
            .and_then(|unit| u32::try_from(unit).ok())
            .filter(|unit| *unit < max_units)
    }
}
