//! Render context abstraction
//!
//! A [`RenderContext`] is the active fixed-function graphics context as seen
//! by a property: its hardware limits, its extension table, the
//! active-texture-unit selector and the handful of rasterization switches a
//! property touches. Real backends wrap a GL context; the
//! [`HeadlessContext`](super::HeadlessContext) simulates one in memory.
//!
//! The context is always passed explicitly as `&mut dyn RenderContext`, so
//! the single-writer discipline on global graphics state is enforced by the
//! borrow checker rather than by convention.

use std::num::NonZeroU32;

use bitflags::bitflags;

use super::unit_pool::TextureUnitPool;

/// Name of a texture object living in a context
///
/// Zero is never a valid name, so `Option<TextureName>` doubles as the
/// "no GPU resource" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureName(pub NonZeroU32);

impl TextureName {
    /// Raw object name
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Texture targets a fixed-function unit can have enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// `GL_TEXTURE_1D`
    Texture1D,
    /// `GL_TEXTURE_2D`
    Texture2D,
    /// `GL_TEXTURE_3D`
    Texture3D,
    /// `GL_TEXTURE_RECTANGLE_ARB`
    Rectangle,
    /// `GL_TEXTURE_CUBE_MAP`
    CubeMap,
}

impl TextureTarget {
    /// Every target, in the order they are disabled on release
    pub const ALL: [TextureTarget; 5] = [
        TextureTarget::Texture1D,
        TextureTarget::Texture2D,
        TextureTarget::Texture3D,
        TextureTarget::Rectangle,
        TextureTarget::CubeMap,
    ];
}

bitflags! {
    /// Set of texture targets enabled on one unit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureTargets: u8 {
        /// 1D textures
        const TEXTURE_1D = 1 << 0;
        /// 2D textures
        const TEXTURE_2D = 1 << 1;
        /// 3D textures
        const TEXTURE_3D = 1 << 2;
        /// Rectangle textures
        const RECTANGLE = 1 << 3;
        /// Cube maps
        const CUBE_MAP = 1 << 4;
    }
}

impl From<TextureTarget> for TextureTargets {
    fn from(target: TextureTarget) -> Self {
        match target {
            TextureTarget::Texture1D => TextureTargets::TEXTURE_1D,
            TextureTarget::Texture2D => TextureTargets::TEXTURE_2D,
            TextureTarget::Texture3D => TextureTargets::TEXTURE_3D,
            TextureTarget::Rectangle => TextureTargets::RECTANGLE,
            TextureTarget::CubeMap => TextureTargets::CUBE_MAP,
        }
    }
}

/// Server-side capabilities toggled by a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `GL_LINE_STIPPLE`
    LineStipple,
    /// `GL_CULL_FACE`
    CullFace,
    /// `GL_ALPHA_TEST`
    AlphaTest,
    /// A texture target on the active unit
    Texture(TextureTarget),
}

/// Which faces are culled when `CullFace` is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Front faces
    Front,
    /// Back faces
    #[default]
    Back,
}

/// Rasterization mode for front and back faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Vertices only
    Point,
    /// Edges only
    Line,
    /// Filled polygons
    #[default]
    Fill,
}

/// The active fixed-function graphics context
///
/// Implementations are not required to be thread-safe; every method runs on
/// the thread owning the context.
pub trait RenderContext {
    // === Capability probing ===

    /// Whether the named version or extension string is supported
    fn extension_supported(&self, name: &str) -> bool;

    /// Load the entry points of a supported version or extension
    ///
    /// Returns `false` when the name is not supported.
    fn load_extension(&mut self, name: &str) -> bool;

    /// Load an extension whose entry points were promoted to core
    fn load_core_promoted_extension(&mut self, name: &str) -> bool;

    /// Whether the multitexture entry points (active texture selection)
    /// are resolved in this context
    fn multitexture_resolved(&self) -> bool;

    /// Whether the window owning this context is mapped on screen
    fn is_mapped(&self) -> bool;

    // === Texture units ===

    /// Hardware maximum number of fixed-function texture units
    fn max_texture_units(&self) -> u32;

    /// Select the active texture unit
    fn set_active_unit(&mut self, unit: u32);

    /// Unit allocator owned by this context
    fn texture_unit_pool(&mut self) -> &mut TextureUnitPool;

    // === Texture objects ===

    /// Create a new texture object
    fn create_texture(&mut self) -> TextureName;

    /// Bind a texture object to a target of the active unit
    fn bind_texture(&mut self, target: TextureTarget, name: TextureName);

    /// Delete a texture object
    fn delete_texture(&mut self, name: TextureName);

    // === Rasterization state ===

    /// Set the rasterized point diameter
    fn set_point_size(&mut self, size: f32);

    /// Set the rasterized line width
    fn set_line_width(&mut self, width: f32);

    /// Set the line stipple repeat factor and pattern
    fn set_line_stipple(&mut self, repeat: i32, pattern: u16);

    /// Enable a capability
    fn enable(&mut self, capability: Capability);

    /// Disable a capability
    fn disable(&mut self, capability: Capability);

    /// Choose which faces `CullFace` removes
    fn set_cull_face(&mut self, face: CullFace);

    /// Set the polygon mode for front and back faces
    fn set_polygon_mode(&mut self, mode: PolygonMode);
}
