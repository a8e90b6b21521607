//! # Rendering
//!
//! Fixed-function property state and texture-unit binding.
//!
//! ## Architecture
//!
//! - **RenderContext**: trait over the active graphics context (limits,
//!   extensions, active unit, rasterization switches)
//! - **TextureUnitBinder**: binds texture slots to hardware units and
//!   releases them, with fixed or pooled unit assignment
//! - **PropertyRenderer**: per-actor rasterization state plus its textures
//! - **HeadlessContext**: in-memory context implementing `RenderContext`
//!
//! ## Render Cycle
//!
//! ```text
//! PropertyRenderer::render ──► rasterization state ──► TextureUnitBinder::bind_all
//!                                                        (active unit back to 0)
//!        ... geometry submitted by the caller ...
//! PropertyRenderer::post_render ──► culling reset ──► TextureUnitBinder::release_all
//! ```

pub mod binder;
pub mod capabilities;
pub mod context;
pub mod error;
pub mod headless;
pub mod property;
pub mod texture;
pub mod unit_pool;

pub use binder::{BindReport, BoundSlot, ReleaseReport, TextureUnitBinder, UnitStrategy};
pub use capabilities::{load_multitexturing, MultitextureSupport};
pub use context::{
    Capability, CullFace, PolygonMode, RenderContext, TextureName, TextureTarget, TextureTargets,
};
pub use error::{BindError, Diagnostic, DiagnosticKind, RenderError, RenderResult, Severity};
pub use headless::{GlCall, HeadlessContext};
pub use property::{compute_material_color, PropertyRenderer, SOLID_LINE_PATTERN};
pub use texture::{BindableTexture, HasHardwareHandle, Texture2D, TextureSlot};
pub use unit_pool::TextureUnitPool;
