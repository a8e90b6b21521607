//! # Fixed Pipeline
//!
//! Per-actor state management for fixed-function (immediate-mode) graphics
//! contexts.
//!
//! ## Features
//!
//! - **Property State**: point size, line width and stipple, face culling
//! - **Texture Units**: fixed or pool-allocated binding of multiple textures,
//!   with multitexture capability probing and single-texture fallback
//! - **Headless Context**: in-memory context for tools and tests
//! - **Configuration**: TOML/RON settings for contexts and properties
//!
//! ## Quick Start
//!
//! ```rust
//! use fixed_pipeline::prelude::*;
//!
//! let mut context = HeadlessContext::new(&ContextSettings::default());
//! let mut property = PropertyRenderer::new();
//! property.set_texture(0, Box::new(Texture2D::new("albedo", 64, 64)));
//! property.set_texture(1, Box::new(Texture2D::new("detail", 32, 32)));
//!
//! let report = property.render(&mut context)?;
//! assert_eq!(report.bound().len(), 2);
//! // ... draw ...
//! property.post_render(&mut context);
//! assert_eq!(context.active_unit(), 0);
//! # Ok::<(), RenderError>(())
//! ```

pub mod config;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{BinderSettings, Config, ContextSettings, DemoConfig, PropertySettings},
        render::{
            BindReport, BindableTexture, HeadlessContext, PropertyRenderer, ReleaseReport,
            RenderContext, RenderError, Texture2D, TextureUnitBinder, UnitStrategy,
        },
    };
}
