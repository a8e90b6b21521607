//! Settings structures for contexts, binders and properties

use serde::{Deserialize, Serialize};

use super::Config;
use crate::render::UnitStrategy;

/// # Context Settings
///
/// Describes the capabilities a [`HeadlessContext`](crate::render::HeadlessContext)
/// reports: hardware texture-unit limit, core version, advertised extensions
/// and whether the owning window is mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Value reported for the maximum number of fixed-function texture units
    pub max_texture_units: u32,
    /// Core version (major, minor)
    pub gl_version: (u32, u32),
    /// Additional extension strings advertised by the context
    pub extensions: Vec<String>,
    /// Whether the window backing the context is mapped
    pub mapped: bool,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_texture_units: 8,
            gl_version: (2, 1),
            extensions: Vec::new(),
            mapped: true,
        }
    }
}

/// Texture-unit binder settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderSettings {
    /// How slots are mapped to hardware units
    pub strategy: UnitStrategy,
}

/// # Property Settings
///
/// Rasterization state and texture layout applied to a
/// [`PropertyRenderer`](crate::render::PropertyRenderer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertySettings {
    /// Point size in pixels
    pub point_size: f32,
    /// Line width in pixels
    pub line_width: f32,
    /// 16-bit stipple pattern, `0xFFFF` draws solid lines
    pub line_stipple_pattern: u16,
    /// Number of times each pattern bit is repeated
    pub line_stipple_repeat: i32,
    /// Cull back faces
    pub backface_culling: bool,
    /// Cull front faces
    pub frontface_culling: bool,
    /// Hardware unit assigned to each texture, in slot order
    pub texture_units: Vec<i32>,
}

impl Default for PropertySettings {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            line_width: 1.0,
            line_stipple_pattern: 0xFFFF,
            line_stipple_repeat: 1,
            backface_culling: false,
            frontface_culling: false,
            texture_units: vec![0],
        }
    }
}

/// Top-level configuration for the property demo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of render/post-render cycles to run
    pub frames: u32,
    /// Simulated context capabilities
    pub context: ContextSettings,
    /// Binder strategy
    pub binder: BinderSettings,
    /// Property state
    pub property: PropertySettings,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 1,
            context: ContextSettings::default(),
            binder: BinderSettings::default(),
            property: PropertySettings::default(),
        }
    }
}

impl Config for DemoConfig {}
