//! # Headless Context
//!
//! An in-memory fixed-function context. It keeps the state a real driver
//! would keep for the calls a property makes (active unit, per-unit texture
//! targets, capability switches, rasterization parameters, texture objects)
//! and journals every call in order so the sequencing can be inspected.
//!
//! The headless context drives the demo binary and serves as the mock
//! collaborator in tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::num::NonZeroU32;

use super::capabilities::GL_ARB_MULTITEXTURE;
use super::context::{
    Capability, CullFace, PolygonMode, RenderContext, TextureName, TextureTarget, TextureTargets,
};
use super::unit_pool::TextureUnitPool;
use crate::config::ContextSettings;

/// A call recorded by the headless context
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    /// Version or extension loaded
    LoadExtension(String),
    /// Core-promoted extension loaded
    LoadCorePromotedExtension(String),
    /// Active unit selected
    SetActiveUnit(u32),
    /// Capability enabled on the active unit
    Enable(Capability),
    /// Capability disabled on the active unit
    Disable(Capability),
    /// Texture object created
    CreateTexture(TextureName),
    /// Texture object bound to a target of a unit
    BindTexture {
        /// Active unit at bind time
        unit: u32,
        /// Target bound
        target: TextureTarget,
        /// Object bound
        name: TextureName,
    },
    /// Texture object deleted
    DeleteTexture(TextureName),
    /// Point size set
    PointSize(f32),
    /// Line width set
    LineWidth(f32),
    /// Line stipple set
    LineStipple {
        /// Repeat factor
        repeat: i32,
        /// Bit pattern
        pattern: u16,
    },
    /// Cull face selected
    CullFace(CullFace),
    /// Polygon mode set
    PolygonMode(PolygonMode),
}

/// Texture state of one fixed-function unit
#[derive(Debug, Clone, Default)]
struct UnitState {
    enabled: TextureTargets,
    bound: HashMap<TextureTarget, TextureName>,
}

/// Simulated fixed-function context
#[derive(Debug)]
pub struct HeadlessContext {
    settings: ContextSettings,
    mapped: bool,

    multitexture: bool,
    loaded_extensions: Vec<String>,

    active_unit: u32,
    units: Vec<UnitState>,
    capabilities: HashSet<Capability>,
    pool: TextureUnitPool,

    textures: BTreeSet<TextureName>,
    next_texture: u32,

    point_size: f32,
    line_width: f32,
    line_stipple: (i32, u16),
    cull_face: CullFace,
    polygon_mode: PolygonMode,

    journal: Vec<GlCall>,
    errors: Vec<String>,
}

impl HeadlessContext {
    /// Create a context reporting the given capabilities
    pub fn new(settings: &ContextSettings) -> Self {
        log::debug!(
            "Creating headless context: GL {}.{}, {} texture units, {} extensions",
            settings.gl_version.0,
            settings.gl_version.1,
            settings.max_texture_units,
            settings.extensions.len()
        );

        Self {
            settings: settings.clone(),
            mapped: settings.mapped,
            multitexture: false,
            loaded_extensions: Vec::new(),
            active_unit: 0,
            units: vec![UnitState::default(); settings.max_texture_units.max(1) as usize],
            capabilities: HashSet::new(),
            pool: TextureUnitPool::new(settings.max_texture_units),
            textures: BTreeSet::new(),
            next_texture: 1,
            point_size: 1.0,
            line_width: 1.0,
            line_stipple: (1, 0xFFFF),
            cull_face: CullFace::Back,
            polygon_mode: PolygonMode::Fill,
            journal: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Mark the owning window as mapped or unmapped
    pub fn set_mapped(&mut self, mapped: bool) {
        self.mapped = mapped;
    }

    /// Calls recorded so far, oldest first
    pub fn journal(&self) -> &[GlCall] {
        &self.journal
    }

    /// Forget recorded calls (state is kept)
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Number of active-unit selections recorded
    pub fn active_unit_calls(&self) -> usize {
        self.journal
            .iter()
            .filter(|call| matches!(call, GlCall::SetActiveUnit(_)))
            .count()
    }

    /// Invalid operations the context rejected
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Versions and extensions loaded, in load order
    pub fn loaded_extensions(&self) -> &[String] {
        &self.loaded_extensions
    }

    /// Currently selected unit
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Whether a non-texture capability is enabled, or a texture target on
    /// the active unit
    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::Texture(target) => self.enabled_targets(self.active_unit).contains(target.into()),
            other => self.capabilities.contains(&other),
        }
    }

    /// Texture targets enabled on a unit
    pub fn enabled_targets(&self, unit: u32) -> TextureTargets {
        self.units
            .get(unit as usize)
            .map(|state| state.enabled)
            .unwrap_or_default()
    }

    /// Object bound to a target of a unit
    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> Option<TextureName> {
        self.units
            .get(unit as usize)
            .and_then(|state| state.bound.get(&target).copied())
    }

    /// Number of texture objects alive in the context
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Unit pool (read-only view)
    pub fn pool(&self) -> &TextureUnitPool {
        &self.pool
    }

    /// Current point size
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Current line width
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Current line stipple (repeat, pattern)
    pub fn line_stipple(&self) -> (i32, u16) {
        self.line_stipple
    }

    /// Current cull face selection
    pub fn cull_face(&self) -> CullFace {
        self.cull_face
    }

    /// Current polygon mode
    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    fn version_supported(&self, name: &str) -> Option<bool> {
        parse_version(name).map(|requested| requested <= self.settings.gl_version)
    }

    fn resolves_multitexture(name: &str) -> bool {
        name == GL_ARB_MULTITEXTURE || parse_version(name).is_some_and(|version| version >= (1, 3))
    }

    fn load(&mut self, name: &str) -> bool {
        if !self.extension_supported(name) {
            self.errors.push(format!("Extension {} is not supported", name));
            return false;
        }
        if !self.loaded_extensions.iter().any(|loaded| loaded == name) {
            self.loaded_extensions.push(name.to_string());
        }
        if Self::resolves_multitexture(name) {
            self.multitexture = true;
        }
        true
    }

    fn active_state(&mut self) -> Option<&mut UnitState> {
        self.units.get_mut(self.active_unit as usize)
    }
}

/// Parse `GL_VERSION_<major>_<minor>` into a comparable pair
fn parse_version(name: &str) -> Option<(u32, u32)> {
    let (major, minor) = name.strip_prefix("GL_VERSION_")?.split_once('_')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

impl RenderContext for HeadlessContext {
    fn extension_supported(&self, name: &str) -> bool {
        self.version_supported(name)
            .unwrap_or_else(|| self.settings.extensions.iter().any(|ext| ext == name))
    }

    fn load_extension(&mut self, name: &str) -> bool {
        self.journal.push(GlCall::LoadExtension(name.to_string()));
        self.load(name)
    }

    fn load_core_promoted_extension(&mut self, name: &str) -> bool {
        self.journal.push(GlCall::LoadCorePromotedExtension(name.to_string()));
        self.load(name)
    }

    fn multitexture_resolved(&self) -> bool {
        self.multitexture
    }

    fn is_mapped(&self) -> bool {
        self.mapped
    }

    fn max_texture_units(&self) -> u32 {
        self.settings.max_texture_units
    }

    fn set_active_unit(&mut self, unit: u32) {
        self.journal.push(GlCall::SetActiveUnit(unit));
        if !self.multitexture {
            self.errors.push("Active texture selection without multitexture entry points".into());
        } else if unit >= self.settings.max_texture_units.max(1) {
            self.errors.push(format!("Texture unit {} is out of range", unit));
        } else {
            self.active_unit = unit;
        }
    }

    fn texture_unit_pool(&mut self) -> &mut TextureUnitPool {
        &mut self.pool
    }

    fn create_texture(&mut self) -> TextureName {
        let raw = NonZeroU32::new(self.next_texture).unwrap_or(NonZeroU32::MIN);
        self.next_texture = raw.get().saturating_add(1);
        let name = TextureName(raw);
        self.textures.insert(name);
        self.journal.push(GlCall::CreateTexture(name));
        name
    }

    fn bind_texture(&mut self, target: TextureTarget, name: TextureName) {
        let unit = self.active_unit;
        self.journal.push(GlCall::BindTexture { unit, target, name });
        if !self.textures.contains(&name) {
            self.errors.push(format!("Binding deleted texture object {}", name.get()));
            return;
        }
        if let Some(state) = self.active_state() {
            state.bound.insert(target, name);
        }
    }

    fn delete_texture(&mut self, name: TextureName) {
        self.journal.push(GlCall::DeleteTexture(name));
        if !self.textures.remove(&name) {
            self.errors.push(format!("Deleting unknown texture object {}", name.get()));
            return;
        }
        for state in &mut self.units {
            state.bound.retain(|_, bound| *bound != name);
        }
    }

    fn set_point_size(&mut self, size: f32) {
        self.journal.push(GlCall::PointSize(size));
        self.point_size = size;
    }

    fn set_line_width(&mut self, width: f32) {
        self.journal.push(GlCall::LineWidth(width));
        self.line_width = width;
    }

    fn set_line_stipple(&mut self, repeat: i32, pattern: u16) {
        self.journal.push(GlCall::LineStipple { repeat, pattern });
        self.line_stipple = (repeat, pattern);
    }

    fn enable(&mut self, capability: Capability) {
        self.journal.push(GlCall::Enable(capability));
        match capability {
            Capability::Texture(target) => {
                if let Some(state) = self.active_state() {
                    state.enabled.insert(target.into());
                }
            }
            other => {
                self.capabilities.insert(other);
            }
        }
    }

    fn disable(&mut self, capability: Capability) {
        self.journal.push(GlCall::Disable(capability));
        match capability {
            Capability::Texture(target) => {
                if let Some(state) = self.active_state() {
                    state.enabled.remove(target.into());
                }
            }
            other => {
                self.capabilities.remove(&other);
            }
        }
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.journal.push(GlCall::CullFace(face));
        self.cull_face = face;
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.journal.push(GlCall::PolygonMode(mode));
        self.polygon_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::capabilities::{GL_VERSION_1_2, GL_VERSION_1_3};

    fn settings(version: (u32, u32)) -> ContextSettings {
        ContextSettings {
            gl_version: version,
            max_texture_units: 4,
            ..ContextSettings::default()
        }
    }

    #[test]
    fn test_version_strings() {
        let ctx = HeadlessContext::new(&settings((1, 2)));
        assert!(ctx.extension_supported(GL_VERSION_1_2));
        assert!(!ctx.extension_supported(GL_VERSION_1_3));
        assert!(!ctx.extension_supported("GL_ARB_multitexture"));
    }

    #[test]
    fn test_active_unit_requires_multitexture() {
        let mut ctx = HeadlessContext::new(&settings((1, 1)));
        ctx.set_active_unit(1);
        assert_eq!(ctx.active_unit(), 0);
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn test_active_unit_out_of_range_is_rejected() {
        let mut ctx = HeadlessContext::new(&settings((2, 0)));
        assert!(ctx.load_extension(GL_VERSION_1_3));
        ctx.set_active_unit(3);
        assert_eq!(ctx.active_unit(), 3);
        ctx.set_active_unit(4);
        assert_eq!(ctx.active_unit(), 3);
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn test_texture_targets_are_per_unit() {
        let mut ctx = HeadlessContext::new(&settings((2, 0)));
        ctx.load_extension(GL_VERSION_1_3);

        ctx.set_active_unit(2);
        let name = ctx.create_texture();
        ctx.bind_texture(TextureTarget::Texture2D, name);
        ctx.enable(Capability::Texture(TextureTarget::Texture2D));

        assert_eq!(ctx.enabled_targets(2), TextureTargets::TEXTURE_2D);
        assert!(ctx.enabled_targets(0).is_empty());
        assert_eq!(ctx.bound_texture(2, TextureTarget::Texture2D), Some(name));

        ctx.delete_texture(name);
        assert_eq!(ctx.bound_texture(2, TextureTarget::Texture2D), None);
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn test_unsupported_extension_load_fails() {
        let mut ctx = HeadlessContext::new(&settings((1, 1)));
        assert!(!ctx.load_extension(GL_VERSION_1_3));
        assert!(!ctx.multitexture_resolved());
        assert!(ctx.loaded_extensions().is_empty());
    }
}
