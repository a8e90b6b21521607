//! # Fixed-Pipeline Property Renderer
//!
//! Per-actor surface state for an immediate-mode pipeline. Before the
//! actor's geometry is submitted, [`PropertyRenderer::render`] configures
//! rasterization (point size, line width and stipple, face culling) and
//! binds the attached textures; [`PropertyRenderer::post_render`] undoes the
//! state that would otherwise leak into the next actor.
//!
//! ## Usage
//!
//! ```rust
//! use fixed_pipeline::config::ContextSettings;
//! use fixed_pipeline::render::{HeadlessContext, PropertyRenderer, Texture2D};
//!
//! let mut context = HeadlessContext::new(&ContextSettings::default());
//! let mut property = PropertyRenderer::new();
//! property.set_backface_culling(true);
//! property.set_texture(0, Box::new(Texture2D::new("albedo", 256, 256)));
//!
//! let report = property.render(&mut context).unwrap();
//! assert!(report.any_bound());
//! // ... submit geometry ...
//! property.post_render(&mut context);
//! ```

use super::binder::{BindReport, ReleaseReport, TextureUnitBinder, UnitStrategy};
use super::context::{Capability, CullFace, PolygonMode, RenderContext, TextureTarget};
use super::error::RenderResult;
use super::texture::{BindableTexture, TextureSlot};
use crate::config::{BinderSettings, PropertySettings};

/// Stipple pattern that draws solid lines
pub const SOLID_LINE_PATTERN: u16 = 0xFFFF;

/// Rasterization and texture state of one actor
#[derive(Debug)]
pub struct PropertyRenderer {
    point_size: f32,
    line_width: f32,
    line_stipple_pattern: u16,
    line_stipple_repeat: i32,
    backface_culling: bool,
    frontface_culling: bool,
    textures: Vec<TextureSlot>,
    binder: TextureUnitBinder,
}

impl Default for PropertyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRenderer {
    /// Property with default state and no textures
    pub fn new() -> Self {
        Self {
            point_size: 1.0,
            line_width: 1.0,
            line_stipple_pattern: SOLID_LINE_PATTERN,
            line_stipple_repeat: 1,
            backface_culling: false,
            frontface_culling: false,
            textures: Vec::new(),
            binder: TextureUnitBinder::default(),
        }
    }

    /// Property configured from settings; textures are attached separately
    pub fn from_settings(settings: &PropertySettings, binder: &BinderSettings) -> Self {
        Self {
            point_size: settings.point_size,
            line_width: settings.line_width,
            line_stipple_pattern: settings.line_stipple_pattern,
            line_stipple_repeat: settings.line_stipple_repeat,
            backface_culling: settings.backface_culling,
            frontface_culling: settings.frontface_culling,
            textures: Vec::new(),
            binder: TextureUnitBinder::new(binder.strategy),
        }
    }

    // === Rasterization state ===

    /// Point size in pixels
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Set the point size
    pub fn set_point_size(&mut self, size: f32) {
        self.point_size = size;
    }

    /// Line width in pixels
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Set the line width
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Line stipple (repeat factor, pattern)
    pub fn line_stipple(&self) -> (i32, u16) {
        (self.line_stipple_repeat, self.line_stipple_pattern)
    }

    /// Set the line stipple; [`SOLID_LINE_PATTERN`] disables stippling
    pub fn set_line_stipple(&mut self, repeat: i32, pattern: u16) {
        self.line_stipple_repeat = repeat;
        self.line_stipple_pattern = pattern;
    }

    /// Whether back faces are culled
    pub fn backface_culling(&self) -> bool {
        self.backface_culling
    }

    /// Cull back faces
    pub fn set_backface_culling(&mut self, enabled: bool) {
        self.backface_culling = enabled;
    }

    /// Whether front faces are culled
    pub fn frontface_culling(&self) -> bool {
        self.frontface_culling
    }

    /// Cull front faces; ignored while backface culling is on
    pub fn set_frontface_culling(&mut self, enabled: bool) {
        self.frontface_culling = enabled;
    }

    // === Textures ===

    /// Unit strategy used for the attached textures
    pub fn unit_strategy(&self) -> UnitStrategy {
        self.binder.strategy()
    }

    /// Switch unit strategy
    ///
    /// Pooled units still held from an earlier bind are returned by the next
    /// [`post_render`](Self::post_render) whatever the new strategy is.
    pub fn set_unit_strategy(&mut self, strategy: UnitStrategy) {
        if self.textures.iter().any(|slot| slot.allocated_unit().is_some()) {
            log::debug!("Unit strategy changed to {:?} with pooled units still held", strategy);
        }
        self.binder.set_strategy(strategy);
    }

    /// Attach `texture` to a fixed unit, replacing any texture already there
    ///
    /// Returns the replaced texture.
    pub fn set_texture(
        &mut self,
        unit: i32,
        texture: Box<dyn BindableTexture>,
    ) -> Option<Box<dyn BindableTexture>> {
        match self
            .textures
            .iter_mut()
            .find(|slot| slot.assigned_unit() == Some(unit))
        {
            Some(slot) => Some(slot.replace_texture(texture)),
            None => {
                self.textures.push(TextureSlot::with_unit(unit, texture));
                None
            }
        }
    }

    /// Append a texture without a fixed unit, for pooled binding
    pub fn add_texture(&mut self, texture: Box<dyn BindableTexture>) {
        self.textures.push(TextureSlot::unassigned(texture));
    }

    /// Detach the texture assigned to `unit`
    ///
    /// Any pooled unit the slot still holds goes back to the context pool.
    pub fn remove_texture(
        &mut self,
        unit: i32,
        context: &mut dyn RenderContext,
    ) -> Option<Box<dyn BindableTexture>> {
        let index = self
            .textures
            .iter()
            .position(|slot| slot.assigned_unit() == Some(unit))?;
        self.remove_texture_at(index, context)
    }

    /// Detach the texture at slot `index`, returning its pooled unit if held
    pub fn remove_texture_at(
        &mut self,
        index: usize,
        context: &mut dyn RenderContext,
    ) -> Option<Box<dyn BindableTexture>> {
        if index >= self.textures.len() {
            return None;
        }
        let mut slot = self.textures.remove(index);
        if let Some(unit) = TextureUnitBinder::release_slot(&mut slot, context) {
            log::debug!("Texture slot {} returned pooled unit {} on removal", index, unit);
        }
        Some(slot.into_texture())
    }

    /// Detach every texture, returning held pooled units
    pub fn remove_all_textures(&mut self, context: &mut dyn RenderContext) {
        for mut slot in self.textures.drain(..) {
            TextureUnitBinder::release_slot(&mut slot, context);
        }
    }

    /// Number of attached textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Texture at slot `index`
    pub fn texture_at(&self, index: usize) -> Option<&dyn BindableTexture> {
        self.textures.get(index).map(TextureSlot::texture)
    }

    /// Unit currently associated with slot `index`
    ///
    /// The pooled unit if one is held, otherwise the fixed assignment.
    pub fn texture_unit_at(&self, index: usize) -> Option<i32> {
        let slot = self.textures.get(index)?;
        slot.allocated_unit()
            .and_then(|unit| i32::try_from(unit).ok())
            .or(slot.assigned_unit())
    }

    /// Attached slots, in binding order
    pub fn texture_slots(&self) -> &[TextureSlot] {
        &self.textures
    }

    // === Render cycle ===

    /// Apply rasterization state and bind textures before geometry submission
    pub fn render(&mut self, context: &mut dyn RenderContext) -> RenderResult<BindReport> {
        context.set_point_size(self.point_size);
        context.set_line_width(self.line_width);

        if self.line_stipple_pattern != SOLID_LINE_PATTERN {
            context.enable(Capability::LineStipple);
            context.set_line_stipple(self.line_stipple_repeat, self.line_stipple_pattern);
        } else {
            // pattern is still uploaded before disabling; some drivers keep
            // stippling otherwise
            context.set_line_stipple(self.line_stipple_repeat, self.line_stipple_pattern);
            context.disable(Capability::LineStipple);
        }

        context.disable(Capability::Texture(TextureTarget::Texture2D));
        context.disable(Capability::AlphaTest);

        if !self.backface_culling && !self.frontface_culling {
            context.disable(Capability::CullFace);
            context.set_polygon_mode(PolygonMode::Fill);
        } else if self.backface_culling {
            context.set_cull_face(CullFace::Back);
            context.enable(Capability::CullFace);
        } else {
            context.set_cull_face(CullFace::Front);
            context.enable(Capability::CullFace);
        }

        Ok(self.binder.bind_all(&mut self.textures, context)?)
    }

    /// Reset culling and release texture units after geometry submission
    pub fn post_render(&mut self, context: &mut dyn RenderContext) -> ReleaseReport {
        if self.backface_culling || self.frontface_culling {
            context.disable(Capability::CullFace);
            context.set_polygon_mode(PolygonMode::Fill);
        }

        self.binder.release_all(&mut self.textures, context)
    }

    /// Release the GPU resources of every attached texture
    pub fn release_graphics_resources(&mut self, context: &mut dyn RenderContext) -> ReleaseReport {
        self.binder.release_graphics_resources(&mut self.textures, context)
    }
}

/// Material color sent to the fixed-function lighting stage
///
/// RGB is `color * color_factor`, additionally scaled by `opacity` when
/// colors are premultiplied with alpha. Alpha is always `opacity`.
pub fn compute_material_color(
    premultiply_colors_with_alpha: bool,
    color_factor: f64,
    color: [f64; 3],
    opacity: f64,
) -> [f32; 4] {
    let opacity_factor = if premultiply_colors_with_alpha { opacity } else { 1.0 };
    let scale = |channel: f64| (opacity_factor * color_factor * channel) as f32;
    [scale(color[0]), scale(color[1]), scale(color[2]), opacity as f32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextSettings;
    use crate::render::error::{BindError, RenderError};
    use crate::render::headless::{GlCall, HeadlessContext};
    use crate::render::texture::Texture2D;
    use approx::assert_relative_eq;

    fn context() -> HeadlessContext {
        HeadlessContext::new(&ContextSettings {
            max_texture_units: 4,
            ..ContextSettings::default()
        })
    }

    fn texture(label: &str) -> Box<dyn BindableTexture> {
        Box::new(Texture2D::new(label, 16, 16))
    }

    #[test]
    fn test_default_state_sequence() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();

        let report = property.render(&mut ctx).unwrap();
        assert!(report.no_textures());

        assert_eq!(
            ctx.journal(),
            &[
                GlCall::PointSize(1.0),
                GlCall::LineWidth(1.0),
                GlCall::LineStipple { repeat: 1, pattern: SOLID_LINE_PATTERN },
                GlCall::Disable(Capability::LineStipple),
                GlCall::Disable(Capability::Texture(TextureTarget::Texture2D)),
                GlCall::Disable(Capability::AlphaTest),
                GlCall::Disable(Capability::CullFace),
                GlCall::PolygonMode(PolygonMode::Fill),
            ]
        );
    }

    #[test]
    fn test_stipple_enabled_before_pattern() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();
        property.set_line_stipple(3, 0x0F0F);
        property.set_point_size(4.0);
        property.set_line_width(2.5);

        property.render(&mut ctx).unwrap();

        let journal = ctx.journal();
        assert_eq!(journal[2], GlCall::Enable(Capability::LineStipple));
        assert_eq!(journal[3], GlCall::LineStipple { repeat: 3, pattern: 0x0F0F });
        assert!(ctx.is_enabled(Capability::LineStipple));
        assert_relative_eq!(ctx.point_size(), 4.0);
        assert_relative_eq!(ctx.line_width(), 2.5);
    }

    #[test]
    fn test_culling_modes() {
        let cases = [
            (true, false, CullFace::Back),
            (false, true, CullFace::Front),
            (true, true, CullFace::Back),
        ];
        for (back, front, expected) in cases {
            let mut ctx = context();
            let mut property = PropertyRenderer::new();
            property.set_backface_culling(back);
            property.set_frontface_culling(front);

            property.render(&mut ctx).unwrap();
            assert!(ctx.is_enabled(Capability::CullFace));
            assert_eq!(ctx.cull_face(), expected);

            property.post_render(&mut ctx);
            assert!(!ctx.is_enabled(Capability::CullFace));
            assert_eq!(ctx.polygon_mode(), PolygonMode::Fill);
        }
    }

    #[test]
    fn test_post_render_without_culling_leaves_cull_state_alone() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();
        property.render(&mut ctx).unwrap();
        ctx.clear_journal();

        assert!(property.post_render(&mut ctx).is_empty());
        assert!(ctx.journal().is_empty());
    }

    #[test]
    fn test_textured_render_cycle() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();
        property.set_texture(0, texture("albedo"));
        property.set_texture(2, texture("lightmap"));

        let report = property.render(&mut ctx).unwrap();
        assert_eq!(report.bound().len(), 2);
        assert!(ctx.enabled_targets(2).contains(TextureTarget::Texture2D.into()));

        let release = property.post_render(&mut ctx);
        assert_eq!(release.released().len(), 2);
        assert!(ctx.enabled_targets(2).is_empty());
        assert_eq!(ctx.active_unit(), 0);

        property.release_graphics_resources(&mut ctx);
        assert_eq!(ctx.live_textures(), 0);
    }

    #[test]
    fn test_set_texture_replaces_same_unit() {
        let mut property = PropertyRenderer::new();
        assert!(property.set_texture(1, texture("a")).is_none());
        let replaced = property.set_texture(1, texture("b"));

        assert!(replaced.is_some());
        assert_eq!(property.texture_count(), 1);
        assert_eq!(property.texture_unit_at(0), Some(1));

        let mut ctx = context();
        assert!(property.remove_texture(1, &mut ctx).is_some());
        assert!(property.remove_texture(1, &mut ctx).is_none());
        assert_eq!(property.texture_count(), 0);
        assert!(ctx.journal().is_empty());
    }

    #[test]
    fn test_removing_texture_after_exhaustion_returns_its_unit() {
        let mut ctx = HeadlessContext::new(&ContextSettings {
            max_texture_units: 2,
            ..ContextSettings::default()
        });
        let mut property = PropertyRenderer::new();
        property.set_unit_strategy(UnitStrategy::Pooled);
        for label in ["a", "b", "c"] {
            property.add_texture(texture(label));
        }

        assert!(property.render(&mut ctx).is_err());
        assert!(property.remove_texture_at(0, &mut ctx).is_some());
        assert_eq!(ctx.pool().free_count(), 1);

        // two textures on two units fit again
        let report = property.render(&mut ctx).unwrap();
        assert_eq!(report.bound().len(), 2);

        property.post_render(&mut ctx);
        assert_eq!(ctx.pool().free_count(), 2);
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn test_remove_all_textures_returns_held_units() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();
        property.set_unit_strategy(UnitStrategy::Pooled);
        property.add_texture(texture("a"));
        property.add_texture(texture("b"));

        property.render(&mut ctx).unwrap();
        assert_eq!(ctx.pool().allocated_count(), 2);

        property.remove_all_textures(&mut ctx);
        assert_eq!(property.texture_count(), 0);
        assert!(property.texture_slots().is_empty());
        assert_eq!(ctx.pool().allocated_count(), 0);
        assert_eq!(ctx.active_unit(), 0);
    }

    #[test]
    fn test_switching_to_fixed_units_returns_pooled_units() {
        let mut ctx = context();
        let mut property = PropertyRenderer::new();
        property.set_unit_strategy(UnitStrategy::Pooled);
        property.add_texture(texture("a"));
        property.add_texture(texture("b"));

        property.render(&mut ctx).unwrap();
        property.set_unit_strategy(UnitStrategy::Fixed);

        let release = property.post_render(&mut ctx);
        assert_eq!(release.released().len(), 2);
        assert_eq!(ctx.pool().free_count(), ctx.pool().capacity());
        assert!(property
            .texture_slots()
            .iter()
            .all(|slot| slot.allocated_unit().is_none()));
    }

    #[test]
    fn test_pooled_exhaustion_surfaces_as_render_error() {
        let mut ctx = HeadlessContext::new(&ContextSettings {
            max_texture_units: 1,
            ..ContextSettings::default()
        });
        let mut property = PropertyRenderer::new();
        property.set_unit_strategy(UnitStrategy::Pooled);
        property.add_texture(texture("a"));
        property.add_texture(texture("b"));

        let error = property.render(&mut ctx).unwrap_err();
        assert_eq!(
            error,
            RenderError::Bind(BindError::PoolExhausted { slot: 1, requested: 2 })
        );
        assert_eq!(property.texture_unit_at(0), Some(0));

        property.post_render(&mut ctx);
        assert_eq!(ctx.pool().free_count(), 1);
        assert_eq!(property.texture_unit_at(0), None);
    }

    #[test]
    fn test_from_settings() {
        let settings = PropertySettings {
            point_size: 3.0,
            line_stipple_pattern: 0x00FF,
            line_stipple_repeat: 2,
            frontface_culling: true,
            ..PropertySettings::default()
        };
        let property = PropertyRenderer::from_settings(
            &settings,
            &BinderSettings { strategy: UnitStrategy::Pooled },
        );

        assert_relative_eq!(property.point_size(), 3.0);
        assert_eq!(property.line_stipple(), (2, 0x00FF));
        assert!(property.frontface_culling());
        assert_eq!(property.unit_strategy(), UnitStrategy::Pooled);
    }

    #[test]
    fn test_material_color() {
        let straight = compute_material_color(false, 0.5, [1.0, 0.5, 0.25], 0.4);
        assert_relative_eq!(straight[0], 0.5);
        assert_relative_eq!(straight[1], 0.25);
        assert_relative_eq!(straight[2], 0.125);
        assert_relative_eq!(straight[3], 0.4);

        let premultiplied = compute_material_color(true, 0.5, [1.0, 0.5, 0.25], 0.4);
        assert_relative_eq!(premultiplied[0], 0.2);
        assert_relative_eq!(premultiplied[1], 0.1);
        assert_relative_eq!(premultiplied[3], 0.4);
    }
}
