//! # Texture Unit Binder
//!
//! Binds a property's texture slots to hardware texture units before a draw
//! and releases them afterwards.
//!
//! ## Strategies
//!
//! - **Fixed**: each slot carries a caller-assigned unit. Units outside
//!   `[0, max_units)` are skipped with a diagnostic, never wrapped or
//!   clamped.
//! - **Pooled**: units are requested from the context's
//!   [`TextureUnitPool`](super::TextureUnitPool) on every bind and returned on
//!   release. Exhaustion aborts the bind.
//!
//! ## State Contract
//!
//! Whenever multitexturing is available, `bind_all`, `release_all` and
//! `release_graphics_resources` leave unit 0 active so unrelated drawables
//! start from the default unit. Without multitexturing only slot 0 is bound
//! and no unit is ever selected.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::capabilities::load_multitexturing;
use super::context::{Capability, RenderContext, TextureTarget};
use super::error::{BindError, Diagnostic};
use super::texture::{HasHardwareHandle, TextureSlot};

/// How texture slots are mapped to hardware units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStrategy {
    /// Use the unit stored on each slot
    #[default]
    Fixed,
    /// Allocate units from the context pool for each render cycle
    Pooled,
}

/// A slot that was bound or released, with the unit used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundSlot {
    /// Index in the slot list
    pub slot: usize,
    /// Unit used; `None` when no unit was selected
    pub unit: Option<u32>,
}

/// Outcome of a successful [`TextureUnitBinder::bind_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    requested: usize,
    bound: Vec<BoundSlot>,
    diagnostics: Vec<Diagnostic>,
    single_texture: bool,
}

impl BindReport {
    /// No slots were attached; nothing to bind is not a failure
    pub fn no_textures(&self) -> bool {
        self.requested == 0
    }

    /// Number of slots the call was given
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Slots bound, in binding order
    pub fn bound(&self) -> &[BoundSlot] {
        &self.bound
    }

    /// Whether at least one texture ended up bound
    pub fn any_bound(&self) -> bool {
        !self.bound.is_empty()
    }

    /// Slots skipped, with the reason
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Multitexturing was unavailable and only slot 0 was bound
    pub fn is_single_texture(&self) -> bool {
        self.single_texture
    }
}

/// Outcome of a release call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    released: Vec<BoundSlot>,
    diagnostics: Vec<Diagnostic>,
}

impl ReleaseReport {
    /// Slots released, with the unit they were released from
    pub fn released(&self) -> &[BoundSlot] {
        &self.released
    }

    /// Slots skipped, with the reason
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Nothing was released and nothing was reported
    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.diagnostics.is_empty()
    }
}

fn report_skip(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    log::error!("{}", diagnostic.message);
    diagnostics.push(diagnostic);
}

/// Sequences texture-unit activation, binding and release for one drawable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureUnitBinder {
    strategy: UnitStrategy,
}

impl TextureUnitBinder {
    /// Create a binder using `strategy`
    pub fn new(strategy: UnitStrategy) -> Self {
        Self { strategy }
    }

    /// Active strategy
    pub fn strategy(&self) -> UnitStrategy {
        self.strategy
    }

    /// Change strategy; only between a release and the next bind
    pub fn set_strategy(&mut self, strategy: UnitStrategy) {
        self.strategy = strategy;
    }

    /// Bind every slot to a hardware unit
    ///
    /// Zero slots yield a report with [`BindReport::no_textures`] set. In
    /// pooled mode a failure leaves earlier slots holding their units; call
    /// [`release_all`](Self::release_all) regardless of the outcome.
    pub fn bind_all(
        &self,
        slots: &mut [TextureSlot],
        context: &mut dyn RenderContext,
    ) -> Result<BindReport, BindError> {
        let mut report = BindReport {
            requested: slots.len(),
            ..BindReport::default()
        };
        let Some(first) = slots.first_mut() else {
            return Ok(report);
        };

        load_multitexturing(context);
        if !context.multitexture_resolved() {
            first.texture_mut().render_bind_or_load(context);
            report.single_texture = true;
            report.bound.push(BoundSlot { slot: 0, unit: None });
            return Ok(report);
        }

        let outcome = match self.strategy {
            UnitStrategy::Fixed => {
                Self::bind_fixed(slots, context, &mut report);
                Ok(())
            }
            UnitStrategy::Pooled => Self::bind_pooled(slots, context, &mut report),
        };
        context.set_active_unit(0);

        log::debug!(
            "Bound {} of {} texture slots ({:?})",
            report.bound.len(),
            report.requested,
            self.strategy
        );
        outcome.map(|()| report)
    }

    fn bind_fixed(slots: &mut [TextureSlot], context: &mut dyn RenderContext, report: &mut BindReport) {
        let max_units = context.max_texture_units();
        let mut used = HashSet::new();

        for (index, slot) in slots.iter_mut().enumerate() {
            let Some(unit) = slot.unit_in_range(max_units) else {
                report_skip(
                    &mut report.diagnostics,
                    Diagnostic::hardware_limit(index, slot.assigned_unit(), max_units),
                );
                continue;
            };
            if !used.insert(unit) {
                report_skip(&mut report.diagnostics, Diagnostic::duplicate_unit(index, unit));
                continue;
            }

            context.set_active_unit(unit);
            slot.texture_mut().render_bind_or_load(context);
            report.bound.push(BoundSlot { slot: index, unit: Some(unit) });
        }
    }

    fn bind_pooled(
        slots: &mut [TextureSlot],
        context: &mut dyn RenderContext,
        report: &mut BindReport,
    ) -> Result<(), BindError> {
        let requested = slots.len();

        for (index, slot) in slots.iter_mut().enumerate() {
            let held = slot
                .allocated_unit()
                .filter(|unit| context.texture_unit_pool().is_allocated(*unit));
            let unit = match held {
                Some(unit) => {
                    log::debug!("Slot {} still holds texture unit {}", index, unit);
                    unit
                }
                None => match context.texture_unit_pool().allocate() {
                    Some(unit) => unit,
                    None => {
                        let error = BindError::PoolExhausted { slot: index, requested };
                        log::error!("{}", error);
                        return Err(error);
                    }
                },
            };

            slot.set_allocated_unit(Some(unit));
            context.set_active_unit(unit);
            slot.texture_mut().render_bind_or_load(context);
            report.bound.push(BoundSlot { slot: index, unit: Some(unit) });
        }
        Ok(())
    }

    /// Deactivate the units bound by [`bind_all`](Self::bind_all)
    ///
    /// Pooled units are returned to the context pool and cleared from their
    /// slots, so a second call finds nothing to free. A slot still holding a
    /// pooled unit gives it back even when the strategy has since switched to
    /// fixed units.
    pub fn release_all(&self, slots: &mut [TextureSlot], context: &mut dyn RenderContext) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        if slots.is_empty() || !context.multitexture_resolved() {
            return report;
        }

        let max_units = context.max_texture_units();
        for (index, slot) in slots.iter_mut().enumerate() {
            if let Some(unit) = slot.take_allocated_unit() {
                Self::deactivate_unit(context, unit);
                context.texture_unit_pool().free(unit);
                report.released.push(BoundSlot { slot: index, unit: Some(unit) });
                continue;
            }
            if self.strategy == UnitStrategy::Pooled {
                continue;
            }

            let Some(unit) = slot.unit_in_range(max_units) else {
                report_skip(
                    &mut report.diagnostics,
                    Diagnostic::hardware_limit(index, slot.assigned_unit(), max_units),
                );
                continue;
            };
            Self::deactivate_unit(context, unit);
            report.released.push(BoundSlot { slot: index, unit: Some(unit) });
        }
        context.set_active_unit(0);
        report
    }

    /// Return the pooled unit `slot` holds, if any, before the slot is dropped
    ///
    /// The unit's targets are disabled and unit 0 is left active.
    pub fn release_slot(slot: &mut TextureSlot, context: &mut dyn RenderContext) -> Option<u32> {
        let unit = slot.take_allocated_unit()?;
        Self::deactivate_unit(context, unit);
        context.texture_unit_pool().free(unit);
        context.set_active_unit(0);
        Some(unit)
    }

    fn deactivate_unit(context: &mut dyn RenderContext, unit: u32) {
        context.set_active_unit(unit);
        for target in TextureTarget::ALL {
            context.disable(Capability::Texture(target));
        }
    }

    /// Release the GPU resources of every attached texture
    ///
    /// On a mapped context with multitexturing, each texture holding a
    /// hardware handle is released from its own unit; textures without a
    /// handle are skipped. Otherwise every texture is released without
    /// selecting units.
    pub fn release_graphics_resources(
        &self,
        slots: &mut [TextureSlot],
        context: &mut dyn RenderContext,
    ) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        if slots.is_empty() {
            return report;
        }

        if !(context.is_mapped() && context.multitexture_resolved()) {
            for (index, slot) in slots.iter_mut().enumerate() {
                slot.texture_mut().release_graphics_resources(context);
                report.released.push(BoundSlot { slot: index, unit: None });
            }
            return report;
        }

        let max_units = context.max_texture_units();
        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.texture().hardware_handle().is_none() {
                continue;
            }
            let unit = match self.strategy {
                UnitStrategy::Fixed => match slot.unit_in_range(max_units) {
                    Some(unit) => Some(unit),
                    None => {
                        report_skip(
                            &mut report.diagnostics,
                            Diagnostic::hardware_limit(index, slot.assigned_unit(), max_units),
                        );
                        continue;
                    }
                },
                UnitStrategy::Pooled => slot.allocated_unit(),
            };

            if let Some(unit) = unit {
                context.set_active_unit(unit);
            }
            slot.texture_mut().release_graphics_resources(context);
            report.released.push(BoundSlot { slot: index, unit });
        }
        context.set_active_unit(0);
        report
    }
}
