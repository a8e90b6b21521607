//! Errors and per-slot diagnostics produced while binding texture units

use std::fmt;

use thiserror::Error;

/// How a diagnostic affected the operation that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The slot was skipped; remaining slots were still processed
    Skip,
    /// The operation stopped at this slot
    Abort,
}

/// What went wrong for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Assigned unit lies outside `[0, max_units)`
    HardwareLimitExceeded,
    /// Another slot already bound the same unit in this pass
    DuplicateUnit,
    /// The context's unit pool had no free unit left
    PoolExhausted,
}

/// A recoverable condition reported for a single texture slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Skip or abort
    pub severity: Severity,
    /// Condition category
    pub kind: DiagnosticKind,
    /// Index of the slot in the property's texture list
    pub slot: usize,
    /// Unit involved, when one was known
    pub unit: Option<i32>,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Unit index outside the hardware range; the slot is skipped
    pub fn hardware_limit(slot: usize, unit: Option<i32>, max_units: u32) -> Self {
        let message = match unit {
            Some(unit) => format!(
                "Hardware does not support texture unit {} (slot {}, {} units available)",
                unit, slot, max_units
            ),
            None => format!("Texture slot {} has no texture unit assigned", slot),
        };
        Self {
            severity: Severity::Skip,
            kind: DiagnosticKind::HardwareLimitExceeded,
            slot,
            unit,
            message,
        }
    }

    /// Unit already used by an earlier slot of the same pass; the slot is skipped
    pub fn duplicate_unit(slot: usize, unit: u32) -> Self {
        Self {
            severity: Severity::Skip,
            kind: DiagnosticKind::DuplicateUnit,
            slot,
            unit: i32::try_from(unit).ok(),
            message: format!("Texture unit {} is already bound by an earlier slot (slot {})", unit, slot),
        }
    }

    /// No free unit left in the pool; the bind is aborted
    pub fn pool_exhausted(slot: usize, requested: usize) -> Self {
        Self {
            severity: Severity::Abort,
            kind: DiagnosticKind::PoolExhausted,
            slot,
            unit: None,
            message: format!(
                "Not enough texture units: slot {} of {} could not be allocated",
                slot, requested
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Failure of a texture bind call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The unit pool ran dry part-way through a pooled bind
    ///
    /// Slots before `slot` keep the units they were given; the matching
    /// release call must still run to return them.
    #[error("not enough texture units: slot {slot} of {requested} could not be allocated")]
    PoolExhausted {
        /// First slot that did not receive a unit
        slot: usize,
        /// Number of slots the call tried to bind
        requested: usize,
    },
}

impl BindError {
    /// The diagnostic equivalent of this error
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            BindError::PoolExhausted { slot, requested } => Diagnostic::pool_exhausted(*slot, *requested),
        }
    }
}

/// Errors surfaced by the property renderer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Texture binding failed
    #[error("texture binding failed: {0}")]
    Bind(#[from] BindError),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
