//! Two-tier parameter store: live values echo the UI, committed values feed the engine.
//!
//! Only a change of the committed snapshot is reported back to callers, and
//! only that snapshot is ever handed to processing or export.

mod params;

pub use params::{
    AdjustmentKey, AdjustmentParams, AdjustmentValue, ColorAdjustments, Filters, ParamRange,
};

use thiserror::Error;

pub type AdjustmentResult<T> = std::result::Result<T, AdjustmentError>;

#[derive(Debug, Error, PartialEq)]
pub enum AdjustmentError {
    #[error("{key:?} expects a {expected} value")]
    ValueKind {
        key: AdjustmentKey,
        expected: &'static str,
    },
    #[error("{key:?} received a non-finite value")]
    NonFinite { key: AdjustmentKey },
}

fn write_value(
    params: &mut AdjustmentParams,
    key: AdjustmentKey,
    value: AdjustmentValue,
) -> AdjustmentResult<()> {
    match (key.range(), value) {
        (Some(range), AdjustmentValue::Amount(amount)) => {
            if !amount.is_finite() {
                return Err(AdjustmentError::NonFinite { key });
            }
            if let Some(slot) = params.amount_slot(key) {
                *slot = range.clamp(amount);
            }
            Ok(())
        }
        (None, AdjustmentValue::Toggle(enabled)) => {
            params.color.monochrome = enabled;
            Ok(())
        }
        (Some(_), AdjustmentValue::Toggle(_)) => Err(AdjustmentError::ValueKind {
            key,
            expected: "numeric",
        }),
        (None, AdjustmentValue::Amount(_)) => Err(AdjustmentError::ValueKind {
            key,
            expected: "toggle",
        }),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentState {
    live: AdjustmentParams,
    committed: AdjustmentParams,
}

impl AdjustmentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values the UI renders.
    pub const fn live(&self) -> &AdjustmentParams {
        &self.live
    }

    /// Snapshot the engine is allowed to see.
    pub const fn committed(&self) -> &AdjustmentParams {
        &self.committed
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        self.live != self.committed
    }

    /// Continuous slider feedback; never reaches the engine.
    pub fn update(&mut self, key: AdjustmentKey, value: AdjustmentValue) -> AdjustmentResult<()> {
        write_value(&mut self.live, key, value)
    }

    /// Finalises `value` for `key`.
    ///
    /// Returns the new committed snapshot when it differs from the previous one.
    pub fn commit(
        &mut self,
        key: AdjustmentKey,
        value: AdjustmentValue,
    ) -> AdjustmentResult<Option<AdjustmentParams>> {
        let mut next = self.committed;
        write_value(&mut next, key, value)?;
        write_value(&mut self.live, key, value)?;
        Ok(self.replace_committed(next))
    }

    /// Commits whatever the live value of `key` is, as on a slider release.
    pub fn release(&mut self, key: AdjustmentKey) -> Option<AdjustmentParams> {
        let mut next = self.committed;
        match self.live.get(key) {
            AdjustmentValue::Amount(amount) => {
                if let Some(slot) = next.amount_slot(key) {
                    *slot = amount;
                }
            }
            AdjustmentValue::Toggle(enabled) => next.color.monochrome = enabled,
        }
        self.replace_committed(next)
    }

    pub fn reset_key(&mut self, key: AdjustmentKey) -> Option<AdjustmentParams> {
        let defaults = AdjustmentParams::default();
        let mut next = self.committed;
        match (next.amount_slot(key), defaults.get(key)) {
            (Some(slot), AdjustmentValue::Amount(amount)) => *slot = amount,
            _ => next.color.monochrome = defaults.color.monochrome,
        }
        match (self.live.amount_slot(key), defaults.get(key)) {
            (Some(slot), AdjustmentValue::Amount(amount)) => *slot = amount,
            _ => self.live.color.monochrome = defaults.color.monochrome,
        }
        self.replace_committed(next)
    }

    pub fn reset_all(&mut self) -> Option<AdjustmentParams> {
        self.live = AdjustmentParams::default();
        self.replace_committed(AdjustmentParams::default())
    }

    fn replace_committed(&mut self, next: AdjustmentParams) -> Option<AdjustmentParams> {
        if next == self.committed {
            return None;
        }
        tracing::debug!(params = ?next, "adjustments committed");
        self.committed = next;
        Some(next)
    }
}
