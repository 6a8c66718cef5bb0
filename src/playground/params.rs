use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token budget sent with every request; not user editable.
pub const FIXED_MAX_TOKENS: u32 = 200;

pub const TEMPERATURE_RANGE: ParamRange = ParamRange {
    min: 0.0,
    max: 2.0,
    step: 0.1,
};

pub const TOP_P_RANGE: ParamRange = ParamRange {
    min: 0.1,
    max: 1.0,
    step: 0.05,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    A,
    B,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParamError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    /// Clamps into range and snaps onto the step grid, the way a slider would.
    pub fn snap(&self, field: &'static str, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite { field });
        }

        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;

        // two decimals is enough for both grids and drops float noise
        Ok(((snapped * 100.0).round() / 100.0).clamp(self.min, self.max))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ParamUpdate {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl ParamSet {
    pub const fn lane_defaults(lane: Lane) -> Self {
        match lane {
            Lane::A => Self {
                temperature: 0.5,
                top_p: 0.9,
                max_tokens: FIXED_MAX_TOKENS,
            },
            Lane::B => Self {
                temperature: 0.8,
                top_p: 0.95,
                max_tokens: FIXED_MAX_TOKENS,
            },
        }
    }

    /// Returns a copy with the update applied, or the first rejected value.
    pub fn updated(self, update: &ParamUpdate) -> Result<Self, ParamError> {
        let mut next = self;
        if let Some(temperature) = update.temperature {
            next.set_temperature(temperature)?;
        }
        if let Some(top_p) = update.top_p {
            next.set_top_p(top_p)?;
        }
        Ok(next)
    }

    pub fn set_temperature(&mut self, value: f32) -> Result<f32, ParamError> {
        self.temperature = TEMPERATURE_RANGE.snap("temperature", value)?;
        Ok(self.temperature)
    }

    pub fn set_top_p(&mut self, value: f32) -> Result<f32, ParamError> {
        self.top_p = TOP_P_RANGE.snap("top_p", value)?;
        Ok(self.top_p)
    }
}
