//! Volume level and display tier
//!
//! Volume is a linear fraction (0.0-1.0) handed straight to the media
//! element; the tier only drives the speaker icon.

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of the `Low` tier
const LOW_TIER_MAX: f32 = 0.7;

/// Icon state for the current volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTier {
    /// Exactly 0
    Muted,

    /// (0, 0.7]
    Low,

    /// Above 0.7
    High,
}

impl VolumeTier {
    pub fn for_fraction(fraction: f32) -> Self {
        if fraction > LOW_TIER_MAX {
            VolumeTier::High
        } else if fraction > 0.0 {
            VolumeTier::Low
        } else {
            VolumeTier::Muted
        }
    }
}

/// Volume controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    fraction: f32,
}

impl Volume {
    pub fn new(fraction: f32) -> Self {
        Self {
            fraction: Self::sanitize(fraction),
        }
    }

    /// Set volume, clamping to 0.0-1.0 (NaN becomes 0)
    pub fn set(&mut self, fraction: f32) {
        self.fraction = Self::sanitize(fraction);
    }

    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn tier(&self) -> VolumeTier {
        VolumeTier::for_fraction(self.fraction)
    }

    fn sanitize(fraction: f32) -> f32 {
        if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.8)
    }
}
