use std::fmt;

use crate::error::{Error, Result};

/// CLAHE clip limit as chosen on the strength slider.
///
/// Bounded to [1.0, 15.0] in steps of 0.5. Stored as a count of half-steps
/// so that equality and formatting are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipLimit {
    half_steps: u8,
}

impl ClipLimit {
    pub const MIN: ClipLimit = ClipLimit { half_steps: 2 };
    pub const MAX: ClipLimit = ClipLimit { half_steps: 30 };
    pub const DEFAULT: ClipLimit = ClipLimit { half_steps: 6 };
    pub const STEP: f64 = 0.5;

    /// Validates `value` and snaps it to the nearest 0.5 step.
    ///
    /// # Errors
    ///
    /// [`Error::ParameterOutOfRange`] for non-finite values or values outside
    /// [1.0, 15.0].
    pub fn new(value: f64) -> Result<ClipLimit> {
        if !value.is_finite() || value < Self::MIN.value() || value > Self::MAX.value() {
            return Err(Error::ParameterOutOfRange { value });
        }
        Ok(ClipLimit {
            half_steps: (value / Self::STEP).round() as u8,
        })
    }

    pub fn value(self) -> f64 {
        f64::from(self.half_steps) * Self::STEP
    }

    /// Every value the slider can produce, ascending.
    pub fn all() -> impl Iterator<Item = ClipLimit> {
        (Self::MIN.half_steps..=Self::MAX.half_steps).map(|half_steps| ClipLimit { half_steps })
    }

    /// Name of the downloaded PNG, e.g. `imagem_melhorada_clahe_3.0.png`.
    pub fn download_file_name(self) -> String {
        format!("imagem_melhorada_clahe_{self}.png")
    }
}

impl Default for ClipLimit {
    fn default() -> Self {
        ClipLimit::DEFAULT
    }
}

impl fmt::Display for ClipLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}
