//! Instrument spectral response functions (ISRF).
//!
//! An ISRF is the spectral sensitivity curve of one band, tabulated on a
//! uniform wavelength grid. It is stored exactly as loaded; normalisation to
//! unit integral happens at integration time through [`SpectralResponse::normalized`].
//!
//! # File format
//!
//! Band responses are plain two-column text tables named `isrf_<band>.txt`:
//!
//! ```text
//! # wavelength [um], response
//! 0.480, 0.10
//! 0.481, 0.35
//! 0.482, 0.80
//! ```
//!
//! Columns may be separated by commas, tabs or spaces. Lines starting with
//! `#` and blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative tolerance on the wavelength step when checking uniform sampling
const STEP_TOLERANCE: f64 = 1e-6;

/// Errors raised when building or loading a spectral response
#[derive(Debug, Error)]
pub enum SpectralResponseError {
    #[error("wavelength and response tables differ in length ({wavelengths} vs {responses})")]
    LengthMismatch { wavelengths: usize, responses: usize },

    #[error("at least two samples are required, got {0}")]
    TooFewSamples(usize),

    #[error("wavelengths must be strictly increasing (sample {index})")]
    NotIncreasing { index: usize },

    #[error("wavelength step is not uniform (sample {index})")]
    NonUniformStep { index: usize },

    #[error("response at sample {index} must be finite and non-negative, got {value}")]
    InvalidResponse { index: usize, value: f64 },

    #[error("response integrates to zero")]
    ZeroIntegral,

    #[error("failed to read spectral response: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Unit of a tabulated wavelength axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavelengthUnit {
    Nanometer,
    Micrometer,
    Meter,
}

impl WavelengthUnit {
    /// Multiplier taking a value in this unit to nanometres
    pub fn to_nanometers(self) -> f64 {
        match self {
            WavelengthUnit::Nanometer => 1.0,
            WavelengthUnit::Micrometer => 1e3,
            WavelengthUnit::Meter => 1e9,
        }
    }
}

/// Tabulated spectral response of one band.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralResponse {
    wavelengths: Vec<f64>,
    responses: Vec<f64>,
    unit: WavelengthUnit,
}

impl SpectralResponse {
    /// Build a response from wavelength and response tables.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The tables differ in length or hold fewer than two samples
    /// - Wavelengths are not strictly increasing with a uniform step
    /// - A response is negative or not finite
    /// - The responses sum to zero
    pub fn new(
        wavelengths: Vec<f64>,
        responses: Vec<f64>,
        unit: WavelengthUnit,
    ) -> Result<Self, SpectralResponseError> {
        if wavelengths.len() != responses.len() {
            return Err(SpectralResponseError::LengthMismatch {
                wavelengths: wavelengths.len(),
                responses: responses.len(),
            });
        }
        if wavelengths.len() < 2 {
            return Err(SpectralResponseError::TooFewSamples(wavelengths.len()));
        }

        let step = wavelengths[1] - wavelengths[0];
        for i in 1..wavelengths.len() {
            let delta = wavelengths[i] - wavelengths[i - 1];
            if delta.is_nan() || delta <= 0.0 {
                return Err(SpectralResponseError::NotIncreasing { index: i });
            }
            if (delta - step).abs() > STEP_TOLERANCE * step {
                return Err(SpectralResponseError::NonUniformStep { index: i });
            }
        }

        for (index, &value) in responses.iter().enumerate() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SpectralResponseError::InvalidResponse { index, value });
            }
        }
        if responses.iter().sum::<f64>() == 0.0 {
            return Err(SpectralResponseError::ZeroIntegral);
        }

        Ok(Self {
            wavelengths,
            responses,
            unit,
        })
    }

    /// Parse a two-column (wavelength, response) text table.
    pub fn from_text<R: BufRead>(
        reader: R,
        unit: WavelengthUnit,
    ) -> Result<Self, SpectralResponseError> {
        let mut wavelengths = Vec::new();
        let mut responses = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty());
            let mut next_value = |what: &str| -> Result<f64, SpectralResponseError> {
                let field = fields.next().ok_or_else(|| SpectralResponseError::Parse {
                    line: number + 1,
                    reason: format!("missing {what} column"),
                })?;
                field.parse::<f64>().map_err(|e| SpectralResponseError::Parse {
                    line: number + 1,
                    reason: format!("invalid {what} '{field}': {e}"),
                })
            };

            wavelengths.push(next_value("wavelength")?);
            responses.push(next_value("response")?);
        }

        Self::new(wavelengths, responses, unit)
    }

    /// Load the response of `band_id` from `<dir>/isrf_<band_id>.txt`.
    pub fn load_band(
        dir: &Path,
        band_id: &str,
        unit: WavelengthUnit,
    ) -> Result<Self, SpectralResponseError> {
        let path = dir.join(format!("isrf_{band_id}.txt"));
        let file = File::open(&path)?;
        Self::from_text(BufReader::new(file), unit)
    }

    /// Flat (top-hat) response sampled at `n` points from `start` with `step`.
    pub fn flat(
        start: f64,
        step: f64,
        n: usize,
        unit: WavelengthUnit,
    ) -> Result<Self, SpectralResponseError> {
        let wavelengths = (0..n).map(|i| start + i as f64 * step).collect();
        Self::new(wavelengths, vec![1.0; n], unit)
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn responses(&self) -> &[f64] {
        &self.responses
    }

    pub fn unit(&self) -> WavelengthUnit {
        self.unit
    }

    /// Spacing between consecutive wavelength samples
    pub fn step(&self) -> f64 {
        self.wavelengths[1] - self.wavelengths[0]
    }

    /// Discrete integral `Σ response · step`
    pub fn integral(&self) -> f64 {
        self.responses.iter().sum::<f64>() * self.step()
    }

    /// Responses scaled so that `Σ response · step == 1`
    pub fn normalized(&self) -> Array1<f64> {
        let integral = self.integral();
        self.responses.iter().map(|r| r / integral).collect()
    }

    /// Copy of this response with the wavelength axis in nanometres
    pub fn to_nanometers(&self) -> SpectralResponse {
        let scale = self.unit.to_nanometers();
        SpectralResponse {
            wavelengths: self.wavelengths.iter().map(|w| w * scale).collect(),
            responses: self.responses.clone(),
            unit: WavelengthUnit::Nanometer,
        }
    }
}
