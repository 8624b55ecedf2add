//! Complete instrument description and per-band physical parameters.
//!
//! An [`InstrumentConfig`] bundles the telescope, the detector, the platform
//! motion and the list of spectral bands the instrument images. It is the
//! configuration record loaded once per run; each band is then simulated
//! from the flat [`PhysicalParameters`] produced by
//! [`InstrumentConfig::band_parameters`].
//!
//! Configurations are stored as JSON:
//!
//! ```json
//! {
//!   "name": "demo",
//!   "telescope": { "name": "t", "aperture_m": 0.5, "focal_length_m": 2.5, "transmittance": 0.9 },
//!   "sensor": { "name": "s", "pixel_pitch_m": 13e-6, "output_conversion_factor": 1e-3,
//!               "adc_gain": 1.0, "bit_depth": 12, "min_voltage": 0.0, "max_voltage": 3.3 },
//!   "motion": { "k_smear": 0.0, "k_motion": 0.0 },
//!   "bands": [ { "id": "VNIR-0", "central_wavelength_m": 550e-9 } ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{MotionConfig, SensorConfig, TelescopeConfig};

/// Errors raised while loading or validating an instrument configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("duplicate band id: {0}")]
    DuplicateBand(String),

    #[error("unknown band: {0}")]
    UnknownBand(String),
}

/// A spectral band of the instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralBand {
    /// Band identifier, e.g. `VNIR-0`
    pub id: String,
    /// Central wavelength in meters
    pub central_wavelength_m: f64,
}

impl SpectralBand {
    pub fn new(id: impl Into<String>, central_wavelength_m: f64) -> Self {
        Self {
            id: id.into(),
            central_wavelength_m,
        }
    }
}

/// Which intermediate products get handed to the output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Save the band image straight after ISRF integration
    pub save_after_isrf: bool,
    /// Save the irradiance image after the spatial filter
    pub save_optical_stage: bool,
    /// Save the digitised image
    pub save_vcu_stage: bool,
    /// Save the MTF contributors and frequency axes
    pub save_mtf: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_after_isrf: true,
            save_optical_stage: true,
            save_vcu_stage: true,
            save_mtf: true,
        }
    }
}

/// Flat, read-only parameter record for simulating one band.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalParameters {
    /// Band identifier
    pub band: String,
    /// Telescope pupil diameter [m]
    pub aperture_m: f64,
    /// Focal length [m]
    pub focal_length_m: f64,
    /// Pixel pitch [m]
    pub pixel_pitch_m: f64,
    /// Central wavelength of the band [m]
    pub wavelength_m: f64,
    pub k_lf: f64,
    pub w_lf_m: f64,
    pub k_hf: f64,
    pub w_hf_m: f64,
    pub defocus: f64,
    pub k_smear: f64,
    pub k_motion: f64,
    /// Optical transmittance [-]
    pub transmittance: f64,
    /// Output conversion factor [V/e-]
    pub output_conversion_factor: f64,
    pub adc_gain: f64,
    pub bit_depth: u8,
    pub min_voltage: f64,
    pub max_voltage: f64,
}

impl PhysicalParameters {
    /// Optical cut-off frequency `D/(λ·f)` in cycles per metre
    pub fn cutoff_frequency(&self) -> f64 {
        self.aperture_m / (self.wavelength_m * self.focal_length_m)
    }

    /// Radiance to irradiance factor `Tr·(D/f)⁴·π/4`
    pub fn irradiance_factor(&self) -> f64 {
        crate::photometry::irradiance_factor(
            self.aperture_m,
            self.focal_length_m,
            self.transmittance,
        )
    }

    /// Wavefront error exponent weight at the band's wavelength
    pub fn wavefront_weight(&self) -> f64 {
        self.k_lf * (self.w_lf_m / self.wavelength_m).powi(2)
            + self.k_hf * (self.w_hf_m / self.wavelength_m).powi(2)
    }
}

/// Full instrument configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub telescope: TelescopeConfig,
    pub sensor: SensorConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    pub bands: Vec<SpectralBand>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be positive and finite, got {value}"),
        });
    }
    Ok(())
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be non-negative and finite, got {value}"),
        });
    }
    Ok(())
}

impl InstrumentConfig {
    /// Parse and validate a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the physical plausibility of every parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.telescope;
        require_positive("telescope.aperture_m", t.aperture_m)?;
        require_positive("telescope.focal_length_m", t.focal_length_m)?;
        if !(t.transmittance > 0.0 && t.transmittance <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "telescope.transmittance",
                reason: format!("must lie in (0, 1], got {}", t.transmittance),
            });
        }
        require_non_negative("telescope.wavefront_error.k_lf", t.wavefront_error.k_lf)?;
        require_non_negative("telescope.wavefront_error.w_lf_m", t.wavefront_error.w_lf_m)?;
        require_non_negative("telescope.wavefront_error.k_hf", t.wavefront_error.k_hf)?;
        require_non_negative("telescope.wavefront_error.w_hf_m", t.wavefront_error.w_hf_m)?;
        require_non_negative("telescope.defocus", t.defocus)?;

        let s = &self.sensor;
        require_positive("sensor.pixel_pitch_m", s.pixel_pitch_m)?;
        require_positive("sensor.output_conversion_factor", s.output_conversion_factor)?;
        require_positive("sensor.adc_gain", s.adc_gain)?;
        if !(1..=16).contains(&s.bit_depth) {
            return Err(ConfigError::InvalidParameter {
                name: "sensor.bit_depth",
                reason: format!("must lie in 1..=16, got {}", s.bit_depth),
            });
        }
        let range = s.max_voltage - s.min_voltage;
        if range.is_nan() || range <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "sensor.max_voltage",
                reason: format!(
                    "must exceed min_voltage ({} <= {})",
                    s.max_voltage, s.min_voltage
                ),
            });
        }

        require_non_negative("motion.k_smear", self.motion.k_smear)?;
        require_non_negative("motion.k_motion", self.motion.k_motion)?;

        let mut seen = HashSet::new();
        for band in &self.bands {
            require_positive("bands.central_wavelength_m", band.central_wavelength_m)?;
            if !seen.insert(band.id.as_str()) {
                return Err(ConfigError::DuplicateBand(band.id.clone()));
            }
        }
        Ok(())
    }

    /// Band ids in configuration order
    pub fn band_ids(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.id.as_str())
    }

    /// Flatten the configuration into the parameter record of one band
    pub fn band_parameters(&self, band_id: &str) -> Result<PhysicalParameters, ConfigError> {
        let band = self
            .bands
            .iter()
            .find(|b| b.id == band_id)
            .ok_or_else(|| ConfigError::UnknownBand(band_id.to_string()))?;

        let t = &self.telescope;
        let s = &self.sensor;
        Ok(PhysicalParameters {
            band: band.id.clone(),
            aperture_m: t.aperture_m,
            focal_length_m: t.focal_length_m,
            pixel_pitch_m: s.pixel_pitch_m,
            wavelength_m: band.central_wavelength_m,
            k_lf: t.wavefront_error.k_lf,
            w_lf_m: t.wavefront_error.w_lf_m,
            k_hf: t.wavefront_error.k_hf,
            w_hf_m: t.wavefront_error.w_hf_m,
            defocus: t.defocus,
            k_smear: self.motion.k_smear,
            k_motion: self.motion.k_motion,
            transmittance: t.transmittance,
            output_conversion_factor: s.output_conversion_factor,
            adc_gain: s.adc_gain,
            bit_depth: s.bit_depth,
            min_voltage: s.min_voltage,
            max_voltage: s.max_voltage,
        })
    }
}

/// Predefined instruments
pub mod models {
    use super::*;
    use crate::hardware::sensor::models::{CMOS_13UM, VNIR_LINE_30UM};
    use crate::hardware::telescope::models::{IDEAL_50CM, VNIR_150MM};
    use once_cell::sync::Lazy;

    /// Four-band VNIR pushbroom imager
    pub static VNIR_IMAGER: Lazy<InstrumentConfig> = Lazy::new(|| InstrumentConfig {
        name: "VNIR imager".to_string(),
        telescope: VNIR_150MM.clone(),
        sensor: VNIR_LINE_30UM.clone(),
        motion: MotionConfig::new(0.2, 0.1),
        bands: vec![
            SpectralBand::new("VNIR-0", 0.49e-6),
            SpectralBand::new("VNIR-1", 0.665e-6),
            SpectralBand::new("VNIR-2", 0.865e-6),
            SpectralBand::new("VNIR-3", 0.945e-6),
        ],
        output: OutputConfig::default(),
    });

    /// Single-band diffraction-limited demonstrator
    pub static DEMO_550NM: Lazy<InstrumentConfig> = Lazy::new(|| InstrumentConfig {
        name: "Demo 550nm".to_string(),
        telescope: IDEAL_50CM.clone(),
        sensor: CMOS_13UM.clone(),
        motion: MotionConfig::default(),
        bands: vec![SpectralBand::new("VIS", 550e-9)],
        output: OutputConfig::default(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_models_validate() {
        models::VNIR_IMAGER.validate().unwrap();
        models::DEMO_550NM.validate().unwrap();
    }

    #[test]
    fn test_band_parameters_flatten() {
        let params = models::VNIR_IMAGER.band_parameters("VNIR-1").unwrap();
        assert_eq!(params.band, "VNIR-1");
        assert_relative_eq!(params.wavelength_m, 0.665e-6);
        assert_relative_eq!(params.aperture_m, 0.15);
        assert_eq!(params.bit_depth, 12);
        assert_relative_eq!(params.k_smear, 0.2);
    }

    #[test]
    fn test_derived_optical_quantities() {
        let mut params = models::DEMO_550NM.band_parameters("VIS").unwrap();
        // D / (λ f) = 0.5 / (550e-9 * 2.5)
        assert_relative_eq!(params.cutoff_frequency(), 363_636.363_636_363_6, epsilon = 1e-6);
        let expected = 0.9 * (0.5_f64 / 2.5).powi(4) * std::f64::consts::PI / 4.0;
        assert_relative_eq!(params.irradiance_factor(), expected, epsilon = 1e-15);

        params.k_lf = 1.0;
        params.w_lf_m = 55e-9;
        params.k_hf = 2.0;
        params.w_hf_m = 11e-9;
        // (0.1)² + 2·(0.02)²
        assert_relative_eq!(params.wavefront_weight(), 0.0108, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_band() {
        let err = models::VNIR_IMAGER.band_parameters("SWIR-0").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBand(ref b) if b == "SWIR-0"));
    }

    #[test]
    fn test_validation_rejects_bad_bit_depth() {
        let mut config = models::DEMO_550NM.clone();
        config.sensor.bit_depth = 17;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "sensor.bit_depth",
                ..
            })
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_voltage_range() {
        let mut config = models::DEMO_550NM.clone();
        config.sensor.min_voltage = 3.3;
        config.sensor.max_voltage = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicate_bands() {
        let mut config = models::DEMO_550NM.clone();
        config.bands.push(SpectralBand::new("VIS", 600e-9));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateBand(ref b)) if b == "VIS"
        ));
    }

    #[test]
    fn test_json_defaults_for_optional_sections() {
        let json = r#"{
            "name": "minimal",
            "telescope": { "name": "t", "aperture_m": 0.5, "focal_length_m": 2.5, "transmittance": 0.9 },
            "sensor": { "name": "s", "pixel_pitch_m": 13e-6, "output_conversion_factor": 1e-3,
                        "adc_gain": 1.0, "bit_depth": 12, "min_voltage": 0.0, "max_voltage": 3.3 },
            "bands": [ { "id": "B0", "central_wavelength_m": 5.5e-7 } ]
        }"#;
        let config = InstrumentConfig::from_json_str(json).unwrap();
        assert_eq!(config.motion, MotionConfig::default());
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.telescope.defocus, 0.0);
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("instrument.json");

        models::VNIR_IMAGER.save_to_file(&path).unwrap();
        let loaded = InstrumentConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, *models::VNIR_IMAGER);
    }
}
