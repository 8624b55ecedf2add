//! Telescope optical configuration for the imaging instrument.
//!
//! Holds the pupil and aberration parameters that drive the optical part of
//! the system MTF and the radiance to irradiance conversion at the focal
//! plane.
//!
//! # Physics Models
//!
//! ## Cut-off frequency
//! An incoherent circular pupil transmits no spatial frequency above
//! - **fc = D / (λ·f)** (cycles per metre in the focal plane)
//!
//! ## Focal-plane irradiance
//! For an extended scene of radiance L the focal-plane irradiance is
//! - **E = L · Tr · (D/f)⁴ · π/4**
//!
//! ## Wavefront error
//! Residual aberrations are characterised by the RMS of the low- and
//! high-frequency wavefront error together with an empirical weight for each.
//!
//! The band-dependent quantities are evaluated once the telescope is
//! flattened into [`PhysicalParameters`](crate::hardware::PhysicalParameters).
//!
//! # Examples
//!
//! ```rust
//! use ism_simulator::hardware::telescope::{TelescopeConfig, WavefrontError};
//!
//! let telescope = TelescopeConfig::new(
//!     "Demo",
//!     0.5,  // 50cm aperture
//!     2.5,  // 2.5m focal length
//!     0.9,  // 90% transmittance
//!     WavefrontError::default(),
//!     0.0,
//! );
//!
//! assert_eq!(telescope.f_number(), 5.0);
//! ```

use serde::{Deserialize, Serialize};

/// RMS wavefront error split into low and high spatial-frequency terms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WavefrontError {
    /// Empirical coefficient for the low-frequency term [-]
    pub k_lf: f64,
    /// RMS of the low-frequency wavefront error [m]
    pub w_lf_m: f64,
    /// Empirical coefficient for the high-frequency term [-]
    pub k_hf: f64,
    /// RMS of the high-frequency wavefront error [m]
    pub w_hf_m: f64,
}

/// Telescope optical system configuration.
///
/// All lengths are in metres. The configuration is read-only for the
/// whole simulation of a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelescopeConfig {
    /// Telescope model name or identifier
    pub name: String,
    /// Entrance pupil diameter in meters
    pub aperture_m: f64,
    /// Effective focal length in meters
    pub focal_length_m: f64,
    /// Optical transmittance (0.0-1.0)
    pub transmittance: f64,
    /// Residual wavefront error
    #[serde(default)]
    pub wavefront_error: WavefrontError,
    /// Defocus coefficient, defocus/(f/N). 0-2 is low defocusing
    #[serde(default)]
    pub defocus: f64,
}

impl TelescopeConfig {
    /// Create a new telescope configuration
    pub fn new(
        name: impl Into<String>,
        aperture_m: f64,
        focal_length_m: f64,
        transmittance: f64,
        wavefront_error: WavefrontError,
        defocus: f64,
    ) -> Self {
        Self {
            name: name.into(),
            aperture_m,
            focal_length_m,
            transmittance,
            wavefront_error,
            defocus,
        }
    }

    /// Get the f-number of the telescope
    pub fn f_number(&self) -> f64 {
        self.focal_length_m / self.aperture_m
    }
}

/// Predefined telescope models
pub mod models {
    use super::*;
    use once_cell::sync::Lazy;

    /// Compact VNIR imager optics: 15cm pupil at f/3.5
    pub static VNIR_150MM: Lazy<TelescopeConfig> = Lazy::new(|| {
        TelescopeConfig::new(
            "VNIR 150mm",
            0.15,
            0.5262,
            0.99,
            WavefrontError {
                k_lf: 1.0,
                w_lf_m: 30e-9,
                k_hf: 1.0,
                w_hf_m: 10e-9,
            },
            0.1,
        )
    });

    /// Diffraction-limited 50cm telescope at f/5
    pub static IDEAL_50CM: Lazy<TelescopeConfig> = Lazy::new(|| {
        TelescopeConfig::new("Ideal 50cm", 0.5, 2.5, 0.9, WavefrontError::default(), 0.0)
    });
}
