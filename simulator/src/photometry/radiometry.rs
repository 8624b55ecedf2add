//! Radiance to focal-plane irradiance conversion.
//!
//! For an extended scene imaged by a telescope of pupil diameter `D` and
//! focal length `f`, the irradiance on the focal plane is
//!
//! ```text
//! E = L · Tr · (D/f)⁴ · π/4
//! ```
//!
//! The constant in front of `L` is the dominant radiometric scaling of the
//! instrument and is exposed on its own through [`irradiance_factor`].

use log::debug;
use ndarray::{Array2, ArrayView2};

/// Radiance to irradiance scale `Tr · (D/f)⁴ · π/4`.
///
/// # Arguments
/// * `aperture_m` - Pupil diameter [m]
/// * `focal_length_m` - Focal length [m]
/// * `transmittance` - Optical transmittance [-]
pub fn irradiance_factor(aperture_m: f64, focal_length_m: f64, transmittance: f64) -> f64 {
    transmittance * (aperture_m / focal_length_m).powi(4) * std::f64::consts::PI / 4.0
}

/// Scale a radiance image into focal-plane irradiance.
pub fn radiance_to_irradiance(radiance: &ArrayView2<f64>, factor: f64) -> Array2<f64> {
    debug!("Radiance to irradiance factor: {factor:.8e}");
    radiance.mapv(|l| l * factor)
}
