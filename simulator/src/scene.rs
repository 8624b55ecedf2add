//! Synthetic TOA radiance scenes.
//!
//! The reference test input of the simulator is a spectrally flat radiance
//! ramp: 100 along-track lines by 150 across-track columns whose radiance
//! grows linearly with the line and column index. [`gradient_scene`] builds
//! scenes of that kind at any size.

use ndarray::{Array1, Array3};

use crate::error::IsmError;
use crate::photometry::RadianceCube;

/// Lines of the reference gradient scene
pub const GRADIENT_ALT: usize = 100;
/// Columns of the reference gradient scene
pub const GRADIENT_ACT: usize = 150;

/// Spectrally flat radiance ramp.
///
/// Pixel `(i, j)` holds `base + alt_slope·i + act_slope·j` at every
/// wavelength.
///
/// # Arguments
/// * `rows` - Along-track lines
/// * `cols` - Across-track columns
/// * `wavelengths_nm` - Spectral axis of the cube, strictly increasing
/// * `base` - Radiance of pixel (0, 0)
/// * `alt_slope` - Radiance increment per line
/// * `act_slope` - Radiance increment per column
pub fn gradient_scene(
    rows: usize,
    cols: usize,
    wavelengths_nm: &[f64],
    base: f64,
    alt_slope: f64,
    act_slope: f64,
) -> Result<RadianceCube, IsmError> {
    let data = Array3::from_shape_fn((rows, cols, wavelengths_nm.len()), |(i, j, _)| {
        base + alt_slope * i as f64 + act_slope * j as f64
    });
    RadianceCube::new(data, Array1::from(wavelengths_nm.to_vec()))
}

/// Evenly spaced spectral axis from `start_nm` with `count` samples
pub fn spectral_axis(start_nm: f64, step_nm: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start_nm + i as f64 * step_nm).collect()
}
