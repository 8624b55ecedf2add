//! Frequency-domain application of the system MTF.

use log::debug;
use ndarray::{Array2, ArrayView2, Zip};

use super::fft2d::{fft2, fftshift, ifft2};
use crate::error::{ensure_shape, IsmError};

/// Filter an image with an MTF map sampled on the image's frequency grid.
///
/// The map is rolled with [`fftshift`] so its centre sample lands at `(0, 0)`,
/// multiplied with the image spectrum and transformed back. Only the real
/// part of the result is kept; the imaginary residue is round-off.
///
/// Along an even dimension the centre sample is the zero frequency and the
/// image mean is preserved. Along an odd dimension the grid starting at
/// `-1/(2w)` has no zero-frequency sample: the DC term is scaled by the map
/// value at index `n - n/2`, one step above zero, so even a constant image
/// comes out dimmer.
///
/// # Errors
/// `ShapeMismatch` when image and MTF differ in shape. Checked before any
/// transform runs.
pub fn apply_system_mtf(
    image: &ArrayView2<f64>,
    mtf: &ArrayView2<f64>,
) -> Result<Array2<f64>, IsmError> {
    ensure_shape("spatial filter", image.dim(), mtf.dim())?;

    let mut spectrum = fft2(image);
    let shifted = fftshift(mtf);
    Zip::from(&mut spectrum)
        .and(&shifted)
        .for_each(|s, &h| *s *= h);

    let filtered = ifft2(spectrum);
    let residue = filtered.iter().fold(0.0_f64, |acc, v| acc.max(v.im.abs()));
    debug!("Spatial filter imaginary residue: {residue:.3e}");

    Ok(filtered.mapv(|v| v.re))
}
