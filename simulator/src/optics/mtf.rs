//! Analytical MTF contributors of the imaging chain.
//!
//! Each contributor is written once as a scalar function of a single
//! frequency value and then mapped over a frequency grid. The scalar forms
//! carry the piecewise branches and the zero-argument limits, so the grid
//! versions never divide by zero.
//!
//! | Contributor | Grid       | Model                                      |
//! |-------------|------------|--------------------------------------------|
//! | Diffraction | relative   | `(2/π)(acos r − r·sqrt(1−r²))`, 0 for r ≥ 1 |
//! | Defocus     | relative   | `2·J₁(x)/x`, `x = π·d·r·(1−r)`              |
//! | WFE         | relative   | `exp(−r(1−r)·(kLF(wLF/λ)² + kHF(wHF/λ)²))`   |
//! | Detector    | normalised | `|sinc(fn)|`                               |
//! | Smear       | ALT axis   | `sinc(ks·fn_alt)`, replicated across track |
//! | Motion      | normalised | `sinc(km·fn)`                              |
//!
//! `sinc` is the normalised sinc, `sin(πx)/(πx)`.

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView1, ArrayView2};
use scilib::math::bessel;

/// Arguments closer to zero than this use the analytic limit.
const ZERO_LIMIT: f64 = 1e-10;

/// Normalised sinc, `sin(πx)/(πx)` with value 1 at the origin.
pub fn sinc(x: f64) -> f64 {
    if x.abs() < ZERO_LIMIT {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

/// Diffraction-limited MTF of a circular pupil at relative frequency `r`.
pub fn diffraction(r: f64) -> f64 {
    if r < 1.0 {
        2.0 / PI * (r.acos() - r * (1.0 - r * r).sqrt())
    } else {
        0.0
    }
}

/// Defocus MTF at relative frequency `r` for a defocus coefficient.
pub fn defocus(r: f64, defocus: f64) -> f64 {
    let x = PI * defocus * r * (1.0 - r);
    if x.abs() < ZERO_LIMIT {
        return 1.0; // Limit of 2·J₁(x)/x as x approaches 0
    }
    let j1 = bessel::j_n(1, x);
    2.0 * j1 / x
}

/// Wavefront-error MTF at relative frequency `r`.
///
/// `weight` is the combined `kLF·(wLF/λ)² + kHF·(wHF/λ)²` term.
pub fn wavefront_error(r: f64, weight: f64) -> f64 {
    (-r * (1.0 - r) * weight).exp()
}

/// Detector footprint MTF at normalised frequency `fn`.
pub fn detector(fn_: f64) -> f64 {
    sinc(fn_).abs()
}

/// Along-track smear MTF at normalised ALT frequency.
pub fn smear(fn_alt: f64, k_smear: f64) -> f64 {
    sinc(k_smear * fn_alt)
}

/// Isotropic motion-blur MTF at normalised frequency.
pub fn motion(fn_: f64, k_motion: f64) -> f64 {
    sinc(k_motion * fn_)
}

/// Diffraction MTF over a relative-frequency grid
pub fn mtf_diffraction(fr_2d: &ArrayView2<f64>) -> Array2<f64> {
    fr_2d.mapv(diffraction)
}

/// Defocus MTF over a relative-frequency grid
pub fn mtf_defocus(fr_2d: &ArrayView2<f64>, defocus_coefficient: f64) -> Array2<f64> {
    fr_2d.mapv(|r| defocus(r, defocus_coefficient))
}

/// Wavefront-error MTF over a relative-frequency grid
///
/// # Arguments
/// * `fr_2d` - Relative frequencies (f/fc)
/// * `weight` - Exponent weight `kLF·(wLF/λ)² + kHF·(wHF/λ)²`, as given by
///   `PhysicalParameters::wavefront_weight`
pub fn mtf_wavefront_error(fr_2d: &ArrayView2<f64>, weight: f64) -> Array2<f64> {
    fr_2d.mapv(|r| wavefront_error(r, weight))
}

/// Detector MTF over a normalised-frequency grid
pub fn mtf_detector(fn_2d: &ArrayView2<f64>) -> Array2<f64> {
    fn_2d.mapv(detector)
}

/// Smear MTF evaluated on the ALT axis and replicated over `cols` columns
pub fn mtf_smear(fn_alt: &ArrayView1<f64>, cols: usize, k_smear: f64) -> Array2<f64> {
    let profile = fn_alt.mapv(|f| smear(f, k_smear));
    Array2::from_shape_fn((profile.len(), cols), |(i, _)| profile[i])
}

/// Motion-blur MTF over a normalised-frequency grid
pub fn mtf_motion(fn_2d: &ArrayView2<f64>, k_motion: f64) -> Array2<f64> {
    fn_2d.mapv(|f| motion(f, k_motion))
}
