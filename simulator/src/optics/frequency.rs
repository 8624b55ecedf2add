//! Spatial-frequency grids matching an image's sampling.
//!
//! Each image axis of `n` pixels with pitch `w` is sampled in frequency on
//! `[-1/(2w), 1/(2w))` with step `1/(n·w)`. Two 2D grids are derived from
//! the pair of 1D axes:
//!
//! - **normalised** `fn = f / (1/w)`, used by the detector and motion terms
//! - **relative** `fr = f / fc` with cut-off `fc = D/(λ·f)`, used by the
//!   optical terms
//!
//! Rows are along track (ALT) and columns across track (ACT); the grids are
//! combined with `ij` indexing so that `grid[[row, col]]` uses the ALT
//! frequency of `row` and the ACT frequency of `col`.

use ndarray::{Array1, Array2};

use crate::error::{ensure_shape, IsmError};

/// Slack subtracted from the upper bound so the axis stays half open.
const AXIS_EPSILON: f64 = 1e-8;

/// Frequency axis of an image dimension in cycles per metre.
///
/// Samples `-1/(2w) + i/(n·w)` for every `i` whose value lies below
/// `1/(2w) - ε`.
pub fn frequency_axis(n: usize, pixel_pitch_m: f64) -> Array1<f64> {
    let start = -1.0 / (2.0 * pixel_pitch_m);
    let stop = 1.0 / (2.0 * pixel_pitch_m) - AXIS_EPSILON;
    let step = 1.0 / (n as f64 * pixel_pitch_m);

    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    Array1::from_shape_fn(count, |i| start + i as f64 * step)
}

/// Combine two 1D axes into the radial magnitude grid `sqrt(alt² + act²)`.
fn radial_grid(alt: &Array1<f64>, act: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((alt.len(), act.len()), |(i, j)| alt[i].hypot(act[j]))
}

/// Normalised and relative spatial-frequency grids for one image shape.
#[derive(Debug, Clone)]
pub struct FrequencyGrid {
    /// Normalised frequency `f/(1/w)`, shape (rows, columns)
    pub normalized: Array2<f64>,
    /// Relative frequency `f/fc`, shape (rows, columns)
    pub relative: Array2<f64>,
    /// Normalised ACT frequency axis, one entry per column
    pub fn_act: Array1<f64>,
    /// Normalised ALT frequency axis, one entry per row
    pub fn_alt: Array1<f64>,
    /// Optical cut-off frequency in cycles per metre
    pub cutoff_frequency: f64,
}

impl FrequencyGrid {
    /// Derive the grids for an image of `rows × cols` pixels.
    ///
    /// # Arguments
    /// * `rows` - Lines of the image (ALT)
    /// * `cols` - Columns of the image (ACT)
    /// * `pixel_pitch_m` - Pixel size [m]
    /// * `cutoff_frequency` - Optical cut-off `D/(λ·f)` [cycles/m], as given
    ///   by `PhysicalParameters::cutoff_frequency`
    ///
    /// # Errors
    /// `ShapeMismatch` if floating-point edge effects produce axes whose
    /// lengths differ from the image dimensions.
    pub fn new(
        rows: usize,
        cols: usize,
        pixel_pitch_m: f64,
        cutoff_frequency: f64,
    ) -> Result<Self, IsmError> {
        let f_alt = frequency_axis(rows, pixel_pitch_m);
        let f_act = frequency_axis(cols, pixel_pitch_m);
        ensure_shape("frequency grid", (rows, cols), (f_alt.len(), f_act.len()))?;

        let fn_alt = f_alt.mapv(|f| f * pixel_pitch_m);
        let fn_act = f_act.mapv(|f| f * pixel_pitch_m);
        let fr_alt = f_alt.mapv(|f| f / cutoff_frequency);
        let fr_act = f_act.mapv(|f| f / cutoff_frequency);

        Ok(Self {
            normalized: radial_grid(&fn_alt, &fn_act),
            relative: radial_grid(&fr_alt, &fr_act),
            fn_act,
            fn_alt,
            cutoff_frequency,
        })
    }

    /// Image shape the grids were derived for, (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.normalized.dim()
    }
}
