//! Band integration of a spectrally resolved radiance cube.
//!
//! Every pixel's spectrum is linearly interpolated onto the ISRF wavelength
//! samples and summed against the normalised ISRF:
//!
//! ```text
//! L_band(i, j) = Σ_k interp(λ_k; cube[i, j, :]) · isrf_norm(λ_k) · Δλ
//! ```
//!
//! Samples falling outside the cube's wavelength range contribute zero. The
//! bracket index and interpolation weights only depend on the two wavelength
//! axes, so they are computed once per band as a [`Stencil`] and shared by
//! all pixels, which are then evaluated in parallel.

use log::debug;
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis, Zip};

use super::isrf::{SpectralResponse, SpectralResponseError};
use crate::error::{ensure_shape, IsmError};

/// Spectrally resolved TOA radiance, indexed `[row (ALT), column (ACT), sample]`.
#[derive(Debug, Clone)]
pub struct RadianceCube {
    data: Array3<f64>,
    wavelengths_nm: Array1<f64>,
}

impl RadianceCube {
    /// Wrap a cube and its spectral axis.
    ///
    /// # Errors
    /// `ShapeMismatch` if the cube's spectral length differs from the axis
    /// length. `Spectral` if the axis holds fewer than two samples or is not
    /// strictly increasing.
    pub fn new(data: Array3<f64>, wavelengths_nm: Array1<f64>) -> Result<Self, IsmError> {
        let (_, _, samples) = data.dim();
        ensure_shape("radiance cube", (1, wavelengths_nm.len()), (1, samples))?;

        if wavelengths_nm.len() < 2 {
            return Err(SpectralResponseError::TooFewSamples(wavelengths_nm.len()).into());
        }
        for i in 1..wavelengths_nm.len() {
            let delta = wavelengths_nm[i] - wavelengths_nm[i - 1];
            if delta.is_nan() || delta <= 0.0 {
                return Err(SpectralResponseError::NotIncreasing { index: i }.into());
            }
        }

        Ok(Self {
            data,
            wavelengths_nm,
        })
    }

    /// Cube shape, (rows, columns, spectral samples)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Spatial shape, (rows, columns)
    pub fn image_shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn wavelengths_nm(&self) -> &Array1<f64> {
        &self.wavelengths_nm
    }
}

/// One ISRF sample expressed as a weighted pair of cube samples
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    lower: usize,
    lower_weight: f64,
    upper_weight: f64,
}

/// Precomputed interpolation and quadrature weights for one band.
#[derive(Debug, Clone)]
pub struct Stencil {
    taps: Vec<Tap>,
    /// ISRF samples outside the cube's spectral range
    skipped: usize,
}

impl Stencil {
    /// Combine linear interpolation on the cube's spectral axis with the
    /// quadrature weights `isrf_norm · Δλ` at each ISRF sample.
    ///
    /// The ISRF is rescaled to nanometres first. A [`RadianceCube`] always
    /// carries a strictly increasing axis of at least two samples, which
    /// every tap relies on.
    pub fn new(cube: &RadianceCube, isrf: &SpectralResponse) -> Self {
        let cube_wavelengths = &cube.wavelengths_nm;
        let n = cube_wavelengths.len();
        let first = cube_wavelengths[0];
        let last = cube_wavelengths[n - 1];
        let isrf_nm = isrf.to_nanometers();
        let step = isrf_nm.step();
        let norm = isrf_nm.normalized();

        let mut taps = Vec::with_capacity(isrf_nm.len());
        let mut skipped = 0;
        for (&lambda, &weight) in isrf_nm.wavelengths().iter().zip(norm.iter()) {
            if !(first..=last).contains(&lambda) {
                skipped += 1;
                continue;
            }
            let quadrature = weight * step;

            // Index of the first sample strictly above lambda, kept inside the last segment
            let above = cube_wavelengths
                .as_slice()
                .map(|w| w.partition_point(|&x| x <= lambda))
                .unwrap_or_else(|| cube_wavelengths.iter().take_while(|&&x| x <= lambda).count());
            let lower = above.saturating_sub(1).min(n - 2);

            let (w0, w1) = (cube_wavelengths[lower], cube_wavelengths[lower + 1]);
            let t = (lambda - w0) / (w1 - w0);
            taps.push(Tap {
                lower,
                lower_weight: (1.0 - t) * quadrature,
                upper_weight: t * quadrature,
            });
        }

        Self { taps, skipped }
    }

    /// Number of ISRF samples that fall inside the cube's range
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Number of ISRF samples outside the cube's range (contributing zero)
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Band-integrated value of one pixel's spectrum
    pub fn apply(&self, spectrum: &ArrayView1<f64>) -> f64 {
        self.taps
            .iter()
            .map(|tap| {
                tap.lower_weight * spectrum[tap.lower] + tap.upper_weight * spectrum[tap.lower + 1]
            })
            .sum()
    }
}

/// Integrate a radiance cube over one band's ISRF.
///
/// The ISRF wavelength axis is rescaled to nanometres to match the cube.
/// Pixels are independent and evaluated in parallel.
///
/// # Returns
/// Band radiance image of shape (rows, columns)
pub fn spectral_integration(cube: &RadianceCube, isrf: &SpectralResponse) -> Array2<f64> {
    let stencil = Stencil::new(cube, isrf);
    if stencil.skipped() > 0 {
        debug!(
            "{} of {} ISRF samples outside the cube's spectral range",
            stencil.skipped(),
            isrf.len()
        );
    }

    let mut band = Array2::<f64>::zeros(cube.image_shape());
    Zip::from(&mut band)
        .and(cube.data.lanes(Axis(2)))
        .par_for_each(|out, spectrum| *out = stencil.apply(&spectrum));
    band
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::isrf::WavelengthUnit;
    use approx::assert_relative_eq;
    use ndarray::{array, Array};

    fn linear_axis(start: f64, step: f64, n: usize) -> Array1<f64> {
        Array::from_shape_fn(n, |i| start + i as f64 * step)
    }

    #[test]
    fn test_cube_rejects_spectral_length_mismatch() {
        let data = Array3::<f64>::zeros((2, 2, 5));
        let err = RadianceCube::new(data, linear_axis(400.0, 10.0, 4)).unwrap_err();
        assert!(matches!(err, IsmError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_cube_rejects_unsorted_axis() {
        let data = Array3::<f64>::zeros((1, 1, 3));
        let err = RadianceCube::new(data, array![400.0, 390.0, 410.0]).unwrap_err();
        assert!(matches!(
            err,
            IsmError::Spectral(SpectralResponseError::NotIncreasing { index: 1 })
        ));
    }

    #[test]
    fn test_constant_cube_is_preserved() {
        let cube = RadianceCube::new(
            Array3::from_elem((3, 4, 21), 10.0),
            linear_axis(480.0, 2.0, 21),
        )
        .unwrap();
        // Uneven ISRF shape in micrometres, fully inside the cube range
        let isrf = SpectralResponse::new(
            vec![0.485, 0.4875, 0.490, 0.4925, 0.495],
            vec![0.1, 0.7, 1.0, 0.6, 0.2],
            WavelengthUnit::Micrometer,
        )
        .unwrap();

        let band = spectral_integration(&cube, &isrf);
        assert_eq!(band.dim(), (3, 4));
        for &v in band.iter() {
            assert_relative_eq!(v, 10.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_linear_spectrum_gives_centroid() {
        // Radiance equal to wavelength; a symmetric ISRF centred on 500nm
        let wavelengths = linear_axis(450.0, 5.0, 21);
        let cube = RadianceCube::new(
            Array3::from_shape_fn((1, 1, 21), |(_, _, k)| wavelengths[k]),
            wavelengths.clone(),
        )
        .unwrap();
        let isrf = SpectralResponse::new(
            vec![497.0, 498.5, 500.0, 501.5, 503.0],
            vec![1.0, 2.0, 3.0, 2.0, 1.0],
            WavelengthUnit::Nanometer,
        )
        .unwrap();

        let band = spectral_integration(&cube, &isrf);
        assert_relative_eq!(band[[0, 0]], 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_out_of_range_samples_contribute_zero() {
        // Cube covers 500..=504nm, the ISRF runs from 500 to 509nm
        let cube = RadianceCube::new(
            Array3::from_elem((2, 2, 5), 4.0),
            linear_axis(500.0, 1.0, 5),
        )
        .unwrap();
        let isrf = SpectralResponse::flat(500.0, 1.0, 10, WavelengthUnit::Nanometer).unwrap();

        let stencil = Stencil::new(&cube, &isrf);
        assert_eq!(stencil.len(), 5);
        assert_eq!(stencil.skipped(), 5);

        // Half the normalised ISRF falls inside the range
        let band = spectral_integration(&cube, &isrf);
        for &v in band.iter() {
            assert_relative_eq!(v, 2.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_last_cube_sample_is_in_range() {
        let cube =
            RadianceCube::new(Array3::zeros((1, 1, 3)), linear_axis(500.0, 10.0, 3)).unwrap();
        let isrf = SpectralResponse::new(
            vec![510.0, 520.0],
            vec![1.0, 1.0],
            WavelengthUnit::Nanometer,
        )
        .unwrap();
        let stencil = Stencil::new(&cube, &isrf);
        assert_eq!(stencil.len(), 2);
        assert_eq!(stencil.skipped(), 0);
        assert_relative_eq!(stencil.apply(&array![0.0, 1.0, 3.0].view()), 2.0);
    }

    #[test]
    fn test_short_spectral_axis_never_reaches_stencil() {
        for n in [0, 1] {
            let err = RadianceCube::new(Array3::zeros((1, 1, n)), linear_axis(500.0, 10.0, n))
                .unwrap_err();
            assert!(matches!(
                err,
                IsmError::Spectral(SpectralResponseError::TooFewSamples(m)) if m == n
            ));
        }

        // Two samples form a single segment covering both ends
        let cube = RadianceCube::new(array![[[2.0, 4.0]]], array![500.0, 510.0]).unwrap();
        let isrf = SpectralResponse::new(
            vec![500.0, 505.0, 510.0],
            vec![1.0, 1.0, 1.0],
            WavelengthUnit::Nanometer,
        )
        .unwrap();
        let stencil = Stencil::new(&cube, &isrf);
        assert_eq!(stencil.len(), 3);
        assert_eq!(stencil.skipped(), 0);
        assert_relative_eq!(
            stencil.apply(&array![2.0, 4.0].view()),
            spectral_integration(&cube, &isrf)[[0, 0]],
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_pixels_are_independent() {
        let wavelengths = linear_axis(400.0, 10.0, 11);
        let cube = RadianceCube::new(
            Array3::from_shape_fn((4, 5, 11), |(i, j, _)| (i * 5 + j) as f64),
            wavelengths,
        )
        .unwrap();
        let isrf = SpectralResponse::flat(0.42, 0.005, 9, WavelengthUnit::Micrometer).unwrap();

        let band = spectral_integration(&cube, &isrf);
        for ((i, j), &v) in band.indexed_iter() {
            assert_relative_eq!(v, (i * 5 + j) as f64, epsilon = 1e-9);
        }
    }
}
