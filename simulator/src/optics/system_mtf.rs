//! Composite system MTF of the instrument.
//!
//! The six contributors are treated as independent degradation sources, so
//! the system MTF is their elementwise product. All six maps are kept next
//! to the product for diagnostics, together with the marginal frequency
//! axes they were evaluated on.

use log::{debug, info};
use ndarray::{s, Array1, Array2};

use super::frequency::FrequencyGrid;
use super::mtf;
use crate::error::IsmError;
use crate::hardware::PhysicalParameters;

/// Normalised frequency of the pixel Nyquist limit.
pub const NYQUIST_NORMALIZED: f64 = 0.5;

/// The individual contributors to the system MTF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Contributor {
    Diffraction,
    Defocus,
    WavefrontError,
    Detector,
    Smear,
    Motion,
}

impl Contributor {
    pub const ALL: [Contributor; 6] = [
        Contributor::Diffraction,
        Contributor::Defocus,
        Contributor::WavefrontError,
        Contributor::Detector,
        Contributor::Smear,
        Contributor::Motion,
    ];

    /// Short product label, e.g. `Hdiff`
    pub fn label(&self) -> &'static str {
        match self {
            Contributor::Diffraction => "Hdiff",
            Contributor::Defocus => "Hdefoc",
            Contributor::WavefrontError => "Hwfe",
            Contributor::Detector => "Hdet",
            Contributor::Smear => "Hsmear",
            Contributor::Motion => "Hmotion",
        }
    }
}

/// System MTF and its contributors for one band and image shape.
#[derive(Debug, Clone)]
pub struct SystemMtf {
    /// Grids the maps were evaluated on
    pub grid: FrequencyGrid,
    pub diffraction: Array2<f64>,
    pub defocus: Array2<f64>,
    pub wavefront_error: Array2<f64>,
    pub detector: Array2<f64>,
    pub smear: Array2<f64>,
    pub motion: Array2<f64>,
    /// Elementwise product of the six contributors
    pub system: Array2<f64>,
}

impl SystemMtf {
    /// Compute every contributor and the system MTF for a `rows × cols` image.
    pub fn compute(
        rows: usize,
        cols: usize,
        params: &PhysicalParameters,
    ) -> Result<Self, IsmError> {
        info!("Calculation of the System MTF");

        debug!("Calculation of 2D relative frequencies");
        let grid = FrequencyGrid::new(rows, cols, params.pixel_pitch_m, params.cutoff_frequency())?;
        let fr = grid.relative.view();
        let fn_ = grid.normalized.view();

        debug!("Calculation of the diffraction MTF");
        let diffraction = mtf::mtf_diffraction(&fr);
        let defocus = mtf::mtf_defocus(&fr, params.defocus);
        let wavefront_error = mtf::mtf_wavefront_error(&fr, params.wavefront_weight());
        let detector = mtf::mtf_detector(&fn_);
        let smear = mtf::mtf_smear(&grid.fn_alt.view(), cols, params.k_smear);
        let motion = mtf::mtf_motion(&fn_, params.k_motion);

        debug!("Calculation of the system MTF by multiplying the different contributors");
        let system = &diffraction * &defocus * &wavefront_error * &detector * &smear * &motion;

        Ok(Self {
            grid,
            diffraction,
            defocus,
            wavefront_error,
            detector,
            smear,
            motion,
            system,
        })
    }

    /// Image shape, (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.system.dim()
    }

    /// Map of one contributor
    pub fn contributor(&self, which: Contributor) -> &Array2<f64> {
        match which {
            Contributor::Diffraction => &self.diffraction,
            Contributor::Defocus => &self.defocus,
            Contributor::WavefrontError => &self.wavefront_error,
            Contributor::Detector => &self.detector,
            Contributor::Smear => &self.smear,
            Contributor::Motion => &self.motion,
        }
    }

    /// Index of the central row and column
    fn centre(&self) -> (usize, usize) {
        let (rows, cols) = self.shape();
        (rows / 2, cols / 2)
    }

    /// Positive-frequency half of the central ALT row (an ACT profile).
    pub fn act_cut(&self) -> MtfCut {
        let (half_alt, half_act) = self.centre();
        let take = |map: &Array2<f64>| map.slice(s![half_alt, half_act..]).to_owned();
        MtfCut {
            frequencies: self.grid.fn_act.slice(s![half_act..]).to_owned(),
            diffraction: take(&self.diffraction),
            defocus: take(&self.defocus),
            wavefront_error: take(&self.wavefront_error),
            detector: take(&self.detector),
            smear: take(&self.smear),
            motion: take(&self.motion),
            system: take(&self.system),
        }
    }

    /// Positive-frequency half of the central ACT column (an ALT profile).
    pub fn alt_cut(&self) -> MtfCut {
        let (half_alt, half_act) = self.centre();
        let take = |map: &Array2<f64>| map.slice(s![half_alt.., half_act]).to_owned();
        MtfCut {
            frequencies: self.grid.fn_alt.slice(s![half_alt..]).to_owned(),
            diffraction: take(&self.diffraction),
            defocus: take(&self.defocus),
            wavefront_error: take(&self.wavefront_error),
            detector: take(&self.detector),
            smear: take(&self.smear),
            motion: take(&self.motion),
            system: take(&self.system),
        }
    }
}

/// One-dimensional profile through the MTF maps
#[derive(Debug, Clone)]
pub struct MtfCut {
    /// Normalised frequencies of the profile samples
    pub frequencies: Array1<f64>,
    pub diffraction: Array1<f64>,
    pub defocus: Array1<f64>,
    pub wavefront_error: Array1<f64>,
    pub detector: Array1<f64>,
    pub smear: Array1<f64>,
    pub motion: Array1<f64>,
    pub system: Array1<f64>,
}

/// Every contributor evaluated at a single frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MtfBreakdown {
    pub diffraction: f64,
    pub defocus: f64,
    pub wavefront_error: f64,
    pub detector: f64,
    pub smear: f64,
    pub motion: f64,
    pub system: f64,
}

/// Evaluate the MTF chain at one normalised (ALT, ACT) frequency pair.
pub fn evaluate_at(params: &PhysicalParameters, fn_alt: f64, fn_act: f64) -> MtfBreakdown {
    let fn_ = fn_alt.hypot(fn_act);
    // fr = f/fc and f = fn/w
    let fr = fn_ / (params.pixel_pitch_m * params.cutoff_frequency());

    let diffraction = mtf::diffraction(fr);
    let defocus = mtf::defocus(fr, params.defocus);
    let wavefront_error = mtf::wavefront_error(fr, params.wavefront_weight());
    let detector = mtf::detector(fn_);
    let smear = mtf::smear(fn_alt, params.k_smear);
    let motion = mtf::motion(fn_, params.k_motion);

    MtfBreakdown {
        diffraction,
        defocus,
        wavefront_error,
        detector,
        smear,
        motion,
        system: diffraction * defocus * wavefront_error * detector * smear * motion,
    }
}

/// MTF at the Nyquist frequency along each image direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NyquistMtf {
    /// Across track: fn_act = 0.5, fn_alt = 0
    pub act: MtfBreakdown,
    /// Along track: fn_alt = 0.5, fn_act = 0
    pub alt: MtfBreakdown,
}

/// System MTF figure of merit at the pixel Nyquist frequency
pub fn nyquist_mtf(params: &PhysicalParameters) -> NyquistMtf {
    NyquistMtf {
        act: evaluate_at(params, 0.0, NYQUIST_NORMALIZED),
        alt: evaluate_at(params, NYQUIST_NORMALIZED, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::instrument::models::{DEMO_550NM, VNIR_IMAGER};
    use approx::assert_relative_eq;

    fn vnir_params() -> PhysicalParameters {
        VNIR_IMAGER.band_parameters("VNIR-0").unwrap()
    }

    #[test]
    fn test_product_of_contributors() {
        let mtf = SystemMtf::compute(10, 12, &vnir_params()).unwrap();
        for ((i, j), &value) in mtf.system.indexed_iter() {
            let product: f64 = Contributor::ALL
                .iter()
                .map(|&c| mtf.contributor(c)[[i, j]])
                .product();
            assert_relative_eq!(value, product, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_maps_use_parameter_formulas() {
        let params = vnir_params();
        let mtf = SystemMtf::compute(8, 10, &params).unwrap();
        assert_eq!(mtf.grid.cutoff_frequency, params.cutoff_frequency());

        let weight = params.wavefront_weight();
        assert!(weight > 0.0);
        for (&r, &value) in mtf.grid.relative.iter().zip(mtf.wavefront_error.iter()) {
            assert_eq!(value, mtf::wavefront_error(r, weight));
        }
    }

    #[test]
    fn test_dc_gain_is_one() {
        let mtf = SystemMtf::compute(8, 8, &vnir_params()).unwrap();
        // Zero frequency sits at (rows/2, cols/2) for even shapes
        assert_relative_eq!(mtf.system[[4, 4]], 1.0, epsilon = 1e-12);
        for c in Contributor::ALL {
            assert_relative_eq!(mtf.contributor(c)[[4, 4]], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_all_maps_share_image_shape() {
        let mtf = SystemMtf::compute(6, 9, &vnir_params()).unwrap();
        assert_eq!(mtf.shape(), (6, 9));
        for c in Contributor::ALL {
            assert_eq!(mtf.contributor(c).dim(), (6, 9));
        }
        assert_eq!(mtf.grid.fn_alt.len(), 6);
        assert_eq!(mtf.grid.fn_act.len(), 9);
    }

    #[test]
    fn test_system_mtf_bounded() {
        let mtf = SystemMtf::compute(16, 16, &vnir_params()).unwrap();
        for &v in mtf.system.iter() {
            assert!(v.is_finite());
            assert!(v <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_grid_matches_scalar_evaluation() {
        let params = vnir_params();
        let mtf = SystemMtf::compute(8, 10, &params).unwrap();
        for &(i, j) in &[(0, 0), (2, 7), (4, 5), (7, 9)] {
            let point = evaluate_at(&params, mtf.grid.fn_alt[i], mtf.grid.fn_act[j]);
            assert_relative_eq!(mtf.system[[i, j]], point.system, max_relative = 1e-9);
            assert_relative_eq!(mtf.smear[[i, j]], point.smear, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_cuts_start_at_zero_frequency() {
        let mtf = SystemMtf::compute(8, 12, &vnir_params()).unwrap();
        let act = mtf.act_cut();
        let alt = mtf.alt_cut();
        assert_eq!(act.frequencies.len(), 6);
        assert_eq!(alt.frequencies.len(), 4);
        assert!(act.frequencies[0].abs() < 1e-12);
        assert!(alt.frequencies[0].abs() < 1e-12);
        assert_relative_eq!(act.system[0], 1.0, epsilon = 1e-12);
        assert_eq!(act.system.len(), act.frequencies.len());
        assert_eq!(alt.detector.len(), alt.frequencies.len());
    }

    #[test]
    fn test_smear_only_affects_alt() {
        let params = vnir_params();
        let nyquist = nyquist_mtf(&params);
        assert_eq!(nyquist.act.smear, 1.0);
        assert!(nyquist.alt.smear < 1.0);
    }

    #[test]
    fn test_nyquist_detector_term() {
        let nyquist = nyquist_mtf(&DEMO_550NM.band_parameters("VIS").unwrap());
        assert_relative_eq!(
            nyquist.act.detector,
            2.0 / std::f64::consts::PI,
            epsilon = 1e-12
        );
        assert_relative_eq!(nyquist.act.system, nyquist.alt.system, epsilon = 1e-12);
        assert!(nyquist.act.system > 0.0 && nyquist.act.system < 1.0);
    }

    #[test]
    fn test_contributor_labels_unique() {
        let mut labels: Vec<_> = Contributor::ALL.iter().map(|c| c.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 6);
    }
}
