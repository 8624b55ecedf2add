//! Optical phase: spectral filter, radiometry and spatial filter of one band.

use log::{debug, info};
use ndarray::Array2;

use super::{product_name, FN_ACT, FN_ALT, ISM_TOA_ISRF, ISM_TOA_OPTICAL, MTF_SYSTEM};
use crate::error::IsmError;
use crate::hardware::instrument::OutputConfig;
use crate::hardware::PhysicalParameters;
use crate::image_proc::apply_system_mtf;
use crate::io::{Product, ProductSink};
use crate::optics::{Contributor, SystemMtf};
use crate::photometry::{
    radiance_to_irradiance, spectral_integration, RadianceCube, SpectralResponse,
};

/// Intermediate and final images of the optical phase
#[derive(Debug, Clone)]
pub struct OpticalProducts {
    /// Band radiance after ISRF integration
    pub after_isrf: Array2<f64>,
    /// Focal-plane irradiance before the spatial filter
    pub irradiance: Array2<f64>,
    /// Radiance to irradiance scale applied
    pub irradiance_factor: f64,
    /// System MTF and contributors used by the spatial filter
    pub mtf: SystemMtf,
    /// Irradiance after the spatial filter
    pub optical: Array2<f64>,
}

/// Runs the optical stages of one band
#[derive(Debug, Clone, Copy, Default)]
pub struct OpticalPhase {
    output: OutputConfig,
}

impl OpticalPhase {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    /// Integrate, convert and filter one band.
    ///
    /// # Arguments
    /// * `cube` - TOA radiance cube of the scene
    /// * `isrf` - Spectral response of the band
    /// * `params` - Physical parameters of the band
    /// * `sink` - Receives the products enabled in the output configuration
    pub fn compute(
        &self,
        cube: &RadianceCube,
        isrf: &SpectralResponse,
        params: &PhysicalParameters,
        sink: &dyn ProductSink,
    ) -> Result<OpticalProducts, IsmError> {
        let band = params.band.as_str();
        info!("EODP-ALG-ISM-1000: Optical stage");

        info!("EODP-ALG-ISM-1010: Spectral modelling. ISRF");
        let after_isrf = spectral_integration(cube, isrf);
        log_first_pixel(&after_isrf, "radiance");
        if self.output.save_after_isrf {
            sink.save(
                &product_name(ISM_TOA_ISRF, band),
                Product::Image(after_isrf.view()),
            )?;
        }

        info!("EODP-ALG-ISM-1020: Radiances to Irradiances");
        let factor = params.irradiance_factor();
        let irradiance = radiance_to_irradiance(&after_isrf.view(), factor);
        log_first_pixel(&irradiance, "irradiance");

        info!("EODP-ALG-ISM-1030: Spatial modelling. PSF/MTF");
        let (rows, cols) = irradiance.dim();
        let mtf = SystemMtf::compute(rows, cols, params)?;
        if self.output.save_mtf {
            save_mtf(&mtf, band, sink)?;
        }

        let optical = apply_system_mtf(&irradiance.view(), &mtf.system.view())?;
        log_first_pixel(&optical, "irradiance");
        if self.output.save_optical_stage {
            sink.save(
                &product_name(ISM_TOA_OPTICAL, band),
                Product::Image(optical.view()),
            )?;
        }

        Ok(OpticalProducts {
            after_isrf,
            irradiance,
            irradiance_factor: factor,
            mtf,
            optical,
        })
    }
}

fn log_first_pixel(image: &Array2<f64>, unit: &str) {
    if let Some(value) = image.first() {
        debug!("TOA [0,0] {value} [{unit}]");
    }
}

/// Hand every MTF map and both frequency axes to the sink
fn save_mtf(mtf: &SystemMtf, band: &str, sink: &dyn ProductSink) -> Result<(), IsmError> {
    for contributor in Contributor::ALL {
        sink.save(
            &format!("{}_{band}", contributor.label()),
            Product::Image(mtf.contributor(contributor).view()),
        )?;
    }
    sink.save(
        &product_name(MTF_SYSTEM, band),
        Product::Image(mtf.system.view()),
    )?;
    sink.save(
        &product_name(FN_ACT, band),
        Product::Vector(mtf.grid.fn_act.view()),
    )?;
    sink.save(
        &product_name(FN_ALT, band),
        Product::Vector(mtf.grid.fn_alt.view()),
    )?;
    Ok(())
}
