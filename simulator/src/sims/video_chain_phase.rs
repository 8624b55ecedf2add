//! Video chain phase: read-out, amplification and digitisation of one band.

use log::{debug, info};
use ndarray::ArrayView2;

use super::{product_name, ISM_TOA};
use crate::error::IsmError;
use crate::hardware::instrument::OutputConfig;
use crate::hardware::video_chain::{digitise, electrons_to_voltage, Digitised, VoltageImage};
use crate::hardware::PhysicalParameters;
use crate::io::{Product, ProductSink};

/// Intermediate and final images of the video chain
#[derive(Debug, Clone)]
pub struct VideoChainProducts {
    pub voltage: VoltageImage,
    pub digitised: Digitised,
}

/// Runs the video chain stages of one band
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoChainPhase {
    output: OutputConfig,
}

impl VideoChainPhase {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    /// Convert a focal-plane signal image to digital counts.
    pub fn compute(
        &self,
        image: &ArrayView2<f64>,
        params: &PhysicalParameters,
        sink: &dyn ProductSink,
    ) -> Result<VideoChainProducts, IsmError> {
        info!("EODP-ALG-ISM-3000: Video Chain");

        info!("EODP-ALG-ISM-3010: Electrons to Voltage - Read-out and Amplification");
        let voltage = electrons_to_voltage(image, params.output_conversion_factor, params.adc_gain);
        if let Some(v) = voltage.volts.first() {
            debug!("TOA [0,0] {v} [V]");
        }

        info!("EODP-ALG-ISM-3020: Voltage to Digital Numbers - Digitisation");
        let digitised = digitise(
            &voltage.volts.view(),
            params.bit_depth,
            params.min_voltage,
            params.max_voltage,
        );
        if let Some(dn) = digitised.counts.first() {
            debug!("TOA [0,0] {dn} [DN]");
        }

        if self.output.save_vcu_stage {
            sink.save(
                &product_name(ISM_TOA, &params.band),
                Product::Counts(digitised.counts.view()),
            )?;
        }

        Ok(VideoChainProducts { voltage, digitised })
    }
}
