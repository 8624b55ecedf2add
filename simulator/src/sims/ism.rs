//! Instrument simulation over every band of an instrument.
//!
//! Bands share nothing but the read-only scene and configuration, so they
//! are processed in parallel, each owning its own products.

use std::collections::HashMap;
use std::path::Path;

use log::info;
use ndarray::Array2;
use rayon::prelude::*;

use super::optical_phase::{OpticalPhase, OpticalProducts};
use super::video_chain_phase::{VideoChainPhase, VideoChainProducts};
use crate::error::IsmError;
use crate::hardware::{InstrumentConfig, PhysicalParameters};
use crate::io::ProductSink;
use crate::optics::{nyquist_mtf, NyquistMtf};
use crate::photometry::{RadianceCube, SpectralResponse, WavelengthUnit};

/// Everything produced for one band
#[derive(Debug, Clone)]
pub struct BandProducts {
    pub params: PhysicalParameters,
    pub optical: OpticalProducts,
    pub video: VideoChainProducts,
    /// System MTF at the Nyquist frequency
    pub nyquist: NyquistMtf,
}

impl BandProducts {
    pub fn band(&self) -> &str {
        &self.params.band
    }

    /// Final digitised image
    pub fn counts(&self) -> &Array2<u16> {
        &self.video.digitised.counts
    }

    pub fn saturated_percent(&self) -> f64 {
        self.video.digitised.saturated_percent()
    }
}

/// Simulator of one instrument with the spectral responses of its bands.
#[derive(Debug, Clone)]
pub struct Ism {
    config: InstrumentConfig,
    isrfs: HashMap<String, SpectralResponse>,
}

impl Ism {
    /// Build a simulator from a validated configuration and per-band ISRFs.
    pub fn new(
        config: InstrumentConfig,
        isrfs: HashMap<String, SpectralResponse>,
    ) -> Result<Self, IsmError> {
        config.validate()?;
        Ok(Self { config, isrfs })
    }

    /// Load `isrf_<band>.txt` for every configured band from `dir`.
    pub fn load(
        config: InstrumentConfig,
        isrf_dir: &Path,
        unit: WavelengthUnit,
    ) -> Result<Self, IsmError> {
        let mut isrfs = HashMap::new();
        for band in config.band_ids() {
            let isrf = SpectralResponse::load_band(isrf_dir, band, unit)?;
            isrfs.insert(band.to_string(), isrf);
        }
        Self::new(config, isrfs)
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    /// Run both phases for one band.
    pub fn process_band(
        &self,
        cube: &RadianceCube,
        band_id: &str,
        sink: &dyn ProductSink,
    ) -> Result<BandProducts, IsmError> {
        let params = self.config.band_parameters(band_id)?;
        let isrf = self
            .isrfs
            .get(band_id)
            .ok_or_else(|| IsmError::MissingIsrf(band_id.to_string()))?;
        info!("Processing band {band_id}");

        let optical = OpticalPhase::new(self.config.output).compute(cube, isrf, &params, sink)?;
        let video = VideoChainPhase::new(self.config.output).compute(
            &optical.optical.view(),
            &params,
            sink,
        )?;
        let nyquist = nyquist_mtf(&params);
        info!(
            "Band {band_id}: Nyquist MTF ACT {:.4}, ALT {:.4}, saturated {:.2}%",
            nyquist.act.system,
            nyquist.alt.system,
            video.digitised.saturated_percent()
        );

        Ok(BandProducts {
            params,
            optical,
            video,
            nyquist,
        })
    }

    /// Run a subset of bands in parallel, results in the order given.
    pub fn process_bands(
        &self,
        cube: &RadianceCube,
        band_ids: &[&str],
        sink: &dyn ProductSink,
    ) -> Result<Vec<BandProducts>, IsmError> {
        band_ids
            .par_iter()
            .map(|band| self.process_band(cube, band, sink))
            .collect()
    }

    /// Run every configured band in parallel.
    pub fn process_all(
        &self,
        cube: &RadianceCube,
        sink: &dyn ProductSink,
    ) -> Result<Vec<BandProducts>, IsmError> {
        info!("Instrument simulation of {}", self.config.name);
        let bands: Vec<&str> = self.config.band_ids().collect();
        self.process_bands(cube, &bands, sink)
    }
}
