//! Run the instrument simulation over a TOA radiance cube
//!
//! The scene is either read from a JSON cube file or generated as the
//! spectrally flat reference gradient. Every configured band (or the one
//! selected with `--band`) is processed and its products written as JSON
//! documents to the output directory.
//!
//! Usage:
//! ```
//! cargo run --release --bin ism_run -- --isrf-dir auxiliary --output-dir out
//! cargo run --release --bin ism_run -- --instrument demo --gradient 100x150
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ism_simulator::hardware::InstrumentConfig;
use ism_simulator::io::{read_cube, JsonDirectorySink, NullSink, ProductSink};
use ism_simulator::photometry::{RadianceCube, SpectralResponse, WavelengthUnit};
use ism_simulator::scene::{gradient_scene, spectral_axis, GRADIENT_ACT, GRADIENT_ALT};
use ism_simulator::shared_args::{parse_grid_size, GridSize, InstrumentModel, UnitArg};
use ism_simulator::Ism;
use log::{info, warn};

/// Half width of the flat response used when no ISRF tables are given
const FLAT_ISRF_HALF_WIDTH_UM: f64 = 0.02;
const FLAT_ISRF_STEP_UM: f64 = 0.001;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate the digitised output of an EO imager")]
struct Args {
    /// Instrument configuration file (JSON), overrides --instrument
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in instrument model
    #[arg(short, long, default_value_t = InstrumentModel::Vnir)]
    instrument: InstrumentModel,

    /// Directory holding isrf_<band>.txt tables
    #[arg(long)]
    isrf_dir: Option<PathBuf>,

    /// Wavelength unit of the ISRF tables
    #[arg(long, default_value_t = UnitArg::Um)]
    isrf_unit: UnitArg,

    /// Radiance cube file (JSON)
    #[arg(long, conflicts_with = "gradient")]
    input: Option<PathBuf>,

    /// Generate a gradient scene of this size instead of reading one
    #[arg(long, value_parser = parse_grid_size)]
    gradient: Option<GridSize>,

    /// Directory receiving the products, nothing is written when omitted
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Process only this band
    #[arg(short, long)]
    band: Option<String>,
}

/// Flat response centred on every band, in micrometres
fn flat_isrfs(config: &InstrumentConfig) -> Result<HashMap<String, SpectralResponse>> {
    let samples = (2.0 * FLAT_ISRF_HALF_WIDTH_UM / FLAT_ISRF_STEP_UM).round() as usize + 1;
    config
        .bands
        .iter()
        .map(|band| {
            let start = band.central_wavelength_m * 1e6 - FLAT_ISRF_HALF_WIDTH_UM;
            let isrf = SpectralResponse::flat(
                start,
                FLAT_ISRF_STEP_UM,
                samples,
                WavelengthUnit::Micrometer,
            )
            .with_context(|| format!("building flat ISRF for band {}", band.id))?;
            Ok((band.id.clone(), isrf))
        })
        .collect()
}

/// Gradient scene sampled every 5nm across the instrument's bands
fn reference_scene(config: &InstrumentConfig, size: GridSize) -> Result<RadianceCube> {
    let centres_nm: Vec<f64> = config
        .bands
        .iter()
        .map(|b| b.central_wavelength_m * 1e9)
        .collect();
    let lowest = centres_nm.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = centres_nm.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lowest.is_finite() || !highest.is_finite() {
        bail!("instrument {} has no bands", config.name);
    }

    let start = (lowest - 50.0).floor();
    let count = ((highest - start + 50.0) / 5.0).ceil() as usize + 1;
    let wavelengths = spectral_axis(start, 5.0, count);
    Ok(gradient_scene(
        size.rows,
        size.cols,
        &wavelengths,
        10.0,
        1.0,
        1.0,
    )?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => InstrumentConfig::load_from_file(path)
            .with_context(|| format!("loading instrument configuration {}", path.display()))?,
        None => args.instrument.to_config().clone(),
    };
    info!("Instrument: {}", config.name);

    let ism = match &args.isrf_dir {
        Some(dir) => Ism::load(config, dir, args.isrf_unit.into())
            .with_context(|| format!("loading ISRFs from {}", dir.display()))?,
        None => {
            warn!("No ISRF directory given, using flat responses around each band centre");
            let isrfs = flat_isrfs(&config)?;
            Ism::new(config, isrfs)?
        }
    };

    let telescope = &ism.config().telescope;
    let sensor = &ism.config().sensor;
    info!(
        "Telescope: {} at f/{:.2}, sensor: {} with {} DN full scale",
        telescope.name,
        telescope.f_number(),
        sensor.name,
        sensor.max_digital_value()
    );

    let cube = match &args.input {
        Some(path) => read_cube(path)
            .with_context(|| format!("reading radiance cube {}", path.display()))?,
        None => {
            let size = args.gradient.unwrap_or(GridSize {
                rows: GRADIENT_ALT,
                cols: GRADIENT_ACT,
            });
            reference_scene(ism.config(), size)?
        }
    };
    let (rows, cols, samples) = cube.dim();
    info!("Scene: {rows}x{cols} pixels, {samples} spectral samples");

    let sink: Box<dyn ProductSink> = match &args.output_dir {
        Some(dir) => Box::new(
            JsonDirectorySink::new(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?,
        ),
        None => Box::new(NullSink),
    };

    let products = match &args.band {
        Some(band) => ism.process_bands(&cube, &[band.as_str()], sink.as_ref())?,
        None => ism.process_all(&cube, sink.as_ref())?,
    };

    println!(
        "{:<10} {:>14} {:>10} {:>10} {:>12}",
        "Band", "Irr. factor", "MTF ACT", "MTF ALT", "Saturated %"
    );
    for band in &products {
        println!(
            "{:<10} {:>14.6e} {:>10.4} {:>10.4} {:>12.2}",
            band.band(),
            band.optical.irradiance_factor,
            band.nyquist.act.system,
            band.nyquist.alt.system,
            band.saturated_percent()
        );
    }
    if let Some(dir) = &args.output_dir {
        println!("Products written to {}", dir.display());
    }

    Ok(())
}
