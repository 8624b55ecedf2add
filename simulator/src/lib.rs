//! Instrument simulation of an Earth-observation imager
//!
//! This crate turns an ideal top-of-atmosphere radiance cube into the digital
//! image a pushbroom sensor would produce for each of its spectral bands:
//!
//! 1. Spectral integration of the cube against the band's ISRF
//! 2. Radiance to focal-plane irradiance conversion
//! 3. Spatial filtering with the composite system MTF
//! 4. Read-out, amplification and saturating digitisation
//!
//! Each stage is a pure function of its inputs; [`sims`] sequences them per
//! band and hands intermediate products to an explicit [`io::ProductSink`].

pub mod error;
pub mod hardware;
pub mod image_proc;
pub mod io;
pub mod optics;
pub mod photometry;
pub mod scene;
pub mod shared_args;
pub mod sims;

// Re-exports for easier access
pub use error::IsmError;
pub use hardware::{InstrumentConfig, PhysicalParameters, SensorConfig, TelescopeConfig};
pub use image_proc::apply_system_mtf;
pub use optics::{nyquist_mtf, FrequencyGrid, SystemMtf};
pub use photometry::{spectral_integration, RadianceCube, SpectralResponse, WavelengthUnit};
pub use scene::gradient_scene;
pub use sims::{BandProducts, Ism};
