//! Spectral and radiometric models

pub mod isrf;
pub mod radiometry;
pub mod spectral_integration;

pub use isrf::{SpectralResponse, SpectralResponseError, WavelengthUnit};
pub use radiometry::{irradiance_factor, radiance_to_irradiance};
pub use spectral_integration::{spectral_integration, RadianceCube, Stencil};
