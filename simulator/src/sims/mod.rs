//! Band-level orchestration of the instrument simulation.
//!
//! [`optical_phase`] and [`video_chain_phase`] sequence the pure stages of
//! one band and hand named intermediate products to a sink. [`ism`] runs
//! both phases over every band of an instrument.

pub mod ism;
pub mod optical_phase;
pub mod video_chain_phase;

pub use ism::{BandProducts, Ism};
pub use optical_phase::{OpticalPhase, OpticalProducts};
pub use video_chain_phase::{VideoChainPhase, VideoChainProducts};

/// Band image straight after ISRF integration
pub const ISM_TOA_ISRF: &str = "ism_toa_isrf_";
/// Irradiance image after the spatial filter
pub const ISM_TOA_OPTICAL: &str = "ism_toa_optical_";
/// Digitised image
pub const ISM_TOA: &str = "ism_toa_";
/// Composite system MTF
pub const MTF_SYSTEM: &str = "Hsys_";
/// Normalised ACT frequency axis
pub const FN_ACT: &str = "fnAct_";
/// Normalised ALT frequency axis
pub const FN_ALT: &str = "fnAlt_";

/// Product name of `prefix` for one band, e.g. `ism_toa_VNIR-0`
pub fn product_name(prefix: &str, band: &str) -> String {
    format!("{prefix}{band}")
}
