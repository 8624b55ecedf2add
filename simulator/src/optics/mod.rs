//! Spatial-frequency response of the instrument optics and detector

pub mod frequency;
pub mod mtf;
pub mod system_mtf;

pub use frequency::{frequency_axis, FrequencyGrid};
pub use system_mtf::{nyquist_mtf, Contributor, MtfBreakdown, MtfCut, NyquistMtf, SystemMtf};
