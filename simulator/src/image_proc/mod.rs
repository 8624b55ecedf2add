//! Image processing for the optical phase.
//!
//! Frequency-domain filtering of band images with the system MTF.

pub mod fft2d;
pub mod spatial_filter;

pub use fft2d::{fft2, fftshift, ifft2};
pub use spatial_filter::apply_system_mtf;
