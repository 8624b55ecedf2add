//! Hardware module for telescope, sensor and video-chain models

pub mod instrument;
pub mod motion;
pub mod sensor;
pub mod telescope;
pub mod video_chain;

pub use instrument::{InstrumentConfig, PhysicalParameters, SpectralBand};
pub use motion::MotionConfig;
pub use sensor::SensorConfig;
pub use telescope::{TelescopeConfig, WavefrontError};
