//! Platform motion parameters feeding the smear and motion-blur MTF terms.

use serde::{Deserialize, Serialize};

/// Image motion during integration, expressed in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Amplitude of the low-frequency smear along track [pixels]
    pub k_smear: f64,
    /// Amplitude of the high-frequency motion blur, ALT and ACT [pixels]
    pub k_motion: f64,
}

impl MotionConfig {
    pub fn new(k_smear: f64, k_motion: f64) -> Self {
        Self { k_smear, k_motion }
    }
}
