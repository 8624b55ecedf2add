//! Pipeline-level error type.
//!
//! Only a shape disagreement between stage inputs aborts a band. The other
//! conditions a stage can run into (zero-frequency limits, spectral samples
//! outside the cube's range, saturation) are defined behaviour and never
//! surface as errors.

use thiserror::Error;

use crate::hardware::instrument::ConfigError;
use crate::io::sink::SinkError;
use crate::photometry::isrf::SpectralResponseError;

/// Errors raised while simulating one band.
#[derive(Debug, Error)]
pub enum IsmError {
    /// Two inputs of an elementwise stage disagree in shape.
    #[error("shape mismatch in {stage}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        stage: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("no spectral response loaded for band {0}")]
    MissingIsrf(String),

    #[error("invalid spectral response: {0}")]
    Spectral(#[from] SpectralResponseError),

    #[error("invalid instrument configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to persist product: {0}")]
    Sink(#[from] SinkError),
}

/// Check that `actual` matches `expected`, naming `stage` on failure.
pub fn ensure_shape(
    stage: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), IsmError> {
    if expected != actual {
        return Err(IsmError::ShapeMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message_names_stage_and_shapes() {
        let err = ensure_shape("spatial filter", (4, 4), (4, 5)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("spatial filter"));
        assert!(msg.contains("(4, 4)"));
        assert!(msg.contains("(4, 5)"));
    }

    #[test]
    fn test_matching_shapes_pass() {
        assert!(ensure_shape("frequency grid", (3, 7), (3, 7)).is_ok());
    }
}
