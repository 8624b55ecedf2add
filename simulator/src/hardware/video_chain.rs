//! Read-out and digitisation of the detector signal.
//!
//! Two stateless stages turn the focal-plane signal into the counts the
//! instrument downlinks:
//!
//! 1. **Electrons to volts**: read-out and amplification,
//!    `V = signal · OCF · ADC_gain`.
//! 2. **Volts to digital numbers**: `DN = round(V / (Vmax - Vmin) · (2^b - 1))`,
//!    clipped to `[0, 2^b - 1]`.
//!
//! Clipping is the one place in the chain where information is lost for
//! good, so the digitiser reports the fraction of pixels that ended up at
//! the top of the range. Out-of-range voltages are clamped silently; they
//! are never an error.

use log::{debug, warn};
use ndarray::{Array2, ArrayView2};

/// Largest count representable with `bit_depth` bits.
///
/// # Panics
/// If `bit_depth` is outside `1..=16`.
pub fn max_digital_value(bit_depth: u8) -> u16 {
    assert!(
        (1..=16).contains(&bit_depth),
        "Bit depth must lie in 1..=16, got {bit_depth}"
    );
    ((1u32 << bit_depth) - 1) as u16
}

/// Result of the electrons to voltage stage
#[derive(Debug, Clone)]
pub struct VoltageImage {
    /// Image in volts
    pub volts: Array2<f64>,
    /// Combined scale factor `OCF · ADC_gain` applied to every pixel
    pub scale: f64,
}

/// Simulate the read-out and amplification of the detector signal.
///
/// # Arguments
/// * `signal` - Input image in electrons (or irradiance-equivalent units)
/// * `output_conversion_factor` - Output conversion factor [V/e-]
/// * `adc_gain` - Gain of the analog-to-digital converter [-]
pub fn electrons_to_voltage(
    signal: &ArrayView2<f64>,
    output_conversion_factor: f64,
    adc_gain: f64,
) -> VoltageImage {
    let scale = output_conversion_factor * adc_gain;
    debug!("Electrons to volts factor: {scale:.8e}");
    VoltageImage {
        volts: signal.mapv(|v| v * scale),
        scale,
    }
}

/// Result of digitisation
#[derive(Debug, Clone)]
pub struct Digitised {
    /// Image in digital counts
    pub counts: Array2<u16>,
    /// Fraction of pixels at the maximum count (0.0-1.0)
    pub saturated_fraction: f64,
    /// Maximum representable count for the bit depth used
    pub max_value: u16,
}

impl Digitised {
    /// Saturated fraction as a percentage
    pub fn saturated_percent(&self) -> f64 {
        self.saturated_fraction * 100.0
    }
}

/// Quantise a voltage to a count without clipping.
///
/// Ties round to even, matching the reference quantiser.
fn quantise(volts: f64, voltage_range: f64, max_dn: f64) -> f64 {
    (volts / voltage_range * max_dn).round_ties_even()
}

/// Convert a voltage image into saturating digital counts.
///
/// # Arguments
/// * `voltage` - Input image in volts
/// * `bit_depth` - ADC bit depth (1..=16)
/// * `min_voltage` - Lower end of the ADC range [V]
/// * `max_voltage` - Upper end of the ADC range [V]
///
/// # Returns
/// Counts clipped to `[0, 2^bit_depth - 1]` and the saturated fraction.
pub fn digitise(
    voltage: &ArrayView2<f64>,
    bit_depth: u8,
    min_voltage: f64,
    max_voltage: f64,
) -> Digitised {
    let max_value = max_digital_value(bit_depth);
    let max_dn = max_value as f64;
    let voltage_range = max_voltage - min_voltage;
    debug!("Volts to digital factor: {:.8}", max_dn / voltage_range);

    let counts = voltage.mapv(|v| quantise(v, voltage_range, max_dn).clamp(0.0, max_dn) as u16);

    let saturated = counts.iter().filter(|&&dn| dn == max_value).count();
    let saturated_fraction = if counts.is_empty() {
        0.0
    } else {
        saturated as f64 / counts.len() as f64
    };

    if saturated > 0 {
        warn!(
            "{saturated} of {} pixels saturated ({:.2}%)",
            counts.len(),
            saturated_fraction * 100.0
        );
    }

    Digitised {
        counts,
        saturated_fraction,
        max_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_max_digital_value() {
        assert_eq!(max_digital_value(1), 1);
        assert_eq!(max_digital_value(8), 255);
        assert_eq!(max_digital_value(12), 4095);
        assert_eq!(max_digital_value(16), 65535);
    }

    #[test]
    #[should_panic(expected = "Bit depth must lie in 1..=16")]
    fn test_max_digital_value_rejects_zero_bits() {
        max_digital_value(0);
    }

    #[test]
    fn test_electrons_to_voltage_scales() {
        let signal = array![[1000.0, 2000.0], [0.0, 500.0]];
        let result = electrons_to_voltage(&signal.view(), 1e-3, 2.0);
        assert_relative_eq!(result.scale, 2e-3);
        assert_relative_eq!(result.volts[[0, 0]], 2.0);
        assert_relative_eq!(result.volts[[0, 1]], 4.0);
        assert_relative_eq!(result.volts[[1, 0]], 0.0);
        assert_relative_eq!(result.volts[[1, 1]], 1.0);
    }

    #[test]
    fn test_digitise_basic() {
        let volts = array![[0.0, 1.0], [3.3, 0.5]];
        let result = digitise(&volts.view(), 12, 0.0, 3.3);
        assert_eq!(result.counts[[0, 0]], 0);
        // 1.0 / 3.3 * 4095 = 1240.9
        assert_eq!(result.counts[[0, 1]], 1241);
        assert_eq!(result.counts[[1, 0]], 4095);
        assert_eq!(result.counts[[1, 1]], 620);
        assert_relative_eq!(result.saturated_fraction, 0.25);
    }

    #[test]
    fn test_digitise_rounds_half_to_even() {
        // 2.5 and 3.5 counts for an 8-bit ADC with 255V range
        let volts = array![[2.5, 3.5]];
        let result = digitise(&volts.view(), 8, 0.0, 255.0);
        assert_eq!(result.counts[[0, 0]], 2);
        assert_eq!(result.counts[[0, 1]], 4);
    }

    #[test]
    fn test_digitise_full_saturation() {
        let volts = array![[3.3, 4.0], [10.0, 3.3]];
        let result = digitise(&volts.view(), 12, 0.0, 3.3);
        assert!(result.counts.iter().all(|&dn| dn == 4095));
        assert_relative_eq!(result.saturated_fraction, 1.0);
        assert_relative_eq!(result.saturated_percent(), 100.0);
    }

    #[test]
    fn test_digitise_negative_clamps_to_zero() {
        let volts = array![[-1.0, -0.0001]];
        let result = digitise(&volts.view(), 12, 0.0, 3.3);
        assert_eq!(result.counts[[0, 0]], 0);
        assert_eq!(result.counts[[0, 1]], 0);
        assert_eq!(result.saturated_fraction, 0.0);
    }

    #[test]
    fn test_digitise_empty_image() {
        let volts = Array2::<f64>::zeros((0, 0));
        let result = digitise(&volts.view(), 12, 0.0, 3.3);
        assert!(result.counts.is_empty());
        assert_eq!(result.saturated_fraction, 0.0);
    }

    #[test]
    fn test_digitise_monotonic() {
        let a = Array2::from_shape_fn((8, 8), |(i, j)| (i * 8 + j) as f64 * 0.04);
        let b = a.mapv(|v| v + 0.013);
        let da = digitise(&a.view(), 12, 0.0, 3.3);
        let db = digitise(&b.view(), 12, 0.0, 3.3);
        for (x, y) in da.counts.iter().zip(db.counts.iter()) {
            assert!(x <= y);
        }
    }
}
