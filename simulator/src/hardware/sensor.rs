//! Sensor configuration for the detector and its readout electronics

use serde::{Deserialize, Serialize};

/// Configuration for a sensor detector and its video chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Name/model of the sensor
    pub name: String,
    /// Pixel pitch in meters
    pub pixel_pitch_m: f64,
    /// Output conversion factor in volts per electron
    pub output_conversion_factor: f64,
    /// Gain of the analog-to-digital converter
    pub adc_gain: f64,
    /// Bit depth of the ADC
    pub bit_depth: u8,
    /// Lower end of the ADC input range in volts
    pub min_voltage: f64,
    /// Upper end of the ADC input range in volts
    pub max_voltage: f64,
}

impl SensorConfig {
    /// Create a new sensor configuration
    pub fn new(
        name: impl Into<String>,
        pixel_pitch_m: f64,
        output_conversion_factor: f64,
        adc_gain: f64,
        bit_depth: u8,
        min_voltage: f64,
        max_voltage: f64,
    ) -> Self {
        Self {
            name: name.into(),
            pixel_pitch_m,
            output_conversion_factor,
            adc_gain,
            bit_depth,
            min_voltage,
            max_voltage,
        }
    }

    /// Largest digital count the ADC can represent, `2^bit_depth - 1`
    pub fn max_digital_value(&self) -> u16 {
        crate::hardware::video_chain::max_digital_value(self.bit_depth)
    }
}

/// Standard sensor models
pub mod models {
    use super::*;
    use once_cell::sync::Lazy;

    /// 12-bit VNIR line detector with 30µm pixels
    pub static VNIR_LINE_30UM: Lazy<SensorConfig> =
        Lazy::new(|| SensorConfig::new("VNIR line 30um", 30e-6, 1e-6, 0.56, 12, 0.0, 0.86));

    /// 12-bit CMOS detector with 13µm pixels and a 3.3V ADC range
    pub static CMOS_13UM: Lazy<SensorConfig> =
        Lazy::new(|| SensorConfig::new("CMOS 13um", 13e-6, 1e-3, 1.0, 12, 0.0, 3.3));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_digital_value() {
        let sensor = models::CMOS_13UM.clone();
        assert_eq!(sensor.max_digital_value(), 4095);
    }
}
