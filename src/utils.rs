//! Utility functions for the still-monitor crate.

/// Convert Celsius to Fahrenheit.
///
/// # Arguments
///
/// * `celsius` - Temperature in degrees Celsius
///
/// # Returns
///
/// Temperature in degrees Fahrenheit. NaN stays NaN.
///
/// # Example
///
/// ```
/// use still_monitor::celsius_to_fahrenheit;
///
/// let fahrenheit = celsius_to_fahrenheit(100.0);
/// assert!((fahrenheit - 212.0).abs() < 0.001);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius.
///
/// # Example
///
/// ```
/// use still_monitor::fahrenheit_to_celsius;
///
/// let celsius = fahrenheit_to_celsius(212.0);
/// assert!((celsius - 100.0).abs() < 0.001);
/// ```
#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Convert Celsius to calibrated Fahrenheit.
///
/// The calibration offset is in °F and is added after conversion.
#[inline]
pub fn celsius_to_calibrated_fahrenheit(celsius: f64, calibration_offset_f: f64) -> f64 {
    celsius_to_fahrenheit(celsius) + calibration_offset_f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(125.0) - 257.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(-40.0) - (-40.0)).abs() < 0.001);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert!((fahrenheit_to_celsius(32.0) - 0.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_calibrated_conversion() {
        assert!((celsius_to_calibrated_fahrenheit(100.0, 0.0) - 212.0).abs() < 0.001);
        assert!((celsius_to_calibrated_fahrenheit(100.0, -2.5) - 209.5).abs() < 0.001);
        assert!(celsius_to_calibrated_fahrenheit(f64::NAN, 1.0).is_nan());
    }
}
