//! Status LEDs on ESP32 GPIO.
//!
//! # Wiring
//!
//! - Success → GPIO5
//! - Signal → GPIO4
//! - Error → GPIO2 (also the DevKit's onboard LED)
//!
//! Each LED is driven active-high through a series resistor.

use super::configuration_error;
use crate::error::BusConfigurationError;
use crate::indicator::Indicator;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

/// Indicator on an ESP32 output driver.
pub type Esp32Indicator<'d> = Indicator<PinDriver<'d, AnyOutputPin, Output>>;

/// Configures `pin` as an output and switches the LED off.
pub fn indicator<'d>(
    pin: AnyOutputPin,
    name: &'static str,
) -> Result<Esp32Indicator<'d>, BusConfigurationError> {
    let driver = PinDriver::output(pin).map_err(configuration_error(name))?;
    Indicator::new(driver, name).map_err(configuration_error(name))
}
