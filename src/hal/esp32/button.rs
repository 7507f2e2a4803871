//! Hint button on ESP32 GPIO.
//!
//! # Wiring
//!
//! - One leg → GPIO23 (internal pull-down)
//! - Other leg → 3.3V

use super::configuration_error;
use crate::button::PushButton;
use crate::error::BusConfigurationError;
use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver, Pull};

/// Push button on an ESP32 input driver.
pub type Esp32Button<'d> = PushButton<PinDriver<'d, AnyInputPin, Input>>;

/// Configures `pin` as a pulled-down input read active-high.
pub fn hint_button<'d>(pin: AnyInputPin) -> Result<Esp32Button<'d>, BusConfigurationError> {
    let mut driver = PinDriver::input(pin).map_err(configuration_error("button"))?;
    driver
        .set_pull(Pull::Down)
        .map_err(configuration_error("button"))?;
    Ok(PushButton::active_high(driver))
}
