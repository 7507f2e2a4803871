//! Keypad lines on ESP32 GPIO.
//!
//! # Wiring
//!
//! - Rows → GPIO13, 19, 14, 27 (outputs)
//! - Columns → GPIO26, 25, 33, 32 (inputs, internal pull-up)

use super::configuration_error;
use crate::error::BusConfigurationError;
use crate::keypad::{Keypad, COLS, ROWS};
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver, Pull};

/// Keypad on ESP32 pin drivers.
pub type Esp32Keypad<'d> =
    Keypad<PinDriver<'d, AnyOutputPin, Output>, PinDriver<'d, AnyInputPin, Input>, Delay>;

/// Configures the row and column pins and builds the scanner.
///
/// # Example
///
/// ```ignore
/// let pins = peripherals.pins;
/// let keypad = escape_prop::hal::esp32::keypad(
///     [
///         pins.gpio13.downgrade_output(),
///         pins.gpio19.downgrade_output(),
///         pins.gpio14.downgrade_output(),
///         pins.gpio27.downgrade_output(),
///     ],
///     [
///         pins.gpio26.downgrade_input(),
///         pins.gpio25.downgrade_input(),
///         pins.gpio33.downgrade_input(),
///         pins.gpio32.downgrade_input(),
///     ],
/// )?;
/// ```
pub fn keypad<'d>(
    rows: [AnyOutputPin; ROWS],
    cols: [AnyInputPin; COLS],
) -> Result<Esp32Keypad<'d>, BusConfigurationError> {
    let [r0, r1, r2, r3] = rows;
    let rows = [row(r0)?, row(r1)?, row(r2)?, row(r3)?];

    let [c0, c1, c2, c3] = cols;
    let cols = [column(c0)?, column(c1)?, column(c2)?, column(c3)?];

    Keypad::new(rows, cols, Delay::new_default()).map_err(configuration_error("keypad row"))
}

fn row<'d>(pin: AnyOutputPin) -> Result<PinDriver<'d, AnyOutputPin, Output>, BusConfigurationError> {
    PinDriver::output(pin).map_err(configuration_error("keypad row"))
}

fn column<'d>(pin: AnyInputPin) -> Result<PinDriver<'d, AnyInputPin, Input>, BusConfigurationError> {
    let mut driver = PinDriver::input(pin).map_err(configuration_error("keypad column"))?;
    driver
        .set_pull(Pull::Up)
        .map_err(configuration_error("keypad column"))?;
    Ok(driver)
}
