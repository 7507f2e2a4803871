//! I2C bus for the character LCD.
//!
//! # Wiring
//!
//! - SDA → GPIO21
//! - SCL → GPIO22
//! - VCC → 5V (backpack), GND → GND

use super::configuration_error;
use crate::config::DisplayConfig;
use crate::error::BusConfigurationError;
use esp_idf_hal::gpio::{InputPin, OutputPin};
use esp_idf_hal::i2c::{I2c, I2cConfig, I2cDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;

/// Installs the I2C controller driver with internal pull-ups enabled.
///
/// Must be called once, before the LCD is created.
///
/// # Example
///
/// ```ignore
/// use escape_prop::hal::esp32::initialize_bus;
///
/// let peripherals = Peripherals::take()?;
/// let i2c = initialize_bus(
///     peripherals.i2c0,
///     peripherals.pins.gpio21,
///     peripherals.pins.gpio22,
///     &DisplayConfig::default(),
/// )?;
/// ```
///
/// # Errors
///
/// Returns [`BusConfigurationError`] for `"i2c0"` if the driver cannot be
/// installed, typically because the controller is already in use.
pub fn initialize_bus<'d, I2C: I2c>(
    i2c: impl Peripheral<P = I2C> + 'd,
    sda: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    scl: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    config: &DisplayConfig,
) -> Result<I2cDriver<'d>, BusConfigurationError> {
    let bus_config = I2cConfig::new()
        .baudrate(config.bus_frequency_hz.Hz())
        .sda_enable_pullup(true)
        .scl_enable_pullup(true);

    let driver = I2cDriver::new(i2c, sda, scl, &bus_config).map_err(configuration_error("i2c0"))?;
    log::info!("I2C bus up at {} Hz", config.bus_frequency_hz);
    Ok(driver)
}
