//! ESP32 DevKit hardware layer for the escape-room prop.
//!
//! Builds the `esp-idf-hal` drivers the generic components run on. Every
//! constructor maps the platform's `EspError` to a
//! [`BusConfigurationError`](crate::error::BusConfigurationError) naming the
//! resource that could not be set up.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core)
//! - **Display**: 16x2 HD44780 LCD with PCF8574 I2C backpack
//! - **Keypad**: 4x4 membrane matrix
//! - **LEDs**: success, signal (Morse) and error
//! - **Button**: hint request
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod bus;
mod button;
mod keypad;
mod led;

pub use bus::initialize_bus;
pub use button::{hint_button, Esp32Button};
pub use keypad::{keypad, Esp32Keypad};
pub use led::{indicator, Esp32Indicator};

use crate::error::BusConfigurationError;
use esp_idf_hal::sys::EspError;

/// Wraps a platform error for `resource`.
fn configuration_error(resource: &'static str) -> impl Fn(EspError) -> BusConfigurationError {
    move |e| BusConfigurationError::new(resource).with_code(e.code())
}

/// Pin assignments of the prop's ESP32 DevKit.
pub mod pins {
    // =========================================================================
    // I2C Display (PCF8574 + HD44780)
    // =========================================================================

    /// I2C data line
    pub const I2C_SDA: i32 = 21;

    /// I2C clock line
    pub const I2C_SCL: i32 = 22;

    // =========================================================================
    // Keypad (4x4 matrix)
    // =========================================================================

    /// Row outputs, top to bottom
    pub const KEYPAD_ROWS: [i32; 4] = [13, 19, 14, 27];

    /// Column inputs with pull-up, left to right
    pub const KEYPAD_COLS: [i32; 4] = [26, 25, 33, 32];

    // =========================================================================
    // LEDs and button
    // =========================================================================

    /// Lit when the code is solved
    pub const LED_SUCCESS: i32 = 5;

    /// Morse hint output
    pub const LED_SIGNAL: i32 = 4;

    /// Lit while a wrong code is shown
    pub const LED_ERROR: i32 = 2;

    /// Hint button, active high with pull-down
    pub const BUTTON: i32 = 23;
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_idf_hal::sys::{esp_err_t, ESP_ERR_INVALID_STATE};

    #[test]
    fn configuration_error_keeps_platform_code() {
        let code = ESP_ERR_INVALID_STATE as esp_err_t;
        let esp_error = EspError::from(code).unwrap();

        let err = configuration_error("i2c0")(esp_error);

        assert_eq!(err, BusConfigurationError::new("i2c0").with_code(code));
        assert_eq!(err.to_string(), "failed to configure i2c0 (code 259)");
    }
}
