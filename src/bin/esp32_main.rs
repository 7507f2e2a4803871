//! ESP32 escape-room prop.
//!
//! This is the main entry point for the physical prop. It brings up the
//! I2C LCD, keypad, LEDs and hint button, then runs the password game until
//! the code is found.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//!
//! # Flash and monitor
//! espflash flash --monitor target/xtensa-esp32-espidf/release/esp32_main
//! ```

use anyhow::anyhow;
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{InputPin, OutputPin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use escape_prop::hal::esp32::{hint_button, indicator, initialize_bus, keypad};
use escape_prop::{Config, Lcd, PasswordGame, PropIo, SignalEncoder};

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    log::info!("escape-prop starting");

    let config = Config::default();
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // =========================================================================
    // Display (PCF8574 LCD on GPIO21/22)
    // =========================================================================
    let i2c = initialize_bus(peripherals.i2c0, pins.gpio21, pins.gpio22, &config.display)?;
    let mut lcd = Lcd::new(i2c, Delay::new_default(), &config.display);
    lcd.init().map_err(|e| anyhow!("LCD init failed: {:?}", e))?;

    // =========================================================================
    // Keypad (rows GPIO13/19/14/27, columns GPIO26/25/33/32)
    // =========================================================================
    let keypad = keypad(
        [
            pins.gpio13.downgrade_output(),
            pins.gpio19.downgrade_output(),
            pins.gpio14.downgrade_output(),
            pins.gpio27.downgrade_output(),
        ],
        [
            pins.gpio26.downgrade_input(),
            pins.gpio25.downgrade_input(),
            pins.gpio33.downgrade_input(),
            pins.gpio32.downgrade_input(),
        ],
    )?;

    // =========================================================================
    // LEDs (GPIO5/4/2) and hint button (GPIO23)
    // =========================================================================
    let success = indicator(pins.gpio5.downgrade_output(), "success")?;
    let signal = indicator(pins.gpio4.downgrade_output(), "signal")?;
    let error = indicator(pins.gpio2.downgrade_output(), "error")?;
    let button = hint_button(pins.gpio23.downgrade_input())?;

    // =========================================================================
    // Game
    // =========================================================================
    let io = PropIo {
        display: lcd,
        keypad,
        button,
        success,
        signal,
        error,
        encoder: SignalEncoder::new(Delay::new_default()),
        delay: Delay::new_default(),
    };
    let mut game = PasswordGame::new(io, config.game);

    game.run().map_err(|e| anyhow!("game stopped: {}", e))?;

    log::info!("Puzzle solved");
    Ok(())
}
