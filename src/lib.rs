//! # escape-prop
//!
//! Firmware for an escape-room prop: players type a code on a 4x4 keypad,
//! read feedback on a 16x2 character LCD, and can press a button to have the
//! answer blinked in Morse on an LED.
//!
//! ## Features
//!
//! - **Character LCD**: HD44780 driven in 4-bit mode through a PCF8574 I2C expander
//! - **Matrix keypad**: row-by-row scanning with debounce confirmation
//! - **Morse signalling**: standard timing on any output pin
//! - **Password game**: the prop's main loop, configurable texts and code
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Seams between the drivers and the game loop
//! - `lcd`, `keypad`, `morse` - Drivers generic over `embedded-hal` 1.0
//! - `indicator`, `button` - Thin LED and push button wrappers
//! - `game` - The password puzzle
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use escape_prop::{
//!     hal::{MockClock, MockDelay, MockI2c},
//!     Config, Lcd,
//! };
//!
//! let config = Config::default();
//! let bus = MockI2c::new();
//! let mut lcd = Lcd::new(bus.clone(), MockDelay::with_clock(MockClock::new()), &config.display);
//!
//! lcd.init().unwrap();
//! lcd.print("Entrez le code:").unwrap();
//!
//! assert_eq!(bus.screen().row_text(0, 15), "Entrez le code:");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Polled push button.
pub mod button;
/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Startup and runtime error types.
pub mod error;
/// The password game loop.
pub mod game;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Named status LEDs.
pub mod indicator;
/// 4x4 matrix keypad scanner.
pub mod keypad;
/// HD44780 character LCD over a PCF8574 expander.
pub mod lcd;
/// Morse encoding and timed playback.
pub mod morse;
/// Traits at the seams between drivers and the game.
pub mod traits;

// Re-exports for convenience
pub use button::PushButton;
pub use config::{Config, DisplayConfig, GameConfig};
pub use error::{BusConfigurationError, GameError};
pub use game::{CodeEntry, GameStatus, PasswordGame, PropIo};
pub use indicator::Indicator;
pub use keypad::{Keypad, DEFAULT_KEYMAP};
pub use lcd::Lcd;
pub use morse::SignalEncoder;
pub use traits::{CharacterDisplay, KeySource, TriggerButton};
