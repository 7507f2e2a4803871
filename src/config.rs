//! Shared configuration for desktop simulation and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! Pin numbers are not configuration: they live in `hal::esp32::pins`.
//! Morse timing and the keypad debounce are fixed protocol constants and
//! are not configurable either.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::config::{Config, DisplayConfig, GameConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.display.i2c_address, 0x27);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_display(DisplayConfig::default().with_i2c_address(0x3F))
//!     .with_game(GameConfig::default().with_secret_code("1234"));
//! assert_eq!(config.game.secret_code.as_str(), "1234");
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (display lines, codes)
pub const MAX_SHORT_STRING: usize = 32;

/// Maximum length for longer config strings (Morse messages)
pub const MAX_LONG_STRING: usize = 64;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helpers for creating heapless strings
// ============================================================================

/// Copies as much of `s` as fits into `out`, stopping on a char boundary.
fn push_truncated<const N: usize>(out: &mut HString<N>, s: &str) {
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    push_truncated(&mut hs, s);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    push_truncated(&mut hs, s);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Character LCD and its I2C bus
    pub display: DisplayConfig,
    /// Password game texts and pacing
    pub game: GameConfig,
}

impl Config {
    /// Set display configuration
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    /// Set game configuration
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Character LCD configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    /// 7-bit I2C address of the PCF8574 expander
    pub i2c_address: u8,
    /// I2C clock rate in Hz
    pub bus_frequency_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x27,
            bus_frequency_hz: 100_000,
        }
    }
}

impl DisplayConfig {
    /// Set the expander address
    pub fn with_i2c_address(mut self, address: u8) -> Self {
        self.i2c_address = address;
        self
    }

    /// Set the bus clock rate
    pub fn with_bus_frequency_hz(mut self, hz: u32) -> Self {
        self.bus_frequency_hz = hz;
        self
    }
}

// ============================================================================
// Game Config
// ============================================================================

/// Password game configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Code that solves the puzzle, compared exactly against typed keys
    pub secret_code: ShortString,
    /// Message flashed in Morse when the trigger button is pressed
    pub morse_hint: LongString,
    /// First-row prompt shown every iteration
    pub prompt: ShortString,
    /// First row after a correct code
    pub success_line1: ShortString,
    /// Second row after a correct code
    pub success_line2: ShortString,
    /// First row after a wrong code
    pub failure_message: ShortString,
    /// Pause at the end of every loop iteration in milliseconds
    pub poll_interval_ms: u32,
    /// Pause between lighting a verdict LED and printing the verdict
    pub verdict_delay_ms: u32,
    /// How long the failure message and error LED stay up
    pub failure_hold_ms: u32,
    /// Pause before a new attempt starts
    pub retry_delay_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            secret_code: short_string("B947D"),
            morse_hint: long_string("b947d"),
            prompt: short_string("Entrez le code:"),
            success_line1: short_string("Reussite!"),
            success_line2: short_string("Wait for part 2!"),
            failure_message: short_string("Nope!"),
            poll_interval_ms: 100,
            verdict_delay_ms: 500,
            failure_hold_ms: 1000,
            retry_delay_ms: 1000,
        }
    }
}

impl GameConfig {
    /// Set the secret code
    pub fn with_secret_code(mut self, code: &str) -> Self {
        self.secret_code = short_string(code);
        self
    }

    /// Set the Morse hint message
    pub fn with_morse_hint(mut self, hint: &str) -> Self {
        self.morse_hint = long_string(hint);
        self
    }

    /// Set the prompt line
    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = short_string(prompt);
        self
    }

    /// Set the loop poll interval
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Number of keys that make up one attempt (never zero)
    pub fn code_len(&self) -> usize {
        self.secret_code.chars().count().max(1)
    }
}

// ============================================================================
// Tests
// ============================================================================
