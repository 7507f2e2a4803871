//! Error types shared across the prop's components.
//!
//! Only two kinds of failure are errors here:
//!
//! - [`BusConfigurationError`]: a bus or pin could not be configured at
//!   startup. Fatal; nothing further can work.
//! - [`GameError`]: a display or indicator write failed while the game was
//!   running.
//!
//! "No key pressed" and "unsupported Morse character" are not errors; they
//! are `None` and a skipped character respectively.

use core::fmt;

/// A bus or pin was rejected by the platform during initialization.
///
/// Typically the hardware resource is already owned or the driver could
/// not be installed. There is no retry path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusConfigurationError {
    /// Which resource failed (e.g. `"i2c0"`, `"keypad row"`).
    pub resource: &'static str,
    /// Platform error code, when the platform reports one.
    pub code: Option<i32>,
}

impl BusConfigurationError {
    /// Creates an error for `resource` with no platform code.
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            code: None,
        }
    }

    /// Attaches the platform error code.
    pub const fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for BusConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "failed to configure {} (code {})", self.resource, code),
            None => write!(f, "failed to configure {}", self.resource),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BusConfigurationError {}

/// Failure while the game loop drives its outputs.
///
/// `DE` is the display's error type, `LE` the indicator pins' error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError<DE, LE> {
    /// A display transaction was not acknowledged.
    Display(DE),
    /// An indicator pin could not be driven.
    Indicator(LE),
}

impl<DE: fmt::Debug, LE: fmt::Debug> fmt::Display for GameError<DE, LE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Display(e) => write!(f, "display write failed: {:?}", e),
            Self::Indicator(e) => write!(f, "indicator write failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<DE: fmt::Debug, LE: fmt::Debug> std::error::Error for GameError<DE, LE> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_error_display_without_code() {
        let err = BusConfigurationError::new("i2c0");
        assert_eq!(err.to_string(), "failed to configure i2c0");
        assert_eq!(err.code, None);
    }

    #[test]
    fn bus_error_display_with_code() {
        let err = BusConfigurationError::new("keypad row").with_code(259);
        assert_eq!(err.to_string(), "failed to configure keypad row (code 259)");
    }

    #[test]
    fn bus_error_is_std_error() {
        let err = BusConfigurationError::new("i2c0");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn game_error_display() {
        let err: GameError<&str, ()> = GameError::Display("nack");
        assert_eq!(err.to_string(), "display write failed: \"nack\"");

        let err: GameError<(), u8> = GameError::Indicator(3);
        assert_eq!(err.to_string(), "indicator write failed: 3");
    }
}
