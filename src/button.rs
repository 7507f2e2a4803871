//! Polled push button.

use crate::traits::TriggerButton;
use embedded_hal::digital::InputPin;

/// A push button on one input pin.
///
/// The prop's button pulls its line high when pressed (pin configured with
/// pull-down). Read errors count as "not pressed".
///
/// # Example
///
/// ```rust
/// use escape_prop::button::PushButton;
/// use escape_prop::hal::MockPin;
/// use escape_prop::traits::TriggerButton;
///
/// let line = MockPin::new();
/// let mut button = PushButton::active_high(line.clone());
///
/// assert!(!button.is_pressed());
/// line.set_level(true);
/// assert!(button.is_pressed());
/// ```
pub struct PushButton<P> {
    pin: P,
    active_high: bool,
}

impl<P: InputPin> PushButton<P> {
    /// Button reading high when pressed.
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }

    /// Button reading low when pressed (pull-up wiring).
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_high: false,
        }
    }

    /// Gives back the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: InputPin> TriggerButton for PushButton<P> {
    fn is_pressed(&mut self) -> bool {
        let pressed = match self.pin.is_high() {
            Ok(high) => high == self.active_high,
            Err(_) => false,
        };
        log::trace!("Button pressed: {}", pressed);
        pressed
    }
}
