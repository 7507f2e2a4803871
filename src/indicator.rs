//! Named status LEDs.
//!
//! [`Indicator`] wraps an output pin and remembers whether it is lit. It is
//! itself an [`OutputPin`], so the Morse encoder can flash it directly.

use embedded_hal::digital::{ErrorType, OutputPin};

/// An LED with a name and a logical state.
///
/// Starts off. The state tracks the last successful write.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::MockPin;
/// use escape_prop::indicator::Indicator;
///
/// let pin = MockPin::new();
/// let mut led = Indicator::new(pin.clone(), "success").unwrap();
///
/// led.on().unwrap();
/// assert!(led.is_on());
/// assert!(pin.level());
/// ```
pub struct Indicator<P> {
    pin: P,
    name: &'static str,
    lit: bool,
}

impl<P: OutputPin> Indicator<P> {
    /// Takes `pin` and switches it off.
    pub fn new(mut pin: P, name: &'static str) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self {
            pin,
            name,
            lit: false,
        })
    }

    /// Lights the LED.
    pub fn on(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        if !self.lit {
            log::debug!("LED {} on", self.name);
        }
        self.lit = true;
        Ok(())
    }

    /// Switches the LED off.
    pub fn off(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        if self.lit {
            log::debug!("LED {} off", self.name);
        }
        self.lit = false;
        Ok(())
    }

    /// Inverts the LED.
    pub fn toggle(&mut self) -> Result<(), P::Error> {
        if self.lit {
            self.off()
        } else {
            self.on()
        }
    }

    /// True if lit.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.lit
    }

    /// Name given at construction.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gives back the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: ErrorType> ErrorType for Indicator<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for Indicator<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        // Morse marks go through here; no log per element
        self.pin.set_low()?;
        self.lit = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()?;
        self.lit = true;
        Ok(())
    }
}
