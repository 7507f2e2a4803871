//! HD44780 character LCD behind a PCF8574 I2C port expander.
//!
//! The expander exposes eight parallel lines. The backpack wires them as:
//!
//! | Bit | Line | Use |
//! |-----|------|-----|
//! | 0 | RS | 0 = instruction, 1 = data |
//! | 1 | RW | always 0 (write) |
//! | 2 | EN | controller samples data on its falling edge |
//! | 3 | BL | backlight, kept asserted |
//! | 4-7 | D4-D7 | data nibble |
//!
//! Every logical byte therefore costs two nibble transfers, and every
//! nibble transfer costs two bus writes (EN high, then EN low), each
//! followed by a settle time. Those delays are part of the protocol: the
//! controller is never polled for its busy flag.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::config::DisplayConfig;
//! use escape_prop::hal::{MockClock, MockDelay, MockI2c};
//! use escape_prop::lcd::Lcd;
//!
//! let clock = MockClock::new();
//! let bus = MockI2c::new().with_clock(clock.clone());
//! let mut lcd = Lcd::new(bus.clone(), MockDelay::with_clock(clock), &DisplayConfig::default());
//!
//! lcd.init().unwrap();
//! lcd.set_cursor(1, 4).unwrap();
//! lcd.print("hi").unwrap();
//!
//! assert_eq!(bus.screen().row_text(1, 16), "    hi          ");
//! ```

use crate::config::DisplayConfig;
use crate::traits::CharacterDisplay;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Expander control bits.
pub mod bits {
    /// Register select: high for data, low for instructions.
    pub const RS: u8 = 0x01;
    /// Read/write select. Never set; the driver only writes.
    pub const RW: u8 = 0x02;
    /// Enable strobe.
    pub const EN: u8 = 0x04;
    /// Backlight transistor.
    pub const BACKLIGHT: u8 = 0x08;
}

/// HD44780 instruction bytes used by the driver.
pub mod command {
    /// Clear display and return the address counter to 0.
    pub const CLEAR: u8 = 0x01;
    /// Entry mode: increment, no shift.
    pub const ENTRY_MODE_INCREMENT: u8 = 0x06;
    /// Display on, cursor off, blink off.
    pub const DISPLAY_ON: u8 = 0x0C;
    /// Function set probe sent during reset (8-bit interface).
    pub const FUNCTION_SET_8BIT: u8 = 0x30;
    /// Function set switching the interface to 4 bits.
    pub const FUNCTION_SET_4BIT: u8 = 0x20;
    /// Function set: 4-bit, 2 lines, 5x8 font.
    pub const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
    /// Set DDRAM address; OR with the 7-bit address.
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

/// DDRAM address of the first cell of each row.
pub const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

const POWER_ON_DELAY_MS: u32 = 50;
const PROBE_LONG_WAIT_MS: u32 = 5;
const PROBE_SHORT_WAIT_US: u32 = 600;
const ENABLE_SETTLE_US: u32 = 600;
const COMMAND_SETTLE_MS: u32 = 2;
const DATA_SETTLE_US: u32 = 600;
const CLEAR_CYCLE_MS: u32 = 5;

/// Character LCD driver.
///
/// Owns the I2C bus handle and a delay source. The bus must already be
/// configured (see `hal::esp32::initialize_bus` on hardware); owning it is
/// what makes "bus initialized before any write" hold.
///
/// Transaction failures are returned as the bus error type and never
/// retried. A dropped write can leave the controller out of nibble sync;
/// [`init`](Self::init) recovers it.
pub struct Lcd<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Lcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a driver for the display at `config.i2c_address`.
    ///
    /// Nothing is written until [`init`](Self::init).
    pub fn new(i2c: I2C, delay: D, config: &DisplayConfig) -> Self {
        Self {
            i2c,
            delay,
            address: config.i2c_address,
        }
    }

    /// Runs the controller's reset-by-instruction sequence and configures
    /// it for 4-bit, 2-line operation with the cursor hidden.
    ///
    /// Works from any prior state, including a controller left halfway
    /// through a 4-bit byte.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        self.probe(command::FUNCTION_SET_8BIT)?;
        self.delay.delay_ms(PROBE_LONG_WAIT_MS);
        self.probe(command::FUNCTION_SET_8BIT)?;
        self.delay.delay_us(PROBE_SHORT_WAIT_US);
        self.probe(command::FUNCTION_SET_8BIT)?;
        self.delay.delay_us(PROBE_SHORT_WAIT_US);
        self.probe(command::FUNCTION_SET_4BIT)?;
        self.delay.delay_ms(PROBE_LONG_WAIT_MS);

        self.command(command::FUNCTION_SET_4BIT_2LINE)?;
        self.command(command::DISPLAY_ON)?;
        self.command(command::ENTRY_MODE_INCREMENT)?;
        self.clear()?;

        log::info!("LCD initialised at {:#04x}", self.address);
        Ok(())
    }

    /// Clears the display and waits out the clear cycle.
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(command::CLEAR)?;
        self.delay.delay_ms(CLEAR_CYCLE_MS);
        Ok(())
    }

    /// Moves the cursor to `row`, `column`.
    ///
    /// No bounds check: rows past the last wrap over [`ROW_OFFSETS`] and the
    /// address is masked to 7 bits, so bad input lands on some cell rather
    /// than failing.
    pub fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), I2C::Error> {
        let offset = ROW_OFFSETS[usize::from(row) % ROW_OFFSETS.len()];
        let address = column.wrapping_add(offset) & 0x7F;
        self.command(command::SET_DDRAM_ADDRESS | address)
    }

    /// Writes `text` at the cursor, one data byte per character.
    ///
    /// Characters outside ASCII are shown as `?`.
    pub fn print(&mut self, text: &str) -> Result<(), I2C::Error> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.write_data(byte)?;
        }
        Ok(())
    }

    /// Returns the expander address.
    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives back the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Latches the high nibble of `value` as a full 8-bit instruction.
    fn probe(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.pulse((value & 0xF0) | bits::BACKLIGHT)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), I2C::Error> {
        let high = value & 0xF0;
        let low = (value << 4) & 0xF0;

        self.pulse(high | mode | bits::BACKLIGHT)?;
        self.pulse(low | mode | bits::BACKLIGHT)
    }

    fn command(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.send(value, 0)?;
        self.delay.delay_ms(COMMAND_SETTLE_MS);
        Ok(())
    }

    fn write_data(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.send(value, bits::RS)?;
        self.delay.delay_us(DATA_SETTLE_US);
        Ok(())
    }

    /// EN high then low; the controller latches on the falling edge.
    fn pulse(&mut self, bus: u8) -> Result<(), I2C::Error> {
        self.write_expander(bus | bits::EN)?;
        self.delay.delay_us(ENABLE_SETTLE_US);
        self.write_expander(bus & !bits::EN)?;
        self.delay.delay_us(ENABLE_SETTLE_US);
        Ok(())
    }

    fn write_expander(&mut self, bus: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[bus])
    }
}

impl<I2C, D> CharacterDisplay for Lcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = I2C::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        Lcd::clear(self)
    }

    fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), Self::Error> {
        Lcd::set_cursor(self, row, column)
    }

    fn print(&mut self, text: &str) -> Result<(), Self::Error> {
        Lcd::print(self, text)
    }
}
