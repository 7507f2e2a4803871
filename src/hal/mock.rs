//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the `embedded-hal` traits the
//! drivers are generic over, plus a simulated display controller, so the
//! whole prop can be exercised on desktop.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockClock`] | - | Shared simulated time, advanced only by delays |
//! | [`MockDelay`] | `DelayNs` | Advances a [`MockClock`] instead of sleeping |
//! | [`MockPin`] | `OutputPin`, `InputPin` | Level plus timestamped history |
//! | [`MockI2c`] | `I2c` | Records writes, injects NACKs, feeds an [`Hd44780Sim`] |
//! | [`MockKeyMatrix`] | `OutputPin` rows, `InputPin` columns | Simulated 4x4 keypad wiring |
//! | [`ScriptedKeys`] | [`KeySource`] | Queued key presses |
//!
//! All handles are cheap clones sharing one state, so a test keeps a clone
//! for inspection after moving the original into a driver.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::hal::{MockClock, MockDelay, MockPin};
//! use escape_prop::morse::SignalEncoder;
//!
//! let clock = MockClock::new();
//! let mut led = MockPin::new().with_clock(clock.clone());
//! let mut encoder = SignalEncoder::new(MockDelay::with_clock(clock.clone()));
//!
//! encoder.play(&mut led, "E").unwrap();
//!
//! // One 200ms dot, then symbol space and letter space
//! assert_eq!(led.pulses().len(), 1);
//! assert_eq!(clock.now_ms(), 200 + 200 + 1000);
//! ```
//!
//! [`KeySource`]: crate::traits::KeySource

use crate::keypad::{COLS, ROWS};
use crate::lcd::{bits, ROW_OFFSETS};
use crate::traits::KeySource;

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};

// ============================================================================
// Time
// ============================================================================

/// Shared simulated clock in nanoseconds.
///
/// Time only moves when a [`MockDelay`] sleeps or a test advances it.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::MockClock;
///
/// let clock = MockClock::new();
/// let view = clock.clone();
///
/// clock.advance_ms(250);
/// assert_eq!(view.now_ms(), 250);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    now_ns: Rc<Cell<u64>>,
}

impl MockClock {
    /// Creates a new clock at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in nanoseconds.
    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    /// Current time in whole milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ns.get() / 1_000_000
    }

    /// Advances the clock by `ns` nanoseconds.
    pub fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance_ns(ms * 1_000_000);
    }
}

/// Delay that advances a [`MockClock`] instead of blocking.
#[derive(Clone, Debug, Default)]
pub struct MockDelay {
    clock: MockClock,
}

impl MockDelay {
    /// Creates a delay with its own clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a delay advancing `clock`.
    pub fn with_clock(clock: MockClock) -> Self {
        Self { clock }
    }

    /// The clock this delay advances.
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ns(u64::from(ms) * 1_000_000);
    }
}

// ============================================================================
// GPIO
// ============================================================================

/// A high period seen on a [`MockPin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    /// When the pin went high.
    pub start_ns: u64,
    /// How long it stayed high.
    pub width_ns: u64,
}

impl Pulse {
    /// Width in whole milliseconds.
    pub fn width_ms(&self) -> u64 {
        self.width_ns / 1_000_000
    }
}

#[derive(Debug, Default)]
struct PinState {
    high: bool,
    history: Vec<(u64, bool)>,
    clock: Option<MockClock>,
}

/// Mock GPIO pin.
///
/// As an output it records every write with the time it happened. As an
/// input it reads whatever level the test set.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::MockPin;
/// use embedded_hal::digital::{InputPin, OutputPin};
///
/// let mut pin = MockPin::new();
/// pin.set_high().unwrap();
/// assert!(pin.level());
///
/// let mut input = MockPin::new();
/// input.set_level(true);
/// assert!(input.is_high().unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    state: Rc<RefCell<PinState>>,
}

impl MockPin {
    /// Creates a pin reading low with no clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamps history entries with `clock`.
    pub fn with_clock(self, clock: MockClock) -> Self {
        self.state.borrow_mut().clock = Some(clock);
        self
    }

    /// Current level (true = high).
    pub fn level(&self) -> bool {
        self.state.borrow().high
    }

    /// Forces the level without recording history (input simulation).
    pub fn set_level(&self, high: bool) {
        self.state.borrow_mut().high = high;
    }

    /// Every write as `(time_ns, level)`, oldest first.
    pub fn history(&self) -> Vec<(u64, bool)> {
        self.state.borrow().history.clone()
    }

    /// Completed high periods, oldest first.
    pub fn pulses(&self) -> Vec<Pulse> {
        let mut pulses = Vec::new();
        let mut rose_at = None;
        let mut level = false;
        for &(at, high) in self.state.borrow().history.iter() {
            match (level, high) {
                (false, true) => rose_at = Some(at),
                (true, false) => {
                    if let Some(start_ns) = rose_at.take() {
                        pulses.push(Pulse {
                            start_ns,
                            width_ns: at - start_ns,
                        });
                    }
                }
                _ => {}
            }
            level = high;
        }
        pulses
    }

    fn record(&self, high: bool) {
        let mut state = self.state.borrow_mut();
        let at = state.clock.as_ref().map_or(0, MockClock::now_ns);
        state.high = high;
        state.history.push((at, high));
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.record(true);
        Ok(())
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level())
    }
}

// ============================================================================
// I2C + HD44780 simulation
// ============================================================================

/// One byte written to the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusWrite {
    /// Simulated time of the write.
    pub at_ns: u64,
    /// Target address.
    pub address: u8,
    /// Byte put on the expander lines.
    pub byte: u8,
}

/// Error returned by [`MockI2c`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockI2cError {
    /// Nothing answers at this address.
    AddressNack(u8),
    /// Failure injected with [`MockI2c::fail_after`].
    Injected,
}

impl i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressNack(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::Injected => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
        }
    }
}

#[derive(Debug)]
struct I2cState {
    device_address: u8,
    writes: Vec<BusWrite>,
    clock: Option<MockClock>,
    fail_after: Option<usize>,
    screen: Hd44780Sim,
}

/// Mock I2C bus with a PCF8574 + HD44780 display attached.
///
/// Every acknowledged byte is logged and fed to the display simulator.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::MockI2c;
/// use embedded_hal::i2c::I2c;
///
/// let mut bus = MockI2c::new();
/// bus.write(0x27, &[0x08]).unwrap();
/// assert!(bus.write(0x50, &[0x08]).is_err());
/// assert_eq!(bus.bytes(), vec![0x08]);
/// ```
#[derive(Clone, Debug)]
pub struct MockI2c {
    state: Rc<RefCell<I2cState>>,
}

impl Default for MockI2c {
    fn default() -> Self {
        Self::new()
    }
}

impl MockI2c {
    /// Creates a bus with the display at the usual backpack address 0x27.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(I2cState {
                device_address: 0x27,
                writes: Vec::new(),
                clock: None,
                fail_after: None,
                screen: Hd44780Sim::new(),
            })),
        }
    }

    /// Timestamps writes with `clock`.
    pub fn with_clock(self, clock: MockClock) -> Self {
        self.state.borrow_mut().clock = Some(clock);
        self
    }

    /// Moves the simulated display to `address`.
    pub fn with_device_address(self, address: u8) -> Self {
        self.state.borrow_mut().device_address = address;
        self
    }

    /// Acknowledges `count` more bytes, then fails every following one.
    pub fn fail_after(&self, count: usize) {
        let mut state = self.state.borrow_mut();
        let done = state.writes.len();
        state.fail_after = Some(done + count);
    }

    /// Stops injecting failures.
    pub fn recover(&self) {
        self.state.borrow_mut().fail_after = None;
    }

    /// Acknowledged writes, oldest first.
    pub fn writes(&self) -> Vec<BusWrite> {
        self.state.borrow().writes.clone()
    }

    /// Acknowledged bytes, oldest first.
    pub fn bytes(&self) -> Vec<u8> {
        self.state.borrow().writes.iter().map(|w| w.byte).collect()
    }

    /// Forgets logged writes. The display keeps its state.
    pub fn clear_log(&self) {
        let mut state = self.state.borrow_mut();
        state.writes.clear();
        state.fail_after = None;
    }

    /// Snapshot of the simulated display.
    pub fn screen(&self) -> Hd44780Sim {
        self.state.borrow().screen.clone()
    }

    fn write_byte(&self, address: u8, byte: u8) -> Result<(), MockI2cError> {
        let mut state = self.state.borrow_mut();
        if address != state.device_address {
            return Err(MockI2cError::AddressNack(address));
        }
        if state.fail_after.is_some_and(|limit| state.writes.len() >= limit) {
            return Err(MockI2cError::Injected);
        }
        let at_ns = state.clock.as_ref().map_or(0, MockClock::now_ns);
        state.writes.push(BusWrite {
            at_ns,
            address,
            byte,
        });
        state.screen.feed(byte);
        Ok(())
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.write_byte(address, byte)?;
                    }
                }
                // The expander reads back its port latch; not modelled
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// HD44780 controller as seen through a PCF8574 backpack.
///
/// Decodes the expander byte stream: data is latched on each EN falling
/// edge, as one 8-bit instruction (low lines unwired) until the controller
/// is switched to 4-bit mode, then as nibble pairs. Display RAM, the
/// address counter and the mode flags are modelled; CGRAM and shifting are
/// not.
#[derive(Clone, Debug)]
pub struct Hd44780Sim {
    ddram: [u8; 128],
    address_counter: u8,
    four_bit: bool,
    pending_high: Option<u8>,
    last_bus: Option<u8>,
    display_on: bool,
    cursor_on: bool,
    blink_on: bool,
    increment: bool,
    two_lines: bool,
    backlight_dropped: bool,
    instructions: Vec<u8>,
}

impl Default for Hd44780Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Hd44780Sim {
    /// Controller state right after power-on reset.
    pub fn new() -> Self {
        Self {
            ddram: [b' '; 128],
            address_counter: 0,
            four_bit: false,
            pending_high: None,
            last_bus: None,
            display_on: false,
            cursor_on: false,
            blink_on: false,
            increment: true,
            two_lines: false,
            backlight_dropped: false,
            instructions: Vec::new(),
        }
    }

    /// Processes one byte written to the expander.
    pub fn feed(&mut self, bus: u8) {
        if bus & bits::BACKLIGHT == 0 {
            self.backlight_dropped = true;
        }
        if let Some(prev) = self.last_bus {
            if prev & bits::EN != 0 && bus & bits::EN == 0 {
                self.latch(prev);
            }
        }
        self.last_bus = Some(bus);
    }

    fn latch(&mut self, bus: u8) {
        let nibble = bus >> 4;
        let data = bus & bits::RS != 0;

        if !self.four_bit {
            self.pending_high = None;
            self.execute(nibble << 4, data);
            return;
        }
        match self.pending_high.take() {
            None => self.pending_high = Some(nibble),
            Some(high) => self.execute((high << 4) | nibble, data),
        }
    }

    fn execute(&mut self, value: u8, data: bool) {
        if data {
            self.ddram[usize::from(self.address_counter)] = value;
            self.step_address();
            return;
        }

        self.instructions.push(value);
        if value & 0x80 != 0 {
            self.address_counter = value & 0x7F;
        } else if value & 0x40 != 0 {
            // CGRAM address
        } else if value & 0x20 != 0 {
            self.four_bit = value & 0x10 == 0;
            self.two_lines = value & 0x08 != 0;
        } else if value & 0x10 != 0 {
            // cursor/display shift
        } else if value & 0x08 != 0 {
            self.display_on = value & 0x04 != 0;
            self.cursor_on = value & 0x02 != 0;
            self.blink_on = value & 0x01 != 0;
        } else if value & 0x04 != 0 {
            self.increment = value & 0x02 != 0;
        } else if value & 0x02 != 0 {
            self.address_counter = 0;
        } else if value == 0x01 {
            self.ddram.fill(b' ');
            self.address_counter = 0;
            self.increment = true;
        }
    }

    fn step_address(&mut self) {
        let next = if self.increment {
            self.address_counter.wrapping_add(1)
        } else {
            self.address_counter.wrapping_sub(1)
        } & 0x7F;

        // In 2-line mode the rows are 0x00-0x27 and 0x40-0x67
        self.address_counter = match (self.two_lines, next) {
            (true, 0x28) => 0x40,
            (true, 0x68) => 0x00,
            _ => next,
        };
    }

    /// Character at `row`, `column`.
    pub fn cell(&self, row: u8, column: u8) -> char {
        let base = ROW_OFFSETS[usize::from(row) % ROW_OFFSETS.len()];
        let addr = base.wrapping_add(column) & 0x7F;
        char::from(self.ddram[usize::from(addr)])
    }

    /// The first `width` characters of `row`.
    pub fn row_text(&self, row: u8, width: u8) -> String {
        (0..width).map(|col| self.cell(row, col)).collect()
    }

    /// True if both rows are blank.
    pub fn is_blank(&self) -> bool {
        self.ddram.iter().all(|&b| b == b' ')
    }

    /// Current DDRAM address counter.
    pub fn address_counter(&self) -> u8 {
        self.address_counter
    }

    /// True once the controller runs a 4-bit interface.
    pub fn is_four_bit(&self) -> bool {
        self.four_bit
    }

    /// True if a nibble is waiting for its partner.
    pub fn has_pending_nibble(&self) -> bool {
        self.pending_high.is_some()
    }

    /// Display enabled by the display-control instruction.
    pub fn display_on(&self) -> bool {
        self.display_on
    }

    /// Underline cursor visible.
    pub fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    /// Blinking cursor enabled.
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Entry mode increments the address counter.
    pub fn increments(&self) -> bool {
        self.increment
    }

    /// 2-line mode selected by function set.
    pub fn two_lines(&self) -> bool {
        self.two_lines
    }

    /// True if any byte ever arrived with the backlight bit clear.
    pub fn backlight_dropped(&self) -> bool {
        self.backlight_dropped
    }

    /// Every instruction executed, oldest first.
    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }
}

// ============================================================================
// Keypad
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct KeyPress {
    row: usize,
    col: usize,
    from_ns: u64,
    until_ns: Option<u64>,
}

#[derive(Debug)]
struct MatrixState {
    rows: [MockPin; ROWS],
    presses: Vec<KeyPress>,
    clock: MockClock,
}

/// Simulated 4x4 keypad wiring.
///
/// A column reads low when a key in that column is held and its row is
/// driven low, like a switch between the two lines with the column pulled
/// up.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::{MockClock, MockDelay, MockKeyMatrix};
/// use escape_prop::keypad::Keypad;
///
/// let clock = MockClock::new();
/// let matrix = MockKeyMatrix::new(clock.clone());
/// let mut keypad = Keypad::new(
///     matrix.row_pins(),
///     matrix.column_pins(),
///     MockDelay::with_clock(clock),
/// )
/// .unwrap();
///
/// matrix.press(0, 2);
/// assert_eq!(keypad.scan(), Some('B'));
/// ```
#[derive(Clone, Debug)]
pub struct MockKeyMatrix {
    state: Rc<RefCell<MatrixState>>,
}

impl MockKeyMatrix {
    /// Creates a matrix with nothing pressed. Row pins start low.
    pub fn new(clock: MockClock) -> Self {
        let rows = core::array::from_fn(|_| MockPin::new().with_clock(clock.clone()));
        Self {
            state: Rc::new(RefCell::new(MatrixState {
                rows,
                presses: Vec::new(),
                clock,
            })),
        }
    }

    /// Handles to the row lines (driven by the keypad).
    pub fn row_pins(&self) -> [MockPin; ROWS] {
        self.state.borrow().rows.clone()
    }

    /// Handles to the column lines (sensed by the keypad).
    pub fn column_pins(&self) -> [MatrixColumn; COLS] {
        core::array::from_fn(|col| MatrixColumn {
            matrix: Rc::clone(&self.state),
            col,
        })
    }

    /// Holds the key at `row`, `col` from now on.
    pub fn press(&self, row: usize, col: usize) {
        let mut state = self.state.borrow_mut();
        let from_ns = state.clock.now_ns();
        state.presses.push(KeyPress {
            row,
            col,
            from_ns,
            until_ns: None,
        });
    }

    /// Holds the key at `row`, `col` for `ms` milliseconds from now.
    pub fn press_for_ms(&self, row: usize, col: usize, ms: u64) {
        let mut state = self.state.borrow_mut();
        let from_ns = state.clock.now_ns();
        state.presses.push(KeyPress {
            row,
            col,
            from_ns,
            until_ns: Some(from_ns + ms * 1_000_000),
        });
    }

    /// Releases the key at `row`, `col`.
    pub fn release(&self, row: usize, col: usize) {
        self.state
            .borrow_mut()
            .presses
            .retain(|p| !(p.row == row && p.col == col));
    }

    /// Releases every key.
    pub fn release_all(&self) {
        self.state.borrow_mut().presses.clear();
    }

    /// Current level of every row line.
    pub fn row_levels(&self) -> [bool; ROWS] {
        let state = self.state.borrow();
        core::array::from_fn(|row| state.rows[row].level())
    }
}

/// Column input of a [`MockKeyMatrix`].
#[derive(Clone, Debug)]
pub struct MatrixColumn {
    matrix: Rc<RefCell<MatrixState>>,
    col: usize,
}

impl MatrixColumn {
    fn pulled_low(&self) -> bool {
        let state = self.matrix.borrow();
        let now = state.clock.now_ns();
        state.presses.iter().any(|p| {
            p.col == self.col
                && p.from_ns <= now
                && p.until_ns.map_or(true, |until| now < until)
                && !state.rows[p.row].level()
        })
    }
}

impl digital::ErrorType for MatrixColumn {
    type Error = Infallible;
}

impl InputPin for MatrixColumn {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.pulled_low())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pulled_low())
    }
}

/// Key source replaying a fixed script, one entry per scan.
///
/// # Example
///
/// ```rust
/// use escape_prop::hal::ScriptedKeys;
/// use escape_prop::traits::KeySource;
///
/// let mut keys = ScriptedKeys::from_keys("12");
/// keys.push_idle(1);
///
/// assert_eq!(keys.scan(), Some('1'));
/// assert_eq!(keys.scan(), Some('2'));
/// assert_eq!(keys.scan(), None);
/// assert_eq!(keys.scan(), None); // exhausted
/// assert_eq!(keys.scan_count(), 4);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    queue: VecDeque<Option<char>>,
    scans: usize,
}

impl ScriptedKeys {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script pressing each character of `keys` in turn.
    pub fn from_keys(keys: &str) -> Self {
        Self {
            queue: keys.chars().map(Some).collect(),
            scans: 0,
        }
    }

    /// Appends one key press.
    pub fn push_key(&mut self, key: char) {
        self.queue.push_back(Some(key));
    }

    /// Appends `count` scans with nothing pressed.
    pub fn push_idle(&mut self, count: usize) {
        self.queue.extend(core::iter::repeat(None).take(count));
    }

    /// Entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of scans performed.
    pub fn scan_count(&self) -> usize {
        self.scans
    }
}

impl KeySource for ScriptedKeys {
    fn scan(&mut self) -> Option<char> {
        self.scans += 1;
        self.queue.pop_front().flatten()
    }
}

// ============================================================================
// Tests
// ============================================================================
