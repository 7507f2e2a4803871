//! 4x4 matrix keypad scanner.
//!
//! Rows are outputs held high when idle; columns are inputs pulled up. A key
//! shorts its row to its column, so driving one row low and reading a low
//! column identifies the key.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::hal::{MockClock, MockDelay, MockKeyMatrix};
//! use escape_prop::keypad::Keypad;
//!
//! let clock = MockClock::new();
//! let matrix = MockKeyMatrix::new(clock.clone());
//! let mut keypad = Keypad::new(
//!     matrix.row_pins(),
//!     matrix.column_pins(),
//!     MockDelay::with_clock(clock.clone()),
//! )
//! .unwrap();
//!
//! assert_eq!(keypad.scan(), None);
//!
//! matrix.press(3, 1); // '3'
//! assert_eq!(keypad.scan(), Some('3'));
//! assert_eq!(clock.now_ms(), 100); // one debounce wait
//! ```

use crate::traits::KeySource;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Number of row lines.
pub const ROWS: usize = 4;

/// Number of column lines.
pub const COLS: usize = 4;

/// Character reported for each row/column intersection.
pub type KeyMap = [[char; COLS]; ROWS];

/// Layout of the prop's membrane keypad as wired.
pub const DEFAULT_KEYMAP: KeyMap = [
    ['5', '6', 'B', '7'],
    ['8', '9', 'C', '*'],
    ['0', '#', 'D', '1'],
    ['2', '3', 'A', '4'],
];

/// Time a column must stay low before a key is accepted.
pub const DEBOUNCE_MS: u32 = 100;

/// Polled keypad scanner.
///
/// Owns all eight lines. Between scans every row is high, so no column can
/// read low.
pub struct Keypad<R, C, D> {
    rows: [R; ROWS],
    cols: [C; COLS],
    delay: D,
    keymap: &'static KeyMap,
}

impl<R, C, D> Keypad<R, C, D>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    /// Takes the lines and drives every row inactive (high).
    ///
    /// Column pull-ups are configured by whoever created the pins.
    pub fn new(rows: [R; ROWS], cols: [C; COLS], delay: D) -> Result<Self, R::Error> {
        Self::with_keymap(rows, cols, delay, &DEFAULT_KEYMAP)
    }

    /// Like [`new`](Self::new) with a different label layout.
    pub fn with_keymap(
        mut rows: [R; ROWS],
        cols: [C; COLS],
        delay: D,
        keymap: &'static KeyMap,
    ) -> Result<Self, R::Error> {
        for row in rows.iter_mut() {
            row.set_high()?;
        }
        log::info!("Keypad ready ({}x{})", ROWS, COLS);
        Ok(Self {
            rows,
            cols,
            delay,
            keymap,
        })
    }

    /// Polls the matrix once.
    ///
    /// Rows are driven low one at a time in order and the columns read in
    /// order, so with several keys held the first in row-major order wins.
    /// The first low column seen is re-read after [`DEBOUNCE_MS`]; if it has
    /// gone high the whole scan reports nothing. A scan therefore blocks for
    /// at most one debounce period.
    ///
    /// Pin errors read as "no key". Every row is high again on return.
    pub fn scan(&mut self) -> Option<char> {
        for row in 0..ROWS {
            if self.rows[row].set_low().is_err() {
                let _ = self.rows[row].set_high();
                continue;
            }

            let candidate = (0..COLS).find(|&col| self.column_low(col));
            let confirmed = candidate.filter(|&col| {
                self.delay.delay_ms(DEBOUNCE_MS);
                self.column_low(col)
            });

            let _ = self.rows[row].set_high();

            if let Some(col) = confirmed {
                let key = self.keymap[row][col];
                log::debug!("Key '{}' at row {} col {}", key, row, col);
                return Some(key);
            }
            if candidate.is_some() {
                log::debug!("Bounce on row {} rejected", row);
                return None;
            }
        }
        None
    }

    /// Label of the key at `row`, `col`.
    pub fn key_at(&self, row: usize, col: usize) -> Option<char> {
        self.keymap.get(row)?.get(col).copied()
    }

    /// Gives back the lines and delay.
    pub fn release(self) -> ([R; ROWS], [C; COLS], D) {
        (self.rows, self.cols, self.delay)
    }

    fn column_low(&mut self, col: usize) -> bool {
        self.cols[col].is_low().unwrap_or(false)
    }
}

impl<R, C, D> KeySource for Keypad<R, C, D>
where
    R: OutputPin,
    C: InputPin,
    D: DelayNs,
{
    fn scan(&mut self) -> Option<char> {
        Keypad::scan(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MatrixColumn, MockClock, MockDelay, MockKeyMatrix, MockPin};

    type TestKeypad = Keypad<MockPin, MatrixColumn, MockDelay>;

    fn keypad() -> (TestKeypad, MockKeyMatrix, MockClock) {
        let clock = MockClock::new();
        let matrix = MockKeyMatrix::new(clock.clone());
        let keypad = Keypad::new(
            matrix.row_pins(),
            matrix.column_pins(),
            MockDelay::with_clock(clock.clone()),
        )
        .unwrap();
        (keypad, matrix, clock)
    }

    #[test]
    fn new_drives_rows_high() {
        let (_keypad, matrix, _) = keypad();
        assert_eq!(matrix.row_levels(), [true; ROWS]);
    }

    #[test]
    fn every_position_maps_to_its_label() {
        let (mut keypad, matrix, _) = keypad();
        for row in 0..ROWS {
            for col in 0..COLS {
                matrix.press(row, col);
                assert_eq!(keypad.scan(), Some(DEFAULT_KEYMAP[row][col]));
                matrix.release(row, col);
            }
        }
    }

    #[test]
    fn idle_scan_does_not_wait() {
        let (mut keypad, _, clock) = keypad();
        assert_eq!(keypad.scan(), None);
        assert_eq!(clock.now_ns(), 0);
    }

    #[test]
    fn short_press_rejected_after_one_wait() {
        let (mut keypad, matrix, clock) = keypad();
        matrix.press_for_ms(1, 2, 50);
        // A second key further on must not be considered
        matrix.press(3, 3);

        assert_eq!(keypad.scan(), None);
        assert_eq!(clock.now_ms(), u64::from(DEBOUNCE_MS));
    }

    #[test]
    fn rows_restored_after_hit() {
        let (mut keypad, matrix, _) = keypad();
        matrix.press(2, 0);
        assert_eq!(keypad.scan(), Some('0'));
        assert_eq!(matrix.row_levels(), [true; ROWS]);
    }

    #[test]
    fn only_one_row_low_at_a_time() {
        let (mut keypad, matrix, _) = keypad();
        keypad.scan();

        let rows = matrix.row_pins();
        // new() high, then low/high per row
        for pin in rows.iter() {
            let levels: Vec<bool> = pin.history().iter().map(|&(_, l)| l).collect();
            assert_eq!(levels, vec![true, false, true]);
        }
    }

    #[test]
    fn custom_keymap() {
        static DIGITS: KeyMap = [
            ['1', '2', '3', 'A'],
            ['4', '5', '6', 'B'],
            ['7', '8', '9', 'C'],
            ['*', '0', '#', 'D'],
        ];
        let clock = MockClock::new();
        let matrix = MockKeyMatrix::new(clock.clone());
        let mut keypad = Keypad::with_keymap(
            matrix.row_pins(),
            matrix.column_pins(),
            MockDelay::with_clock(clock),
            &DIGITS,
        )
        .unwrap();

        matrix.press(3, 1);
        assert_eq!(keypad.scan(), Some('0'));
        assert_eq!(keypad.key_at(0, 3), Some('A'));
    }

    #[test]
    fn key_at_out_of_range() {
        let (keypad, _, _) = keypad();
        assert_eq!(keypad.key_at(0, 0), Some('5'));
        assert_eq!(keypad.key_at(4, 0), None);
        assert_eq!(keypad.key_at(0, 4), None);
    }

    // =========================================================================
    // Pin Error Tests
    // =========================================================================

    #[derive(Default)]
    struct BrokenColumn;

    impl embedded_hal::digital::ErrorType for BrokenColumn {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl InputPin for BrokenColumn {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    #[test]
    fn read_errors_count_as_no_key() {
        let rows: [MockPin; ROWS] = core::array::from_fn(|_| MockPin::new());
        let cols: [BrokenColumn; COLS] = Default::default();
        let mut keypad = Keypad::new(rows, cols, MockDelay::new()).unwrap();

        assert_eq!(keypad.scan(), None);
    }
}
