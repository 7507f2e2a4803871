//! Keypad scanner tests against the simulated matrix

use escape_prop::{
    hal::{MatrixColumn, MockClock, MockDelay, MockKeyMatrix, MockPin},
    keypad::{DEBOUNCE_MS, ROWS},
    Keypad, KeySource, DEFAULT_KEYMAP,
};

type TestKeypad = Keypad<MockPin, MatrixColumn, MockDelay>;

fn setup() -> (TestKeypad, MockKeyMatrix, MockClock) {
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

/// Position of `key` in the default layout.
fn position(key: char) -> (usize, usize) {
    for (row, keys) in DEFAULT_KEYMAP.iter().enumerate() {
        if let Some(col) = keys.iter().position(|&k| k == key) {
            return (row, col);
        }
    }
    panic!("no key {}", key);
}

// ============================================================================
// Single Key
// ============================================================================

#[test]
fn single_key_reported() {
    let (mut keypad, matrix, _) = setup();
    matrix.press(1, 3);
    assert_eq!(keypad.scan(), Some('*'));
}

#[test]
fn held_key_reported_every_scan() {
    let (mut keypad, matrix, _) = setup();
    matrix.press(0, 0);
    assert_eq!(keypad.scan(), Some('5'));
    assert_eq!(keypad.scan(), Some('5'));
}

#[test]
fn no_key_returns_none() {
    let (mut keypad, _, clock) = setup();
    for _ in 0..10 {
        assert_eq!(keypad.scan(), None);
    }
    assert_eq!(clock.now_ns(), 0);
}

#[test]
fn layout_matches_membrane() {
    assert_eq!(position('5'), (0, 0));
    assert_eq!(position('B'), (0, 2));
    assert_eq!(position('9'), (1, 1));
    assert_eq!(position('4'), (3, 3));
    assert_eq!(position('7'), (0, 3));
    assert_eq!(position('D'), (2, 2));
}

// ============================================================================
// Multiple Keys
// ============================================================================

#[test]
fn two_keys_same_row_first_column_wins() {
    let (mut keypad, matrix, _) = setup();
    matrix.press(2, 3);
    matrix.press(2, 1);
    assert_eq!(keypad.scan(), Some('#'));
}

#[test]
fn two_keys_different_rows_first_row_wins() {
    let (mut keypad, matrix, _) = setup();
    matrix.press(3, 0);
    matrix.press(1, 2);
    assert_eq!(keypad.scan(), Some('C'));
}

// ============================================================================
// Debounce
// ============================================================================

#[test]
fn glitch_shorter_than_debounce_rejected() {
    let (mut keypad, matrix, clock) = setup();
    matrix.press_for_ms(0, 1, u64::from(DEBOUNCE_MS) - 1);

    assert_eq!(keypad.scan(), None);
    assert_eq!(clock.now_ms(), u64::from(DEBOUNCE_MS));
}

#[test]
fn press_lasting_debounce_accepted() {
    let (mut keypad, matrix, _) = setup();
    matrix.press_for_ms(0, 1, u64::from(DEBOUNCE_MS) + 1);
    assert_eq!(keypad.scan(), Some('6'));
}

#[test]
fn rejected_glitch_hides_later_keys_for_that_scan() {
    let (mut keypad, matrix, _) = setup();
    matrix.press_for_ms(0, 0, 10);
    matrix.press(2, 2);

    assert_eq!(keypad.scan(), None);
    assert_eq!(keypad.scan(), Some('D'));
}

#[test]
fn at_most_one_debounce_per_scan() {
    let (mut keypad, matrix, clock) = setup();
    matrix.press(3, 3);
    keypad.scan();
    assert_eq!(clock.now_ms(), u64::from(DEBOUNCE_MS));
}

// ============================================================================
// Row Restoration
// ============================================================================

#[test]
fn rows_high_after_every_scan() {
    let (mut keypad, matrix, _) = setup();
    assert_eq!(matrix.row_levels(), [true; ROWS]);

    keypad.scan();
    assert_eq!(matrix.row_levels(), [true; ROWS]);

    matrix.press(1, 1);
    keypad.scan();
    assert_eq!(matrix.row_levels(), [true; ROWS]);

    matrix.release_all();
    matrix.press_for_ms(2, 0, 5);
    keypad.scan();
    assert_eq!(matrix.row_levels(), [true; ROWS]);
}

#[test]
fn scan_stops_at_hit_row() {
    let (mut keypad, matrix, _) = setup();
    matrix.press(1, 0);
    keypad.scan();

    let rows = matrix.row_pins();
    assert_eq!(rows[1].history().len(), 3);
    // Rows below the hit are never driven
    assert_eq!(rows[2].history().len(), 1);
    assert_eq!(rows[3].history().len(), 1);
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn typing_secret_code() {
    let (mut keypad, matrix, _) = setup();
    let mut typed = String::new();

    for key in "B947D".chars() {
        let (row, col) = position(key);
        matrix.press(row, col);
        if let Some(k) = keypad.scan() {
            typed.push(k);
        }
        matrix.release(row, col);
        assert_eq!(keypad.scan(), None);
    }

    assert_eq!(typed, "B947D");
}

#[test]
fn keypad_as_key_source() {
    let (keypad, matrix, _) = setup();
    let mut source: Box<dyn KeySource> = Box::new(keypad);
    matrix.press(3, 2);
    assert_eq!(source.scan(), Some('A'));
}
