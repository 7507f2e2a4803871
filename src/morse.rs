//! Morse code as timed light pulses.
//!
//! Timing is expressed in units of [`BASE_UNIT_MS`]:
//!
//! | Element | Units | Output |
//! |---------|-------|--------|
//! | dot | 1 | on |
//! | dash | 3 | on |
//! | symbol space | 1 | off, after every dot or dash |
//! | letter space | 5 | off, after every letter |
//! | word space | 7 | off, for each space character |
//!
//! The gap between two letters is therefore 1 + 5 = 6 units, and a space
//! between words adds 7 more. Letters are case-insensitive; characters with
//! no Morse pattern are skipped entirely.
//!
//! # Example
//!
//! ```rust
//! use escape_prop::morse::{duration_ms, elements, Element};
//!
//! let first: Vec<Element> = elements("A").collect();
//! assert_eq!(
//!     first,
//!     vec![
//!         Element::Mark(200),
//!         Element::Space(200),
//!         Element::Mark(600),
//!         Element::Space(200),
//!         Element::Space(1000),
//!     ]
//! );
//!
//! assert_eq!(duration_ms("SOS"), 7800);
//! ```

use core::str::Chars;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Length of one timing unit.
pub const BASE_UNIT_MS: u32 = 200;

/// Units the output stays on for a dot.
pub const DOT_UNITS: u32 = 1;
/// Units the output stays on for a dash.
pub const DASH_UNITS: u32 = 3;
/// Units off after each dot or dash.
pub const SYMBOL_SPACE_UNITS: u32 = 1;
/// Units off after each letter.
pub const LETTER_SPACE_UNITS: u32 = 5;
/// Units off for a space between words.
pub const WORD_SPACE_UNITS: u32 = 7;

/// International Morse patterns for A-Z and 0-9.
const TABLE: [(char, &str); 36] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
];

/// One Morse symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// Short mark.
    Dot,
    /// Long mark.
    Dash,
}

impl Symbol {
    /// Units the output stays on.
    pub const fn units(self) -> u32 {
        match self {
            Symbol::Dot => DOT_UNITS,
            Symbol::Dash => DASH_UNITS,
        }
    }

    fn from_ascii(b: u8) -> Self {
        if b == b'-' {
            Symbol::Dash
        } else {
            Symbol::Dot
        }
    }
}

/// Pattern for `c` as dots and dashes, e.g. `"-..."` for `'b'`.
///
/// Returns `None` for characters outside A-Z / 0-9, including space.
pub fn pattern(c: char) -> Option<&'static str> {
    let c = c.to_ascii_uppercase();
    TABLE.iter().find(|(k, _)| *k == c).map(|(_, p)| *p)
}

/// Symbols making up `c`, or `None` if it has no pattern.
pub fn symbols(c: char) -> Option<impl Iterator<Item = Symbol>> {
    pattern(c).map(|p| p.bytes().map(Symbol::from_ascii))
}

/// A stretch of time with the output either on or off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    /// Output on for this many milliseconds.
    Mark(u32),
    /// Output off for this many milliseconds.
    Space(u32),
}

impl Element {
    /// Length of the element.
    pub const fn duration_ms(self) -> u32 {
        match self {
            Element::Mark(ms) | Element::Space(ms) => ms,
        }
    }
}

/// Iterator over the elements of a message. See [`elements`].
#[derive(Clone, Debug)]
pub struct Elements<'a> {
    chars: Chars<'a>,
    pattern: &'static [u8],
    pos: usize,
    symbol_space_due: bool,
    letter_space_due: bool,
}

impl Iterator for Elements<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        loop {
            if self.symbol_space_due {
                self.symbol_space_due = false;
                return Some(Element::Space(SYMBOL_SPACE_UNITS * BASE_UNIT_MS));
            }
            if let Some(&b) = self.pattern.get(self.pos) {
                self.pos += 1;
                self.symbol_space_due = true;
                return Some(Element::Mark(Symbol::from_ascii(b).units() * BASE_UNIT_MS));
            }
            if self.letter_space_due {
                self.letter_space_due = false;
                return Some(Element::Space(LETTER_SPACE_UNITS * BASE_UNIT_MS));
            }

            let c = self.chars.next()?;
            if c == ' ' {
                return Some(Element::Space(WORD_SPACE_UNITS * BASE_UNIT_MS));
            }
            if let Some(p) = pattern(c) {
                self.pattern = p.as_bytes();
                self.pos = 0;
                self.letter_space_due = true;
            }
        }
    }
}

/// Element sequence `message` is played as.
pub fn elements(message: &str) -> Elements<'_> {
    Elements {
        chars: message.chars(),
        pattern: &[],
        pos: 0,
        symbol_space_due: false,
        letter_space_due: false,
    }
}

/// Total time [`SignalEncoder::play`] blocks for `message`.
pub fn duration_ms(message: &str) -> u64 {
    let units: u64 = message
        .chars()
        .map(|c| {
            if c == ' ' {
                return u64::from(WORD_SPACE_UNITS);
            }
            match symbols(c) {
                Some(syms) => {
                    let marks: u32 = syms.map(|s| s.units() + SYMBOL_SPACE_UNITS).sum();
                    u64::from(marks + LETTER_SPACE_UNITS)
                }
                None => 0,
            }
        })
        .sum();
    units * u64::from(BASE_UNIT_MS)
}

/// Plays messages on an output line.
///
/// Blocking: [`play`](Self::play) returns once the last element has
/// elapsed. The line is borrowed only for that call.
pub struct SignalEncoder<D> {
    delay: D,
}

impl<D: DelayNs> SignalEncoder<D> {
    /// Creates an encoder timing with `delay`.
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Flashes `message` on `line`, high for marks and low for spaces.
    ///
    /// The line is left low. An empty or fully unsupported message returns
    /// at once without touching the line.
    pub fn play<P: OutputPin>(&mut self, line: &mut P, message: &str) -> Result<(), P::Error> {
        log::debug!("Morse start: {:?} ({} ms)", message, duration_ms(message));
        for element in elements(message) {
            match element {
                Element::Mark(ms) => {
                    line.set_high()?;
                    self.delay.delay_ms(ms);
                    line.set_low()?;
                }
                Element::Space(ms) => self.delay.delay_ms(ms),
            }
        }
        log::debug!("Morse done");
        Ok(())
    }

    /// Gives back the delay.
    pub fn release(self) -> D {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockDelay, MockPin};
    use alloc::vec::Vec;

    #[test]
    fn table_covers_letters_and_digits() {
        for c in ('A'..='Z').chain('0'..='9') {
            assert!(pattern(c).is_some(), "missing {}", c);
        }
    }

    #[test]
    fn pattern_is_case_insensitive() {
        assert_eq!(pattern('b'), Some("-..."));
        assert_eq!(pattern('B'), Some("-..."));
    }

    #[test]
    fn unsupported_characters_have_no_pattern() {
        for c in [' ', '!', '?', '\u{e9}', '*', '#'] {
            assert_eq!(pattern(c), None);
        }
    }

    #[test]
    fn symbols_of_letter() {
        let syms: Vec<Symbol> = symbols('K').unwrap().collect();
        assert_eq!(syms, vec![Symbol::Dash, Symbol::Dot, Symbol::Dash]);
    }

    #[test]
    fn elements_skip_unsupported() {
        let with_noise: Vec<Element> = elements("E!").collect();
        let plain: Vec<Element> = elements("E").collect();
        assert_eq!(with_noise, plain);
    }

    #[test]
    fn space_is_word_gap_only() {
        let els: Vec<Element> = elements(" ").collect();
        assert_eq!(els, vec![Element::Space(1400)]);
    }

    #[test]
    fn empty_message() {
        assert_eq!(elements("").count(), 0);
        assert_eq!(duration_ms(""), 0);
    }

    #[test]
    fn duration_matches_elements() {
        for msg in ["b947d", "Hello World", "SOS SOS", "x?y"] {
            let sum: u64 = elements(msg).map(|e| u64::from(e.duration_ms())).sum();
            assert_eq!(duration_ms(msg), sum, "{}", msg);
        }
    }

    #[test]
    fn play_leaves_line_low() {
        let clock = MockClock::new();
        let mut line = MockPin::new().with_clock(clock.clone());
        let mut encoder = SignalEncoder::new(MockDelay::with_clock(clock.clone()));

        encoder.play(&mut line, "T").unwrap();

        assert!(!line.level());
        assert_eq!(line.pulses().len(), 1);
        assert_eq!(line.pulses()[0].width_ms(), 600);
        assert_eq!(clock.now_ms(), duration_ms("T"));
    }

    #[test]
    fn play_unsupported_does_nothing() {
        let clock = MockClock::new();
        let mut line = MockPin::new();
        let mut encoder = SignalEncoder::new(MockDelay::with_clock(clock.clone()));

        encoder.play(&mut line, "?!").unwrap();

        assert!(line.history().is_empty());
        assert_eq!(clock.now_ns(), 0);
    }
}
