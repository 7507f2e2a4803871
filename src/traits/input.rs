//! Input traits polled by the orchestrator.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`KeySource`] | One poll of a keypad, returning at most one key |
//! | [`TriggerButton`] | Level query of a push button |
//!
//! Both are poll-based: nothing here registers callbacks or interrupts.

/// A source of discrete key presses.
///
/// Each call to [`scan`](Self::scan) is one poll. `None` covers both "no key
/// pressed" and readings rejected as noise.
pub trait KeySource {
    /// Polls once and returns the pressed key, if any.
    fn scan(&mut self) -> Option<char>;
}

/// A push button read by polling.
pub trait TriggerButton {
    /// Returns true if the button is pressed right now.
    fn is_pressed(&mut self) -> bool;
}
