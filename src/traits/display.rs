//! Display abstraction for the prop's text feedback.
//!
//! This module defines the [`CharacterDisplay`] trait: the three operations
//! the orchestrator needs from a character LCD.

/// Character display with addressable cells.
///
/// Implementors translate these calls into their controller's wire
/// protocol. The cursor position is not tracked by the trait; callers
/// position it explicitly before printing.
///
/// # Example
///
/// ```ignore
/// use escape_prop::traits::CharacterDisplay;
///
/// struct MyDisplay { /* ... */ }
///
/// impl CharacterDisplay for MyDisplay {
///     type Error = ();
///
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), ()> { Ok(()) }
///     fn print(&mut self, text: &str) -> Result<(), ()> { Ok(()) }
/// }
/// ```
pub trait CharacterDisplay {
    /// Error type for display operations.
    type Error: core::fmt::Debug;

    /// Blanks every cell and returns the cursor to the first cell.
    ///
    /// Blocks until the controller has finished clearing.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Moves the cursor to `row`, `column` (both zero-based).
    ///
    /// Out-of-range positions are not validated.
    fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), Self::Error>;

    /// Writes `text` starting at the cursor.
    ///
    /// The cursor advances by the controller's own auto-increment rule.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;
}
