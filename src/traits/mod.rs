//! Trait definitions at the seams between the prop's components and the
//! orchestrator.
//!
//! The drivers themselves are generic over `embedded-hal` 1.0 traits
//! (`I2c`, `OutputPin`, `InputPin`, `DelayNs`). The traits here describe what
//! the orchestrator consumes from them, so the game can be driven by real
//! hardware or by the mocks in [`crate::hal::mock`].
//!
//! # Submodules
//!
//! - `display`: character display contract
//! - `input`: key source and trigger button contracts
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`CharacterDisplay`] | [`Lcd`](crate::lcd::Lcd) |
//! | [`KeySource`] | [`Keypad`](crate::keypad::Keypad), [`ScriptedKeys`](crate::hal::ScriptedKeys) |
//! | [`TriggerButton`] | [`PushButton`](crate::button::PushButton) |

pub mod display;
pub mod input;

pub use display::*;
pub use input::*;
