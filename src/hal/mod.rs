//! Hardware Abstraction Layer implementations.
//!
//! The drivers in this crate are generic over `embedded-hal` traits; this
//! module supplies the concrete pins, buses and delays they run on.
//!
//! # Available Implementations
//!
//! - `mock`: Simulated clock, pins, I2C display and keypad for desktop tests
//! - `esp32`: ESP32 DevKit wiring of the prop (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
