//! Text-generation provider abstractions for PostPilot.
//!
//! - `TextGenerator`: RPITIT trait for concrete provider implementations
//! - `BoxTextGenerator`: Object-safe wrapper for dynamic dispatch

pub mod box_generator;
pub mod generator;
