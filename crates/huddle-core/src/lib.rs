//! Shared configuration and error types for the Huddle workspace reminder
//! engine.

pub mod config;
pub mod error;

pub use config::HuddleConfig;
pub use error::{HuddleError, Result, ValidationError};
