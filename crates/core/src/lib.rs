#![deny(unused)]
//! Core types, traits, and error definitions for AgriAssist.
//!
//! This crate provides the data contracts shared by every flow, the service
//! traits the model gateway implements, prompt templating and output schema
//! generation.

pub mod config;
pub mod error;
pub mod mocks;
pub mod schema;
pub mod template;
pub mod traits;
pub mod types;
pub mod validate;

pub use error::{Error, ErrorKind, Result};
pub use traits::*;
pub use types::*;
