//! Data contracts for every flow.
//!
//! Inputs implement [`Validate`](crate::validate::Validate) and are checked
//! before any external call; outputs derive `JsonSchema` so the same type
//! drives both the schema sent to the model and strict response parsing.

pub mod chat;
pub mod crop;
pub mod finance;
pub mod intent;
pub mod locale;
pub mod media;
pub mod speech;

pub use chat::*;
pub use crop::*;
pub use finance::*;
pub use intent::*;
pub use locale::*;
pub use media::*;
pub use speech::*;
