//! Core traits for AgriAssist.
//!
//! - `llm`: hosted completion service (CompletionClient, PromptInput)
//! - `speech`: hosted speech-synthesis service (SpeechSynthesizer)

pub mod llm;
pub mod speech;

pub use llm::*;
pub use speech::*;
