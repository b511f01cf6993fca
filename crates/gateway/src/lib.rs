#![deny(unused)]
//! HTTP gateway and flows for AgriAssist.
//!
//! This crate provides the orchestrator, the feature flows, speech output
//! with WAV encoding, and the Axum server exposing them.

pub mod assist;
pub mod audio;
pub mod features;
pub mod flow;
pub mod orchestrator;
pub mod server;
pub mod tts;

pub use assist::AssistFlow;
pub use audio::{AudioFormat, WavStreamWriter};
pub use features::FeatureFlows;
pub use flow::PromptFlow;
pub use orchestrator::Orchestrator;
pub use server::{AppState, GatewayServer};
pub use tts::SpeechFlow;
