use serde::{Deserialize, Serialize};

use super::locale::Language;
use crate::error::Result;
use crate::validate::{require_non_blank, Validate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechInput {
    pub text: String,
}

impl Validate for TextToSpeechInput {
    fn validate(&self) -> Result<()> {
        require_non_blank("text", &self.text)
    }
}

/// The generated audio as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechOutput {
    /// `data:audio/wav;base64,<payload>`
    pub audio_data_uri: String,
}

// =============================================================================
// Speech Recognition Errors
// =============================================================================

/// Error reported by a client-side speech recognizer.
///
/// Names follow the Web Speech API error codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    LanguageNotSupported,
    #[serde(untagged)]
    Other(String),
}

impl RecognitionErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    /// Silence or a user-initiated stop: stop listening without telling the user.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::Aborted)
    }
}

/// A recognition failure reported by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionErrorReport {
    pub error: RecognitionErrorKind,
    /// BCP-47 tag the recognizer was listening in.
    #[serde(default)]
    pub lang: Option<String>,
}

impl RecognitionErrorReport {
    /// Unknown or missing tags fall back to English.
    pub fn language(&self) -> Language {
        self.lang
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionErrorReply {
    pub ignorable: bool,
    /// Message for the user. Absent when the error is ignorable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// BCP-47 tag of `message`.
    pub lang: String,
}

impl From<&RecognitionErrorReport> for RecognitionErrorReply {
    fn from(report: &RecognitionErrorReport) -> Self {
        let language = report.language();
        let ignorable = report.error.is_ignorable();
        Self {
            ignorable,
            message: (!ignorable).then(|| language.recognition_failed().to_string()),
            lang: language.code().to_string(),
        }
    }
}
