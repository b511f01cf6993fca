//! Supported interface languages.
//!
//! A `Language` travels with each request that needs one; nothing reads a
//! process-wide selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::intent::AgentLabel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Spanish,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::Marathi,
    ];

    /// BCP-47 code, as used by speech recognition.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Spanish => "es-ES",
            Language::Marathi => "mr-IN",
        }
    }

    /// Name used inside prompts ("respond in ...").
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::Marathi => "Marathi",
        }
    }

    /// Resolve a BCP-47 code or a bare primary subtag (`"hi"`).
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next().unwrap_or(code).to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().split('-').next() == Some(primary.as_str()))
    }

    /// Spoken confirmation before navigating to a feature page.
    pub fn navigating_to(&self, agent: AgentLabel) -> String {
        let page = agent.as_str();
        match self {
            Language::English => format!("Navigating to {}.", page),
            Language::Hindi => format!("{} पर जा रहे हैं।", page),
            Language::Spanish => format!("Navegando a {}.", page),
            Language::Marathi => format!("{} कडे जात आहे.", page),
        }
    }

    /// Spoken reply when no feature matched and no question was proposed.
    pub fn not_understood(&self) -> &'static str {
        match self {
            Language::English => "Sorry, I could not understand your request. Please try again.",
            Language::Hindi => "क्षमा करें, मैं आपका अनुरोध समझ नहीं सका। कृपया पुनः प्रयास करें।",
            Language::Spanish => "Lo siento, no pude entender tu solicitud. Inténtalo de nuevo.",
            Language::Marathi => "माफ करा, मला तुमची विनंती समजली नाही. कृपया पुन्हा प्रयत्न करा.",
        }
    }

    /// Shown when speech recognition failed for a reason the user can act on.
    pub fn recognition_failed(&self) -> &'static str {
        match self {
            Language::English => "Sorry, I could not hear you. Please check your microphone and try again.",
            Language::Hindi => "क्षमा करें, मैं आपको सुन नहीं सका। कृपया अपना माइक्रोफ़ोन जांचें और पुनः प्रयास करें।",
            Language::Spanish => "Lo siento, no pude escucharte. Revisa tu micrófono e inténtalo de nuevo.",
            Language::Marathi => "माफ करा, मला तुमचे ऐकू आले नाही. कृपया तुमचा मायक्रोफोन तपासा आणि पुन्हा प्रयत्न करा.",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
