use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::locale::Language;
use super::media::MediaPart;
use crate::error::{Error, Result};
use crate::traits::PromptInput;
use crate::validate::{require_min_chars, require_non_blank, Validate};

/// Minimum length of a free-text problem description.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

// =============================================================================
// Crop Diagnosis
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDiagnosisInput {
    /// A photo of the crop as `data:<mimetype>;base64,<encoded_data>`.
    pub photo_data_uri: String,
    /// The description of the crop issue in the local language.
    pub description: String,
    /// The language of the description.
    #[serde(default)]
    pub language: Language,
}

impl Validate for CropDiagnosisInput {
    fn validate(&self) -> Result<()> {
        require_min_chars("description", &self.description, MIN_DESCRIPTION_CHARS)?;
        let photo = MediaPart::from_data_uri(&self.photo_data_uri)?;
        if !photo.is_image() {
            return Err(Error::validation(
                "photoDataUri",
                format!("must be an image, got {}", photo.mime_type),
            ));
        }
        Ok(())
    }
}

impl PromptInput for CropDiagnosisInput {
    fn media(&self) -> Result<Vec<MediaPart>> {
        Ok(vec![MediaPart::from_data_uri(&self.photo_data_uri)?])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CropDiagnosisOutput {
    /// The diagnosis of the crop issue.
    pub diagnosis: String,
    /// Suggested solutions for the crop issue.
    pub solutions: String,
}

// =============================================================================
// Crop Management
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropManagementInput {
    /// e.g. "Wheat", "Tomatoes".
    pub crop_type: String,
    /// e.g. "planting", "flowering", "harvest".
    pub growth_stage: String,
    /// e.g. "loamy", "clay", "sandy".
    pub soil_type: String,
    /// e.g. "Karnataka, India".
    pub location: String,
    #[serde(default)]
    pub language: Language,
}

impl Validate for CropManagementInput {
    fn validate(&self) -> Result<()> {
        require_non_blank("cropType", &self.crop_type)?;
        require_non_blank("growthStage", &self.growth_stage)?;
        require_non_blank("soilType", &self.soil_type)?;
        require_non_blank("location", &self.location)
    }
}

impl PromptInput for CropManagementInput {}

/// Crop management recommendations report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CropManagementOutput {
    /// Overall recommendation for the crop in its current context.
    pub summary: String,
    /// Water requirements and irrigation techniques.
    pub irrigation: String,
    /// Fertilization schedule and soil amendments.
    pub nutrient_management: String,
    /// Common pests and diseases with control measures.
    pub pest_and_disease_control: String,
    /// Weed identification and control.
    pub weed_control: String,
    /// Concrete next steps for the farmer.
    pub action_steps: Vec<String>,
}
