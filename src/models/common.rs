use crate::error::{Result, StabilityError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    #[serde(rename = "sd3")]
    Sd3,
    #[serde(rename = "sd3-turbo")]
    Sd3Turbo,
    #[serde(rename = "sd3-large")]
    Sd3Large,
    #[serde(rename = "sd3-large-turbo")]
    Sd3LargeTurbo,
    #[serde(rename = "sd3-medium")]
    Sd3Medium,
    #[serde(rename = "core")]
    Core,
}

/// Endpoint a model is served from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Sd3,
    Core,
}

impl ModelFamily {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ModelFamily::Sd3 => "sd3",
            ModelFamily::Core => "core",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub family: ModelFamily,
}

impl Model {
    pub const ALL: [Model; 6] = [
        Model::Sd3,
        Model::Sd3Turbo,
        Model::Sd3Large,
        Model::Sd3LargeTurbo,
        Model::Sd3Medium,
        Model::Core,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Sd3 => "sd3",
            Model::Sd3Turbo => "sd3-turbo",
            Model::Sd3Large => "sd3-large",
            Model::Sd3LargeTurbo => "sd3-large-turbo",
            Model::Sd3Medium => "sd3-medium",
            Model::Core => "core",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Sd3 => "Stable Diffusion 3",
            Model::Sd3Turbo => "Stable Diffusion 3 Turbo",
            Model::Sd3Large => "Stable Diffusion 3 Large",
            Model::Sd3LargeTurbo => "Stable Diffusion 3 Large Turbo",
            Model::Sd3Medium => "Stable Diffusion 3 Medium",
            Model::Core => "Stable Image Core",
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            Model::Core => ModelFamily::Core,
            _ => ModelFamily::Sd3,
        }
    }

    pub fn supported() -> Vec<ModelInfo> {
        Self::ALL
            .iter()
            .map(|model| ModelInfo {
                id: model.as_str().to_string(),
                name: model.display_name().to_string(),
                family: model.family(),
            })
            .collect()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == s.trim())
            .ok_or_else(|| StabilityError::InvalidRequest(format!("unsupported model: {}", s)))
    }
}
