use crate::error::{Result, StabilityError};
use crate::models::common::Model;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    #[default]
    TextToImage,
    ImageToImage,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::TextToImage => "text-to-image",
            GenerationMode::ImageToImage => "image-to-image",
        }
    }
}

impl FromStr for GenerationMode {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "text-to-image" => Ok(GenerationMode::TextToImage),
            "image-to-image" => Ok(GenerationMode::ImageToImage),
            other => Err(StabilityError::InvalidRequest(format!(
                "unknown mode: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "21:9")]
    Ultrawide,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "9:21")]
    UltraVertical,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 9] = [
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Ultrawide,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Vertical,
        AspectRatio::UltraVertical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Ultrawide => "21:9",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Vertical => "9:16",
            AspectRatio::UltraVertical => "9:21",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                StabilityError::InvalidRequest(format!("unsupported aspect ratio: {}", s))
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "jpeg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "application/json")]
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "application/json",
        }
    }

    pub fn is_binary_image(&self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::Png)
    }

    /// Value of the `accept` header for this format.
    pub fn accept(&self) -> &'static str {
        if self.is_binary_image() {
            "image/*"
        } else {
            "application/json"
        }
    }

    /// Extension of the saved artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "application/json" | "json" => Ok(OutputFormat::Json),
            other => Err(StabilityError::InvalidRequest(format!(
                "unsupported output format: {}",
                other
            ))),
        }
    }
}

/// Uploaded image for image-to-image mode.
#[derive(Clone)]
pub struct SourceImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = tokio::fs::read(&path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

pub const DEFAULT_STRENGTH: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub mode: GenerationMode,
    pub model: Model,
    pub aspect_ratio: AspectRatio,
    pub seed: u32,
    pub output_format: OutputFormat,
    /// Always within `[0, 1]`; only settable through `with_strength`.
    strength: f64,
    pub source_image: Option<SourceImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            mode: GenerationMode::default(),
            model: Model::default(),
            aspect_ratio: AspectRatio::default(),
            seed: 0,
            output_format: OutputFormat::default(),
            strength: DEFAULT_STRENGTH,
            source_image: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = if strength.is_nan() {
            DEFAULT_STRENGTH
        } else {
            strength.clamp(0.0, 1.0)
        };
        self
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn with_source_image(mut self, image: SourceImage) -> Self {
        self.source_image = Some(image);
        self
    }

    /// The image to upload, if this request actually runs image-to-image.
    /// Image-to-image without an image behaves as text-to-image.
    pub fn image_input(&self) -> Option<&SourceImage> {
        match self.mode {
            GenerationMode::ImageToImage => self.source_image.as_ref(),
            GenerationMode::TextToImage => None,
        }
    }
}

/// A saved generation result.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub path: PathBuf,
    pub extension: String,
    pub size_bytes: usize,
    pub model: Model,
}
