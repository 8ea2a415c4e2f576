use crate::error::{Result, StabilityError};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// How the outbound endpoint segment is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointRouting {
    /// Every request goes to the `sd3` endpoint.
    Generic,
    /// `core` goes to the `core` endpoint, everything else to its family.
    #[default]
    ByModel,
}

impl EndpointRouting {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointRouting::Generic => "generic",
            EndpointRouting::ByModel => "by-model",
        }
    }
}

impl FromStr for EndpointRouting {
    type Err = StabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(EndpointRouting::Generic),
            "by-model" | "by_model" | "model" => Ok(EndpointRouting::ByModel),
            other => Err(StabilityError::Config(format!(
                "unknown routing policy: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: String,
    pub base_url: String,
    pub output_dir: PathBuf,
    pub routing: EndpointRouting,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            routing: EndpointRouting::default(),
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads a key/value file. Keys present in the file take precedence over
    /// the process environment; missing keys fall back to it.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |e: dotenv::Error| {
            StabilityError::Config(format!("failed to load {}: {}", path.display(), e))
        };

        let mut file_values = HashMap::new();
        for item in dotenv::from_path_iter(path).map_err(load_error)? {
            let (key, value) = item.map_err(load_error)?;
            file_values.insert(key, value);
        }

        Self::from_lookup(|key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| env::var(key).ok())
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        // Missing keys are not an error; the service rejects the call instead.
        if let Some(api_key) = lookup("STABILITY_API_KEY") {
            config.api_key = api_key;
        }
        if let Some(base_url) = lookup("STABILITY_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(output_dir) = lookup("STABILITY_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }
        if let Some(routing) = lookup("STABILITY_ROUTING") {
            config.routing = routing.parse()?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_routing(mut self, routing: EndpointRouting) -> Self {
        self.routing = routing;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
