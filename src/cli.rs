use crate::{
    config::{EndpointRouting, StabilityConfig},
    error::Result,
    logger::{self, LoggerConfig},
    models::{
        AspectRatio, GeneratedArtifact, GenerationMode, GenerationRequest, Model, OutputFormat,
        SourceImage, DEFAULT_STRENGTH,
    },
    stability::StabilityClient,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stability-studio", version, about = "Generate images with the Stability AI API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        let mut config = if self.verbose {
            LoggerConfig::development()
        } else {
            LoggerConfig::new()
        };
        config = config
            .with_json_output(self.log_json)
            .with_colors(!self.no_color && !self.log_json);
        if let Some(path) = &self.log_file {
            config = config.with_file_output(&path.to_string_lossy());
        }
        config
    }

    /// Runs the selected subcommand and returns what should go to stdout.
    pub async fn run(self) -> Result<String> {
        match self.command {
            Commands::Generate(args) => {
                let artifact = args.execute().await?;
                log::info!(
                    "✅ Generated {} ({} bytes) with {}",
                    artifact.extension,
                    artifact.size_bytes,
                    artifact.model
                );
                Ok(artifact.path.display().to_string())
            }
            Commands::Models => Ok(StabilityClient::supported_models()
                .iter()
                .map(|model| {
                    format!("{:<16} {:<32} /{}", model.id, model.name, model.family.endpoint())
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit one generation request and save the result
    Generate(GenerateArgs),
    /// List the supported models
    Models,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Description of the image to generate
    #[arg(short, long)]
    pub prompt: String,

    /// What the image should not contain
    #[arg(short, long, default_value = "")]
    pub negative_prompt: String,

    /// text-to-image or image-to-image
    #[arg(long, default_value = "text-to-image")]
    pub mode: GenerationMode,

    /// Source image for image-to-image
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Influence of the source image, 0.0 to 1.0
    #[arg(long, default_value_t = DEFAULT_STRENGTH, value_parser = parse_strength)]
    pub strength: f64,

    #[arg(short, long, default_value = "1:1")]
    pub aspect_ratio: AspectRatio,

    /// 0 lets the service pick a random seed
    #[arg(short, long, default_value_t = 0)]
    pub seed: u32,

    /// jpeg, png or application/json
    #[arg(short = 'f', long, default_value = "jpeg")]
    pub output_format: OutputFormat,

    #[arg(short, long, default_value = "sd3")]
    pub model: Model,

    /// Key/value file holding STABILITY_API_KEY
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Overrides STABILITY_OUTPUT_DIR
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// generic or by-model; overrides STABILITY_ROUTING
    #[arg(long)]
    pub routing: Option<EndpointRouting>,
}

fn parse_strength(value: &str) -> std::result::Result<f64, String> {
    let strength: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if (0.0..=1.0).contains(&strength) {
        Ok(strength)
    } else {
        Err(format!("strength must be between 0 and 1, got {}", strength))
    }
}

impl GenerateArgs {
    pub fn load_config(&self) -> Result<StabilityConfig> {
        let mut config = if self.env_file.exists() {
            log::info!("✅ Loaded {}", self.env_file.display());
            StabilityConfig::from_env_file(&self.env_file)?
        } else {
            log::warn!(
                "⚠️  {} not found, using process environment",
                self.env_file.display()
            );
            StabilityConfig::from_env()?
        };

        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir.clone());
        }
        if let Some(routing) = self.routing {
            config = config.with_routing(routing);
        }
        Ok(config)
    }

    pub async fn to_request(&self) -> Result<GenerationRequest> {
        let mut request = GenerationRequest::new(self.prompt.clone())
            .with_negative_prompt(self.negative_prompt.clone())
            .with_mode(self.mode)
            .with_model(self.model)
            .with_aspect_ratio(self.aspect_ratio)
            .with_seed(self.seed)
            .with_output_format(self.output_format)
            .with_strength(self.strength);

        if let Some(path) = &self.image {
            if self.mode == GenerationMode::TextToImage {
                log::warn!("--image is ignored in text-to-image mode");
            }
            request = request.with_source_image(SourceImage::from_path(path.clone()).await?);
        } else if self.mode == GenerationMode::ImageToImage {
            log::warn!("image-to-image without --image, sending aspect ratio instead");
        }

        Ok(request)
    }

    pub async fn execute(&self) -> Result<GeneratedArtifact> {
        let config = self.load_config()?;
        logger::log_config_info(&config);

        let request = self.to_request().await?;
        StabilityClient::new(config).generate(request).await
    }
}
