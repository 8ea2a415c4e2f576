pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod stability;
pub mod storage;

pub use config::{EndpointRouting, StabilityConfig};
pub use error::{Result, StabilityError};
pub use models::*;
pub use stability::{ApiCall, ApiResponse, HttpTransport, ImageTransport, StabilityClient};
pub use storage::{ArtifactStore, DirectoryStore};
