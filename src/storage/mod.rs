pub mod directory;
pub mod traits;

pub use directory::DirectoryStore;
pub use traits::ArtifactStore;

use chrono::{DateTime, Local};

/// `<YYYYMMDDHHMMSS>_image.<ext>`, second granularity.
pub fn artifact_file_name(timestamp: DateTime<Local>, extension: &str) -> String {
    format!("{}_image.{}", timestamp.format("%Y%m%d%H%M%S"), extension)
}
