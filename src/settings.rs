use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::buffer::BufferUsage;
use crate::renderer::pool::DEFAULT_GRANULARITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Vertex pool slots grow in multiples of this many vertices.
    #[serde(default = "RenderSettings::default_granularity")]
    pub vertex_granularity: usize,
    /// Index pool slots grow in multiples of this many indices.
    #[serde(default = "RenderSettings::default_granularity")]
    pub index_granularity: usize,
    /// Initial operation capacity of each render bucket.
    #[serde(default = "RenderSettings::default_bucket_capacity")]
    pub bucket_capacity: usize,
    #[serde(default)]
    pub buffer_usage: BufferUsage,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vertex_granularity: Self::default_granularity(),
            index_granularity: Self::default_granularity(),
            bucket_capacity: Self::default_bucket_capacity(),
            buffer_usage: BufferUsage::default(),
        }
    }
}

impl RenderSettings {
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RenderSettings>(json).map(Self::validate)
    }

    pub fn validate(mut self) -> Self {
        if self.vertex_granularity == 0 {
            warn!("Vertex granularity must be greater than zero. Using default value.");
            self.vertex_granularity = Self::default_granularity();
        }

        if self.index_granularity == 0 {
            warn!("Index granularity must be greater than zero. Using default value.");
            self.index_granularity = Self::default_granularity();
        }

        if self.bucket_capacity == 0 {
            warn!("Bucket capacity must be greater than zero. Using default value.");
            self.bucket_capacity = Self::default_bucket_capacity();
        }

        self
    }

    const fn default_granularity() -> usize {
        DEFAULT_GRANULARITY
    }

    const fn default_bucket_capacity() -> usize {
        256
    }
}
