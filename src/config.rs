// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub edgar: EdgarConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub store: StoreConfig,
    pub pipeline: PipelineConfig,
}

/// Identity sent to EDGAR in the mandatory User-Agent header.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgarConfig {
    pub company: String,
    pub email: String,
}

impl EdgarConfig {
    pub fn user_agent(&self) -> String {
        format!("{} {}", self.company, self.email)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ChunkingConfig {
    pub max_size: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub retry_count: usize,
    pub save_dir: PathBuf,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SEC_VECTORIZE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            edgar: EdgarConfig {
                company: "Company".to_string(),
                email: "my.email@domain.com".to_string(),
            },
            // Defaults match the splitter parameters the pipeline was tuned with.
            chunking: ChunkingConfig {
                max_size: 1200,
                overlap: 20,
            },
            embedding: EmbeddingConfig {
                api_key: None,
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
                batch_size: 64,
            },
            store: StoreConfig {
                url: "http://localhost:6333".to_string(),
                api_key: None,
                collection: "sec_filings".to_string(),
            },
            pipeline: PipelineConfig {
                retry_count: 3,
                save_dir: PathBuf::from("."),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chunking.max_size == 0 {
            return Err(PipelineError::Config(
                "chunking.max_size must be greater than 0".to_string(),
            ));
        }

        if self.chunking.overlap >= self.chunking.max_size {
            return Err(PipelineError::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_size ({})",
                self.chunking.overlap, self.chunking.max_size
            )));
        }

        if self.embedding.batch_size == 0 {
            return Err(PipelineError::Config(
                "embedding.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(PipelineError::Config(
                "embedding.dimension must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_max_size() {
        let mut config = Config::default_config();
        config.chunking.overlap = config.chunking.max_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = Config::default_config();
        config.embedding.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_agent_combines_identity() {
        let config = Config::default_config();
        assert_eq!(config.edgar.user_agent(), "Company my.email@domain.com");
    }
}
