//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.processing;
        if p.chunk_size == 0 {
            return Err(ConfigError::Invalid("processing.chunk_size must be > 0".into()));
        }
        if p.chunk_overlap >= p.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "processing.chunk_overlap ({}) must be smaller than chunk_size ({})",
                p.chunk_overlap, p.chunk_size
            )));
        }
        if p.top_k == 0 {
            return Err(ConfigError::Invalid("processing.top_k must be > 0".into()));
        }
        if self.ollama.host.trim().is_empty() {
            return Err(ConfigError::Invalid("ollama.host is empty".into()));
        }
        Ok(())
    }

    /// Directory uploads are staged in before indexing.
    pub fn upload_dir(&self, paths: &AppPaths) -> PathBuf {
        self.session
            .upload_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.upload_dir.clone())
    }

    /// Directory for temporary extraction artifacts (e.g. audio tracks).
    pub fn scratch_dir(&self, paths: &AppPaths) -> PathBuf {
        self.session
            .scratch_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.scratch_dir.clone())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Sift Configuration
# Ask questions about one file at a time

[ollama]
# Ollama server address
host = "http://localhost:11434"

# Model for grounded text answers
model = "gpt-oss:20b"

# Vision-capable model used when an image is attached
vision_model = "llama3.2-vision"

# Model for generating embeddings
embedding_model = "nomic-embed-text"

# Request timeout in seconds
timeout_seconds = 120

# Sampling temperature (0 keeps answers close to the context)
temperature = 0.0

[processing]
# Text chunking for retrieval, in characters
chunk_size = 1000
chunk_overlap = 200

# Chunks retrieved per question
top_k = 5

# Whisper model size: tiny, base, small, medium, large
whisper_model = "base"

[session]
# Where uploads are staged; wiped on every new upload and on clear
# upload_dir = "/tmp/sift/uploads"

# Where temporary extraction artifacts live; wiped on clear
# scratch_dir = "/tmp/sift/scratch"
"#
        .to_string()
    }
}

/// Ollama LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub vision_model: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
            vision_model: "llama3.2-vision".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
            temperature: 0.0,
        }
    }
}

/// Content processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub whisper_model: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            whisper_model: "base".to_string(),
        }
    }
}

/// Upload staging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub upload_dir: Option<String>,
    pub scratch_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.processing.chunk_size, 1000);
        assert_eq!(config.processing.chunk_overlap, 200);
        assert_eq!(config.processing.top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.ollama.vision_model, "llama3.2-vision");
        assert_eq!(config.ollama.temperature, 0.0);
        assert!(config.session.upload_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [ollama]
            model = "mistral"

            [session]
            upload_dir = "/tmp/elsewhere"
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.ollama.model, "mistral");
        // Defaults should still work
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.session.upload_dir.as_deref(), Some("/tmp/elsewhere"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [processing]
            chunk_size = 200
            chunk_overlap = 200
            "#
        )
        .unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ollama.model, "gpt-oss:20b");
    }

    #[test]
    fn test_session_dir_overrides() {
        let paths = AppPaths::new().unwrap();
        let mut config = Config::default();
        assert_eq!(config.upload_dir(&paths), paths.upload_dir);

        config.session.scratch_dir = Some("/tmp/sift-scratch".to_string());
        assert_eq!(config.scratch_dir(&paths), PathBuf::from("/tmp/sift-scratch"));
    }
}
