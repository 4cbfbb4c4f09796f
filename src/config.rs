//! Codec configuration
//!
//! Read from `sqlcell.toml`-style files:
//!
//! ```toml
//! default_timezone = "Europe/Berlin"
//! max_depth = 16
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::decode::DecodeOptions;
use crate::error::{CodecError, CodecResult};
use crate::types::DEFAULT_MAX_DEPTH;

/// User-facing codec settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// IANA zone for sub-second timestamps whose type has none
    pub default_timezone: String,

    /// Composite nesting limit for parsing, decoding and encoding
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Create a new configuration builder
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    pub fn from_toml_str(content: &str) -> CodecResult<Self> {
        toml::from_str(content).map_err(|e| CodecError::Config(e.to_string()))
    }

    /// Load from an explicit file.
    pub fn load(path: impl AsRef<Path>) -> CodecResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded codec config");
        Ok(config)
    }

    /// `<config dir>/sqlcell/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqlcell").join("config.toml"))
    }

    /// Load from [`Self::default_path`], falling back to defaults when the
    /// file does not exist.
    pub fn load_default() -> CodecResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate and convert into decode options.
    pub fn decode_options(&self) -> CodecResult<DecodeOptions> {
        let default_timezone: Tz = self.default_timezone.parse().map_err(|_| {
            CodecError::Config(format!("unknown time zone '{}'", self.default_timezone))
        })?;
        if self.max_depth == 0 {
            return Err(CodecError::Config("max_depth must be at least 1".to_string()));
        }
        Ok(DecodeOptions {
            default_timezone,
            max_depth: self.max_depth,
        })
    }
}

/// Builder for CodecConfig
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    /// Set the default time zone
    pub fn timezone(mut self, zone: impl Into<String>) -> Self {
        self.config.default_timezone = zone.into();
        self
    }

    /// Set the nesting limit
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CodecConfig {
        self.config
    }
}
