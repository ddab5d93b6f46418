//! Configuration file support.
//!
//! Settings are read from TOML. Every section and field has a default, so an
//! empty file (or no file) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use substring_circuits::rolling_hash::{MAX_BASE, MAX_MODULUS};
use substring_circuits::{MembershipParams, RollingHashParams};

const DEFAULT_CORPUS_MAX_LEN: usize = 700_000;
const DEFAULT_MAX_PATTERN_LEN: usize = 70;
const DEFAULT_MAX_DEPTH: usize = 30;
const DEFAULT_CORPUS_WIDTH: usize = 1_024;
const DEFAULT_PATTERN_WIDTH: usize = 70;
const DEFAULT_BASE: u64 = 256;
const DEFAULT_MODULUS: u64 = 1_000_000_007;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub membership: MembershipConfig,
    #[serde(default)]
    pub rolling_hash: RollingHashConfig,
    #[serde(default)]
    pub setup: SetupConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Characters kept after concatenating the corpus fragments
    #[serde(default = "default_corpus_max_len")]
    pub max_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipConfig {
    #[serde(default = "default_max_pattern_len")]
    pub max_pattern_len: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingHashConfig {
    #[serde(default = "default_corpus_width")]
    pub corpus_width: usize,
    #[serde(default = "default_pattern_width")]
    pub pattern_width: usize,
    #[serde(default = "default_base")]
    pub base: u64,
    #[serde(default = "default_modulus")]
    pub modulus: u64,
    #[serde(default = "default_true")]
    pub exact_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Fixed seed for reproducible keys; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_keys_dir")]
    pub cache_dir: PathBuf,
    #[serde(default)]
    pub enable_persistence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_CORPUS_MAX_LEN,
        }
    }
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            max_pattern_len: DEFAULT_MAX_PATTERN_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for RollingHashConfig {
    fn default() -> Self {
        Self {
            corpus_width: DEFAULT_CORPUS_WIDTH,
            pattern_width: DEFAULT_PATTERN_WIDTH,
            base: DEFAULT_BASE,
            modulus: DEFAULT_MODULUS,
            exact_match: true,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_keys_dir(),
            enable_persistence: false,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

fn default_corpus_max_len() -> usize {
    DEFAULT_CORPUS_MAX_LEN
}

fn default_max_pattern_len() -> usize {
    DEFAULT_MAX_PATTERN_LEN
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_corpus_width() -> usize {
    DEFAULT_CORPUS_WIDTH
}

fn default_pattern_width() -> usize {
    DEFAULT_PATTERN_WIDTH
}

fn default_base() -> u64 {
    DEFAULT_BASE
}

fn default_modulus() -> u64 {
    DEFAULT_MODULUS
}

fn default_true() -> bool {
    true
}

fn default_keys_dir() -> PathBuf {
    PathBuf::from(".keys")
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.corpus.max_len == 0 {
            return invalid("corpus.max_len must be positive");
        }
        if self.membership.max_pattern_len == 0 || self.membership.max_depth == 0 {
            return invalid("membership widths must be positive");
        }

        let rolling = &self.rolling_hash;
        if rolling.corpus_width == 0 || rolling.pattern_width == 0 {
            return invalid("rolling_hash widths must be positive");
        }
        if rolling.pattern_width > rolling.corpus_width {
            return invalid("rolling_hash.pattern_width exceeds corpus_width");
        }
        if rolling.base < 2 || rolling.base > MAX_BASE {
            return invalid("rolling_hash.base must be in 2..=2^20");
        }
        if rolling.modulus < 2 || rolling.modulus > MAX_MODULUS {
            return invalid("rolling_hash.modulus must be in 2..=2^40");
        }
        Ok(())
    }

    pub fn membership_params(&self) -> MembershipParams {
        MembershipParams {
            max_pattern_len: self.membership.max_pattern_len,
            max_depth: self.membership.max_depth,
        }
    }

    /// Rolling-hash parameters for patterns of `effective_len` characters.
    pub fn rolling_hash_params(&self, effective_len: usize) -> RollingHashParams {
        RollingHashParams {
            corpus_width: self.rolling_hash.corpus_width,
            pattern_width: self.rolling_hash.pattern_width,
            effective_len,
            base: self.rolling_hash.base,
            modulus: self.rolling_hash.modulus,
            exact_match: self.rolling_hash.exact_match,
        }
    }

    /// Key cache directory when persistence is enabled.
    pub fn key_cache_dir(&self) -> Option<PathBuf> {
        self.keys
            .enable_persistence
            .then(|| self.keys.cache_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.corpus.max_len, DEFAULT_CORPUS_MAX_LEN);
        assert_eq!(config.membership.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.rolling_hash.exact_match);
        assert!(config.batch.parallel);
        assert_eq!(config.setup.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_deserialize_config() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_custom_config() {
        let config_toml = r#"
            [membership]
            max_pattern_len = 16

            [rolling_hash]
            corpus_width = 256
            modulus = 65521
            exact_match = false

            [setup]
            seed = 42

            [keys]
            cache_dir = "/tmp/substring-keys"
            enable_persistence = true
        "#;

        let config: Config = toml::from_str(config_toml).unwrap();
        assert_eq!(config.membership.max_pattern_len, 16);
        assert_eq!(config.membership.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.rolling_hash.modulus, 65521);
        assert_eq!(config.rolling_hash.base, DEFAULT_BASE);
        assert_eq!(config.setup.seed, Some(42));
        assert_eq!(
            config.key_cache_dir(),
            Some(PathBuf::from("/tmp/substring-keys"))
        );

        let params = config.rolling_hash_params(5);
        assert_eq!(params.effective_len, 5);
        assert!(!params.exact_match);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.rolling_hash.modulus = 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.rolling_hash.pattern_width = config.rolling_hash.corpus_width + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.membership.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.setup.seed = Some(9);
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}
