use crate::error::{PipelineError, Result};
use codeflow_chunker::DEFAULT_MAX_CHUNK_LINES;
use codeflow_diagram::{LlmConfig, RenderConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "codeflow.toml";

pub const CONFIG_PATH_ENV: &str = "CODEFLOW_CONFIG";
pub const LLM_BASE_URL_ENV: &str = "CODEFLOW_LLM_BASE_URL";
pub const LLM_MODEL_ENV: &str = "CODEFLOW_LLM_MODEL";
pub const LOG_DIR_ENV: &str = "CODEFLOW_LOG_DIR";

pub const DEFAULT_AUDIT_DIR: &str = "logs";
pub const DEFAULT_MAX_CODE_CHARS: usize = 500;
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeflowConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Submissions up to this many lines become a single chunk.
    #[serde(default = "default_max_chunk_lines")]
    pub max_chunk_lines: usize,
}

fn default_max_chunk_lines() -> usize {
    DEFAULT_MAX_CHUNK_LINES
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_lines: default_max_chunk_lines(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_audit_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_max_code_chars")]
    pub max_code_chars: usize,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIT_DIR)
}

fn default_max_code_chars() -> usize {
    DEFAULT_MAX_CODE_CHARS
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_audit_dir(),
            max_code_chars: default_max_code_chars(),
            list_limit: default_list_limit(),
        }
    }
}

impl CodeflowConfig {
    /// Resolve and load configuration.
    ///
    /// Lookup order: `explicit`, then `$CODEFLOW_CONFIG`, then
    /// `./codeflow.toml` when present, then built-in defaults. Environment
    /// overrides are applied afterwards and the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.is_file().then_some(local)
            });

        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `CODEFLOW_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = non_empty(LLM_BASE_URL_ENV) {
            self.llm.base_url = base_url;
        }
        if let Some(model) = non_empty(LLM_MODEL_ENV) {
            self.llm.model = model;
        }
        if let Some(dir) = non_empty(LOG_DIR_ENV) {
            self.audit.dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.llm.validate()?;
        self.render.validate()?;
        if self.chunking.max_chunk_lines == 0 {
            return Err(PipelineError::InvalidConfig(
                "chunking.max_chunk_lines must be positive".into(),
            ));
        }
        if self.audit.list_limit == 0 {
            return Err(PipelineError::InvalidConfig(
                "audit.list_limit must be positive".into(),
            ));
        }
        Ok(())
    }
}
