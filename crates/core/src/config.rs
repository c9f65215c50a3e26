use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub llm: LlmConfig,
    pub guardrails: GuardrailThresholds,
    pub pipeline: PipelineConfig,
    pub features: FeatureFlags,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub sample_fallback: bool,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
}

/// Per-validator pass thresholds. A score equal to its threshold passes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardrailThresholds {
    pub content_safety: f64,
    pub quality: f64,
    pub business_logic: f64,
    pub bias: f64,
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub response_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    pub multi_agent_enabled: bool,
    pub guardrails_enabled: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Disabled,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub dataset_path: Option<PathBuf>,
    pub sample_fallback: Option<bool>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub response_timeout_secs: Option<u64>,
    pub multi_agent_enabled: Option<bool>,
    pub guardrails_enabled: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for GuardrailThresholds {
    fn default() -> Self {
        Self { content_safety: 0.8, quality: 0.85, business_logic: 0.75, bias: 0.7 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig {
                path: PathBuf::from("data/netflix_titles.csv"),
                sample_fallback: true,
            },
            llm: LlmConfig {
                provider: LlmProvider::Disabled,
                api_key: None,
                base_url: None,
                model: "gpt-4o-mini".to_string(),
                temperature: 0.1,
            },
            guardrails: GuardrailThresholds::default(),
            pipeline: PipelineConfig { response_timeout_secs: 30, max_concurrent_requests: 8 },
            features: FeatureFlags { multi_agent_enabled: true, guardrails_enabled: true },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected disabled|openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("marquee.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn response_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.pipeline.response_timeout_secs)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(dataset) = patch.dataset {
            if let Some(path) = dataset.path {
                self.dataset.path = path;
            }
            if let Some(sample_fallback) = dataset.sample_fallback {
                self.dataset.sample_fallback = sample_fallback;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
        }

        if let Some(guardrails) = patch.guardrails {
            if let Some(content_safety) = guardrails.content_safety {
                self.guardrails.content_safety = content_safety;
            }
            if let Some(quality) = guardrails.quality {
                self.guardrails.quality = quality;
            }
            if let Some(business_logic) = guardrails.business_logic {
                self.guardrails.business_logic = business_logic;
            }
            if let Some(bias) = guardrails.bias {
                self.guardrails.bias = bias;
            }
        }

        if let Some(pipeline) = patch.pipeline {
            if let Some(response_timeout_secs) = pipeline.response_timeout_secs {
                self.pipeline.response_timeout_secs = response_timeout_secs;
            }
            if let Some(max_concurrent_requests) = pipeline.max_concurrent_requests {
                self.pipeline.max_concurrent_requests = max_concurrent_requests;
            }
        }

        if let Some(features) = patch.features {
            if let Some(multi_agent_enabled) = features.multi_agent_enabled {
                self.features.multi_agent_enabled = multi_agent_enabled;
            }
            if let Some(guardrails_enabled) = features.guardrails_enabled {
                self.features.guardrails_enabled = guardrails_enabled;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MARQUEE_DATASET_PATH") {
            self.dataset.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("MARQUEE_DATASET_SAMPLE_FALLBACK") {
            self.dataset.sample_fallback = parse_bool("MARQUEE_DATASET_SAMPLE_FALLBACK", &value)?;
        }

        if let Some(value) = read_env("MARQUEE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("MARQUEE_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("MARQUEE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("MARQUEE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("MARQUEE_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("MARQUEE_LLM_TEMPERATURE", &value)?;
        }

        if let Some(value) = read_env("MARQUEE_GUARDRAILS_CONTENT_SAFETY") {
            self.guardrails.content_safety =
                parse_f64("MARQUEE_GUARDRAILS_CONTENT_SAFETY", &value)?;
        }
        if let Some(value) = read_env("MARQUEE_GUARDRAILS_QUALITY") {
            self.guardrails.quality = parse_f64("MARQUEE_GUARDRAILS_QUALITY", &value)?;
        }
        if let Some(value) = read_env("MARQUEE_GUARDRAILS_BUSINESS_LOGIC") {
            self.guardrails.business_logic =
                parse_f64("MARQUEE_GUARDRAILS_BUSINESS_LOGIC", &value)?;
        }
        if let Some(value) = read_env("MARQUEE_GUARDRAILS_BIAS") {
            self.guardrails.bias = parse_f64("MARQUEE_GUARDRAILS_BIAS", &value)?;
        }

        if let Some(value) = read_env("MARQUEE_PIPELINE_RESPONSE_TIMEOUT_SECS") {
            self.pipeline.response_timeout_secs =
                parse_u64("MARQUEE_PIPELINE_RESPONSE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("MARQUEE_PIPELINE_MAX_CONCURRENT_REQUESTS") {
            self.pipeline.max_concurrent_requests =
                parse_usize("MARQUEE_PIPELINE_MAX_CONCURRENT_REQUESTS", &value)?;
        }

        if let Some(value) = read_env("MARQUEE_FEATURES_MULTI_AGENT_ENABLED") {
            self.features.multi_agent_enabled =
                parse_bool("MARQUEE_FEATURES_MULTI_AGENT_ENABLED", &value)?;
        }
        if let Some(value) = read_env("MARQUEE_FEATURES_GUARDRAILS_ENABLED") {
            self.features.guardrails_enabled =
                parse_bool("MARQUEE_FEATURES_GUARDRAILS_ENABLED", &value)?;
        }

        let log_level =
            read_env("MARQUEE_LOGGING_LEVEL").or_else(|| read_env("MARQUEE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MARQUEE_LOGGING_FORMAT").or_else(|| read_env("MARQUEE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(dataset_path) = overrides.dataset_path {
            self.dataset.path = dataset_path;
        }
        if let Some(sample_fallback) = overrides.sample_fallback {
            self.dataset.sample_fallback = sample_fallback;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = Some(llm_base_url);
        }
        if let Some(response_timeout_secs) = overrides.response_timeout_secs {
            self.pipeline.response_timeout_secs = response_timeout_secs;
        }
        if let Some(multi_agent_enabled) = overrides.multi_agent_enabled {
            self.features.multi_agent_enabled = multi_agent_enabled;
        }
        if let Some(guardrails_enabled) = overrides.guardrails_enabled {
            self.features.guardrails_enabled = guardrails_enabled;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dataset(&self.dataset)?;
        validate_llm(&self.llm)?;
        validate_guardrails(&self.guardrails)?;
        validate_pipeline(&self.pipeline)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("marquee.toml"), PathBuf::from("config/marquee.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_dataset(dataset: &DatasetConfig) -> Result<(), ConfigError> {
    if dataset.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("dataset.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::Disabled => {}
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for the ollama provider".to_string(),
                ));
            }
        }
    }

    if llm.provider != LlmProvider::Disabled && llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    Ok(())
}

fn validate_guardrails(thresholds: &GuardrailThresholds) -> Result<(), ConfigError> {
    let named = [
        ("guardrails.content_safety", thresholds.content_safety),
        ("guardrails.quality", thresholds.quality),
        ("guardrails.business_logic", thresholds.business_logic),
        ("guardrails.bias", thresholds.bias),
    ];

    for (name, value) in named {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!("{name} must be in range 0.0..=1.0")));
        }
    }

    Ok(())
}

fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), ConfigError> {
    if pipeline.response_timeout_secs == 0 || pipeline.response_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "pipeline.response_timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if pipeline.max_concurrent_requests == 0 {
        return Err(ConfigError::Validation(
            "pipeline.max_concurrent_requests must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    dataset: Option<DatasetPatch>,
    llm: Option<LlmPatch>,
    guardrails: Option<GuardrailsPatch>,
    pipeline: Option<PipelinePatch>,
    features: Option<FeaturesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetPatch {
    path: Option<PathBuf>,
    sample_fallback: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct GuardrailsPatch {
    content_safety: Option<f64>,
    quality: Option<f64>,
    business_logic: Option<f64>,
    bias: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PipelinePatch {
    response_timeout_secs: Option<u64>,
    max_concurrent_requests: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FeaturesPatch {
    multi_agent_enabled: Option<bool>,
    guardrails_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
