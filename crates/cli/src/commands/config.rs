use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use marquee_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

const COMMAND: &str = "config";

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Field {
    fn new(key: &'static str, value: impl ToString, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.to_string(), env_keys }
    }
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    CommandResult::raw(0, lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = config.llm.api_key.as_ref().map(redact_secret);

    vec![
        Field::new("dataset.path", config.dataset.path.display(), &["MARQUEE_DATASET_PATH"]),
        Field::new(
            "dataset.sample_fallback",
            config.dataset.sample_fallback,
            &["MARQUEE_DATASET_SAMPLE_FALLBACK"],
        ),
        Field::new("llm.provider", config.llm.provider.as_str(), &["MARQUEE_LLM_PROVIDER"]),
        Field::new(
            "llm.api_key",
            api_key.as_deref().unwrap_or("<unset>"),
            &["MARQUEE_LLM_API_KEY"],
        ),
        Field::new(
            "llm.base_url",
            config.llm.base_url.as_deref().unwrap_or("<unset>"),
            &["MARQUEE_LLM_BASE_URL"],
        ),
        Field::new("llm.model", &config.llm.model, &["MARQUEE_LLM_MODEL"]),
        Field::new("llm.temperature", config.llm.temperature, &["MARQUEE_LLM_TEMPERATURE"]),
        Field::new(
            "guardrails.content_safety",
            config.guardrails.content_safety,
            &["MARQUEE_GUARDRAILS_CONTENT_SAFETY"],
        ),
        Field::new(
            "guardrails.quality",
            config.guardrails.quality,
            &["MARQUEE_GUARDRAILS_QUALITY"],
        ),
        Field::new(
            "guardrails.business_logic",
            config.guardrails.business_logic,
            &["MARQUEE_GUARDRAILS_BUSINESS_LOGIC"],
        ),
        Field::new("guardrails.bias", config.guardrails.bias, &["MARQUEE_GUARDRAILS_BIAS"]),
        Field::new(
            "pipeline.response_timeout_secs",
            config.pipeline.response_timeout_secs,
            &["MARQUEE_PIPELINE_RESPONSE_TIMEOUT_SECS"],
        ),
        Field::new(
            "pipeline.max_concurrent_requests",
            config.pipeline.max_concurrent_requests,
            &["MARQUEE_PIPELINE_MAX_CONCURRENT_REQUESTS"],
        ),
        Field::new(
            "features.multi_agent_enabled",
            config.features.multi_agent_enabled,
            &["MARQUEE_FEATURES_MULTI_AGENT_ENABLED"],
        ),
        Field::new(
            "features.guardrails_enabled",
            config.features.guardrails_enabled,
            &["MARQUEE_FEATURES_GUARDRAILS_ENABLED"],
        ),
        Field::new(
            "logging.level",
            &config.logging.level,
            &["MARQUEE_LOGGING_LEVEL", "MARQUEE_LOG_LEVEL"],
        ),
        Field::new(
            "logging.format",
            config.logging.format.as_str(),
            &["MARQUEE_LOGGING_FORMAT", "MARQUEE_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("marquee.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/marquee.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    toml::from_str::<Value>(&raw).ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|env_key| env::var_os(env_key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &SecretString) -> String {
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn redaction_keeps_only_the_key_prefix() {
        assert_eq!(redact_secret(&SecretString::from("sk-live-abc123".to_owned())), "sk-***");
        assert_eq!(redact_secret(&SecretString::from("abc123".to_owned())), "<redacted>");
        assert_eq!(redact_secret(&SecretString::from("  ".to_owned())), "<empty>");
    }

    #[test]
    fn dotted_paths_resolve_through_tables() {
        let doc: Value = toml::from_str("[llm]\nmodel = \"gpt-4o-mini\"\n").expect("toml");

        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
        assert!(!contains_path(&doc, "dataset.path"));
    }
}
