use marquee_agent::prompts::PromptLibrary;
use marquee_agent::providers::create_client;
use marquee_core::config::{AppConfig, LlmProvider, LoadOptions};
use marquee_core::dataset::Catalog;
use serde::Serialize;

use crate::commands::{to_pretty_json, CommandResult, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code when configuration loaded but another readiness check failed.
pub const EXIT_NOT_READY: u8 = 1;

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let config_failed = report
        .checks
        .iter()
        .any(|check| check.name == "config_validation" && check.status == CheckStatus::Fail);
    let exit_code = match report.overall_status {
        CheckStatus::Fail if config_failed => EXIT_CONFIG,
        CheckStatus::Fail => EXIT_NOT_READY,
        CheckStatus::Pass | CheckStatus::Skipped => 0,
    };

    let output = if json_output { to_pretty_json(&report) } else { render_human(&report) };
    CommandResult::raw(exit_code, output)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_prompt_templates());
            checks.push(check_dataset(&config));
            checks.push(check_reasoning_provider(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["prompt_templates", "dataset_load", "reasoning_provider"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Skipped checks are informational; only an explicit failure blocks readiness.
    let ready = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if ready { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if ready {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_prompt_templates() -> DoctorCheck {
    match PromptLibrary::new() {
        Ok(_) => DoctorCheck {
            name: "prompt_templates",
            status: CheckStatus::Pass,
            details: "classification, rephrase and judge templates compiled".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "prompt_templates",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_dataset(config: &AppConfig) -> DoctorCheck {
    let catalog = Catalog::load(&config.dataset);
    match catalog.table() {
        Ok(table) => {
            let report = table.report();
            DoctorCheck {
                name: "dataset_load",
                status: CheckStatus::Pass,
                details: format!(
                    "{} titles from {} ({} duplicates dropped, {} incomplete rows dropped)",
                    table.len(),
                    table.source(),
                    report.duplicates_dropped,
                    report.rows_missing_title_or_type
                ),
            }
        }
        Err(error) => DoctorCheck {
            name: "dataset_load",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_reasoning_provider(config: &AppConfig) -> DoctorCheck {
    if config.llm.provider == LlmProvider::Disabled {
        return DoctorCheck {
            name: "reasoning_provider",
            status: CheckStatus::Skipped,
            details: "llm.provider = disabled; keyword classification and local scoring only"
                .to_string(),
        };
    }

    match create_client(&config.llm) {
        Ok(Some(client)) => DoctorCheck {
            name: "reasoning_provider",
            status: CheckStatus::Pass,
            details: format!(
                "{} client configured with model `{}`",
                client.provider_name(),
                config.llm.model
            ),
        },
        Ok(None) => DoctorCheck {
            name: "reasoning_provider",
            status: CheckStatus::Skipped,
            details: "no reasoning client configured".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "reasoning_provider",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
