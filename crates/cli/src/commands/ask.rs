use marquee_agent::AgentRuntime;
use marquee_core::config::LoadOptions;
use marquee_core::domain::{Audience, GuardrailVerdict, QueryContext, Response};

use crate::commands::{block_on, load_config, CommandResult, EXIT_INVALID_ARGUMENT, EXIT_RUNTIME};

const COMMAND: &str = "ask";

/// Exit code for a query that ended rejected or in an error response.
pub const EXIT_NOT_ANSWERED: u8 = 1;

pub fn run(options: LoadOptions, query: &str, audience: Option<&str>, json: bool) -> CommandResult {
    let audience = match audience.map(str::parse::<Audience>).transpose() {
        Ok(audience) => audience,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                error.to_string(),
                EXIT_INVALID_ARGUMENT,
            )
        }
    };

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match AgentRuntime::from_config(&config) {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(COMMAND, "runtime_init", error.to_string(), EXIT_RUNTIME)
        }
    };

    let context = QueryContext { audience, locale: None };
    let response = match block_on(COMMAND, runtime.handle(query, context)) {
        Ok(response) => response,
        Err(failure) => return failure,
    };

    let exit_code = if response.is_success() { 0 } else { EXIT_NOT_ANSWERED };
    let output = if json { response.to_json() } else { render_human(&response) };
    CommandResult::raw(exit_code, output)
}

fn render_human(response: &Response) -> String {
    let mut lines = Vec::new();

    match response {
        Response::Success { category, answer, verdicts, notes, .. } => {
            lines.push(format!("[{category}] {answer}"));
            push_verdicts(&mut lines, verdicts);
            lines.extend(notes.iter().map(|note| format!("note: {note}")));
        }
        Response::Rejected { category, reason, verdicts, notes, .. } => {
            lines.push(format!("[{category}] rejected: {reason}"));
            push_verdicts(&mut lines, verdicts);
            lines.extend(notes.iter().map(|note| format!("note: {note}")));
        }
        Response::Error { reason, .. } => lines.push(format!("error: {reason}")),
    }

    lines.join("\n")
}

fn push_verdicts(lines: &mut Vec<String>, verdicts: &[GuardrailVerdict]) {
    for verdict in verdicts {
        let marker = if verdict.passed { "ok" } else { "fail" };
        lines.push(format!(
            "- [{marker}] {}: {:.2} (threshold {:.2}) {}",
            verdict.kind.label(),
            verdict.score,
            verdict.threshold,
            verdict.reason
        ));
    }
}
