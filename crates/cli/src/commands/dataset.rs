use marquee_core::config::LoadOptions;
use marquee_core::dataset::{describe, Catalog, DetailLevel};

use crate::commands::{
    load_config, to_pretty_json, CommandResult, EXIT_DATASET, EXIT_INVALID_ARGUMENT,
};

const COMMAND: &str = "dataset";

pub fn run(options: LoadOptions, detail: &str) -> CommandResult {
    let level = match detail.parse::<DetailLevel>() {
        Ok(level) => level,
        Err(message) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                message,
                EXIT_INVALID_ARGUMENT,
            )
        }
    };

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let catalog = Catalog::load(&config.dataset);
    match catalog.table() {
        Ok(table) => CommandResult::raw(0, to_pretty_json(&describe(table, level))),
        Err(error) => {
            CommandResult::failure(COMMAND, "dataset_unavailable", error.to_string(), EXIT_DATASET)
        }
    }
}
