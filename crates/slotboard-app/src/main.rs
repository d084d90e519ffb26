//! Main application entry point.

use slotboard_app::{Script, replay};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: slotboard <script.json>");
        return ExitCode::from(2);
    };

    log::info!("Replaying {}", path);
    let script = match Script::load(&path) {
        Ok(script) => script,
        Err(err) => {
            log::error!("Failed to load {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let report = pollster::block_on(replay(script));
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Failed to serialize report: {}", err);
            ExitCode::FAILURE
        }
    }
}
