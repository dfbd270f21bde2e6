//! Entrypoint for the batch handler: reads one JSON event from stdin (or a
//! file given as the first argument) and prints the response object. Request
//! failures come back inside the JSON, never as a nonzero exit.

use anyhow::{Context, Result};
use inpaintd::batch;
use inpaintd::invoker::PredictCommand;
use inpaintd::pipeline::{MaskLayout, Pipeline};
use inpaintd::settings::Settings;
use inpaintd::workspace::WorkspaceManager;
use std::env;
use std::io::Read;

fn read_event() -> Result<serde_json::Value> {
    let args: Vec<String> = env::args().collect();
    let raw = match args.get(1) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading event file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::load()?;
    let pipeline = Pipeline::new(
        WorkspaceManager::new(&settings.workspace_root),
        PredictCommand::from_settings(&settings),
        MaskLayout::Subdirs,
    );

    let event = read_event()?;
    let response = batch::handle_event(&pipeline, &event);
    println!("{response}");
    Ok(())
}
