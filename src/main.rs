//! analysis-templates-tui - manage Kargo cluster analysis templates from the terminal
//!
//! This is the main entry point for the application.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod cli;
mod component;
mod components;
mod config;
mod error;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::cli::Cli;
use crate::component::Component;
use crate::config::Config;
use crate::services::{InMemoryTemplates, KargoClient, TemplateService};
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.apply(Config::load().unwrap_or_default());

    if cli.save_config {
        let path = config.save()?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    if let Err(err) = init_logging(&config, cli.verbose) {
        eprintln!("Logging disabled: {:#}", err);
    }

    let service: Arc<dyn TemplateService> = if cli.demo {
        tracing::info!("using in-memory demo backend");
        Arc::new(InMemoryTemplates::seeded())
    } else {
        tracing::info!(api_url = %config.api_url, "connecting to Kargo API");
        Arc::new(KargoClient::new(&config)?)
    };

    // Setup terminal
    Tui::install_panic_hook();
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    let mut app = App::new(service, &config);

    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "application error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Send tracing output to the log file; the terminal belongs to the UI
fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let path = config
        .log_path()
        .context("could not determine log file location")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open {}", path.display()))?;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("analysis_templates_tui={}", level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    if let Some(action) = app.init()? {
        app.dispatch(action)?;
    }

    while !app.should_quit {
        // Apply finished requests before drawing, even while keys keep arriving
        app.drain_completions()?;

        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        // Check for pending external editor
        if let Some(manifest) = app.pending_editor.take() {
            launch_external_editor(tui, app, &manifest)?;
            continue;
        }

        match tui.next_event()? {
            Some(Event::Key(key)) => {
                if let Some(action) = app.handle_key_event(key)? {
                    app.dispatch(action)?;
                }
            }
            Some(Event::Resize(w, h)) => app.dispatch(Action::Resize(w, h))?,
            Some(_) => {}
            // No event - send a tick for time-based updates
            None => app.dispatch(Action::Tick)?,
        }
    }

    let pending = app.runner.in_flight();
    if pending > 0 {
        tracing::debug!(pending, "quitting with requests still in flight");
    }
    Ok(())
}

/// Edit the manifest in $VISUAL / $EDITOR and hand the result back to the modal
fn launch_external_editor(tui: &mut Tui, app: &mut App, manifest: &str) -> Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix("cluster-analysis-template-")
        .suffix(".yaml")
        .tempfile()?;
    file.write_all(manifest.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    // Allow editors with arguments, e.g. "code --wait"
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");

    tui.suspend()?;
    let status = Command::new(program).args(parts).arg(file.path()).status();
    tui.resume()?;

    let action = match status {
        Ok(exit) if exit.success() => match fs::read_to_string(file.path()) {
            Ok(text) => Action::ManifestEdited(text),
            Err(e) => Action::EditorFailed(format!("could not read edited manifest: {}", e)),
        },
        Ok(exit) => Action::EditorFailed(format!("{} exited with {}", editor, exit)),
        Err(e) => Action::EditorFailed(format!("could not launch '{}': {}", editor, e)),
    };
    tracing::debug!(%action, "editor closed");

    app.dispatch(action)
}
