// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// The `quill-tui` binary prints the submitted value after the alternate
// screen is gone; that file opts out locally via `allow`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use app::App;
use quill_core::EntityCatalog;
use quill_core::catalog::load_catalog;
use quill_core::config::Config;
use quill_core::config::ConfigOverrides;
use std::fs::OpenOptions;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
mod overlay;
mod reference_pane;
mod tui;

pub use cli::Cli;

/// Run the field until it is submitted or abandoned. Returns the submitted
/// value, or `None` when the user quit.
pub fn run_main(cli: Cli) -> std::io::Result<Option<String>> {
    let config = {
        // Load configuration and support CLI overrides.
        let overrides = ConfigOverrides {
            trigger: cli.trigger,
            label: cli.label.clone(),
            placeholder: cli.placeholder.clone(),
            description: cli.description.clone(),
            required: if cli.required { Some(true) } else { None },
            catalog_path: cli.catalog.clone(),
        };
        #[allow(clippy::print_stderr)]
        match Config::load_with_overrides(overrides) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error loading configuration: {err}");
                std::process::exit(1);
            }
        }
    };

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    // Open (or create) the log file, appending to it.
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join("quill-tui.log"))?;

    // Wrap file in non‑blocking writer.
    let (non_blocking, _guard) = non_blocking(log_file);

    // use RUST_LOG env var, default to info for quill crates.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quill_core=info,quill_tui=info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    let catalog = match &config.catalog_path {
        Some(path) => match load_catalog(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                #[allow(clippy::print_stderr)]
                {
                    eprintln!("Error loading catalog: {err}");
                }
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("no catalog configured; every reference will render unresolved");
            EntityCatalog::default()
        }
    };

    Ok(try_run_ratatui_app(cli, config, catalog))
}

#[expect(
    clippy::print_stderr,
    reason = "Resort to stderr in exceptional situations."
)]
fn try_run_ratatui_app(cli: Cli, config: Config, catalog: EntityCatalog) -> Option<String> {
    match run_ratatui_app(cli, config, catalog) {
        Ok(value) => value,
        Err(report) => {
            eprintln!("Error: {report:?}");
            None
        }
    }
}

fn run_ratatui_app(
    cli: Cli,
    config: Config,
    catalog: EntityCatalog,
) -> color_eyre::Result<Option<String>> {
    color_eyre::install()?;

    let mut terminal = tui::init()?;
    terminal.clear()?;

    let Cli { value, .. } = cli;
    let mut app = App::new(&config, catalog, value);
    let app_result = app.run(&mut terminal);

    restore();
    app_result
}

#[expect(
    clippy::print_stderr,
    reason = "TUI should no longer be displayed, so we can write to stderr."
)]
fn restore() {
    if let Err(err) = tui::restore() {
        eprintln!(
            "failed to restore terminal. Run `reset` or restart your terminal to recover: {err}"
        );
    }
}
