use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    // INFO events stay hidden unless asked for, the menus own the console
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("small_library=debug,warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("small_library=warn"))
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// File logger, also used by the terminal UI where writing to stderr would
/// tear the screen. Without a `log_file` events are dropped.
pub fn init_file_logger(verbose: bool, log_file: Option<&Path>) {
    let Some(path) = log_file else {
        tracing_subscriber::registry().with(EnvFilter::new("off")).init();
        return;
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Failed to create log dir {}: {}", parent.display(), e);
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(default_filter(verbose))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_target(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            tracing_subscriber::registry().with(EnvFilter::new("off")).init();
        }
    }
}
