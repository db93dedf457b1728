use clap::Parser;
use small_library::utils::error::{ErrorSeverity, LibraryError};
use small_library::utils::{logger, validation::Validate};
use small_library::{CliConfig, Frontend, LibraryConfig, LibrarySystem, TextMenu};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置並套用命令列覆蓋設定
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    let verbose = config.logging.verbose;
    match (cli.frontend, config.logging.log_file.as_deref()) {
        (Frontend::Text, None) => logger::init_cli_logger(verbose),
        (_, log_file) => logger::init_file_logger(verbose, log_file.map(Path::new)),
    }

    tracing::info!("Starting small-library ({:?} front end)", cli.frontend);
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let mut system = match build_system(&config) {
        Ok(system) => system,
        Err(e) => fail(&e),
    };

    match cli.frontend {
        Frontend::Text => {
            let stdin = std::io::stdin();
            let mut menu = TextMenu::new(&mut system, stdin.lock(), std::io::stdout())
                .with_title(config.library.name.clone());
            if let Err(e) = menu.run() {
                fail(&e);
            }
        }
        Frontend::Tui => run_tui(system, &config)?,
    }

    Ok(())
}

fn build_system(config: &LibraryConfig) -> small_library::Result<LibrarySystem> {
    let mut system = LibrarySystem::new(config.lending.clone());

    if config.catalog.seed_defaults {
        system.seed_library();
    }

    if let Some(seed_file) = &config.catalog.seed_file {
        let loaded = system.seed_from_csv(seed_file)?;
        tracing::info!("📁 Loaded {} titles from {}", loaded, seed_file);
    }

    tracing::info!("Catalog ready with {} titles", system.library().len());
    Ok(system)
}

#[cfg(feature = "tui")]
fn run_tui(system: LibrarySystem, config: &LibraryConfig) -> anyhow::Result<()> {
    use small_library::frontend::tui::{self, TuiApp};

    let mut app = TuiApp::new(system, config.library.name.clone());
    tui::run(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_tui(_system: LibrarySystem, _config: &LibraryConfig) -> anyhow::Result<()> {
    anyhow::bail!("this build does not include the terminal UI; rebuild with --features tui")
}

fn fail(e: &LibraryError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

// 根據錯誤嚴重程度決定退出碼
fn severity_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

// 致命錯誤一律以非零碼結束
fn exit_code(e: &LibraryError) -> i32 {
    severity_code(e.severity()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_never_exit_zero() {
        let low = LibraryError::BookNotFound {
            isbn: "9780441172719".to_string(),
        };
        assert_eq!(severity_code(low.severity()), 0);
        assert_eq!(exit_code(&low), 1);

        let config = LibraryError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(exit_code(&config), 1);
        assert_eq!(exit_code(&LibraryError::NotLoggedIn), 2);
        let io = LibraryError::from(std::io::Error::other("disk"));
        assert_eq!(exit_code(&io), 3);
    }
}
