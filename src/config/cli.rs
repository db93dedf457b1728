use crate::config::toml_config::LibraryConfig;
use crate::config::CliConfig;
use crate::utils::error::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Frontend {
    /// Numbered text menus on stdin/stdout
    Text,
    /// Full-screen terminal UI
    Tui,
}

impl CliConfig {
    /// Loads the config file (or defaults) and layers the command line on top.
    pub fn resolve(&self) -> Result<LibraryConfig> {
        let mut config = match &self.config {
            Some(path) => LibraryConfig::from_file(path)?,
            None => LibraryConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut LibraryConfig) {
        if self.no_seed {
            config.catalog.seed_defaults = false;
        }
        if let Some(catalog) = &self.catalog {
            config.catalog.seed_file = Some(catalog.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.logging.log_file = Some(log_file.clone());
        }
        if self.verbose {
            config.logging.verbose = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let cli = CliConfig::parse_from(["small-library"]);
        assert_eq!(cli.frontend, Frontend::Text);
        let config = cli.resolve().unwrap();
        assert_eq!(config, LibraryConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cli = CliConfig::parse_from([
            "small-library",
            "--frontend",
            "tui",
            "--no-seed",
            "--catalog",
            "extra.csv",
            "--log-file",
            "logs/library.log",
            "-v",
        ]);
        assert_eq!(cli.frontend, Frontend::Tui);

        let config = cli.resolve().unwrap();
        assert!(!config.catalog.seed_defaults);
        assert_eq!(config.catalog.seed_file.as_deref(), Some("extra.csv"));
        assert_eq!(config.logging.log_file.as_deref(), Some("logs/library.log"));
        assert!(config.logging.verbose);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let cli = CliConfig::parse_from(["small-library", "--config", "/no/such/library.toml"]);
        assert!(matches!(
            cli.resolve(),
            Err(crate::utils::error::LibraryError::IoError(_))
        ));
    }
}
