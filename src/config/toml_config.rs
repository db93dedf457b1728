use crate::config::policy::LendingPolicy;
use crate::utils::error::{LibraryError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub library: LibrarySection,
    pub lending: LendingPolicy,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySection {
    pub name: String,
}

impl Default for LibrarySection {
    fn default() -> Self {
        Self {
            name: "Library Management System".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub seed_defaults: bool,
    pub seed_file: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub log_file: Option<String>,
}

impl LibraryConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LibraryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LibraryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LIBRARY_SEED_FILE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LibraryError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("library.name", &self.library.name).map_err(|_| {
            LibraryError::InvalidConfigValueError {
                field: "library.name".to_string(),
                value: self.library.name.clone(),
                reason: "Value cannot be empty or whitespace-only".to_string(),
            }
        })?;

        validate_range("lending.loan_period_days", self.lending.loan_period_days, 1, 365)?;
        validate_positive_number("lending.borrow_limit", self.lending.borrow_limit, 1)?;
        validate_range("lending.fine_per_day", self.lending.fine_per_day, 0, 1000)?;

        if let Some(seed_file) = &self.catalog.seed_file {
            validate_path("catalog.seed_file", seed_file)?;
            validate_file_extension("catalog.seed_file", seed_file, &["csv"])?;
        }

        if let Some(log_file) = &self.logging.log_file {
            validate_path("logging.log_file", log_file)?;
        }

        Ok(())
    }
}

impl Validate for LibraryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LibraryConfig::from_toml_str("").unwrap();
        assert_eq!(config, LibraryConfig::default());
        assert!(config.catalog.seed_defaults);
        assert_eq!(config.lending.loan_period_days, 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[library]
name = "Branch Library"

[lending]
loan_period_days = 21
fine_per_day = 2

[catalog]
seed_defaults = false
seed_file = "books.csv"
"#;

        let config = LibraryConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.library.name, "Branch Library");
        assert_eq!(config.lending.loan_period_days, 21);
        assert_eq!(config.lending.fine_per_day, 2);
        assert_eq!(config.lending.borrow_limit, 5);
        assert!(!config.catalog.seed_defaults);
        assert_eq!(config.catalog.seed_file.as_deref(), Some("books.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMALL_LIBRARY_TEST_SEED", "/tmp/seed.csv");

        let toml_content = r#"
[catalog]
seed_file = "${SMALL_LIBRARY_TEST_SEED}"
"#;

        let config = LibraryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.catalog.seed_file.as_deref(), Some("/tmp/seed.csv"));

        std::env::remove_var("SMALL_LIBRARY_TEST_SEED");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = r#"
[library]
name = "${SMALL_LIBRARY_SURELY_UNSET_VAR}"
"#;
        let config = LibraryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.library.name, "${SMALL_LIBRARY_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_config_validation() {
        let zero_limit = LibraryConfig::from_toml_str("[lending]\nborrow_limit = 0\n").unwrap();
        assert!(zero_limit.validate().is_err());

        let long_loan = LibraryConfig::from_toml_str("[lending]\nloan_period_days = 400\n").unwrap();
        assert!(long_loan.validate().is_err());

        let bad_seed = LibraryConfig::from_toml_str("[catalog]\nseed_file = \"books.json\"\n").unwrap();
        assert!(bad_seed.validate().is_err());

        let blank_name = LibraryConfig::from_toml_str("[library]\nname = \"  \"\n").unwrap();
        assert!(matches!(
            blank_name.validate(),
            Err(LibraryError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            LibraryConfig::from_toml_str("[lending\nborrow_limit = 1"),
            Err(LibraryError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[library]\nname = \"File Library\"\n")
            .unwrap();

        let config = LibraryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.library.name, "File Library");
    }
}
