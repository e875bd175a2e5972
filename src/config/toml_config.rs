use crate::config::store::StoreSettings;
use crate::core::content::{PageLimits, DEFAULT_SITE_NAME};
use crate::utils::error::{ContentError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Used in citations, e.g. "... . InCity Research."
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

/// Whole-application configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub site: SiteConfig,
    pub pages: PageLimits,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ContentError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// File first (if any), then `SANITY_*` variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.store = config.store.with_env_overrides();
        Ok(config)
    }

    // ${VAR} 換成環境變數，未設定的保留原字串
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.store.validate()?;
        validation::validate_non_empty_string("site.name", &self.site.name)?;
        validation::validate_positive_number("pages.max_years", self.pages.max_years, 1)?;
        Ok(())
    }
}
