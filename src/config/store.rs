use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const DEFAULT_DATASET: &str = "production";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";

/// Identity and transport settings of the content store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
    /// Overrides `https://<project>.api.sanity.io`, e.g. for a proxy.
    pub api_host: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_cdn: false,
            token: None,
            api_host: None,
            timeout_seconds: None,
        }
    }
}

// token 不可出現在日誌裡
impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("use_cdn", &self.use_cdn)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_host", &self.api_host)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl StoreSettings {
    /// 從環境變數載入設定，缺少的項目使用預設值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Environment variables win over values already present.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(project_id) = env_non_empty("SANITY_PROJECT_ID") {
            self.project_id = project_id;
        }
        if let Some(dataset) = env_non_empty("SANITY_DATASET") {
            self.dataset = dataset;
        }
        if let Some(api_version) = env_non_empty("SANITY_API_VERSION") {
            self.api_version = api_version;
        }
        if let Some(use_cdn) = env_flag("SANITY_USE_CDN") {
            self.use_cdn = use_cdn;
        }
        if let Some(token) = env_non_empty("SANITY_API_TOKEN") {
            self.token = Some(token);
        }
        if let Some(api_host) = env_non_empty("SANITY_API_HOST") {
            self.api_host = Some(api_host);
        }
        if let Some(timeout) = env_non_empty("SANITY_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.timeout_seconds = Some(timeout);
        }
        self
    }

    /// Whether the store can be queried at all. Checked once when the
    /// client is built; an unconfigured store degrades every read to empty.
    pub fn is_configured(&self) -> bool {
        validation::is_valid_project_id(&self.project_id)
    }

    pub fn base_url(&self) -> String {
        let base = match &self.api_host {
            Some(host) => host.clone(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => format!("https://{}.api.sanity.io", self.project_id),
        };
        if base.ends_with('/') {
            base
        } else {
            format!("{}/", base)
        }
    }
}

impl Validate for StoreSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_project_id("store.project_id", &self.project_id)?;
        validation::validate_dataset("store.dataset", &self.dataset)?;
        validation::validate_api_version("store.api_version", &self.api_version)?;

        if let Some(api_host) = &self.api_host {
            validation::validate_url("store.api_host", api_host)?;
        }

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("store.timeout_seconds", timeout as usize, 1)?;
        }

        Ok(())
    }
}
