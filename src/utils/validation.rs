use crate::utils::error::{ContentError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Placeholder value shipped in sample env files; treated as "not set".
pub const PLACEHOLDER_PROJECT_ID: &str = "your-project-id";

fn project_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("static regex"))
}

fn dataset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").expect("static regex"))
}

fn api_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}|1|X)$").expect("static regex"))
}

/// A project id is usable when it is non-empty, not the placeholder, and
/// made of lowercase letters, digits and dashes only.
pub fn is_valid_project_id(project_id: &str) -> bool {
    !project_id.is_empty()
        && project_id != PLACEHOLDER_PROJECT_ID
        && project_id_pattern().is_match(project_id)
}

pub fn validate_project_id(field_name: &str, project_id: &str) -> Result<()> {
    if project_id.is_empty() {
        return Err(ContentError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    if !is_valid_project_id(project_id) {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: project_id.to_string(),
            reason: "Project id must match ^[a-z0-9-]+$ and not be the placeholder".to_string(),
        });
    }

    Ok(())
}

pub fn validate_dataset(field_name: &str, dataset: &str) -> Result<()> {
    if !dataset_pattern().is_match(dataset) {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: dataset.to_string(),
            reason: "Dataset names use lowercase letters, digits, '_' and '-' (max 64)"
                .to_string(),
        });
    }
    Ok(())
}

pub fn validate_api_version(field_name: &str, api_version: &str) -> Result<()> {
    if !api_version_pattern().is_match(api_version) {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: api_version.to_string(),
            reason: "API version must be a YYYY-MM-DD date, '1' or 'X'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ContentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ContentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_rules() {
        assert!(is_valid_project_id("abc123"));
        assert!(is_valid_project_id("my-project-9"));
        assert!(!is_valid_project_id(""));
        assert!(!is_valid_project_id("your-project-id"));
        assert!(!is_valid_project_id("MyProject"));
        assert!(!is_valid_project_id("abc_123"));
        assert!(!is_valid_project_id("abc 123"));
    }

    #[test]
    fn test_validate_project_id_errors() {
        assert!(matches!(
            validate_project_id("store.project_id", ""),
            Err(ContentError::MissingConfigError { .. })
        ));
        assert!(matches!(
            validate_project_id("store.project_id", "your-project-id"),
            Err(ContentError::InvalidConfigValueError { .. })
        ));
        assert!(validate_project_id("store.project_id", "k3x9ab").is_ok());
    }

    #[test]
    fn test_validate_dataset_and_version() {
        assert!(validate_dataset("store.dataset", "production").is_ok());
        assert!(validate_dataset("store.dataset", "staging_2").is_ok());
        assert!(validate_dataset("store.dataset", "Prod").is_err());
        assert!(validate_api_version("store.api_version", "2024-01-01").is_ok());
        assert!(validate_api_version("store.api_version", "X").is_ok());
        assert!(validate_api_version("store.api_version", "v2024").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.api_host", "https://example.com").is_ok());
        assert!(validate_url("store.api_host", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("store.api_host", "").is_err());
        assert!(validate_url("store.api_host", "invalid-url").is_err());
        assert!(validate_url("store.api_host", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("pages.recent_publications", 4, 1).is_ok());
        assert!(validate_positive_number("pages.recent_publications", 0, 1).is_err());
    }
}
