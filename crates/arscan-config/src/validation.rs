// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks constraints serde cannot express. All violations are collected
//! before returning.

use url::Url;

use crate::diagnostic::ConfigError;
use crate::model::ArscanConfig;

fn check_http_url(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ConfigError::Validation {
            message: format!("{key} must use http or https, got scheme `{}`", url.scheme()),
        }),
        Err(e) => errors.push(ConfigError::Validation {
            message: format!("{key} `{value}` is not a valid URL: {e}"),
        }),
    }
}

fn check_not_blank(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: format!("{key} must not be empty"),
        });
    }
}

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ArscanConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` must be one of {}",
                config.app.log_level,
                LEVELS.join(", ")
            ),
        });
    }

    check_http_url(&mut errors, "api.base_url", &config.api.base_url);
    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.request_timeout_secs must be greater than 0".to_string(),
        });
    }
    if config.api.connect_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.connect_timeout_secs must be greater than 0".to_string(),
        });
    }

    check_http_url(&mut errors, "firestore.base_url", &config.firestore.base_url);
    check_not_blank(&mut errors, "firestore.collection", &config.firestore.collection);
    if config.firestore.api_key.is_some() && !config.firestore.is_enabled() {
        errors.push(ConfigError::Validation {
            message: "firestore.api_key is set but firestore.project_id is missing".to_string(),
        });
    }

    check_not_blank(&mut errors, "storage.database_path", &config.storage.database_path);
    check_not_blank(&mut errors, "storage.namespace", &config.storage.namespace);

    let fetch = &config.fetch;
    check_http_url(&mut errors, "fetch.connectivity_url", &fetch.connectivity_url);
    if !fetch.backoff_multiplier.is_finite() || fetch.backoff_multiplier < 1.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "fetch.backoff_multiplier must be at least 1.0, got {}",
                fetch.backoff_multiplier
            ),
        });
    }
    if fetch.retry_delay_ms > fetch.max_retry_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "fetch.retry_delay_ms ({}) exceeds fetch.max_retry_delay_ms ({})",
                fetch.retry_delay_ms, fetch.max_retry_delay_ms
            ),
        });
    }
    if fetch.cache_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "fetch.cache_ttl_secs must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ArscanConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = ArscanConfig::default();
        config.api.base_url = "ftp://example.com".into();
        config.fetch.backoff_multiplier = 0.5;
        config.fetch.cache_ttl_secs = 0;
        config.storage.namespace = " ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {errors:?}");
    }

    #[test]
    fn api_key_without_project_is_rejected() {
        let mut config = ArscanConfig::default();
        config.firestore.api_key = Some("key".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("project_id"));
    }

    #[test]
    fn connectivity_url_must_be_http() {
        let mut config = ArscanConfig::default();
        config.fetch.connectivity_url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("fetch.connectivity_url"));
    }

    #[test]
    fn delay_above_ceiling_is_rejected() {
        let mut config = ArscanConfig::default();
        config.fetch.retry_delay_ms = 60_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("max_retry_delay_ms"));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut config = ArscanConfig::default();
        config.app.log_level = "loud".into();
        assert!(validate_config(&config).is_err());
    }
}
