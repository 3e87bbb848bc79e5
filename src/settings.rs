use std::path::Path;
use std::time::Duration;

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use serde::Deserialize;

use crate::catalog::RetryPolicy;

#[derive(Debug, Deserialize)]
pub struct GeneralSettings {
    pub log_file: String,
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSettings {
    pub opensearch_url: String,
    pub odata_url: String,
    pub request_timeout_secs: u64,
    pub access_token: Option<String>,
}

impl CatalogSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub max_delay_secs: f64,
    pub jitter_min: f64,
    pub jitter_max: f64,
}

impl RetrySettings {
    /// Reject delays and jitter bounds that cannot form a retry policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("retry.base_delay_secs", self.base_delay_secs),
            ("retry.max_delay_secs", self.max_delay_secs),
            ("retry.jitter_min", self.jitter_min),
            ("retry.jitter_max", self.jitter_max),
        ];
        for (key, value) in bounds.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(ConfigError::Message(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        if self.jitter_min > self.jitter_max {
            return Err(ConfigError::Message(format!(
                "retry.jitter_min ({}) exceeds retry.jitter_max ({})",
                self.jitter_min, self.jitter_max
            )));
        }

        Ok(())
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs_f64(self.base_delay_secs),
            Duration::from_secs_f64(self.max_delay_secs),
            self.jitter_min..self.jitter_max,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ArchiveSettings {
    pub http_root: String,
    pub id_mapping_dir: Option<String>,
}

/// This struct stores the program settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub general: GeneralSettings,
    pub catalog: CatalogSettings,
    pub retry: RetrySettings,
    pub archive: ArchiveSettings,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut s = ConfigBuilder::<DefaultState>::default();
        s = s.add_source(File::new("settings-default.toml", FileFormat::Toml));
        s = s.add_source(File::new("settings.toml", FileFormat::Toml).required(false));
        if let Some(path) = path {
            s = s.add_source(File::from(path));
        }
        s = s.add_source(
            Environment::with_prefix("SENTINEL_MMD")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = s.build()?;

        let settings: Self = config.try_deserialize()?;
        settings.retry.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils;

    use super::*;

    #[test]
    fn load_defaults() {
        let settings = Settings::new(None).expect("Unable to load settings.");

        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.catalog.request_timeout(), Duration::from_secs(15));
        assert!(settings
            .archive
            .http_root
            .starts_with("https://nbstds.met.no/"));
    }

    #[test]
    fn load_file() {
        let path = test_utils::create_temp_file_with_suffix(
            ".toml",
            r#"
            [general]
            debug = true

            [retry]
            max_attempts = 2
            "#,
        );

        let settings = Settings::new(Some(&path)).expect("Unable to load settings.");

        assert!(settings.general.debug);
        assert_eq!(settings.retry.max_attempts, 2);
        assert_eq!(settings.retry.policy().max_attempts(), 2);
    }

    #[test]
    fn invalid_retry_delays() {
        for retry in [
            "base_delay_secs = -1.0",
            "max_delay_secs = nan",
            "jitter_min = 2.0",
        ] {
            let path = test_utils::create_temp_file_with_suffix(
                ".toml",
                &format!("[retry]\n{}\n", retry),
            );

            let error = Settings::new(Some(&path)).unwrap_err();

            assert!(matches!(error, ConfigError::Message(_)), "{}", retry);
        }
    }
}
