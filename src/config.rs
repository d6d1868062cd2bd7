use crate::application::feed_state::PollPolicy;
use crate::application::feed_watcher::FeedSpec;
use crate::application::lifecycle::LifecycleSettings;
use crate::application::pipeline::PipelineSettings;
use crate::domain::error::DomainError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "signaldesk.toml";
pub const ENV_PREFIX: &str = "SIGNALDESK_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    pub feeds: Vec<FeedConfig>,
    pub watcher: WatcherConfig,
    pub pipeline: PipelineConfig,
    pub lifecycle: LifecycleConfig,
    pub llm: LlmConfig,
    pub market_data: MarketDataConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
}

fn default_min_interval_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherConfig {
    pub tick_millis: u64,
    pub error_penalty_secs: u64,
    pub max_error_penalty_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub workers: usize,
    pub capital: f64,
    pub call_timeout_secs: u64,
    pub max_article_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub holding_period_days: i64,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataConfig {
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "./signaldesk.db".to_string(),
            feeds: vec![FeedConfig {
                name: "bloomberg_markets".to_string(),
                url: "https://feeds.bloomberg.com/markets/news.rss".to_string(),
                min_interval_secs: default_min_interval_secs(),
            }],
            watcher: WatcherConfig {
                tick_millis: 1000,
                error_penalty_secs: 30,
                max_error_penalty_secs: 300,
                request_timeout_secs: 10,
            },
            pipeline: PipelineConfig {
                workers: 4,
                capital: 25_000.0,
                call_timeout_secs: 60,
                max_article_chars: 20_000,
            },
            lifecycle: LifecycleConfig {
                holding_period_days: 7,
                interval_secs: 60,
            },
            llm: LlmConfig {
                base_url: crate::infrastructure::llm::openai::DEFAULT_BASE_URL.to_string(),
                api_key: String::new(),
                model: crate::infrastructure::llm::openai::DEFAULT_MODEL.to_string(),
            },
            market_data: MarketDataConfig {
                base_url: crate::infrastructure::market_data::yahoo::DEFAULT_BASE_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file (missing file is fine), then
    /// `SIGNALDESK_*` variables with `__` separating nested keys.
    /// `OPENAI_API_KEY` is accepted when no key is configured otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config: Self = Self::figment(file)
            .extract()
            .map_err(|e| DomainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the runtime cannot represent or act on.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.lifecycle.holding_period_days <= 0
            || chrono::Duration::try_days(self.lifecycle.holding_period_days).is_none()
        {
            return Err(DomainError::Config(format!(
                "lifecycle.holding_period_days must be a positive number of days, got {}",
                self.lifecycle.holding_period_days
            )));
        }

        let mut durations = vec![
            ("watcher.error_penalty_secs", self.watcher.error_penalty_secs),
            ("watcher.max_error_penalty_secs", self.watcher.max_error_penalty_secs),
        ];
        durations.extend(
            self.feeds
                .iter()
                .map(|feed| ("feeds.min_interval_secs", feed.min_interval_secs)),
        );
        for (key, secs) in durations {
            if checked_seconds(secs).is_none() {
                return Err(DomainError::Config(format!("{key} is out of range: {secs}")));
            }
        }

        if self.pipeline.workers == 0 {
            return Err(DomainError::Config("pipeline.workers must be at least 1".into()));
        }
        if !self.pipeline.capital.is_finite() || self.pipeline.capital < 0.0 {
            return Err(DomainError::Config(format!(
                "pipeline.capital must be a non-negative amount, got {}",
                self.pipeline.capital
            )));
        }
        Ok(())
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY"])
                    .map(|_| "llm.api_key".into()),
            )
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn feed_specs(&self) -> Vec<FeedSpec> {
        self.feeds
            .iter()
            .map(|feed| FeedSpec {
                name: feed.name.clone(),
                url: feed.url.clone(),
                policy: PollPolicy {
                    min_interval: saturating_seconds(feed.min_interval_secs),
                    error_penalty: saturating_seconds(self.watcher.error_penalty_secs),
                    max_error_penalty: saturating_seconds(self.watcher.max_error_penalty_secs),
                },
            })
            .collect()
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            capital: self.pipeline.capital,
            call_timeout: Duration::from_secs(self.pipeline.call_timeout_secs),
            ..PipelineSettings::default()
        }
    }

    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            holding_period: chrono::Duration::try_days(self.lifecycle.holding_period_days)
                .unwrap_or(chrono::Duration::MAX),
            interval: Duration::from_secs(self.lifecycle.interval_secs),
            call_timeout: Duration::from_secs(self.pipeline.call_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.watcher.request_timeout_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.watcher.tick_millis)
    }
}

fn checked_seconds(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

fn saturating_seconds(secs: u64) -> chrono::Duration {
    checked_seconds(secs).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("does-not-exist.toml"))
            .extract()
            .unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.pipeline.workers, 4);
        assert_eq!(cfg.lifecycle.holding_period_days, 7);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
database_path = "/tmp/desk.db"

[[feeds]]
name = "wire"
url = "https://example.com/rss"
min_interval_secs = 45

[pipeline]
workers = 2
capital = 1000.0
call_timeout_secs = 5
max_article_chars = 100
"#
        )
        .unwrap();

        let cfg: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file.path()))
            .extract()
            .unwrap();
        assert_eq!(cfg.database_path, "/tmp/desk.db");
        assert_eq!(cfg.feeds.len(), 1);
        assert_eq!(cfg.feeds[0].min_interval_secs, 45);
        assert_eq!(cfg.pipeline.workers, 2);
        assert_eq!(cfg.watcher.request_timeout_secs, 10);

        let specs = cfg.feed_specs();
        assert_eq!(specs[0].policy.min_interval, chrono::Duration::seconds(45));
        assert_eq!(specs[0].policy.max_error_penalty, chrono::Duration::seconds(300));
        assert_eq!(cfg.pipeline_settings().call_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_bad_holding_period() {
        let mut cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.lifecycle.holding_period_days = -3;
        assert!(matches!(cfg.validate(), Err(DomainError::Config(_))));

        cfg.lifecycle.holding_period_days = 0;
        assert!(cfg.validate().is_err());

        cfg.lifecycle.holding_period_days = i64::MAX;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_intervals() {
        let mut cfg = AppConfig::default();
        cfg.watcher.max_error_penalty_secs = u64::MAX;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("watcher.max_error_penalty_secs"));
        // Conversions never panic, even on unvalidated values.
        assert_eq!(cfg.feed_specs()[0].policy.max_error_penalty, chrono::Duration::MAX);

        let mut cfg = AppConfig::default();
        cfg.pipeline.workers = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_reports_invalid_values_as_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[lifecycle]\nholding_period_days = -1\ninterval_secs = 60").unwrap();
        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
        assert!(err.to_string().contains("holding_period_days"));
    }
}
