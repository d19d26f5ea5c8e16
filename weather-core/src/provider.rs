use crate::{
    Config, FetchError, WeatherRecord,
    provider::{fixture::FixtureProvider, http::HttpProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod fixture;
pub mod http;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Fixture,
    Http,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Fixture => "fixture",
            ProviderId::Http => "http",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Fixture, ProviderId::Http]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "fixture" => Ok(ProviderId::Fixture),
            "http" => Ok(ProviderId::Http),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: fixture, http."
            )),
        }
    }
}

/// Source of the current weather shown by the view.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self) -> Result<WeatherRecord, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::Fixture => Arc::new(FixtureProvider::from_config(&config.fixture)),
        ProviderId::Http => {
            let http = config.http.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No endpoint configured for provider '{id}'.\n\
                     Hint: run `weather configure {id}` and enter the endpoint URL."
                )
            })?;
            Arc::new(HttpProvider::new(
                http.url.clone(),
                Duration::from_secs(http.timeout_secs),
            )?)
        }
    };

    Ok(provider)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig};

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_ignores_case() {
        assert_eq!(ProviderId::try_from("HTTP").unwrap(), ProviderId::Http);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn http_provider_errors_when_endpoint_missing() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::Http, &cfg).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("No endpoint configured for provider 'http'"));
        assert!(msg.contains("Hint: run `weather configure http`"));
    }

    #[test]
    fn http_provider_builds_when_endpoint_set() {
        let mut cfg = Config::default();
        cfg.set_http_endpoint(HttpConfig {
            url: "http://localhost:8080/weather".into(),
            timeout_secs: 5,
        });

        assert!(provider_from_config(ProviderId::Http, &cfg).is_ok());
    }

    #[test]
    fn default_provider_is_fixture_when_not_set() {
        let cfg = Config::default();
        let provider = default_provider_from_config(&cfg).expect("fixture needs no setup");

        assert!(format!("{provider:?}").contains("FixtureProvider"));
    }

    #[test]
    fn default_provider_from_config_rejects_unknown_id() {
        let cfg = Config {
            default_provider: Some("carrier-pigeon".into()),
            ..Config::default()
        };
        let err = default_provider_from_config(&cfg).unwrap_err();

        assert!(err.to_string().contains("Unknown provider 'carrier-pigeon'"));
    }
}
