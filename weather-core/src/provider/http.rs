use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{FetchError, WeatherRecord};

use super::WeatherProvider;

/// Fetches one [`WeatherRecord`] as JSON from a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    url: String,
    http: Client,
}

impl HttpProvider {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WeatherProvider for HttpProvider {
    async fn fetch(&self) -> Result<WeatherRecord, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let res = self.http.get(&self.url).send().await.map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;
        debug!(url = %self.url, %status, bytes = body.len(), "weather endpoint responded");

        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status,
                body: truncate_body(&body),
            });
        }

        parse_record(&body)
    }
}

fn parse_record(body: &str) -> Result<WeatherRecord, FetchError> {
    Ok(serde_json::from_str(body)?)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_payload() {
        let body = r#"{"location":"Tokyo, JP","temperature":28,"condition":"Sunny",
            "humidity":55,"windSpeed":8,"visibility":12,"feelsLike":30}"#;
        let rec = parse_record(body).expect("valid payload");

        assert_eq!(rec.location, "Tokyo, JP");
        assert_eq!(rec.feels_like, 30);
    }

    #[test]
    fn missing_field_is_decode_error() {
        let err = parse_record(r#"{"location":"Nowhere"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let short = truncate_body(&body);

        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(150);
        let short = truncate_body(&body);

        assert!(short.ends_with("..."));
        assert!(short.len() <= 203);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // port 9 (discard) on localhost is expected to refuse connections
        let provider = HttpProvider::new(
            "http://127.0.0.1:9/weather".into(),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.user_message(), "Failed to fetch weather data");
    }
}
