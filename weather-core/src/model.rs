use serde::{Deserialize, Serialize};

/// One snapshot of current conditions for a place.
///
/// Field names follow the JSON payload served by weather endpoints
/// (`windSpeed`, `feelsLike`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub location: String,
    /// Degrees Celsius.
    pub temperature: i32,
    pub condition: String,
    /// Percent.
    pub humidity: i32,
    /// km/h.
    pub wind_speed: f64,
    /// km.
    pub visibility: f64,
    /// Degrees Celsius.
    pub feels_like: i32,
}

impl WeatherRecord {
    pub fn new(
        location: impl Into<String>,
        temperature: i32,
        condition: impl Into<String>,
        humidity: i32,
        wind_speed: f64,
        visibility: f64,
        feels_like: i32,
    ) -> Self {
        Self {
            location: location.into(),
            temperature,
            condition: condition.into(),
            humidity,
            wind_speed,
            visibility,
            feels_like,
        }
    }
}

/// Icon shown next to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    Sun,
    RainCloud,
    SnowCloud,
    Cloud,
}

impl WeatherIcon {
    /// Case-insensitive exact match; anything unrecognised gets the plain cloud.
    pub fn for_condition(condition: &str) -> Self {
        match condition.to_lowercase().as_str() {
            "sunny" => WeatherIcon::Sun,
            "rainy" => WeatherIcon::RainCloud,
            "snowy" => WeatherIcon::SnowCloud,
            "cloudy" | "partly cloudy" => WeatherIcon::Cloud,
            _ => WeatherIcon::Cloud,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "sun",
            WeatherIcon::RainCloud => "rain-cloud",
            WeatherIcon::SnowCloud => "snow-cloud",
            WeatherIcon::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
