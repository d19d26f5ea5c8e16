//! Pure projection of [`ViewState`] into what a front end should draw.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{ViewState, WeatherIcon};

pub const LOADING_TEXT: &str = "Loading weather data...";

/// The single control a settled view offers. Both trigger a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TryAgain,
    RefreshWeather,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::TryAgain => "Try Again",
            Action::RefreshWeather => "Refresh Weather",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub location: String,
    pub icon: WeatherIcon,
    pub temperature: i32,
    pub condition: String,
    pub feels_like: i32,
    pub humidity: i32,
    pub wind_speed: f64,
    pub visibility: f64,
    pub updated_at: DateTime<Utc>,
    /// Present only while auto-refresh is actually running.
    pub footer: Option<String>,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading { text: &'static str },
    Error { message: String, action: Action },
    Ready(ReadyView),
}

impl View {
    pub fn action(&self) -> Option<Action> {
        match self {
            View::Loading { .. } => None,
            View::Error { action, .. } => Some(*action),
            View::Ready(ready) => Some(ready.action),
        }
    }
}

pub fn render(state: &ViewState, auto_refresh: Option<Duration>) -> View {
    match state {
        ViewState::Loading => View::Loading { text: LOADING_TEXT },
        ViewState::Error { message } => View::Error {
            message: message.clone(),
            action: Action::TryAgain,
        },
        ViewState::Ready { record, fetched_at } => View::Ready(ReadyView {
            location: record.location.clone(),
            icon: WeatherIcon::for_condition(&record.condition),
            temperature: record.temperature,
            condition: record.condition.clone(),
            feels_like: record.feels_like,
            humidity: record.humidity,
            wind_speed: record.wind_speed,
            visibility: record.visibility,
            updated_at: *fetched_at,
            footer: auto_refresh.map(footer_text),
            action: Action::RefreshWeather,
        }),
    }
}

fn footer_text(every: Duration) -> String {
    if every < Duration::from_secs(1) {
        let period = match every.as_millis() {
            1 => "millisecond".to_string(),
            ms => format!("{ms} milliseconds"),
        };
        return format!("Weather data updates automatically every {period}");
    }

    let secs = every.as_secs();
    let period = match secs {
        3600 => "hour".to_string(),
        60 => "minute".to_string(),
        s if s >= 3600 && s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "second".to_string(),
        s => format!("{s} seconds"),
    };
    format!("Weather data updates automatically every {period}")
}
