use chrono::Local;
use weather_core::{ReadyView, View, WeatherIcon};

fn glyph(icon: WeatherIcon) -> &'static str {
    match icon {
        WeatherIcon::Sun => "☀",
        WeatherIcon::RainCloud => "🌧",
        WeatherIcon::SnowCloud => "🌨",
        WeatherIcon::Cloud => "☁",
    }
}

/// Render a view as plain terminal text.
pub fn format_view(view: &View) -> String {
    match view {
        View::Loading { text } => format!("⟳ {text}"),
        View::Error { message, action } => format!("✗ {message}\n  [{}]", action.label()),
        View::Ready(ready) => format_ready(ready),
    }
}

fn format_ready(v: &ReadyView) -> String {
    let mut lines = vec![
        format!("📍 {}", v.location),
        format!("{}  {}°C  {}", glyph(v.icon), v.temperature, v.condition),
        format!("   Feels like {}°C", v.feels_like),
        String::new(),
        format!("   Feels Like  {}°C", v.feels_like),
        format!("   Humidity    {}%", v.humidity),
        format!("   Wind Speed  {} km/h", v.wind_speed),
        format!("   Visibility  {} km", v.visibility),
        String::new(),
        format!(
            "   Updated at {}",
            v.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        format!("  [{}]", v.action.label()),
    ];

    if let Some(footer) = &v.footer {
        lines.push(format!("  {footer}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weather_core::{Action, ViewState, provider::fixture::fixture_set, view::render};

    #[test]
    fn ready_output_contains_every_value() {
        for record in fixture_set() {
            let state = ViewState::Ready {
                record: record.clone(),
                fetched_at: Utc::now(),
            };
            let text = format_view(&render(&state, None));

            assert!(text.contains(&record.location));
            assert!(text.contains(&format!("{}°C  {}", record.temperature, record.condition)));
            assert!(text.contains(&format!("Feels like {}°C", record.feels_like)));
            assert!(text.contains(&format!("{}%", record.humidity)));
            assert!(text.contains(&format!("{} km/h", record.wind_speed)));
            assert!(text.contains(&format!("{} km", record.visibility)));
            assert!(text.contains("[Refresh Weather]"));
        }
    }

    #[test]
    fn whole_numbers_print_without_decimals() {
        let state = ViewState::Ready {
            record: fixture_set().remove(0),
            fetched_at: Utc::now(),
        };
        let text = format_view(&render(&state, None));

        assert!(text.contains("Wind Speed  12 km/h"));
        assert!(text.contains("Visibility  10 km"));
    }

    #[test]
    fn error_output_has_message_and_retry() {
        let view = View::Error {
            message: "Failed to fetch weather data".into(),
            action: Action::TryAgain,
        };

        assert_eq!(format_view(&view), "✗ Failed to fetch weather data\n  [Try Again]");
    }

    #[test]
    fn loading_output_has_no_control() {
        let text = format_view(&render(&ViewState::Loading, None));

        assert_eq!(text, "⟳ Loading weather data...");
    }

    #[test]
    fn footer_is_printed_when_present() {
        let state = ViewState::Ready {
            record: fixture_set().remove(2),
            fetched_at: Utc::now(),
        };
        let text = format_view(&render(&state, Some(std::time::Duration::from_secs(3600))));

        assert!(text.ends_with("Weather data updates automatically every hour"));
        assert!(text.contains("☀"));
    }
}
