//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The weather record model and the built-in fixture set
//! - Abstraction over weather providers (fixture, HTTP)
//! - The view controller state machine and its pure view projection
//! - Configuration handling
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod view;

pub use config::{Config, FixtureConfig, HttpConfig};
pub use controller::{Phase, Transition, ViewController, ViewState};
pub use error::{FETCH_FAILURE_MESSAGE, FetchError};
pub use model::{WeatherIcon, WeatherRecord};
pub use provider::{ProviderId, WeatherProvider};
pub use view::{Action, ReadyView, View};
