use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use tracing::debug;
use weather_core::{
    Config, HttpConfig, ProviderId, Transition, ViewController, WeatherProvider,
    provider::provider_from_config,
};

use crate::output::format_view;

const DEFAULT_WATCH_SECS: u64 = 3600;
const QUIT: &str = "Quit";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the configured data source.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Provider short name, "fixture" or "http".
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Simulated latency of the fixture provider, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub latency_ms: Option<u64>,

    /// Seed for fixture selection, for reproducible output.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Make the first N fixture fetches fail.
    #[arg(long, global = true, value_name = "N")]
    pub fail_first: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider and make it the default.
    Configure {
        /// Provider short name, "fixture" or "http".
        provider: String,
    },

    /// Load once and print the current weather.
    Show {
        /// Print the record as JSON instead of the formatted view.
        #[arg(long)]
        json: bool,
    },

    /// Show the weather and prompt for refreshes.
    Interactive,

    /// Keep refreshing on a timer until interrupted.
    Watch {
        /// Refresh interval in seconds.
        #[arg(long, value_name = "SECS")]
        every: Option<u64>,
    },
}

impl SourceArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ms) = self.latency_ms {
            config.fixture.latency_ms = ms;
        }
        if let Some(seed) = self.seed {
            config.fixture.seed = Some(seed);
        }
        if let Some(n) = self.fail_first {
            config.fixture.fail_first = n;
        }
    }

    fn provider_id(&self, config: &Config) -> anyhow::Result<ProviderId> {
        match self.provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => config.default_provider_id(),
        }
    }

    /// Config from disk with flag overrides, and the provider it selects.
    fn load(&self) -> anyhow::Result<(Config, Arc<dyn WeatherProvider>)> {
        let mut config = Config::load()?;
        self.apply(&mut config);

        let id = self.provider_id(&config)?;
        let provider = provider_from_config(id, &config)?;
        debug!(%id, "provider selected");

        Ok((config, provider))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { json } => {
                let (_, provider) = self.source.load()?;
                show(provider, json).await
            }
            Command::Interactive => {
                let (_, provider) = self.source.load()?;
                interactive(provider).await
            }
            Command::Watch { every } => {
                let (config, provider) = self.source.load()?;
                let secs = every.or(config.auto_refresh_secs).unwrap_or(DEFAULT_WATCH_SECS);
                anyhow::ensure!(secs > 0, "Refresh interval must be at least one second");
                watch(provider, Duration::from_secs(secs)).await
            }
        }
    }
}

async fn show(provider: Arc<dyn WeatherProvider>, json: bool) -> anyhow::Result<()> {
    let mut controller = ViewController::mount(provider);
    controller.settle().await;

    match (json, controller.state().record()) {
        (true, Some(record)) => println!("{}", serde_json::to_string_pretty(record)?),
        _ => println!("{}", format_view(&controller.view())),
    }

    if let Some(message) = controller.state().error_message() {
        anyhow::bail!("{message}");
    }
    Ok(())
}

async fn interactive(provider: Arc<dyn WeatherProvider>) -> anyhow::Result<()> {
    let mut controller = ViewController::mount(provider);

    loop {
        println!("{}", format_view(&controller.view()));
        controller.settle().await;

        let view = controller.view();
        println!("{}", format_view(&view));

        let Some(action) = view.action() else {
            break;
        };

        match Select::new("What next?", vec![action.label(), QUIT]).prompt() {
            Ok(choice) if choice == QUIT => break,
            Ok(_) => {
                controller.refresh();
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Prompt failed"),
        }
    }

    controller.unmount();
    Ok(())
}

async fn watch(provider: Arc<dyn WeatherProvider>, every: Duration) -> anyhow::Result<()> {
    let mut controller = ViewController::mount(provider);
    controller.enable_auto_refresh(every);
    println!("{}", format_view(&controller.view()));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let transition = tokio::select! {
            res = &mut ctrl_c => {
                res.context("Failed to listen for Ctrl-C")?;
                break;
            }
            transition = controller.next_transition() => transition,
        };

        match transition {
            Some(Transition::Settled(_)) | Some(Transition::RefreshStarted) => {
                println!("{}", format_view(&controller.view()));
            }
            Some(Transition::Stale) | Some(Transition::RefreshSkipped) => {}
            None => break,
        }
    }

    controller.unmount();
    Ok(())
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    match id {
        ProviderId::Fixture => {
            config.fixture.latency_ms = CustomType::<u64>::new("Simulated latency (ms):")
                .with_default(config.fixture.latency_ms)
                .prompt()?;

            let seed = Text::new("Seed (leave empty for random):").prompt()?;
            let seed = seed.trim();
            config.fixture.seed = if seed.is_empty() {
                None
            } else {
                Some(seed.parse().with_context(|| format!("Invalid seed '{seed}'"))?)
            };
        }
        ProviderId::Http => {
            let current = config.http.as_ref().map(|h| h.url.clone()).unwrap_or_default();
            let url = Text::new("Endpoint URL:").with_initial_value(&current).prompt()?;
            anyhow::ensure!(!url.trim().is_empty(), "Endpoint URL must not be empty");

            let timeout_secs = CustomType::<u64>::new("Request timeout (s):")
                .with_default(config.http.as_ref().map_or(10, |h| h.timeout_secs))
                .prompt()?;

            config.set_http_endpoint(HttpConfig {
                url: url.trim().to_string(),
                timeout_secs,
            });
        }
    }

    config.set_default_provider(id);
    let path = config.save()?;
    println!("Saved {id} configuration to {}", path.display());

    Ok(())
}
