//! The view controller: owns the view state and drives loads through a
//! [`WeatherProvider`].
//!
//! Fetches run as spawned tasks and report back over a channel. The owner of
//! the controller applies them by awaiting [`ViewController::next_transition`],
//! so the state itself is only ever touched through `&mut self`.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{FetchError, WeatherProvider, WeatherRecord, view::View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Error,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error { message: String },
    Ready {
        record: WeatherRecord,
        fetched_at: DateTime<Utc>,
    },
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        match self {
            ViewState::Loading => Phase::Loading,
            ViewState::Error { .. } => Phase::Error,
            ViewState::Ready { .. } => Phase::Ready,
        }
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            ViewState::Ready { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Outcome of processing one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A load finished and its result is now the view state.
    Settled(Phase),
    /// A completion from a superseded load was dropped.
    Stale,
    /// The auto-refresh timer started a refresh.
    RefreshStarted,
    /// The auto-refresh timer fired while a load was in flight.
    RefreshSkipped,
}

/// Shortest interval accepted by [`ViewController::enable_auto_refresh`].
pub const MIN_AUTO_REFRESH: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Signal {
    Completed {
        generation: u64,
        result: Result<WeatherRecord, FetchError>,
    },
    Scheduled,
}

/// Aborts the wrapped task when the owner goes away.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug)]
pub struct ViewController {
    provider: Arc<dyn WeatherProvider>,
    state: ViewState,
    generation: u64,
    mounted: bool,
    initial_load_started: bool,
    pending: Option<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
    auto_refresh: Option<Duration>,
    tx: mpsc::UnboundedSender<Signal>,
    rx: mpsc::UnboundedReceiver<Signal>,
}

impl ViewController {
    /// Callers go through [`ViewController::mount`]; nothing is in flight yet.
    fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            provider,
            state: ViewState::Loading,
            generation: 0,
            mounted: true,
            initial_load_started: false,
            pending: None,
            timer: None,
            auto_refresh: None,
            tx,
            rx,
        }
    }

    /// Create the controller and kick off the initial load.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(provider: Arc<dyn WeatherProvider>) -> Self {
        let mut controller = Self::new(provider);
        controller.initial_load();
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn auto_refresh(&self) -> Option<Duration> {
        self.auto_refresh
    }

    pub fn view(&self) -> View {
        crate::view::render(&self.state, self.auto_refresh)
    }

    /// Runs once per mount; later calls are ignored.
    pub fn initial_load(&mut self) {
        if !self.mounted || self.initial_load_started {
            debug!("initial load already started, ignoring");
            return;
        }
        self.initial_load_started = true;
        self.start_load("initial");
    }

    /// User-triggered reload. Refused while a load is in flight or after unmount.
    pub fn refresh(&mut self) -> bool {
        if !self.mounted {
            debug!("refresh after unmount ignored");
            return false;
        }
        if self.phase() == Phase::Loading {
            debug!(generation = self.generation, "refresh ignored while loading");
            return false;
        }
        self.start_load("refresh");
        true
    }

    /// Fire a refresh every `every`, starting one interval from now.
    ///
    /// Intervals below [`MIN_AUTO_REFRESH`] are raised to it.
    pub fn enable_auto_refresh(&mut self, every: Duration) {
        self.disable_auto_refresh();
        if !self.mounted {
            return;
        }

        let every = if every < MIN_AUTO_REFRESH {
            warn!(
                requested_ms = every.as_millis() as u64,
                "auto-refresh interval too short, using minimum"
            );
            MIN_AUTO_REFRESH
        } else {
            every
        };

        let tx = self.tx.clone();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(Signal::Scheduled).is_err() {
                    break;
                }
            }
        }));
        self.auto_refresh = Some(every);
        info!(every_secs = every.as_secs(), "auto-refresh enabled");
    }

    pub fn disable_auto_refresh(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.auto_refresh = None;
    }

    /// Wait for the next signal and apply it.
    ///
    /// Returns `None` once the controller is unmounted.
    pub async fn next_transition(&mut self) -> Option<Transition> {
        if !self.mounted {
            return None;
        }
        let signal = self.rx.recv().await?;
        Some(self.handle(signal))
    }

    /// Process signals until the state leaves `Loading`.
    pub async fn settle(&mut self) -> &ViewState {
        while self.phase() == Phase::Loading {
            if self.next_transition().await.is_none() {
                break;
            }
        }
        &self.state
    }

    /// Tear down: cancel in-flight work and stop accepting completions.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.disable_auto_refresh();
        info!(generation = self.generation, "view controller unmounted");
    }

    fn start_load(&mut self, reason: &'static str) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        self.generation += 1;
        let generation = self.generation;
        self.state = ViewState::Loading;

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            // inner task so a panicking provider still reports back
            let mut fetch = AbortOnDrop(tokio::spawn(async move { provider.fetch().await }));
            let result = match (&mut fetch.0).await {
                Ok(result) => result,
                Err(err) if err.is_panic() => Err(FetchError::Panicked),
                Err(_) => return,
            };
            // receiver gone means the controller was dropped
            let _ = tx.send(Signal::Completed { generation, result });
        }));

        info!(generation, reason, "weather load started");
    }

    fn handle(&mut self, signal: Signal) -> Transition {
        match signal {
            Signal::Completed { generation, result } => self.apply(generation, result),
            Signal::Scheduled => {
                if self.refresh() {
                    Transition::RefreshStarted
                } else {
                    Transition::RefreshSkipped
                }
            }
        }
    }

    fn apply(&mut self, generation: u64, result: Result<WeatherRecord, FetchError>) -> Transition {
        if !self.mounted || generation != self.generation {
            warn!(generation, current = self.generation, "discarding stale weather completion");
            return Transition::Stale;
        }
        self.pending = None;

        self.state = match result {
            Ok(record) => {
                info!(generation, location = %record.location, "weather loaded");
                ViewState::Ready {
                    record,
                    fetched_at: Utc::now(),
                }
            }
            Err(err) => {
                warn!(generation, error = %err, "weather fetch failed");
                ViewState::Error {
                    message: err.user_message().to_string(),
                }
            }
        };

        Transition::Settled(self.phase())
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        self.unmount();
    }
}
