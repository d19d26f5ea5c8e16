use std::{
    fmt::Debug,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{FetchError, WeatherRecord, config::FixtureConfig};

use super::WeatherProvider;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

/// The four sample locations served by [`FixtureProvider`].
pub fn fixture_set() -> Vec<WeatherRecord> {
    vec![
        WeatherRecord::new("New York, NY", 22, "Partly Cloudy", 65, 12.0, 10.0, 25),
        WeatherRecord::new("London, UK", 18, "Rainy", 80, 15.0, 8.0, 16),
        WeatherRecord::new("Tokyo, JP", 28, "Sunny", 55, 8.0, 12.0, 30),
        WeatherRecord::new("Sydney, AU", 24, "Cloudy", 70, 10.0, 15.0, 26),
    ]
}

/// Picks an index in `0..len`. Callers guarantee `len > 0`.
pub trait IndexSource: Send + Sync + Debug {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform, unseeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIndex;

impl IndexSource for RandomIndex {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Uniform, reproducible for a given seed.
#[derive(Debug)]
pub struct SeededIndex {
    rng: Mutex<StdRng>,
}

impl SeededIndex {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl IndexSource for SeededIndex {
    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..len)
    }
}

/// Serves a random record from a fixed in-memory set after a simulated delay.
#[derive(Debug)]
pub struct FixtureProvider {
    records: Vec<WeatherRecord>,
    index: Box<dyn IndexSource>,
    latency: Duration,
    failures_left: AtomicU32,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self {
            records: fixture_set(),
            index: Box::new(RandomIndex),
            latency: DEFAULT_LATENCY,
            failures_left: AtomicU32::new(0),
        }
    }

    pub fn from_config(cfg: &FixtureConfig) -> Self {
        let provider = Self::new()
            .with_latency(Duration::from_millis(cfg.latency_ms))
            .failing_first(cfg.fail_first);

        match cfg.seed {
            Some(seed) => provider.with_index_source(SeededIndex::new(seed)),
            None => provider,
        }
    }

    pub fn with_records(mut self, records: Vec<WeatherRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn with_index_source(mut self, index: impl IndexSource + 'static) -> Self {
        self.index = Box::new(index);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `n` fetches fail with [`FetchError::Simulated`].
    pub fn failing_first(self, n: u32) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for FixtureProvider {
    async fn fetch(&self) -> Result<WeatherRecord, FetchError> {
        tokio::time::sleep(self.latency).await;

        let forced = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Err(FetchError::Simulated);
        }

        if self.records.is_empty() {
            return Err(FetchError::NoRecords);
        }

        let len = self.records.len();
        let idx = self.index.pick(len).min(len - 1);
        debug!(idx, len, "picked fixture record");

        Ok(self.records[idx].clone())
    }
}

/// Hands out a fixed sequence of indices, then repeats the last one.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ScriptedIndex {
    picks: Mutex<std::collections::VecDeque<usize>>,
    last: Mutex<usize>,
}

#[cfg(test)]
impl ScriptedIndex {
    pub(crate) fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: Mutex::new(picks.into_iter().collect()),
            last: Mutex::new(0),
        }
    }
}

#[cfg(test)]
impl IndexSource for ScriptedIndex {
    fn pick(&self, _len: usize) -> usize {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.picks.lock().unwrap().pop_front() {
            *last = next;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_set_has_four_known_locations() {
        let set = fixture_set();
        let names: Vec<_> = set.iter().map(|r| r.location.as_str()).collect();

        assert_eq!(names, ["New York, NY", "London, UK", "Tokyo, JP", "Sydney, AU"]);
        assert_eq!(set[2].condition, "Sunny");
        assert_eq!(set[1].feels_like, 16);
    }

    #[test]
    fn seeded_index_is_reproducible_and_in_range() {
        let a = SeededIndex::new(42);
        let b = SeededIndex::new(42);

        let left: Vec<_> = (0..32).map(|_| a.pick(4)).collect();
        let right: Vec<_> = (0..32).map(|_| b.pick(4)).collect();

        assert_eq!(left, right);
        assert!(left.iter().all(|i| *i < 4));
    }

    #[test]
    fn random_index_stays_in_range() {
        for _ in 0..200 {
            assert!(RandomIndex.pick(4) < 4);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_returns_member_of_fixture_set() {
        let provider = FixtureProvider::new();
        let rec = provider.fetch().await.expect("fixture fetch cannot fail");

        assert!(fixture_set().contains(&rec));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_uses_injected_index() {
        let provider = FixtureProvider::new().with_index_source(ScriptedIndex::new([3, 0]));

        assert_eq!(provider.fetch().await.unwrap().location, "Sydney, AU");
        assert_eq!(provider.fetch().await.unwrap().location, "New York, NY");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_for_latency() {
        let provider = FixtureProvider::new().with_latency(Duration::from_millis(1000));
        let start = tokio::time::Instant::now();

        provider.fetch().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_first_fails_then_recovers() {
        let provider = FixtureProvider::new().failing_first(2);

        assert!(matches!(provider.fetch().await, Err(FetchError::Simulated)));
        assert!(matches!(provider.fetch().await, Err(FetchError::Simulated)));
        assert!(provider.fetch().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_record_set_is_a_fetch_error() {
        let provider = FixtureProvider::new().with_records(Vec::new());

        assert!(matches!(provider.fetch().await, Err(FetchError::NoRecords)));
    }

    #[test]
    fn from_config_applies_latency_and_seed() {
        let cfg = FixtureConfig {
            latency_ms: 250,
            seed: Some(7),
            fail_first: 0,
        };
        let provider = FixtureProvider::from_config(&cfg);

        assert_eq!(provider.latency(), Duration::from_millis(250));
        assert!(format!("{provider:?}").contains("SeededIndex"));
    }
}
