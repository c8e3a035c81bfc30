pub mod poller;
pub mod ticker;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{Mutex, watch},
    time::timeout,
};

use crate::{
    api::solax,
    error::FetchError,
    prelude::*,
    telemetry::{FetchStatus, Observation, Snapshot},
};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce a fresh snapshot for a device.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, serial_number: &str) -> Result<Snapshot, FetchError>;
}

#[async_trait]
impl Fetch for solax::Api {
    async fn fetch(&self, serial_number: &str) -> Result<Snapshot, FetchError> {
        self.get_realtime_info(serial_number).await
    }
}

/// Read-only view of the coordinator state, as seen by the entities.
pub trait Source: Send + Sync {
    fn observe(&self) -> Arc<Observation>;
}

/// Owns fetching and caching for a single device.
///
/// The coordinator is passive: it performs exactly one fetch per [`Coordinator::refresh`]
/// and never schedules anything by itself.
pub struct Coordinator<F = solax::Api> {
    fetcher: F,
    serial_number: String,
    timeout: Duration,
    observation: watch::Sender<Arc<Observation>>,

    /// Number of completed fetches, bumped while holding [`Coordinator::last_outcome`].
    generation: AtomicU64,

    /// Held for the whole duration of a fetch.
    last_outcome: Mutex<Option<Result<Arc<Snapshot>, FetchError>>>,
}

#[bon::bon]
impl<F: Fetch> Coordinator<F> {
    #[builder]
    pub fn new(
        fetcher: F,
        #[builder(into)] serial_number: String,
        #[builder(default = DEFAULT_FETCH_TIMEOUT)] timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            serial_number,
            timeout,
            observation: watch::Sender::new(Arc::new(Observation::default())),
            generation: AtomicU64::new(0),
            last_outcome: Mutex::new(None),
        }
    }

    /// Fetch the device telemetry and publish the outcome.
    ///
    /// When another refresh is already in flight, this one waits for it and
    /// returns its outcome instead of calling the cloud again.
    #[instrument(skip_all, fields(serial_number = %self.serial_number))]
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, FetchError> {
        let seen_generation = self.generation.load(Ordering::Acquire);
        let mut last_outcome = self.last_outcome.lock().await;
        if self.generation.load(Ordering::Acquire) != seen_generation
            && let Some(outcome) = last_outcome.as_ref()
        {
            debug!("coalesced with the refresh that was in flight");
            return outcome.clone();
        }

        let outcome = self.fetch_once().await;
        *last_outcome = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn fetch_once(&self) -> Result<Arc<Snapshot>, FetchError> {
        debug!(timeout = ?self.timeout, "refreshing…");
        let outcome = timeout(self.timeout, self.fetcher.fetch(&self.serial_number))
            .await
            .unwrap_or(Err(FetchError::Timeout(self.timeout)));
        match outcome {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                info!(n_fields = snapshot.len(), "refreshed");
                let observation = Observation::succeeded(Arc::clone(&snapshot), Utc::now());
                self.observation.send_replace(Arc::new(observation));
                Ok(snapshot)
            }
            Err(error) => {
                warn!("refresh failed: {error}");
                self.observation.send_modify(|current| *current = Arc::new(current.failed(&error)));
                Err(error)
            }
        }
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.observation.borrow().snapshot)
    }

    pub fn current_status(&self) -> FetchStatus {
        self.observation.borrow().status.clone()
    }
}

impl<F: Fetch> Source for Coordinator<F> {
    fn observe(&self) -> Arc<Observation> {
        Arc::clone(&self.observation.borrow())
    }
}

#[cfg(test)]
pub mod tests {
    use std::{
        collections::VecDeque,
        sync::{Mutex as StdMutex, atomic::AtomicUsize},
    };

    use serde_json::{Value, json};
    use tokio::{
        sync::Semaphore,
        task::yield_now,
        time::{Instant, sleep},
    };

    use super::*;

    pub fn snapshot(value: Value) -> Snapshot {
        Snapshot::from(value.as_object().cloned().unwrap_or_default())
    }

    /// Replays the scripted outcomes, one per call.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        outcomes: StdMutex<VecDeque<Result<Snapshot, FetchError>>>,
        pub n_calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        pub fn new(outcomes: impl IntoIterator<Item = Result<Snapshot, FetchError>>) -> Self {
            Self { outcomes: StdMutex::new(outcomes.into_iter().collect()), ..Self::default() }
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetcher {
        async fn fetch(&self, serial_number: &str) -> Result<Snapshot, FetchError> {
            assert_eq!(serial_number, "XYZ123");
            self.n_calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())))
        }
    }

    /// Blocks every fetch until a permit is released, tracking the concurrency.
    struct GatedFetcher {
        gate: Semaphore,
        n_calls: AtomicUsize,
        n_in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl GatedFetcher {
        fn new() -> Self {
            Self {
                gate: Semaphore::new(0),
                n_calls: AtomicUsize::new(0),
                n_in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetch for GatedFetcher {
        async fn fetch(&self, _serial_number: &str) -> Result<Snapshot, FetchError> {
            self.n_calls.fetch_add(1, Ordering::SeqCst);
            let n_in_flight = self.n_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(n_in_flight, Ordering::SeqCst);
            self.gate.acquire().await.unwrap().forget();
            self.n_in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(snapshot(json!({ "acpower": 42 })))
        }
    }

    struct HangingFetcher;

    #[async_trait]
    impl Fetch for HangingFetcher {
        async fn fetch(&self, _serial_number: &str) -> Result<Snapshot, FetchError> {
            sleep(Duration::from_secs(3600)).await;
            Ok(Snapshot::default())
        }
    }

    fn coordinator<F: Fetch>(fetcher: F) -> Coordinator<F> {
        Coordinator::builder().fetcher(fetcher).serial_number("XYZ123").build()
    }

    #[tokio::test]
    async fn initial_state() {
        let coordinator = coordinator(ScriptedFetcher::default());
        assert!(coordinator.current_snapshot().is_empty());
        assert_eq!(coordinator.current_status(), FetchStatus::Uninitialized);
        assert!(coordinator.observe().last_updated_at.is_none());
    }

    #[tokio::test]
    async fn success_then_rejection_keeps_stale_snapshot() -> Result<(), FetchError> {
        let first = snapshot(json!({ "acpower": 1500, "soc": 80 }));
        let coordinator = coordinator(ScriptedFetcher::new([
            Ok(first.clone()),
            Err(FetchError::ApiRejected("SN not found".into())),
        ]));

        let refreshed = coordinator.refresh().await?;
        assert_eq!(*refreshed, first);
        assert_eq!(*coordinator.current_snapshot(), first);
        assert_eq!(coordinator.current_status(), FetchStatus::Ok);
        let last_updated_at = coordinator.observe().last_updated_at;
        assert!(last_updated_at.is_some());

        let error = coordinator.refresh().await.unwrap_err();
        assert_eq!(error, FetchError::ApiRejected("SN not found".into()));
        assert_eq!(*coordinator.current_snapshot(), first);
        assert_eq!(coordinator.current_status(), FetchStatus::Error("SN not found".into()));
        assert_eq!(coordinator.observe().last_updated_at, last_updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn success_replaces_snapshot_wholesale() -> Result<(), FetchError> {
        let coordinator = coordinator(ScriptedFetcher::new([
            Ok(snapshot(json!({ "acpower": 1500, "soc": 80 }))),
            Ok(snapshot(json!({ "acpower": 900 }))),
        ]));
        coordinator.refresh().await?;
        coordinator.refresh().await?;
        let current = coordinator.current_snapshot();
        assert_eq!(current["acpower"], 900);
        assert!(!current.contains_key("soc"));
        Ok(())
    }

    #[tokio::test]
    async fn transport_error_recorded() {
        let coordinator =
            coordinator(ScriptedFetcher::new([Err(FetchError::Transport("dns failure".into()))]));
        assert!(coordinator.refresh().await.is_err());
        assert_eq!(
            coordinator.current_status(),
            FetchStatus::Error("transport error: dns failure".into()),
        );
        assert!(coordinator.current_snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_fetch_times_out() {
        let coordinator = coordinator(HangingFetcher);
        let started_at = Instant::now();
        let error = coordinator.refresh().await.unwrap_err();
        let elapsed = started_at.elapsed();
        assert!(elapsed >= DEFAULT_FETCH_TIMEOUT, "{elapsed:?}");
        assert!(elapsed < DEFAULT_FETCH_TIMEOUT + Duration::from_secs(1), "{elapsed:?}");
        assert_eq!(error, FetchError::Timeout(DEFAULT_FETCH_TIMEOUT));
        let FetchStatus::Error(message) = coordinator.current_status() else {
            panic!("status must be an error");
        };
        assert!(message.contains("timed out"), "{message}");
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_fetch() {
        let coordinator = coordinator(GatedFetcher::new());
        let (first, second, ()) = tokio::join!(coordinator.refresh(), coordinator.refresh(), async {
            yield_now().await;
            coordinator.fetcher.gate.add_permits(1);
        });
        assert_eq!(coordinator.fetcher.n_calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.fetcher.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(coordinator.current_status(), FetchStatus::Ok);
    }

    #[tokio::test]
    async fn sequential_refreshes_are_not_coalesced() {
        let coordinator = coordinator(GatedFetcher::new());
        coordinator.fetcher.gate.add_permits(2);
        assert!(coordinator.refresh().await.is_ok());
        assert!(coordinator.refresh().await.is_ok());
        assert_eq!(coordinator.fetcher.n_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn observation_is_published_as_a_whole() -> Result<(), FetchError> {
        let coordinator = coordinator(ScriptedFetcher::new([
            Ok(snapshot(json!({ "acpower": 1500 }))),
            Err(FetchError::ApiRejected("SN not found".into())),
        ]));

        coordinator.refresh().await?;
        let succeeded = coordinator.observe();
        assert_eq!(succeeded.status, FetchStatus::Ok);
        assert_eq!(succeeded.snapshot["acpower"], 1500);

        let _ = coordinator.refresh().await;
        let failed = coordinator.observe();
        assert_eq!(failed.status, FetchStatus::Error("SN not found".into()));
        assert!(Arc::ptr_eq(&failed.snapshot, &succeeded.snapshot));

        // Earlier observations are never mutated in place:
        assert_eq!(succeeded.status, FetchStatus::Ok);
        Ok(())
    }
}
