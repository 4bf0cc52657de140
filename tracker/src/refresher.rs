//! Periodic background refresh of the element-set store.
//!
//! The refresher owns a dedicated thread running a current-thread tokio runtime,
//! so all network I/O stays off the render loop.

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    elements::ElementSet,
    store::{ElementSetStore, RefreshError},
    units::Timestamp,
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Element set request failed. {0}")]
    Http(#[from] reqwest::Error),
    #[error("Element set source responded with HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("Element set request timed out after {0:?}")]
    Timeout(Duration),
}

/// Where the raw element-set text comes from
#[async_trait]
pub trait ElementSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Fetches the element-set payload over HTTP(S)
#[derive(Debug)]
pub struct HttpElementSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpElementSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ElementSource for HttpElementSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "Fetching element set");
        let resp = self.client.get(self.url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    /// The store was fresh, nothing fetched
    Fresh,
    Refreshed(Arc<ElementSet>),
    /// The previous record was kept
    Failed(RefreshError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefresherConfig {
    /// How often the store staleness is checked
    pub period: Duration,
    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

pub struct Refresher<S> {
    store: ElementSetStore,
    source: S,
    cfg: RefresherConfig,
}

impl<S: ElementSource> Refresher<S> {
    pub fn new(store: ElementSetStore, source: S, cfg: RefresherConfig) -> Self {
        Self { store, source, cfg }
    }

    pub fn store(&self) -> &ElementSetStore {
        &self.store
    }

    /// One staleness check, and if needed one fetch and refresh
    pub async fn refresh_once(&self, now: Timestamp) -> RefreshOutcome {
        if !self.store.is_stale(now) {
            return RefreshOutcome::Fresh;
        }

        let payload =
            match tokio::time::timeout(self.cfg.fetch_timeout, self.source.fetch()).await {
                Ok(Ok(payload)) => payload,
                Ok(Err(e)) => return self.failed(e.into()),
                Err(_elapsed) => {
                    return self.failed(FetchError::Timeout(self.cfg.fetch_timeout).into())
                }
            };

        match self.store.refresh(&payload, now) {
            Ok(set) => RefreshOutcome::Refreshed(set),
            Err(e) => self.failed(e),
        }
    }

    fn failed(&self, err: RefreshError) -> RefreshOutcome {
        match self.store.current_elements() {
            Some(set) => warn!(
                err = %err,
                name = set.name(),
                epoch = %set.epoch(),
                "Element set refresh failed, keeping the last known-good set"
            ),
            None => warn!(
                err = %err,
                label = self.store.label(),
                "Element set refresh failed, no element set loaded yet"
            ),
        }
        RefreshOutcome::Failed(err)
    }

    /// Refresh on every period tick until cancelled, the first tick is immediate
    pub async fn run(&self, c_tok: CancellationToken) {
        let mut interval = tokio::time::interval(self.cfg.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = c_tok.cancelled() => break,
                _ = interval.tick() => {
                    // A pending fetch is dropped on cancellation
                    tokio::select! {
                        _ = c_tok.cancelled() => break,
                        outcome = self.refresh_once(Timestamp::now()) => {
                            debug!(?outcome, "Refresh cycle complete");
                        }
                    }
                }
            }
        }

        debug!("Element set refresher stopped");
    }
}

impl<S: ElementSource + 'static> Refresher<S> {
    /// Run the refresher on its own thread
    pub fn spawn(self) -> std::io::Result<RefresherHandle> {
        let c_tok = CancellationToken::new();
        let task_tok = c_tok.clone();
        let period = self.cfg.period;
        let join = std::thread::Builder::new()
            .name("element-refresher".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!(err = %e, "Failed to start the refresher runtime");
                        return;
                    }
                };
                rt.block_on(self.run(task_tok));
            })?;

        info!(
            period = %humantime::format_duration(period),
            "Started element set refresher"
        );

        Ok(RefresherHandle {
            c_tok,
            join: Some(join),
        })
    }
}

/// Stops the refresher thread when stopped or dropped
#[derive(Debug)]
pub struct RefresherHandle {
    c_tok: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl RefresherHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.c_tok.cancel();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("Element set refresher thread panicked");
            }
        }
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
