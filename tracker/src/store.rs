//! Latest known-good element set, shared between the refresher and the render path.

use std::sync::{Arc, PoisonError, RwLock};

use tle_protocol::{find_element_set, ParseError};
use tracing::info;

use crate::{
    elements::{ElementSet, ElementsError},
    refresher::FetchError,
    units::{Time, Timestamp},
};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Parse(#[from] ParseError<String>),
    #[error(transparent)]
    Elements(#[from] ElementsError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The element set along with the time it was fetched.
///
/// A populated record always carries its fetch time.
#[derive(Debug, Clone, Default)]
pub struct FetchRecord {
    element_set: Option<Arc<ElementSet>>,
    fetched_at: Option<Timestamp>,
}

impl FetchRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fetched(element_set: Arc<ElementSet>, fetched_at: Timestamp) -> Self {
        Self {
            element_set: Some(element_set),
            fetched_at: Some(fetched_at),
        }
    }

    pub fn element_set(&self) -> Option<&Arc<ElementSet>> {
        self.element_set.as_ref()
    }

    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }
}

#[derive(Debug)]
struct StoreInner {
    label: String,
    stale_threshold: Time,
    record: RwLock<Arc<FetchRecord>>,
}

/// Cheaply cloneable handle to the shared record.
///
/// Writers swap the whole record, readers clone the `Arc`, so nobody ever sees
/// a partially updated set.
#[derive(Debug, Clone)]
pub struct ElementSetStore {
    inner: Arc<StoreInner>,
}

impl ElementSetStore {
    pub fn new(label: impl Into<String>, stale_threshold: Time) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                label: label.into(),
                stale_threshold,
                record: RwLock::new(Arc::new(FetchRecord::empty())),
            }),
        }
    }

    /// Label of the tracked object in the source payload
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn stale_threshold(&self) -> Time {
        self.inner.stale_threshold
    }

    pub fn record(&self) -> Arc<FetchRecord> {
        // The lock only guards an Arc swap, a poisoned lock still holds a whole record
        self.inner
            .record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_elements(&self) -> Option<Arc<ElementSet>> {
        self.record().element_set().cloned()
    }

    /// True when nothing was fetched yet, or the last fetch is older than the threshold
    pub fn is_stale(&self, now: Timestamp) -> bool {
        match self.record().fetched_at() {
            None => true,
            Some(fetched_at) => now - fetched_at > self.inner.stale_threshold,
        }
    }

    /// Parse `payload` and, if it holds a usable set for the tracked label, make it current.
    ///
    /// The record is left untouched on error.
    pub fn refresh(&self, payload: &str, now: Timestamp) -> Result<Arc<ElementSet>, RefreshError> {
        let tle = find_element_set(payload, &self.inner.label)?;
        let element_set = Arc::new(ElementSet::from_tle(tle)?);
        self.replace(element_set.clone(), now);
        info!(
            name = element_set.name(),
            epoch = %element_set.epoch(),
            "Refreshed element set"
        );
        Ok(element_set)
    }

    pub fn replace(&self, element_set: Arc<ElementSet>, fetched_at: Timestamp) {
        let record = Arc::new(FetchRecord::fetched(element_set, fetched_at));
        *self
            .inner
            .record
            .write()
            .unwrap_or_else(PoisonError::into_inner) = record;
    }
}
