// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record lifecycle tracking between `present` and `cleanup`.
//!
//! Each provider instance owns one [`LifecycleTracker`]. `present` inserts the
//! record it created under the ACME token; `cleanup` takes it back out. The
//! token is the only safe key: one instance may serve several challenges for the
//! same domain at once (a multi-SAN certificate with `example.com` and
//! `*.example.com` shares one challenge name).
//!
//! The map sits behind a `std::sync::Mutex`. Every method locks, copies data in
//! or out, and unlocks before returning, so the lock is never held across a
//! backend call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What `present` created for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRecord {
    /// Challenge record name, trailing-dot form
    pub fqdn: String,
    /// Authoritative zone the record was created in
    pub zone: String,
    /// Backend identifier of the zone, if the API uses one
    pub zone_id: Option<String>,
    /// Record name relative to the zone
    pub subdomain: String,
    /// TXT content
    pub value: String,
    /// Backend identifier of the record, if the API returned one
    pub record_id: Option<String>,
}

/// Instance-scoped `token -> TrackedRecord` map.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    records: Mutex<HashMap<String, TrackedRecord>>,
}

impl LifecycleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated: every
    // critical section is a single HashMap call.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, TrackedRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `record` under `token`, returning the entry it replaced.
    pub fn insert(&self, token: &str, record: TrackedRecord) -> Option<TrackedRecord> {
        self.lock().insert(token.to_string(), record)
    }

    /// Remove and return the entry for `token`.
    pub fn take(&self, token: &str) -> Option<TrackedRecord> {
        self.lock().remove(token)
    }

    /// Copy of the entry for `token`.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<TrackedRecord> {
        self.lock().get(token).cloned()
    }

    /// Whether `token` is tracked.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.lock().contains_key(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
