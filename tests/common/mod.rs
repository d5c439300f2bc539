// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dns01_providers::config::{Config, ConfigSchema, CredentialField, Credentials, Defaults};
use dns01_providers::errors::{BackendError, ProviderError};
use dns01_providers::provider::{
    Backend, CleanupPolicy, DnsProvider, ExistingRecord, TxtRecord, ZoneLookup,
};
use dns01_providers::zone::Zone;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Zones hosted by the in-memory account
pub const ACCOUNT_ZONES: &[&str] = &["example.com", "bar.example.com", "example.org"];

/// One TXT record held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoredRecord {
    pub zone: String,
    pub name: String,
    pub value: String,
    pub id: String,
}

/// A record set shared by every backend instance built on it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRecord>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current records, sorted for comparison.
    pub fn snapshot(&self) -> Vec<StoredRecord> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort();
        records
    }

    /// Seed a record that no challenge created.
    pub fn seed(&self, zone: &str, name: &str, value: &str) {
        let id = self.allocate_id();
        self.records.lock().unwrap().push(StoredRecord {
            zone: zone.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            id,
        });
    }

    fn allocate_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryCredentials {
    pub api_key: String,
}

impl Credentials for MemoryCredentials {
    const FIELDS: &'static [CredentialField] = &[CredentialField {
        key: "apiKey",
        env: "API_KEY",
        required: true,
        example: "\"key\"",
        description: "API key",
    }];
}

/// Account zone list, tracked record IDs, minimum TTL 60.
#[derive(Debug)]
pub struct MemoryBackend {
    store: Arc<MemoryStore>,
}

impl MemoryBackend {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl ConfigSchema for MemoryBackend {
    type Credentials = MemoryCredentials;
    const NAME: &'static str = "memory";
    const ENV_NAMESPACE: &'static str = "MEMORY";
    const MIN_TTL: u32 = 60;

    fn defaults() -> Defaults {
        Defaults {
            ttl: 300,
            ..Defaults::default()
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::Account;
    const CLEANUP: CleanupPolicy = CleanupPolicy::Tracked;

    fn connect(_config: &Config<MemoryCredentials>) -> Result<Self, ProviderError> {
        Ok(Self::new(MemoryStore::new()))
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        // Let concurrent challenges interleave between zone lookup and create.
        tokio::task::yield_now().await;
        Ok(ACCOUNT_ZONES.iter().map(|name| Zone::named(name)).collect())
    }

    async fn find_txt(
        &self,
        record: &TxtRecord,
    ) -> Result<Option<Vec<ExistingRecord>>, ProviderError> {
        let existing = self
            .store
            .snapshot()
            .into_iter()
            .filter(|r| r.zone == record.zone_name() && r.name == record.subdomain)
            .map(|r| ExistingRecord {
                id: Some(r.id),
                value: r.value,
            })
            .collect();
        Ok(Some(existing))
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        tokio::task::yield_now().await;
        let id = self.store.allocate_id();
        self.store.records.lock().unwrap().push(StoredRecord {
            zone: record.zone_name().to_string(),
            name: record.subdomain.clone(),
            value: record.value.clone(),
            id: id.clone(),
        });
        Ok(Some(id))
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        tokio::task::yield_now().await;
        let id = record.record_id.as_deref().unwrap_or_default();
        let mut records = self.store.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(ProviderError::backend(
                Self::NAME,
                BackendError::NotFound {
                    what: format!("record {id}"),
                },
            ));
        }
        Ok(())
    }
}

/// A provider over `store` with the given document.
pub fn memory_provider(store: &Arc<MemoryStore>, document: &str) -> DnsProvider<MemoryBackend> {
    let config = dns01_providers::config::parse_config::<MemoryBackend>(document)
        .unwrap()
        .unwrap();
    DnsProvider::with_backend(config, MemoryBackend::new(Arc::clone(store))).unwrap()
}
