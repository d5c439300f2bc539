// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Vultr DNS backend.
//!
//! Zones are discovered from the account's domain list (cursor-paginated) and
//! records are addressed by ID inside a zone. Cleanup deletes every TXT record
//! at the challenge name that carries the challenge value, attempting all of
//! them even when one deletion fails.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{deserialize_string, Config, ConfigSchema, CredentialField, Credentials};
use crate::constants::TXT_RECORD_TYPE;
use crate::errors::ProviderError;
use crate::http::{ApiClient, Auth};
use crate::provider::{
    delete_each, Backend, BackendResultExt, ExistingRecord, TxtRecord, ZoneLookup,
};
use crate::zone::Zone;

use super::api_client;

/// Production API endpoint
pub const VULTR_API_URL: &str = "https://api.vultr.com/v2";

/// Page size for list calls
const PER_PAGE: &str = "25";

/// Vultr personal access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VultrCredentials {
    #[serde(deserialize_with = "deserialize_string")]
    pub api_key: String,
}

impl Credentials for VultrCredentials {
    const FIELDS: &'static [CredentialField] = &[CredentialField {
        key: "apiKey",
        env: "API_KEY",
        required: true,
        example: "\"your-api-key\"",
        description: "Vultr API key",
    }];
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    next: String,
}

#[derive(Debug, Deserialize)]
struct DomainList {
    #[serde(default)]
    domains: Vec<VultrDomain>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct VultrDomain {
    domain: String,
}

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<VultrRecord>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
struct VultrRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[serde(default)]
    data: String,
}

impl VultrRecord {
    /// Vultr returns TXT data wrapped in double quotes.
    fn value(&self) -> &str {
        self.data.trim_matches('"')
    }
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    record: VultrRecord,
}

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    data: String,
    ttl: u32,
    priority: u32,
}

/// Vultr backend client.
#[derive(Debug)]
pub struct Vultr {
    client: ApiClient,
}

impl Vultr {
    /// Build a client against `base` instead of the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &Config<VultrCredentials>,
        base: &str,
    ) -> Result<Self, ProviderError> {
        let auth = Auth::Bearer(config.credentials.api_key.clone());
        Ok(Self {
            client: api_client(Self::NAME, base, auth, config.http_timeout)?,
        })
    }

    fn page_query(cursor: &str) -> Vec<(&'static str, String)> {
        let mut query = vec![("per_page", PER_PAGE.to_string())];
        if !cursor.is_empty() {
            query.push(("cursor", cursor.to_string()));
        }
        query
    }

    /// TXT records at the challenge name, across all pages.
    async fn matching_records(
        &self,
        record: &TxtRecord,
    ) -> Result<Vec<VultrRecord>, ProviderError> {
        let path = format!("/domains/{}/records", record.zone_name());
        let mut cursor = String::new();
        let mut matches = Vec::new();

        loop {
            let page: RecordList = self
                .client
                .get_json(&path, &Self::page_query(&cursor))
                .await
                .for_provider(Self::NAME)?;

            matches.extend(page.records.into_iter().filter(|r| {
                r.record_type == TXT_RECORD_TYPE && r.name.eq_ignore_ascii_case(&record.subdomain)
            }));

            if page.meta.links.next.is_empty() {
                break;
            }
            cursor = page.meta.links.next;
        }

        Ok(matches)
    }
}

impl ConfigSchema for Vultr {
    type Credentials = VultrCredentials;
    const NAME: &'static str = "vultr";
    const ENV_NAMESPACE: &'static str = "VULTR";
}

#[async_trait]
impl Backend for Vultr {
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::Account;

    fn connect(config: &Config<VultrCredentials>) -> Result<Self, ProviderError> {
        Self::with_base_url(config, VULTR_API_URL)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        let mut cursor = String::new();
        let mut zones = Vec::new();

        loop {
            let page: DomainList = self
                .client
                .get_json("/domains", &Self::page_query(&cursor))
                .await
                .for_provider(Self::NAME)?;

            zones.extend(page.domains.iter().map(|d| Zone::named(&d.domain)));

            if page.meta.links.next.is_empty() {
                break;
            }
            cursor = page.meta.links.next;
        }

        debug!(provider = Self::NAME, zones = zones.len(), "Listed account zones");
        Ok(zones)
    }

    async fn find_txt(
        &self,
        record: &TxtRecord,
    ) -> Result<Option<Vec<ExistingRecord>>, ProviderError> {
        let existing = self
            .matching_records(record)
            .await?
            .into_iter()
            .map(|r| ExistingRecord {
                value: r.value().to_string(),
                id: Some(r.id),
            })
            .collect();
        Ok(Some(existing))
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        let request = CreateRecord {
            name: &record.subdomain,
            record_type: TXT_RECORD_TYPE,
            data: format!("\"{}\"", record.value),
            ttl: record.ttl,
            priority: 0,
        };

        let created: RecordEnvelope = self
            .client
            .send_json(
                Method::POST,
                &format!("/domains/{}/records", record.zone_name()),
                &request,
            )
            .await
            .for_provider(Self::NAME)?;

        Ok(Some(created.record.id))
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        let stale: Vec<VultrRecord> = self
            .matching_records(record)
            .await?
            .into_iter()
            .filter(|r| r.value() == record.value)
            .collect();

        if stale.is_empty() {
            debug!(
                provider = Self::NAME,
                fqdn = %record.fqdn,
                "No matching TXT record to delete"
            );
            return Ok(());
        }

        let zone = record.zone_name();
        delete_each(Self::NAME, stale, move |r| async move {
            self.client
                .delete(&format!("/domains/{zone}/records/{}", r.id))
                .await
                .map(|_| ())
                .for_provider(Self::NAME)
        })
        .await
    }
}

#[cfg(test)]
#[path = "vultr_tests.rs"]
mod vultr_tests;
