// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Linode (Akamai) DNS backend.
//!
//! Linode addresses zones and records by numeric ID. The zone ID comes from the
//! account's paginated domain list and the record ID returned on creation is
//! kept by the lifecycle tracker, so cleanup needs the token that created the
//! record.
//!
//! Linode publishes zone changes every 15 minutes. When no propagation timeout
//! is configured, [`publication_wait`] derives one from the time left until the
//! next publication run.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Timelike, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    deserialize_string, Config, ConfigSchema, CredentialField, Credentials, Defaults,
};
use crate::constants::TXT_RECORD_TYPE;
use crate::errors::{BackendError, ProviderError};
use crate::http::{ApiClient, Auth};
use crate::provider::{Backend, BackendResultExt, CleanupPolicy, TxtRecord, ZoneLookup};
use crate::zone::Zone;

use super::api_client;

/// Production API endpoint
pub const LINODE_API_URL: &str = "https://api.linode.com/v4";

/// Linode rejects TXT records with a shorter TTL
const MIN_TTL: u32 = 300;

/// Minutes between two zone publication runs
const PUBLICATION_CYCLE_MINS: u32 = 15;

/// Slack added on top of the publication wait
const PUBLICATION_FUDGE_SECS: u64 = 120;

/// Page size for the domain list
const PAGE_SIZE: &str = "100";

/// Linode personal access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinodeCredentials {
    #[serde(deserialize_with = "deserialize_string")]
    pub token: String,
}

impl Credentials for LinodeCredentials {
    const FIELDS: &'static [CredentialField] = &[CredentialField {
        key: "token",
        env: "TOKEN",
        required: true,
        example: "\"your-access-token\"",
        description: "Linode personal access token with Domains read/write scope",
    }];
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    page: u32,
    pages: u32,
}

#[derive(Debug, Deserialize)]
struct LinodeDomain {
    id: u64,
    domain: String,
}

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    target: &'a str,
    ttl_sec: u32,
}

#[derive(Debug, Deserialize)]
struct LinodeRecord {
    id: u64,
}

/// Time to wait for the next zone publication run, starting at `minute` past the hour.
#[must_use]
pub fn publication_wait(minute: u32) -> Duration {
    let remaining = PUBLICATION_CYCLE_MINS - (minute % PUBLICATION_CYCLE_MINS);
    Duration::from_secs(u64::from(remaining) * 60 + u64::from(MIN_TTL) + PUBLICATION_FUDGE_SECS)
}

/// Linode backend client.
#[derive(Debug)]
pub struct Linode {
    client: ApiClient,
}

impl Linode {
    /// Build a client against `base` instead of the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &Config<LinodeCredentials>,
        base: &str,
    ) -> Result<Self, ProviderError> {
        let auth = Auth::Bearer(config.credentials.token.clone());
        Ok(Self {
            client: api_client(Self::NAME, base, auth, config.http_timeout)?,
        })
    }

    fn zone_id(record: &TxtRecord) -> Result<&str, ProviderError> {
        record.zone_id().ok_or_else(|| {
            ProviderError::backend(
                Self::NAME,
                BackendError::NotFound {
                    what: format!("domain ID of zone '{}'", record.zone_name()),
                },
            )
        })
    }
}

impl ConfigSchema for Linode {
    type Credentials = LinodeCredentials;
    const NAME: &'static str = "linode";
    const ENV_NAMESPACE: &'static str = "LINODE";
    const MIN_TTL: u32 = MIN_TTL;

    fn defaults() -> Defaults {
        Defaults {
            ttl: MIN_TTL,
            propagation_timeout: Duration::ZERO,
            polling_interval: Duration::from_secs(15),
            ..Defaults::default()
        }
    }
}

#[async_trait]
impl Backend for Linode {
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::Account;
    const CLEANUP: CleanupPolicy = CleanupPolicy::Tracked;

    fn connect(config: &Config<LinodeCredentials>) -> Result<Self, ProviderError> {
        Self::with_base_url(config, LINODE_API_URL)
    }

    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        let mut zones = Vec::new();
        let mut page = 1_u32;

        loop {
            let result: Page<LinodeDomain> = self
                .client
                .get_json(
                    "/domains",
                    &[("page", page.to_string()), ("page_size", PAGE_SIZE.to_string())],
                )
                .await
                .for_provider(Self::NAME)?;

            zones.extend(
                result
                    .data
                    .iter()
                    .map(|d| Zone::with_id(&d.domain, d.id.to_string())),
            );

            if result.page >= result.pages {
                break;
            }
            page = result.page + 1;
        }

        debug!(provider = Self::NAME, zones = zones.len(), "Listed account zones");
        Ok(zones)
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        let zone_id = Self::zone_id(record)?;
        let request = CreateRecord {
            record_type: TXT_RECORD_TYPE,
            name: &record.subdomain,
            target: &record.value,
            ttl_sec: record.ttl,
        };

        let created: LinodeRecord = self
            .client
            .send_json(Method::POST, &format!("/domains/{zone_id}/records"), &request)
            .await
            .for_provider(Self::NAME)?;

        Ok(Some(created.id.to_string()))
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        let zone_id = Self::zone_id(record)?;
        let Some(record_id) = record.record_id.as_deref() else {
            return Err(ProviderError::UnknownRecord {
                provider: Self::NAME.to_string(),
                fqdn: record.fqdn.clone(),
            });
        };

        self.client
            .delete(&format!("/domains/{zone_id}/records/{record_id}"))
            .await
            .for_provider(Self::NAME)?;
        Ok(())
    }

    fn timeout(config: &Config<LinodeCredentials>) -> (Duration, Duration) {
        let timeout = if config.propagation_timeout.is_zero() {
            publication_wait(Utc::now().minute())
        } else {
            config.propagation_timeout
        };
        (timeout, config.polling_interval)
    }
}

#[cfg(test)]
#[path = "linode_tests.rs"]
mod linode_tests;
