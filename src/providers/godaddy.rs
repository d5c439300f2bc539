// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! GoDaddy DNS backend.
//!
//! The GoDaddy API has no per-record delete. All records of one type and name
//! are replaced as a set with `PUT`, so both `present` and `cleanup` read the
//! current TXT set, edit it locally and write it back. A set can never become
//! empty: when the last TXT record goes away a placeholder record named
//! `empty` is written instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{
    deserialize_string, Config, ConfigSchema, CredentialField, Credentials, Defaults,
};
use crate::constants::TXT_RECORD_TYPE;
use crate::errors::ProviderError;
use crate::http::{ApiClient, Auth};
use crate::provider::{Backend, BackendResultExt, ExistingRecord, TxtRecord};

use super::api_client;

/// Production API endpoint
pub const GODADDY_API_URL: &str = "https://api.godaddy.com";

/// GoDaddy rejects TXT records with a shorter TTL
const MIN_TTL: u32 = 600;

/// Name of the record written when a TXT set would otherwise be empty
const PLACEHOLDER_NAME: &str = "empty";

/// GoDaddy API key pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoDaddyCredentials {
    #[serde(deserialize_with = "deserialize_string")]
    pub api_key: String,
    #[serde(deserialize_with = "deserialize_string")]
    pub api_secret: String,
}

impl Credentials for GoDaddyCredentials {
    const FIELDS: &'static [CredentialField] = &[
        CredentialField {
            key: "apiKey",
            env: "API_KEY",
            required: true,
            example: "\"your-api-key\"",
            description: "GoDaddy API key",
        },
        CredentialField {
            key: "apiSecret",
            env: "API_SECRET",
            required: true,
            example: "\"your-api-secret\"",
            description: "GoDaddy API secret",
        },
    ];
}

/// One entry of a GoDaddy record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DnsRecord {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    record_type: String,
    name: String,
    #[serde(default)]
    data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<u32>,
}

/// GoDaddy backend client.
#[derive(Debug)]
pub struct GoDaddy {
    client: ApiClient,
}

impl GoDaddy {
    /// Build a client against `base` instead of the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &Config<GoDaddyCredentials>,
        base: &str,
    ) -> Result<Self, ProviderError> {
        let auth = Auth::Header {
            name: "Authorization",
            value: format!(
                "sso-key {}:{}",
                config.credentials.api_key, config.credentials.api_secret
            ),
        };
        Ok(Self {
            client: api_client(Self::NAME, base, auth, config.http_timeout)?,
        })
    }

    fn records_path(zone: &str, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("/v1/domains/{zone}/records/{TXT_RECORD_TYPE}/{name}"),
            None => format!("/v1/domains/{zone}/records/{TXT_RECORD_TYPE}"),
        }
    }

    /// TXT records at `name`, or every TXT record of the zone.
    async fn txt_records(
        &self,
        zone: &str,
        name: Option<&str>,
    ) -> Result<Vec<DnsRecord>, ProviderError> {
        self.client
            .get_json(&Self::records_path(zone, name), &[])
            .await
            .for_provider(Self::NAME)
    }

    async fn replace_txt_records(
        &self,
        zone: &str,
        name: Option<&str>,
        records: &[DnsRecord],
    ) -> Result<(), ProviderError> {
        self.client
            .send_json_discard(Method::PUT, &Self::records_path(zone, name), records)
            .await
            .for_provider(Self::NAME)
    }
}

impl ConfigSchema for GoDaddy {
    type Credentials = GoDaddyCredentials;
    const NAME: &'static str = "godaddy";
    const ENV_NAMESPACE: &'static str = "GODADDY";
    const MIN_TTL: u32 = MIN_TTL;

    fn defaults() -> Defaults {
        Defaults {
            ttl: MIN_TTL,
            propagation_timeout: Duration::from_secs(120),
            ..Defaults::default()
        }
    }
}

#[async_trait]
impl Backend for GoDaddy {
    fn connect(config: &Config<GoDaddyCredentials>) -> Result<Self, ProviderError> {
        Self::with_base_url(config, GODADDY_API_URL)
    }

    async fn find_txt(
        &self,
        record: &TxtRecord,
    ) -> Result<Option<Vec<ExistingRecord>>, ProviderError> {
        let records = self
            .txt_records(record.zone_name(), Some(record.name_or_apex()))
            .await?;

        Ok(Some(
            records
                .into_iter()
                .map(|r| ExistingRecord {
                    id: None,
                    value: r.data,
                })
                .collect(),
        ))
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        let name = record.name_or_apex();
        let mut records: Vec<DnsRecord> = self
            .txt_records(record.zone_name(), Some(name))
            .await?
            .into_iter()
            .filter(|r| !r.data.is_empty() && r.data != record.value)
            .collect();

        records.push(DnsRecord {
            record_type: TXT_RECORD_TYPE.to_string(),
            name: name.to_string(),
            data: record.value.clone(),
            ttl: Some(record.ttl),
            priority: None,
        });

        self.replace_txt_records(record.zone_name(), Some(name), &records)
            .await?;
        Ok(None)
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        let zone = record.zone_name();
        let at_name = self.txt_records(zone, Some(record.name_or_apex())).await?;
        if at_name.is_empty() {
            debug!(
                provider = Self::NAME,
                fqdn = %record.fqdn,
                "No TXT records left at challenge name"
            );
            return Ok(());
        }

        let mut keep: Vec<DnsRecord> = self
            .txt_records(zone, None)
            .await?
            .into_iter()
            .filter(|r| r.data != record.value && !r.data.is_empty())
            .collect();

        if keep.is_empty() {
            keep.push(DnsRecord {
                record_type: String::new(),
                name: PLACEHOLDER_NAME.to_string(),
                data: String::new(),
                ttl: None,
                priority: None,
            });
        }

        self.replace_txt_records(zone, None, &keep).await
    }
}

#[cfg(test)]
#[path = "godaddy_tests.rs"]
mod godaddy_tests;
