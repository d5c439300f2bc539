// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Variomedia DNS backend.
//!
//! Variomedia applies record changes through a job queue: creating or deleting a
//! record returns a queue job, and the change only counts as done once that job
//! reports `done`. Both operations poll the job with [`wait_for`], bounded by the
//! configured propagation timeout.
//!
//! The record ID is only known from the creation response, so cleanup needs the
//! tracked entry of the token that created it. The API is rate limited and
//! challenges are processed one at a time.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{
    deserialize_string, Config, ConfigSchema, CredentialField, Credentials, Defaults,
};
use crate::constants::{DEFAULT_SEQUENCE_INTERVAL_SECS, TXT_RECORD_TYPE};
use crate::errors::{BackendError, ProviderError};
use crate::http::{decode_json, ApiClient, Auth};
use crate::provider::{Backend, BackendResultExt, CleanupPolicy, TxtRecord};
use crate::wait::wait_for;

use super::api_client;

/// Production API endpoint
pub const VARIOMEDIA_API_URL: &str = "https://api.variomedia.de";

/// Job status reported once a change is applied
const JOB_DONE: &str = "done";

/// Variomedia API token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariomediaCredentials {
    #[serde(deserialize_with = "deserialize_string")]
    pub api_token: String,
}

impl Credentials for VariomediaCredentials {
    const FIELDS: &'static [CredentialField] = &[CredentialField {
        key: "apiToken",
        env: "API_TOKEN",
        required: true,
        example: "\"your-api-token\"",
        description: "Variomedia API token",
    }];
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    data: CreateData<'a>,
}

#[derive(Debug, Serialize)]
struct CreateData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: RecordAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct RecordAttributes<'a> {
    record_type: &'a str,
    name: &'a str,
    domain: &'a str,
    data: &'a str,
    ttl: u32,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    data: Job,
}

#[derive(Debug, Deserialize)]
struct Job {
    id: String,
    #[serde(default)]
    attributes: JobAttributes,
    #[serde(default)]
    links: JobLinks,
}

#[derive(Debug, Default, Deserialize)]
struct JobAttributes {
    #[serde(default)]
    job_type: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Default, Deserialize)]
struct JobLinks {
    #[serde(rename = "dns-record", default)]
    dns_record: String,
}

/// Variomedia backend client.
#[derive(Debug)]
pub struct Variomedia {
    client: ApiClient,
    job_timeout: Duration,
    job_interval: Duration,
}

impl Variomedia {
    /// Build a client against `base` instead of the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &Config<VariomediaCredentials>,
        base: &str,
    ) -> Result<Self, ProviderError> {
        let auth = Auth::Header {
            name: "Authorization",
            value: format!("token {}", config.credentials.api_token),
        };
        Ok(Self {
            client: api_client(Self::NAME, base, auth, config.http_timeout)?,
            job_timeout: config.propagation_timeout,
            job_interval: config.polling_interval,
        })
    }

    /// Poll a queue job until it reports `done`.
    async fn wait_job(&self, domain: &str, job_id: &str) -> Result<(), ProviderError> {
        let client = &self.client;
        wait_for(
            Self::NAME,
            &format!("apply change on {domain}"),
            self.job_timeout,
            self.job_interval,
            move || async move {
                let job: JobResponse = client
                    .get_json(&format!("/queue-jobs/{job_id}"), &[])
                    .await
                    .for_provider(Self::NAME)?;

                info!(
                    provider = Self::NAME,
                    domain = %domain,
                    job_id = %job.data.id,
                    job_type = %job.data.attributes.job_type,
                    status = %job.data.attributes.status,
                    "Queue job status"
                );
                Ok(job.data.attributes.status == JOB_DONE)
            },
        )
        .await
    }
}

/// Record ID from the `dns-record` link of a job (the last path segment).
fn record_id_from_link(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

impl ConfigSchema for Variomedia {
    type Credentials = VariomediaCredentials;
    const NAME: &'static str = "variomedia";
    const ENV_NAMESPACE: &'static str = "VARIOMEDIA";

    fn defaults() -> Defaults {
        Defaults {
            ttl: 300,
            sequence_interval: Some(Duration::from_secs(DEFAULT_SEQUENCE_INTERVAL_SECS)),
            ..Defaults::default()
        }
    }
}

#[async_trait]
impl Backend for Variomedia {
    const CLEANUP: CleanupPolicy = CleanupPolicy::Tracked;
    const SEQUENTIAL: bool = true;

    fn connect(config: &Config<VariomediaCredentials>) -> Result<Self, ProviderError> {
        Self::with_base_url(config, VARIOMEDIA_API_URL)
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        let request = CreateRequest {
            data: CreateData {
                kind: "dns-record",
                attributes: RecordAttributes {
                    record_type: TXT_RECORD_TYPE,
                    name: &record.subdomain,
                    domain: record.zone_name(),
                    data: &record.value,
                    ttl: record.ttl,
                },
            },
        };

        let job: JobResponse = self
            .client
            .send_json(Method::POST, "/dns-records", &request)
            .await
            .for_provider(Self::NAME)?;

        self.wait_job(&record.domain, &job.data.id).await?;

        let record_id = record_id_from_link(&job.data.links.dns_record).ok_or_else(|| {
            ProviderError::backend(
                Self::NAME,
                BackendError::Api {
                    reason: format!("job {} carries no dns-record link", job.data.id),
                },
            )
        })?;
        Ok(Some(record_id.to_string()))
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        let Some(record_id) = record.record_id.as_deref() else {
            return Err(ProviderError::UnknownRecord {
                provider: Self::NAME.to_string(),
                fqdn: record.fqdn.clone(),
            });
        };

        let body = self
            .client
            .delete(&format!("/dns-records/{record_id}"))
            .await
            .for_provider(Self::NAME)?;
        let job: JobResponse = decode_json(&body).for_provider(Self::NAME)?;

        self.wait_job(&record.domain, &job.data.id).await
    }
}

#[cfg(test)]
#[path = "variomedia_tests.rs"]
mod variomedia_tests;
