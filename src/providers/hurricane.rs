// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hurricane Electric (dns.he.net) backend.
//!
//! Hurricane Electric has no record API. Each challenge name must be set up
//! once in the web UI as a dynamic TXT record with its own update token, and
//! the record value is then overwritten through the dyndns endpoint. Cleanup
//! writes `"."` because the record itself cannot be deleted.
//!
//! Tokens are configured per domain: `domain:token,domain:token` in
//! `HURRICANE_TOKENS`, or a `credentials` mapping in a document.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::config::{
    deserialize_string_map, Config, ConfigSchema, CredentialField, Credentials, Defaults,
};
use crate::constants::{CHALLENGE_LABEL, DEFAULT_SEQUENCE_INTERVAL_SECS};
use crate::errors::{BackendError, ProviderError};
use crate::http::{ApiClient, Auth};
use crate::provider::{Backend, BackendResultExt, TxtRecord, ZoneLookup};

use super::api_client;

/// Production dyndns endpoint
pub const HURRICANE_API_URL: &str = "https://dyn.dns.he.net";

/// Value written on cleanup
const CLEARED_VALUE: &str = ".";

/// Dynamic TXT update tokens by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HurricaneCredentials {
    #[serde(deserialize_with = "deserialize_string_map")]
    pub credentials: BTreeMap<String, String>,
}

impl Credentials for HurricaneCredentials {
    const FIELDS: &'static [CredentialField] = &[CredentialField {
        key: "credentials",
        env: "TOKENS",
        required: true,
        example: "{ example.com: your-txt-token }",
        description: "dynamic TXT record tokens by domain",
    }];

    fn env_value(_field: &CredentialField, raw: String) -> Result<Value, String> {
        let tokens = parse_tokens(&raw)?;
        Ok(Value::Mapping(
            tokens
                .into_iter()
                .map(|(domain, token)| (Value::String(domain), Value::String(token)))
                .collect(),
        ))
    }
}

/// Parse `domain:token,domain:token`. A single trailing comma is allowed.
///
/// # Errors
///
/// Returns the offending pair when it does not split into exactly two parts.
pub fn parse_tokens(raw: &str) -> Result<BTreeMap<String, String>, String> {
    let raw = raw.strip_suffix(',').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    raw.split(',')
        .map(|pair| match pair.split(':').collect::<Vec<_>>()[..] {
            [domain, token] => Ok((domain.trim().to_string(), token.trim().to_string())),
            _ => Err(format!("incorrect credential pair: {pair}")),
        })
        .collect()
}

/// Hurricane Electric backend client.
#[derive(Debug)]
pub struct Hurricane {
    client: ApiClient,
    tokens: BTreeMap<String, String>,
}

impl Hurricane {
    /// Build a client against `base` instead of the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        config: &Config<HurricaneCredentials>,
        base: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: api_client(Self::NAME, base, Auth::None, config.http_timeout)?,
            tokens: config.credentials.credentials.clone(),
        })
    }

    /// Overwrite the TXT value of `hostname`.
    async fn update_txt(&self, hostname: &str, txt: &str) -> Result<(), ProviderError> {
        let domain = hostname
            .strip_prefix(CHALLENGE_LABEL)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(hostname);

        let token = self.tokens.get(domain).ok_or_else(|| {
            ProviderError::backend(
                Self::NAME,
                BackendError::NotFound {
                    what: format!("update token for domain '{domain}'"),
                },
            )
        })?;

        let body = self
            .client
            .post_form(
                "/nic/update",
                &[("hostname", hostname), ("password", token), ("txt", txt)],
            )
            .await
            .for_provider(Self::NAME)?;

        check_response(hostname, &body).for_provider(Self::NAME)
    }
}

/// Interpret a dyndns response body.
fn check_response(hostname: &str, body: &str) -> Result<(), BackendError> {
    let code = body.split_whitespace().next().unwrap_or_default();
    let reason = match code {
        "good" | "nochg" => return Ok(()),
        "badauth" => format!("wrong authentication token provided for TXT record {hostname}"),
        "abuse" => format!("blocked hostname for abuse: {hostname}"),
        "interval" => format!("TXT record {hostname} updated too frequently, rate limited"),
        "nohost" => format!("TXT record {hostname} does not exist"),
        "notfqdn" => format!("{hostname} is not a valid FQDN"),
        _ => format!("attempt to change TXT record {hostname} returned {}", body.trim()),
    };
    Err(BackendError::Api { reason })
}

impl ConfigSchema for Hurricane {
    type Credentials = HurricaneCredentials;
    const NAME: &'static str = "hurricane";
    const ENV_NAMESPACE: &'static str = "HURRICANE";

    fn defaults() -> Defaults {
        Defaults {
            propagation_timeout: Duration::from_secs(300),
            sequence_interval: Some(Duration::from_secs(DEFAULT_SEQUENCE_INTERVAL_SECS)),
            ..Defaults::default()
        }
    }
}

#[async_trait]
impl Backend for Hurricane {
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::None;
    const SEQUENTIAL: bool = true;

    fn connect(config: &Config<HurricaneCredentials>) -> Result<Self, ProviderError> {
        Self::with_base_url(config, HURRICANE_API_URL)
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        self.update_txt(&record.subdomain, &record.value).await?;
        Ok(None)
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        self.update_txt(&record.subdomain, CLEARED_VALUE).await
    }
}

#[cfg(test)]
#[path = "hurricane_tests.rs"]
mod hurricane_tests;
