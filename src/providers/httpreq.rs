// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic HTTP request backend.
//!
//! Forwards each challenge to a user-operated endpoint as a JSON `POST` to
//! `<endpoint>/present` or `<endpoint>/cleanup`. The endpoint decides how to
//! publish the record.
//!
//! In the default mode the body is `{"fqdn": ..., "value": ...}`. In `RAW` mode
//! the raw challenge is sent instead: `{"domain": ..., "token": ..., "keyAuth": ...}`.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::config::{deserialize_string, Config, ConfigSchema, CredentialField, Credentials};
use crate::errors::ProviderError;
use crate::http::{build_api_url, ApiClient, Auth};
use crate::provider::{Backend, BackendResultExt, TxtRecord, ZoneLookup};

use super::api_client;

/// Mode that forwards the raw challenge
pub const MODE_RAW: &str = "RAW";

/// Endpoint and optional Basic credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpReqCredentials {
    #[serde(deserialize_with = "deserialize_string")]
    pub endpoint: String,
    #[serde(deserialize_with = "deserialize_string")]
    pub mode: String,
    #[serde(deserialize_with = "deserialize_string")]
    pub username: String,
    #[serde(deserialize_with = "deserialize_string")]
    pub password: String,
}

impl Credentials for HttpReqCredentials {
    const FIELDS: &'static [CredentialField] = &[
        CredentialField {
            key: "endpoint",
            env: "ENDPOINT",
            required: true,
            example: "\"https://acme-hook.example.com\"",
            description: "base URL receiving /present and /cleanup",
        },
        CredentialField {
            key: "mode",
            env: "MODE",
            required: false,
            example: "\"\"",
            description: "RAW to send domain, token and keyAuth instead of fqdn and value",
        },
        CredentialField {
            key: "username",
            env: "USERNAME",
            required: false,
            example: "\"\"",
            description: "Basic auth user, used together with password",
        },
        CredentialField {
            key: "password",
            env: "PASSWORD",
            required: false,
            example: "\"\"",
            description: "Basic auth password",
        },
    ];
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    fqdn: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage<'a> {
    domain: &'a str,
    token: &'a str,
    key_auth: &'a str,
}

/// HTTP request backend client.
#[derive(Debug)]
pub struct HttpReq {
    client: ApiClient,
    raw: bool,
}

impl HttpReq {
    async fn post(&self, path: &str, record: &TxtRecord) -> Result<(), ProviderError> {
        let result = if self.raw {
            let message = RawMessage {
                domain: &record.domain,
                token: &record.token,
                key_auth: &record.key_auth,
            };
            self.client
                .send_json_discard(Method::POST, path, &message)
                .await
        } else {
            let message = Message {
                fqdn: &record.fqdn,
                value: &record.value,
            };
            self.client
                .send_json_discard(Method::POST, path, &message)
                .await
        };
        result.for_provider(Self::NAME)
    }
}

impl ConfigSchema for HttpReq {
    type Credentials = HttpReqCredentials;
    const NAME: &'static str = "httpreq";
    const ENV_NAMESPACE: &'static str = "HTTPREQ";

    fn check(config: &Config<HttpReqCredentials>) -> Result<(), ProviderError> {
        let endpoint = build_api_url(&config.credentials.endpoint);
        url::Url::parse(&endpoint).map_err(|e| ProviderError::Config {
            provider: Self::NAME.to_string(),
            reason: format!("invalid endpoint '{}': {e}", config.credentials.endpoint),
        })?;
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpReq {
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::None;

    fn connect(config: &Config<HttpReqCredentials>) -> Result<Self, ProviderError> {
        let credentials = &config.credentials;
        let auth = if credentials.username.is_empty() || credentials.password.is_empty() {
            Auth::None
        } else {
            Auth::Basic {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            }
        };

        Ok(Self {
            client: api_client(Self::NAME, &credentials.endpoint, auth, config.http_timeout)?,
            raw: credentials.mode == MODE_RAW,
        })
    }

    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError> {
        self.post("/present", record).await?;
        Ok(None)
    }

    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError> {
        self.post("/cleanup", record).await
    }
}

#[cfg(test)]
#[path = "httpreq_tests.rs"]
mod httpreq_tests;
