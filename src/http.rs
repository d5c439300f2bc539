// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared HTTP client for backend APIs.
//!
//! Every backend talks JSON (or form-encoded) HTTP to a vendor API. [`ApiClient`]
//! wraps a `reqwest::Client` with the vendor base URL, the authentication
//! scheme and the configured request timeout, and maps non-success responses to
//! [`BackendError::Http`] through [`map_http_error_to_reason`].
//!
//! The client never retries. Transient failures are surfaced to the caller with
//! [`BackendError::is_transient`] set.

use std::fmt::Debug;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::constants::USER_AGENT;
use crate::errors::BackendError;
use crate::http_errors::{map_connection_error, map_http_error_to_reason};

/// Authentication applied to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// No credentials (or credentials carried in the request body)
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// HTTP Basic authentication
    Basic { username: String, password: String },
    /// A vendor-specific header, e.g. `Authorization: sso-key K:S`
    Header { name: &'static str, value: String },
}

impl Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bearer(_) => write!(f, "Bearer(***)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}:***)"),
            Self::Header { name, .. } => write!(f, "Header({name}: ***)"),
        }
    }
}

/// Build the API base URL, trimming trailing slashes.
///
/// Addresses without a scheme are assumed to be HTTPS.
#[must_use]
pub fn build_api_url(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{base}")
    }
}

/// HTTP client bound to one vendor API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
    auth: Auth,
}

impl ApiClient {
    /// Create a client for `base` with the given authentication and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if `base` is not a valid URL or the
    /// underlying client cannot be built.
    pub fn new(base: &str, auth: Auth, timeout: Duration) -> Result<Self, BackendError> {
        let base = build_api_url(base);
        url::Url::parse(&base).map_err(|e| BackendError::Transport {
            reason: format!("invalid API URL '{base}': {e}"),
        })?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base, auth })
    }

    /// The base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Join `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base.clone()
        } else {
            format!("{}/{path}", self.base)
        }
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");

        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Header { name, value } => request.header(*name, value),
        }
    }

    /// Send a request and return the response body of a successful call.
    async fn execute(
        &self,
        method: &Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<String, BackendError> {
        debug!(method = %method, url = %url, "HTTP API request");

        let response = request.send().await.map_err(|e| {
            let (reason, message) = map_connection_error();
            error!(
                method = %method,
                url = %url,
                reason = reason,
                error = %e,
                "{message}"
            );
            BackendError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await;

        if !status.is_success() {
            let body = body.unwrap_or_default();
            let (reason, message) = map_http_error_to_reason(status.as_u16());
            error!(
                method = %method,
                url = %url,
                status = %status,
                reason = reason,
                error = %body,
                "{message}"
            );
            return Err(BackendError::Http {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        let body = body.map_err(|e| {
            error!(method = %method, url = %url, error = %e, "Failed to read response body");
            BackendError::Transport {
                reason: format!("failed to read response body: {e}"),
            }
        })?;

        info!(
            method = %method,
            url = %url,
            status = %status,
            response_len = body.len(),
            "HTTP API request successful"
        );
        Ok(body)
    }

    /// Send an optional JSON body with optional query parameters; return the raw body.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] for transport failures and non-2xx responses.
    pub async fn request<B: Serialize + Debug + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String, BackendError> {
        let url = self.url(path);
        let mut request = self.builder(method.clone(), path);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(&method, &url, request).await
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Decode`] when the body is not the expected JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let body = self.request::<()>(Method::GET, path, query, None).await?;
        decode_json(&body)
    }

    /// Send a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Decode`] when the body is not the expected JSON.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + Debug + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.request(method, path, &[], Some(body)).await?;
        decode_json(&body)
    }

    /// Send a JSON body and ignore the response content.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] for transport failures and non-2xx responses.
    pub async fn send_json_discard<B: Serialize + Debug + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        self.request(method, path, &[], Some(body)).await.map(|_| ())
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] for transport failures and non-2xx responses.
    pub async fn delete(&self, path: &str) -> Result<String, BackendError> {
        self.request::<()>(Method::DELETE, path, &[], None).await
    }

    /// `POST` a form-encoded body and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] for transport failures and non-2xx responses.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<String, BackendError> {
        let url = self.url(path);
        let request = self.builder(Method::POST, path).form(form);
        self.execute(&Method::POST, &url, request).await
    }
}

/// Decode a JSON response body.
///
/// # Errors
///
/// Returns [`BackendError::Decode`] with the serde error.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Decode {
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
