// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for DNS-01 providers.
//!
//! This module provides specialized error types for:
//! - Configuration resolution (nil config, missing credentials, parse failures, TTL bounds)
//! - Zone/subdomain resolution against a backend account or public DNS
//! - Record lifecycle tracking between `present` and `cleanup`
//! - Backend API calls (HTTP status, transport, decoding, vendor error bodies)
//!
//! Every [`ProviderError`] carries the name of the provider that produced it, and
//! renders as `"<provider>: ..."`. Backend failures are kept unmodified as the
//! error source so callers can still inspect them.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by a backend client while talking to a vendor API.
///
/// These errors do not know which provider they belong to; the adapter wraps them
/// in [`ProviderError::Backend`] together with the provider name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The API answered with a non-success HTTP status.
    #[error("unexpected HTTP status {status} ({reason}): {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Stable reason code from [`crate::http_errors::map_http_error_to_reason`]
        reason: &'static str,
        /// Response body, as returned by the vendor
        body: String,
    },

    /// The request never produced a response (DNS failure, refused connection, timeout).
    #[error("HTTP request failed: {reason}")]
    Transport {
        /// Underlying transport error
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode API response: {reason}")]
    Decode {
        /// Decoder error
        reason: String,
    },

    /// The API accepted the request but reported a failure in its body.
    #[error("API error: {reason}")]
    Api {
        /// Vendor error message
        reason: String,
    },

    /// A resource required by the operation does not exist on the backend.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing resource
        what: String,
    },
}

impl BackendError {
    /// Returns true if retrying the same call later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Transport { .. } => true,
            Self::Decode { .. } | Self::Api { .. } | Self::NotFound { .. } => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                reason: err.to_string(),
            }
        } else {
            Self::Transport {
                reason: err.to_string(),
            }
        }
    }
}

/// Errors produced while resolving the authoritative zone of a FQDN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    /// No candidate zone matched the FQDN.
    #[error("no zone found for '{fqdn}'")]
    NotFound {
        /// The FQDN being resolved
        fqdn: String,
    },

    /// Two distinct zones share the longest matching name.
    #[error("zone '{zone}' is listed more than once")]
    Ambiguous {
        /// The duplicated zone name
        zone: String,
    },

    /// The FQDN does not sit inside the zone it was matched against.
    #[error("'{fqdn}' is not within zone '{zone}'")]
    OutsideZone {
        /// The FQDN
        fqdn: String,
        /// The zone it was compared with
        zone: String,
    },

    /// A DNS query failed before an answer was received.
    #[error("DNS lookup for '{name}' failed: {reason}")]
    Lookup {
        /// The queried name
        name: String,
        /// Reason for the failure
        reason: String,
    },

    /// Listing the account's zones through the backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Composite error type returned by every provider operation.
///
/// This is the error surfaced to the ACME client through the
/// [`crate::provider::ChallengeProvider`] contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The requested provider name is not registered.
    #[error("DNS provider '{name}' is not supported")]
    UnrecognizedProvider {
        /// The name that was requested
        name: String,
    },

    /// The configuration is nil or structurally invalid.
    #[error("{provider}: {reason}")]
    Config {
        /// Provider name
        provider: String,
        /// What is wrong with the configuration
        reason: String,
    },

    /// One or more required credential fields are empty.
    ///
    /// Raised during validation, before any network access.
    #[error("{provider}: some credentials information are missing: {}", fields.join(", "))]
    MissingCredentials {
        /// Provider name
        provider: String,
        /// Missing fields, as `documentKey (ENV_VARIABLE)`
        fields: Vec<String>,
    },

    /// The configuration document (or an environment value) could not be parsed.
    #[error("{provider}: failed to parse configuration: {reason}")]
    ConfigParse {
        /// Provider name
        provider: String,
        /// Parser error
        reason: String,
    },

    /// The configured TTL is below the backend minimum.
    #[error("{provider}: invalid TTL, TTL ({ttl}) must be greater than or equal to {min}")]
    TtlTooLow {
        /// Provider name
        provider: String,
        /// Configured TTL
        ttl: u32,
        /// Backend minimum
        min: u32,
    },

    /// No authoritative zone could be found for the challenge FQDN.
    #[error("{provider}: could not find zone for '{fqdn}': {reason}")]
    ZoneNotFound {
        /// Provider name
        provider: String,
        /// The challenge FQDN
        fqdn: String,
        /// Why resolution failed
        reason: String,
    },

    /// Two candidate zones tie for the longest match.
    #[error("{provider}: zone '{zone}' matches more than one account zone")]
    AmbiguousZone {
        /// Provider name
        provider: String,
        /// The ambiguous zone name
        zone: String,
    },

    /// `cleanup` was called for a token that `present` never recorded.
    #[error("{provider}: unknown record ID for '{fqdn}'")]
    UnknownRecord {
        /// Provider name
        provider: String,
        /// The challenge FQDN
        fqdn: String,
    },

    /// The backend API call failed.
    #[error("{provider}: {source}")]
    Backend {
        /// Provider name
        provider: String,
        /// The unmodified backend error
        source: BackendError,
    },

    /// A backend readiness condition did not hold before the deadline.
    #[error("{provider}: {action}: time limit exceeded after {timeout:?}")]
    Timeout {
        /// Provider name
        provider: String,
        /// The action being waited on
        action: String,
        /// The deadline that elapsed
        timeout: Duration,
    },
}

impl ProviderError {
    /// Wrap a backend error with the provider name.
    #[must_use]
    pub fn backend(provider: &str, source: BackendError) -> Self {
        Self::Backend {
            provider: provider.to_string(),
            source,
        }
    }

    /// Convert a zone resolution failure into the provider-level taxonomy.
    #[must_use]
    pub fn from_zone(provider: &str, fqdn: &str, err: ZoneError) -> Self {
        match err {
            ZoneError::Ambiguous { zone } => Self::AmbiguousZone {
                provider: provider.to_string(),
                zone,
            },
            ZoneError::Backend(source) => Self::backend(provider, source),
            other => Self::ZoneNotFound {
                provider: provider.to_string(),
                fqdn: fqdn.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// The provider name carried by this error, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::UnrecognizedProvider { .. } => None,
            Self::Config { provider, .. }
            | Self::MissingCredentials { provider, .. }
            | Self::ConfigParse { provider, .. }
            | Self::TtlTooLow { provider, .. }
            | Self::ZoneNotFound { provider, .. }
            | Self::AmbiguousZone { provider, .. }
            | Self::UnknownRecord { provider, .. }
            | Self::Backend { provider, .. }
            | Self::Timeout { provider, .. } => Some(provider),
        }
    }

    /// Returns true if this error is transient and the operation could be retried.
    ///
    /// Configuration and lifecycle errors are permanent; only backend failures that
    /// look like rate limiting, server errors or transport trouble are transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend { source, .. } => source.is_transient(),
            Self::Timeout { .. } => true,
            Self::UnrecognizedProvider { .. }
            | Self::Config { .. }
            | Self::MissingCredentials { .. }
            | Self::ConfigParse { .. }
            | Self::TtlTooLow { .. }
            | Self::ZoneNotFound { .. }
            | Self::AmbiguousZone { .. }
            | Self::UnknownRecord { .. } => false,
        }
    }

    /// Stable reason code for this error, suitable for metrics labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnrecognizedProvider { .. } => "UnrecognizedProvider",
            Self::Config { .. } => "ConfigError",
            Self::MissingCredentials { .. } => "MissingCredentials",
            Self::ConfigParse { .. } => "ConfigParseError",
            Self::TtlTooLow { .. } => "TTLTooLow",
            Self::ZoneNotFound { .. } => "ZoneNotFound",
            Self::AmbiguousZone { .. } => "AmbiguousZone",
            Self::UnknownRecord { .. } => "UnknownRecord",
            Self::Backend {
                source: BackendError::Http { reason, .. },
                ..
            } => *reason,
            Self::Backend { .. } => "BackendAPIError",
            Self::Timeout { .. } => "Timeout",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
