// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS-01 challenge derivation.
//!
//! An ACME DNS-01 challenge for `example.com` is satisfied by a TXT record at
//! `_acme-challenge.example.com.` whose value is the unpadded base64url encoding
//! of the SHA-256 digest of the key authorization.
//!
//! # Example
//!
//! ```rust
//! use dns01_providers::challenge::ChallengeInfo;
//!
//! let info = ChallengeInfo::new("example.com", "token.thumbprint");
//! assert_eq!(info.effective_fqdn, "_acme-challenge.example.com.");
//! assert_eq!(info.value.len(), 43);
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::constants::CHALLENGE_LABEL;

/// Everything a provider needs to publish one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeInfo {
    /// The domain under validation, as received from the ACME client
    pub domain: String,
    /// Challenge record name in trailing-dot form
    pub effective_fqdn: String,
    /// TXT record content
    pub value: String,
}

impl ChallengeInfo {
    /// Derive the challenge record name and value for `domain`.
    ///
    /// A leading wildcard label (`*.`) is dropped since wildcard and apex
    /// authorizations share the same challenge record.
    #[must_use]
    pub fn new(domain: &str, key_auth: &str) -> Self {
        let base = domain.strip_prefix("*.").unwrap_or(domain);

        Self {
            domain: domain.to_string(),
            effective_fqdn: format!("{CHALLENGE_LABEL}.{}", to_fqdn(base)),
            value: challenge_value(key_auth),
        }
    }

    /// The challenge record name without its trailing dot.
    #[must_use]
    pub fn unqualified_fqdn(&self) -> &str {
        un_fqdn(&self.effective_fqdn)
    }
}

/// Compute the TXT record value for a key authorization.
#[must_use]
pub fn challenge_value(key_auth: &str) -> String {
    let digest = Sha256::digest(key_auth.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Append a trailing dot to `name` unless it already has one.
#[must_use]
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Strip a single trailing dot from `name`.
#[must_use]
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
#[path = "challenge_tests.rs"]
mod challenge_tests;
