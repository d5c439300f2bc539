// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone and subdomain resolution for challenge FQDNs.
//!
//! A challenge name such as `_acme-challenge.foo.bar.example.com.` is matched
//! against the zones known to a backend account by walking label boundaries from
//! the full name toward the root. The longest matching zone wins, and the
//! remaining labels form the subdomain passed to the backend.
//!
//! ```text
//! _acme-challenge.foo.bar.example.com
//!                 ^^^^^^^^^^^^^^^^^^^  foo.bar.example.com   (not hosted)
//!                     ^^^^^^^^^^^^^^^  bar.example.com       (hosted, wins)
//!                         ^^^^^^^^^^^  example.com           (hosted, shorter)
//! ```
//!
//! Names are compared case-insensitively and without their trailing dot.

use async_trait::async_trait;
use tracing::debug;

use crate::challenge::un_fqdn;
use crate::errors::ZoneError;

/// An authoritative zone as known to a backend account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone apex, unqualified (`example.com`)
    pub name: String,
    /// Backend identifier of the zone, when the API addresses zones by ID
    pub id: Option<String>,
}

impl Zone {
    /// A zone known only by name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: un_fqdn(name).to_string(),
            id: None,
        }
    }

    /// A zone with a backend identifier.
    #[must_use]
    pub fn with_id(name: &str, id: impl Into<String>) -> Self {
        Self {
            name: un_fqdn(name).to_string(),
            id: Some(id.into()),
        }
    }
}

/// Result of resolving a challenge FQDN against a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    /// The authoritative zone
    pub zone: Zone,
    /// Labels left of the zone apex; empty when the FQDN is the apex itself
    pub subdomain: String,
}

impl ResolvedZone {
    /// Place `fqdn` inside an already selected `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::OutsideZone`] when `fqdn` is not inside `zone`.
    pub fn within(fqdn: &str, zone: Zone) -> Result<Self, ZoneError> {
        let subdomain = extract_subdomain(fqdn, &zone.name)?;
        Ok(Self { zone, subdomain })
    }
}

/// Source of authoritative zones for a FQDN.
///
/// Implemented by backends that list zones through their API and by
/// [`crate::resolver::SoaZoneResolver`] for public SOA lookups.
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Find the zone that is authoritative for `fqdn`.
    async fn find_zone(&self, fqdn: &str) -> Result<Zone, ZoneError>;
}

/// A fixed list of zones, matched with [`find_longest_match`].
#[derive(Debug, Clone, Default)]
pub struct StaticZones {
    zones: Vec<Zone>,
}

impl StaticZones {
    #[must_use]
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Convenience constructor from zone names.
    #[must_use]
    pub fn from_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| Zone::named(name)).collect())
    }
}

#[async_trait]
impl ZoneResolver for StaticZones {
    async fn find_zone(&self, fqdn: &str) -> Result<Zone, ZoneError> {
        find_longest_match(fqdn, &self.zones)
    }
}

/// Candidate zone names for `fqdn`, longest first.
///
/// Every label boundary yields one candidate; the root is not a candidate.
///
/// ```rust
/// use dns01_providers::zone::candidate_zones;
///
/// assert_eq!(
///     candidate_zones("a.example.com."),
///     vec!["a.example.com", "example.com", "com"]
/// );
/// ```
#[must_use]
pub fn candidate_zones(fqdn: &str) -> Vec<&str> {
    let name = un_fqdn(fqdn);
    let mut candidates = Vec::new();
    let mut rest = name;

    while !rest.is_empty() {
        candidates.push(rest);
        match rest.find('.') {
            Some(dot) => rest = &rest[dot + 1..],
            None => break,
        }
    }

    candidates
}

/// Pick the longest zone in `zones` that contains `fqdn`.
///
/// # Errors
///
/// - [`ZoneError::NotFound`] when no zone contains the FQDN
/// - [`ZoneError::Ambiguous`] when the longest match is listed more than once
///   with different spellings or identifiers
pub fn find_longest_match(fqdn: &str, zones: &[Zone]) -> Result<Zone, ZoneError> {
    for candidate in candidate_zones(fqdn) {
        let mut matches = zones
            .iter()
            .filter(|zone| un_fqdn(&zone.name).eq_ignore_ascii_case(candidate));

        let Some(first) = matches.next() else {
            continue;
        };

        if matches.any(|other| other != first) {
            return Err(ZoneError::Ambiguous {
                zone: candidate.to_string(),
            });
        }

        debug!(fqdn = %fqdn, zone = %first.name, "Matched authoritative zone");
        return Ok(first.clone());
    }

    Err(ZoneError::NotFound {
        fqdn: fqdn.to_string(),
    })
}

/// Strip `zone` and its separating dot from `fqdn`.
///
/// Returns an empty string when `fqdn` is the zone apex.
///
/// ```rust
/// use dns01_providers::zone::extract_subdomain;
///
/// assert_eq!(
///     extract_subdomain("_acme-challenge.foo.example.com.", "example.com").unwrap(),
///     "_acme-challenge.foo"
/// );
/// assert_eq!(extract_subdomain("example.com.", "example.com.").unwrap(), "");
/// ```
///
/// # Errors
///
/// Returns [`ZoneError::OutsideZone`] when `fqdn` does not end with `zone` on a
/// label boundary.
pub fn extract_subdomain(fqdn: &str, zone: &str) -> Result<String, ZoneError> {
    let name = un_fqdn(fqdn);
    let apex = un_fqdn(zone);

    if name.eq_ignore_ascii_case(apex) {
        return Ok(String::new());
    }

    let outside = || ZoneError::OutsideZone {
        fqdn: fqdn.to_string(),
        zone: zone.to_string(),
    };

    if apex.is_empty() || name.len() <= apex.len() + 1 {
        return Err(outside());
    }

    let split = name.len() - apex.len();
    let (head, tail) = name.split_at_checked(split).ok_or_else(outside)?;
    if !tail.eq_ignore_ascii_case(apex) {
        return Err(outside());
    }

    head.strip_suffix('.')
        .map(str::to_string)
        .ok_or_else(outside)
}

/// Resolve `fqdn` against a list of zones in one step.
///
/// # Errors
///
/// Propagates the errors of [`find_longest_match`] and [`extract_subdomain`].
pub fn resolve(fqdn: &str, zones: &[Zone]) -> Result<ResolvedZone, ZoneError> {
    ResolvedZone::within(fqdn, find_longest_match(fqdn, zones)?)
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
