// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Public DNS zone discovery through SOA queries.
//!
//! Backends whose API does not list zones (or addresses them by name only) find
//! the authoritative zone the way recursive tooling does: query `SOA` for every
//! candidate name from the challenge FQDN toward the root, and stop at the first
//! candidate whose answer section carries an `SOA` record owned by that name.
//!
//! Queries go over UDP with `hickory-client`'s synchronous client, run on the
//! blocking thread pool. Resolved zones are cached per FQDN for the lifetime of
//! the resolver.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RecordType};
use hickory_client::udp::UdpClientConnection;
use tracing::{debug, warn};

use crate::challenge::un_fqdn;
use crate::constants::{DEFAULT_NAMESERVERS, DNS_PORT, ENV_NAMESERVERS};
use crate::errors::ZoneError;
use crate::zone::{candidate_zones, Zone, ZoneResolver};

/// Per-query UDP timeout
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Zone resolver backed by public `SOA` lookups.
#[derive(Debug)]
pub struct SoaZoneResolver {
    nameservers: Vec<SocketAddr>,
    cache: Mutex<HashMap<String, Zone>>,
}

impl SoaZoneResolver {
    #[must_use]
    pub fn new(nameservers: Vec<SocketAddr>) -> Self {
        Self {
            nameservers,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build a resolver from `DNS01_NAMESERVERS`, falling back to public resolvers.
    ///
    /// # Errors
    ///
    /// Returns an error when the variable is set but contains an invalid address.
    pub fn from_env() -> Result<Self, ZoneError> {
        match std::env::var(ENV_NAMESERVERS) {
            Ok(raw) if !raw.trim().is_empty() => Ok(Self::new(parse_nameservers(&raw)?)),
            _ => Ok(Self::new(parse_nameservers(&DEFAULT_NAMESERVERS.join(","))?)),
        }
    }

    /// The nameservers queried, in order.
    #[must_use]
    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }

    fn cached(&self, key: &str) -> Option<Zone> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remember(&self, key: String, zone: Zone) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, zone);
    }

    /// Ask each nameserver in turn whether `candidate` is a zone apex.
    async fn is_zone_apex(&self, candidate: &str) -> Result<bool, ZoneError> {
        let mut last_error = None;

        for server in &self.nameservers {
            match query_soa(*server, candidate).await {
                Ok(is_apex) => return Ok(is_apex),
                Err(e) => {
                    warn!(
                        server = %server,
                        name = %candidate,
                        error = %e,
                        "SOA query failed, trying next nameserver"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ZoneError::Lookup {
            name: candidate.to_string(),
            reason: "no nameservers configured".to_string(),
        }))
    }
}

#[async_trait]
impl ZoneResolver for SoaZoneResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<Zone, ZoneError> {
        let key = un_fqdn(fqdn).to_ascii_lowercase();
        if let Some(zone) = self.cached(&key) {
            return Ok(zone);
        }

        for candidate in candidate_zones(fqdn) {
            if self.is_zone_apex(candidate).await? {
                debug!(fqdn = %fqdn, zone = %candidate, "Found zone through SOA lookup");
                let zone = Zone::named(candidate);
                self.remember(key, zone.clone());
                return Ok(zone);
            }
        }

        Err(ZoneError::NotFound {
            fqdn: fqdn.to_string(),
        })
    }
}

/// Parse a comma-separated nameserver list. Entries without a port use 53.
///
/// # Errors
///
/// Returns [`ZoneError::Lookup`] for an entry that is neither `ip` nor `ip:port`.
pub fn parse_nameservers(raw: &str) -> Result<Vec<SocketAddr>, ZoneError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<SocketAddr>()
                .or_else(|_| entry.parse::<IpAddr>().map(|ip| SocketAddr::new(ip, DNS_PORT)))
                .map_err(|e| ZoneError::Lookup {
                    name: entry.to_string(),
                    reason: format!("invalid nameserver address: {e}"),
                })
        })
        .collect()
}

/// Query `server` for the SOA of `name`; true when the answer is owned by `name`.
async fn query_soa(server: SocketAddr, name: &str) -> Result<bool, ZoneError> {
    let name_str = name.to_string();

    tokio::task::spawn_blocking(move || {
        let lookup_error = |reason: String| ZoneError::Lookup {
            name: name_str.clone(),
            reason,
        };

        let query_name = Name::from_str(&name_str)
            .map_err(|e| lookup_error(format!("invalid name: {e}")))?;

        let conn = UdpClientConnection::with_timeout(server, QUERY_TIMEOUT)
            .map_err(|e| lookup_error(format!("failed to create UDP connection: {e}")))?;
        let client = SyncClient::new(conn);

        let response = client
            .query(&query_name, DNSClass::IN, RecordType::SOA)
            .map_err(|e| lookup_error(e.to_string()))?;

        Ok(response.answers().iter().any(|record| {
            record.record_type() == RecordType::SOA
                && un_fqdn(&record.name().to_string()).eq_ignore_ascii_case(&name_str)
        }))
    })
    .await
    .map_err(|e| ZoneError::Lookup {
        name: name.to_string(),
        reason: format!("DNS query task failed: {e}"),
    })?
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
