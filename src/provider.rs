// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The provider contract and the generic adapter.
//!
//! Two traits meet here:
//!
//! - [`ChallengeProvider`] is what an ACME client sees: `present`, `cleanup`,
//!   `timeout`, and an optional [`Sequential`] capability discovered through
//!   [`ChallengeProvider::as_sequential`].
//! - [`Backend`] is the narrow per-vendor capability: create and delete one TXT
//!   record, and optionally list zones or existing records.
//!
//! [`DnsProvider`] binds a backend, its validated configuration and a
//! [`LifecycleTracker`] into a [`ChallengeProvider`]. Challenge derivation, zone
//! resolution, idempotent creation, token tracking, logging and metrics are
//! implemented once here; vendor quirks stay in the backend.
//!
//! # Lifecycle
//!
//! ```text
//! present(domain, token, keyAuth)
//!   ├─ derive _acme-challenge.<domain>. and the TXT value
//!   ├─ resolve zone + subdomain (SOA, account zone list, or none)
//!   ├─ find_txt: identical record already there? → track it, done
//!   ├─ create_txt
//!   └─ tracker.insert(token → record)
//!
//! cleanup(domain, token, keyAuth)
//!   ├─ tracker.take(token)
//!   │    └─ absent: UnknownRecord (tracked backends) or resolve again (by value)
//!   └─ delete_txt
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::challenge::{un_fqdn, ChallengeInfo};
use crate::config::{
    new_default_config, nil_config, parse_config, validate, Config, ConfigSchema, EnvSnapshot,
};
use crate::constants::DEFAULT_SEQUENCE_INTERVAL_SECS;
use crate::errors::{BackendError, ProviderError};
use crate::lifecycle::{LifecycleTracker, TrackedRecord};
use crate::metrics::{
    record_operation_error, record_operation_success, record_tracked, record_untracked,
    OPERATION_CLEANUP, OPERATION_PRESENT,
};
use crate::resolver::SoaZoneResolver;
use crate::zone::{resolve, ResolvedZone, StaticZones, Zone, ZoneResolver};

// ============================================================================
// Upward Contract
// ============================================================================

/// The capability surface exposed to an ACME client.
#[async_trait]
pub trait ChallengeProvider: Send + Sync + std::fmt::Debug {
    /// Registry name of the provider.
    fn name(&self) -> &str;

    /// Publish the TXT record for one challenge.
    async fn present(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError>;

    /// Remove the TXT record published by the matching `present`.
    async fn cleanup(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError>;

    /// `(propagation timeout, polling interval)` for the caller's propagation check.
    fn timeout(&self) -> (Duration, Duration);

    /// The sequential capability, when this provider has it.
    fn as_sequential(&self) -> Option<&dyn Sequential> {
        None
    }
}

/// Providers whose challenges must be processed one at a time.
///
/// A caller that finds this capability must serialize `present`/`cleanup`
/// across challenges and space them at least [`Sequential::sequential`] apart.
pub trait Sequential: Send + Sync {
    /// Minimum spacing between two challenges.
    fn sequential(&self) -> Duration;
}

// ============================================================================
// Backend Capability
// ============================================================================

/// How a backend finds the authoritative zone of a challenge FQDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneLookup {
    /// Public SOA lookup through a [`ZoneResolver`]
    Soa,
    /// Longest match against [`Backend::list_zones`]
    Account,
    /// The backend takes the full FQDN; no zone is resolved
    None,
}

/// How `cleanup` identifies the record to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Delete by the identifier returned from `create_txt`.
    /// `cleanup` without a tracked entry fails with `UnknownRecord`.
    Tracked,
    /// Delete by name and value; works without a tracked entry.
    ByValue,
}

/// One TXT record operation, as handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    /// Domain as passed by the ACME client
    pub domain: String,
    /// ACME challenge token
    pub token: String,
    /// Key authorization the value was derived from
    pub key_auth: String,
    /// Challenge record name, trailing-dot form
    pub fqdn: String,
    /// TXT content
    pub value: String,
    /// Authoritative zone; `None` for backends that take the full FQDN
    pub zone: Option<Zone>,
    /// Name relative to the zone, empty at the apex; the unqualified FQDN when
    /// no zone is resolved
    pub subdomain: String,
    /// TTL in seconds
    pub ttl: u32,
    /// Backend record identifier; set on `cleanup` when one was tracked
    pub record_id: Option<String>,
}

impl TxtRecord {
    /// Zone name, or an empty string when no zone was resolved.
    #[must_use]
    pub fn zone_name(&self) -> &str {
        self.zone.as_ref().map_or("", |zone| zone.name.as_str())
    }

    /// Backend zone identifier, if any.
    #[must_use]
    pub fn zone_id(&self) -> Option<&str> {
        self.zone.as_ref().and_then(|zone| zone.id.as_deref())
    }

    /// Record name for APIs that spell the apex as `@`.
    #[must_use]
    pub fn name_or_apex(&self) -> &str {
        if self.subdomain.is_empty() {
            "@"
        } else {
            &self.subdomain
        }
    }

    fn to_tracked(&self) -> TrackedRecord {
        TrackedRecord {
            fqdn: self.fqdn.clone(),
            zone: self.zone_name().to_string(),
            zone_id: self.zone_id().map(str::to_string),
            subdomain: self.subdomain.clone(),
            value: self.value.clone(),
            record_id: self.record_id.clone(),
        }
    }
}

/// A TXT record that already exists on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    /// Backend identifier, if the API exposes one
    pub id: Option<String>,
    /// TXT content
    pub value: String,
}

/// A vendor DNS API able to hold ACME challenge records.
///
/// Implementations hold only the API client and whatever they need from the
/// configuration; per-challenge state lives in [`DnsProvider`].
#[async_trait]
pub trait Backend: ConfigSchema + Send + Sync + Sized + 'static {
    /// Zone discovery strategy.
    const ZONE_LOOKUP: ZoneLookup = ZoneLookup::Soa;

    /// Record identification on cleanup.
    const CLEANUP: CleanupPolicy = CleanupPolicy::ByValue;

    /// Whether the provider exposes the [`Sequential`] capability.
    const SEQUENTIAL: bool = false;

    /// Build the backend client from a validated configuration. No network access.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] when the client cannot be built.
    fn connect(config: &Config<Self::Credentials>) -> Result<Self, ProviderError>;

    /// Zones hosted by the account. Required for [`ZoneLookup::Account`].
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the zone list cannot be fetched.
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        Ok(Vec::new())
    }

    /// Existing TXT records at `record`'s name, or `None` when the backend cannot
    /// tell cheaply. Used to make `present` idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the lookup fails.
    async fn find_txt(
        &self,
        record: &TxtRecord,
    ) -> Result<Option<Vec<ExistingRecord>>, ProviderError> {
        let _ = record;
        Ok(None)
    }

    /// Create the record and return its backend identifier, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the record cannot be created.
    async fn create_txt(&self, record: &TxtRecord) -> Result<Option<String>, ProviderError>;

    /// Delete the record.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the record cannot be deleted.
    async fn delete_txt(&self, record: &TxtRecord) -> Result<(), ProviderError>;

    /// `(propagation timeout, polling interval)` reported to the caller.
    fn timeout(config: &Config<Self::Credentials>) -> (Duration, Duration) {
        (config.propagation_timeout, config.polling_interval)
    }
}

/// Attach a provider name to backend errors.
pub trait BackendResultExt<T> {
    /// Wrap the error in [`ProviderError::Backend`].
    ///
    /// # Errors
    ///
    /// Returns the wrapped error unchanged otherwise.
    fn for_provider(self, provider: &str) -> Result<T, ProviderError>;
}

impl<T> BackendResultExt<T> for Result<T, BackendError> {
    fn for_provider(self, provider: &str) -> Result<T, ProviderError> {
        self.map_err(|source| ProviderError::backend(provider, source))
    }
}

/// Run `delete` for every item, keep going after failures, and return the first error.
///
/// # Errors
///
/// Returns the first error produced by `delete`.
pub async fn delete_each<I, F, Fut>(
    provider: &str,
    items: I,
    mut delete: F,
) -> Result<(), ProviderError>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), ProviderError>>,
{
    let mut first_error = None;
    let mut failures = 0_usize;

    for item in items {
        if let Err(e) = delete(item).await {
            failures += 1;
            warn!(
                provider = provider,
                error = %e,
                "Failed to delete challenge record, continuing"
            );
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => {
            warn!(provider = provider, failures = failures, "Cleanup finished with failures");
            Err(e)
        }
        None => Ok(()),
    }
}

// ============================================================================
// Generic Adapter
// ============================================================================

/// A [`ChallengeProvider`] built from a [`Backend`].
pub struct DnsProvider<B: Backend> {
    config: Config<B::Credentials>,
    backend: B,
    zones: Arc<dyn ZoneResolver>,
    tracker: LifecycleTracker,
}

impl<B: Backend> std::fmt::Debug for DnsProvider<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsProvider")
            .field("name", &B::NAME)
            .field("ttl", &self.config.ttl)
            .field("tracked", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

impl<B: Backend> DnsProvider<B> {
    /// Build from environment variables.
    ///
    /// # Errors
    ///
    /// Returns the configuration or validation error; no network access happens.
    pub fn from_env(env: &EnvSnapshot) -> Result<Self, ProviderError> {
        let config = new_default_config::<B>(env)?;
        Self::new_dns_provider_config(Some(config))
    }

    /// Build from a YAML or JSON document.
    ///
    /// # Errors
    ///
    /// Returns the parse or validation error; no network access happens.
    pub fn from_document(raw: &str) -> Result<Self, ProviderError> {
        let config = parse_config::<B>(raw)?;
        Self::new_dns_provider_config(config)
    }

    /// Validate `config` and build the provider.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Config`] for a `None` configuration
    /// - [`ProviderError::MissingCredentials`] / [`ProviderError::TtlTooLow`]
    /// - Any error from [`Backend::connect`]
    pub fn new_dns_provider_config(
        config: Option<Config<B::Credentials>>,
    ) -> Result<Self, ProviderError> {
        let config = config.ok_or_else(|| nil_config(B::NAME))?;
        validate::<B>(Some(&config))?;
        let backend = B::connect(&config)?;
        Self::assemble(config, backend)
    }

    /// Validate `config` and wrap an already-built backend.
    ///
    /// # Errors
    ///
    /// Returns the validation error.
    pub fn with_backend(
        config: Config<B::Credentials>,
        backend: B,
    ) -> Result<Self, ProviderError> {
        validate::<B>(Some(&config))?;
        Self::assemble(config, backend)
    }

    fn assemble(config: Config<B::Credentials>, backend: B) -> Result<Self, ProviderError> {
        let zones: Arc<dyn ZoneResolver> = match B::ZONE_LOOKUP {
            ZoneLookup::Soa => Arc::new(SoaZoneResolver::from_env().map_err(|e| {
                ProviderError::Config {
                    provider: B::NAME.to_string(),
                    reason: e.to_string(),
                }
            })?),
            ZoneLookup::Account | ZoneLookup::None => Arc::new(StaticZones::default()),
        };

        debug!(provider = B::NAME, ttl = config.ttl, "DNS provider configured");

        Ok(Self {
            config,
            backend,
            zones,
            tracker: LifecycleTracker::new(),
        })
    }

    /// Replace the resolver used for [`ZoneLookup::Soa`] backends.
    #[must_use]
    pub fn with_zone_resolver(mut self, zones: Arc<dyn ZoneResolver>) -> Self {
        self.zones = zones;
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config<B::Credentials> {
        &self.config
    }

    /// The backend client.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Challenges presented and not yet cleaned up.
    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }

    /// Resolve the zone and subdomain of `fqdn` according to the backend's strategy.
    ///
    /// Backends without zone lookup get `None` and use the bare FQDN.
    async fn locate(&self, fqdn: &str) -> Result<Option<ResolvedZone>, ProviderError> {
        let resolved = match B::ZONE_LOOKUP {
            ZoneLookup::None => return Ok(None),
            ZoneLookup::Soa => {
                let zone = self
                    .zones
                    .find_zone(fqdn)
                    .await
                    .map_err(|e| ProviderError::from_zone(B::NAME, fqdn, e))?;
                ResolvedZone::within(fqdn, zone)
            }
            ZoneLookup::Account => resolve(fqdn, &self.backend.list_zones().await?),
        }
        .map_err(|e| ProviderError::from_zone(B::NAME, fqdn, e))?;

        debug!(
            provider = B::NAME,
            fqdn = %fqdn,
            zone = %resolved.zone.name,
            subdomain = %resolved.subdomain,
            "Resolved challenge zone"
        );

        Ok(Some(resolved))
    }

    async fn challenge_record(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<TxtRecord, ProviderError> {
        let info = ChallengeInfo::new(domain, key_auth);
        let (zone, subdomain) = match self.locate(&info.effective_fqdn).await? {
            Some(ResolvedZone { zone, subdomain }) => (Some(zone), subdomain),
            None => (None, un_fqdn(&info.effective_fqdn).to_string()),
        };

        Ok(TxtRecord {
            domain: domain.to_string(),
            token: token.to_string(),
            key_auth: key_auth.to_string(),
            fqdn: info.effective_fqdn,
            value: info.value,
            zone,
            subdomain,
            ttl: self.config.ttl,
            record_id: None,
        })
    }

    async fn present_inner(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError> {
        let mut record = self.challenge_record(domain, token, key_auth).await?;

        let existing = self.backend.find_txt(&record).await?.and_then(|records| {
            records.into_iter().find(|existing| existing.value == record.value)
        });

        match existing {
            Some(found) => {
                warn!(
                    provider = B::NAME,
                    fqdn = %record.fqdn,
                    record_id = ?found.id,
                    "Challenge record already exists, not creating a duplicate"
                );
                record.record_id = found.id;
            }
            None => {
                record.record_id = self.backend.create_txt(&record).await?;
                info!(
                    provider = B::NAME,
                    fqdn = %record.fqdn,
                    zone = %record.zone_name(),
                    record_id = ?record.record_id,
                    "Created challenge record"
                );
            }
        }

        if self.tracker.insert(token, record.to_tracked()).is_none() {
            record_tracked(B::NAME);
        }
        Ok(())
    }

    async fn cleanup_inner(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError> {
        let record = match self.tracker.take(token) {
            Some(tracked) => {
                record_untracked(B::NAME);
                TxtRecord {
                    domain: domain.to_string(),
                    token: token.to_string(),
                    key_auth: key_auth.to_string(),
                    fqdn: tracked.fqdn,
                    value: tracked.value,
                    zone: (!tracked.zone.is_empty()).then(|| Zone {
                        name: tracked.zone,
                        id: tracked.zone_id,
                    }),
                    subdomain: tracked.subdomain,
                    ttl: self.config.ttl,
                    record_id: tracked.record_id,
                }
            }
            None => match B::CLEANUP {
                CleanupPolicy::Tracked => {
                    return Err(ProviderError::UnknownRecord {
                        provider: B::NAME.to_string(),
                        fqdn: ChallengeInfo::new(domain, key_auth).effective_fqdn,
                    });
                }
                CleanupPolicy::ByValue => {
                    debug!(
                        provider = B::NAME,
                        domain = %domain,
                        "No tracked record for token, deleting by value"
                    );
                    self.challenge_record(domain, token, key_auth).await?
                }
            },
        };

        self.backend.delete_txt(&record).await?;
        info!(
            provider = B::NAME,
            fqdn = %record.fqdn,
            zone = %record.zone_name(),
            record_id = ?record.record_id,
            "Deleted challenge record"
        );
        Ok(())
    }
}

#[async_trait]
impl<B: Backend> ChallengeProvider for DnsProvider<B> {
    fn name(&self) -> &str {
        B::NAME
    }

    async fn present(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError> {
        let start = Instant::now();
        let result = self.present_inner(domain, token, key_auth).await;
        observe(OPERATION_PRESENT, B::NAME, &result, start);
        result
    }

    async fn cleanup(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> Result<(), ProviderError> {
        let start = Instant::now();
        let result = self.cleanup_inner(domain, token, key_auth).await;
        observe(OPERATION_CLEANUP, B::NAME, &result, start);
        result
    }

    fn timeout(&self) -> (Duration, Duration) {
        B::timeout(&self.config)
    }

    fn as_sequential(&self) -> Option<&dyn Sequential> {
        if B::SEQUENTIAL {
            Some(self)
        } else {
            None
        }
    }
}

impl<B: Backend> Sequential for DnsProvider<B> {
    fn sequential(&self) -> Duration {
        self.config
            .sequence_interval
            .unwrap_or(Duration::from_secs(DEFAULT_SEQUENCE_INTERVAL_SECS))
    }
}

fn observe(operation: &str, provider: &str, result: &Result<(), ProviderError>, start: Instant) {
    match result {
        Ok(()) => record_operation_success(provider, operation, start.elapsed()),
        Err(e) => {
            warn!(
                provider = provider,
                operation = operation,
                reason = e.reason(),
                error = %e,
                "DNS-01 operation failed"
            );
            record_operation_error(provider, operation, e.reason(), start.elapsed());
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
