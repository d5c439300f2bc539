// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider configuration resolution.
//!
//! A provider can be configured from two sources:
//!
//! - **Environment**: variables named `<NAMESPACE>_<FIELD>` (for example
//!   `GODADDY_API_KEY`, `GODADDY_TTL`). Every variable also honours a
//!   `<NAME>_FILE` variant whose trimmed file content is used when the plain
//!   variable is unset.
//! - **Document**: a YAML (or JSON) mapping with camelCase keys (`apiKey`, `ttl`,
//!   `propagationTimeout`, ...). Unknown keys are ignored.
//!
//! The environment path does not have its own parser. It translates variables
//! into the same mapping shape the document uses and both paths are decoded by a
//! single serde model with lenient scalars (`"600"` and `600` are the same TTL,
//! `"60"` and `"60s"` are the same duration). The result is checked by one
//! [`validate`] routine, so an input rejected on one path is rejected the same
//! way on the other.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_POLLING_INTERVAL_SECS, DEFAULT_PROPAGATION_TIMEOUT_SECS,
    DEFAULT_TTL_SECS, ENV_FILE_SUFFIX, ENV_HTTP_TIMEOUT, ENV_POLLING_INTERVAL,
    ENV_PROPAGATION_TIMEOUT, ENV_SEQUENCE_INTERVAL, ENV_TTL, KEY_HTTP_TIMEOUT,
    KEY_POLLING_INTERVAL, KEY_PROPAGATION_TIMEOUT, KEY_SEQUENCE_INTERVAL, KEY_TTL,
};
use crate::duration::{format_duration, parse_duration};
use crate::errors::ProviderError;

const NIL_CONFIG: &str = "the configuration of the DNS provider is nil";

// ============================================================================
// Environment Snapshot
// ============================================================================

/// A point-in-time copy of environment variables.
///
/// Providers never read `std::env` directly; the snapshot is taken once and
/// passed in, which keeps construction deterministic under test.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up `key`, falling back to the file named by `<key>_FILE`.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when `<key>_FILE` is set but cannot be read.
    pub fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        if let Some(value) = self.vars.get(key).filter(|v| !v.is_empty()) {
            return Ok(Some(value.clone()));
        }

        let file_key = format!("{key}{ENV_FILE_SUFFIX}");
        match self.vars.get(&file_key).filter(|v| !v.is_empty()) {
            Some(path) => {
                let content = std::fs::read_to_string(Path::new(path))?;
                let value = content.trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            None => Ok(None),
        }
    }
}

// ============================================================================
// Credentials Metadata
// ============================================================================

/// Describes one credential field of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialField {
    /// Document key (camelCase)
    pub key: &'static str,
    /// Environment suffix appended to the provider namespace
    pub env: &'static str,
    /// Whether validation fails when the field is empty
    pub required: bool,
    /// YAML snippet rendered in the configuration template
    pub example: &'static str,
    /// One-line description rendered as a template comment
    pub description: &'static str,
}

/// Backend-specific credential fields.
///
/// Implementors are plain serde structs with camelCase keys and
/// `#[serde(default)]`; they are flattened into the configuration document.
pub trait Credentials:
    Serialize + DeserializeOwned + Default + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Field metadata, in template order.
    const FIELDS: &'static [CredentialField];

    /// Convert a raw environment value into its document representation.
    ///
    /// Plain string fields need no conversion. Structured fields (such as a
    /// `domain:token` list) override this.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value is malformed.
    fn env_value(field: &CredentialField, raw: String) -> Result<Value, String> {
        let _ = field;
        Ok(Value::String(raw))
    }

    /// Required fields that are empty.
    fn missing_fields(&self) -> Vec<&'static CredentialField> {
        let value = serde_yaml::to_value(self).unwrap_or(Value::Null);
        Self::FIELDS
            .iter()
            .filter(|field| field.required && is_blank(value.get(field.key)))
            .collect()
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Mapping(m)) => m.is_empty(),
        Some(Value::Sequence(s)) => s.is_empty(),
        Some(_) => false,
    }
}

// ============================================================================
// Configuration Model
// ============================================================================

/// Default values a provider starts from on both configuration paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub ttl: u32,
    pub propagation_timeout: Duration,
    pub polling_interval: Duration,
    pub sequence_interval: Option<Duration>,
    pub http_timeout: Duration,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_SECS,
            propagation_timeout: Duration::from_secs(DEFAULT_PROPAGATION_TIMEOUT_SECS),
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
            sequence_interval: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// A resolved provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config<C> {
    /// Backend-specific credentials
    pub credentials: C,
    /// TTL of the challenge record, in seconds
    pub ttl: u32,
    /// Upper bound on DNS propagation, reported through `timeout()`
    pub propagation_timeout: Duration,
    /// Propagation polling interval, reported through `timeout()`
    pub polling_interval: Duration,
    /// Minimum spacing between challenges for sequential providers
    pub sequence_interval: Option<Duration>,
    /// Timeout applied to every backend HTTP request
    pub http_timeout: Duration,
}

impl<C: Default> Config<C> {
    /// A configuration with default values and empty credentials.
    #[must_use]
    pub fn with_defaults(defaults: Defaults) -> Self {
        Self {
            credentials: C::default(),
            ttl: defaults.ttl,
            propagation_timeout: defaults.propagation_timeout,
            polling_interval: defaults.polling_interval,
            sequence_interval: defaults.sequence_interval,
            http_timeout: defaults.http_timeout,
        }
    }
}

/// Static configuration facts about a provider.
pub trait ConfigSchema {
    /// Credential fields of this provider.
    type Credentials: Credentials;

    /// Registry name, used as the error prefix.
    const NAME: &'static str;

    /// Environment variable prefix, without the trailing underscore.
    const ENV_NAMESPACE: &'static str;

    /// Smallest TTL accepted by the backend.
    const MIN_TTL: u32 = 0;

    /// Defaults applied before overlaying environment or document values.
    fn defaults() -> Defaults {
        Defaults::default()
    }

    /// Provider-specific checks run after the shared validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] describing the invalid setting.
    fn check(config: &Config<Self::Credentials>) -> Result<(), ProviderError> {
        let _ = config;
        Ok(())
    }
}

/// The document model shared by both configuration paths.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document<C> {
    #[serde(flatten)]
    credentials: C,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    ttl: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_timeout")]
    propagation_timeout: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    polling_interval: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    sequence_interval: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    http_timeout: Option<Duration>,
}

impl<C> Document<C> {
    fn into_config(self, defaults: Defaults) -> Config<C> {
        Config {
            credentials: self.credentials,
            ttl: self.ttl.unwrap_or(defaults.ttl),
            propagation_timeout: self
                .propagation_timeout
                .unwrap_or(defaults.propagation_timeout),
            polling_interval: self.polling_interval.unwrap_or(defaults.polling_interval),
            sequence_interval: self.sequence_interval.or(defaults.sequence_interval),
            http_timeout: self.http_timeout.unwrap_or(defaults.http_timeout),
        }
    }
}

fn decode<S: ConfigSchema>(value: Value) -> Result<Config<S::Credentials>, ProviderError> {
    let document: Document<S::Credentials> =
        serde_yaml::from_value(value).map_err(|e| ProviderError::ConfigParse {
            provider: S::NAME.to_string(),
            reason: e.to_string(),
        })?;
    Ok(document.into_config(S::defaults()))
}

// ============================================================================
// Configuration Paths
// ============================================================================

/// Full environment variable name for a field suffix.
#[must_use]
pub fn env_key(namespace: &str, suffix: &str) -> String {
    format!("{namespace}_{suffix}")
}

/// Build a configuration from environment variables.
///
/// Missing credentials are not an error here; [`validate`] reports them.
///
/// # Errors
///
/// Returns [`ProviderError::ConfigParse`] when a variable cannot be read or
/// decoded.
pub fn new_default_config<S: ConfigSchema>(
    env: &EnvSnapshot,
) -> Result<Config<S::Credentials>, ProviderError> {
    let parse_error = |key: &str, reason: String| ProviderError::ConfigParse {
        provider: S::NAME.to_string(),
        reason: format!("{key}: {reason}"),
    };
    let read = |suffix: &str| {
        let key = env_key(S::ENV_NAMESPACE, suffix);
        env.get(&key)
            .map_err(|e| parse_error(&key, e.to_string()))
            .map(|value| value.map(|v| (key, v)))
    };

    let mut mapping = Mapping::new();

    for field in <S::Credentials as Credentials>::FIELDS {
        if let Some((key, raw)) = read(field.env)? {
            let value = <S::Credentials as Credentials>::env_value(field, raw)
                .map_err(|reason| parse_error(&key, reason))?;
            mapping.insert(Value::from(field.key), value);
        }
    }

    for (suffix, doc_key) in [
        (ENV_TTL, KEY_TTL),
        (ENV_PROPAGATION_TIMEOUT, KEY_PROPAGATION_TIMEOUT),
        (ENV_POLLING_INTERVAL, KEY_POLLING_INTERVAL),
        (ENV_SEQUENCE_INTERVAL, KEY_SEQUENCE_INTERVAL),
        (ENV_HTTP_TIMEOUT, KEY_HTTP_TIMEOUT),
    ] {
        if let Some((_, raw)) = read(suffix)? {
            mapping.insert(Value::from(doc_key), Value::String(raw));
        }
    }

    debug!(
        provider = S::NAME,
        keys = mapping.len(),
        "Resolved configuration from environment"
    );

    decode::<S>(Value::Mapping(mapping))
}

/// Build a configuration from a YAML or JSON document.
///
/// An empty or `null` document is the nil configuration and yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`ProviderError::ConfigParse`] for malformed documents.
pub fn parse_config<S: ConfigSchema>(
    raw: &str,
) -> Result<Option<Config<S::Credentials>>, ProviderError> {
    let value: Value = serde_yaml::from_str(raw).map_err(|e| ProviderError::ConfigParse {
        provider: S::NAME.to_string(),
        reason: e.to_string(),
    })?;

    if value.is_null() {
        return Ok(None);
    }

    decode::<S>(value).map(Some)
}

/// The error for a missing configuration.
#[must_use]
pub fn nil_config(provider: &str) -> ProviderError {
    ProviderError::Config {
        provider: provider.to_string(),
        reason: NIL_CONFIG.to_string(),
    }
}

/// Validate a configuration, whichever path produced it.
///
/// # Errors
///
/// - [`ProviderError::Config`] when `config` is `None` or a provider check fails
/// - [`ProviderError::MissingCredentials`] when required fields are empty
/// - [`ProviderError::TtlTooLow`] when the TTL is below the backend minimum
pub fn validate<S: ConfigSchema>(
    config: Option<&Config<S::Credentials>>,
) -> Result<(), ProviderError> {
    let Some(config) = config else {
        return Err(nil_config(S::NAME));
    };

    let missing = config.credentials.missing_fields();
    if !missing.is_empty() {
        return Err(ProviderError::MissingCredentials {
            provider: S::NAME.to_string(),
            fields: missing
                .iter()
                .map(|field| format!("{} ({})", field.key, env_key(S::ENV_NAMESPACE, field.env)))
                .collect(),
        });
    }

    if config.ttl < S::MIN_TTL {
        return Err(ProviderError::TtlTooLow {
            provider: S::NAME.to_string(),
            ttl: config.ttl,
            min: S::MIN_TTL,
        });
    }

    S::check(config)
}

/// Render a commented YAML template listing every key and its default.
#[must_use]
pub fn template<S: ConfigSchema>() -> String {
    let defaults = S::defaults();
    let mut out = format!("# {} DNS-01 provider configuration\n", S::NAME);

    for field in <S::Credentials as Credentials>::FIELDS {
        let _ = writeln!(
            out,
            "{}: {}  # {} ({}{})",
            field.key,
            field.example,
            field.description,
            env_key(S::ENV_NAMESPACE, field.env),
            if field.required { ", required" } else { "" },
        );
    }

    let _ = writeln!(out, "{KEY_TTL}: {}", defaults.ttl.max(S::MIN_TTL));
    let _ = writeln!(
        out,
        "{KEY_PROPAGATION_TIMEOUT}: {}",
        format_duration(defaults.propagation_timeout)
    );
    let _ = writeln!(
        out,
        "{KEY_POLLING_INTERVAL}: {}",
        format_duration(defaults.polling_interval)
    );
    if let Some(interval) = defaults.sequence_interval {
        let _ = writeln!(out, "{KEY_SEQUENCE_INTERVAL}: {}", format_duration(interval));
    }
    let _ = writeln!(
        out,
        "{KEY_HTTP_TIMEOUT}: {}",
        format_duration(defaults.http_timeout)
    );

    out
}

// ============================================================================
// Lenient Scalar Decoding
// ============================================================================

/// A scalar as written in YAML or carried by an environment variable.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => u32::try_from(n)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer {n}"))),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid integer '{s}': {e}"))),
        Some(Scalar::Bool(_) | Scalar::Float(_)) => {
            Err(D::Error::custom("expected a non-negative integer"))
        }
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_duration(Option::<Scalar>::deserialize(deserializer)?)
}

/// Like [`deserialize_opt_duration`], but a negative value means "unset" and
/// decodes as zero so the backend can derive its own timeout.
fn deserialize_opt_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Int(n)) if n < 0 => Ok(Some(Duration::ZERO)),
        Some(Scalar::Float(f)) if f < 0.0 => Ok(Some(Duration::ZERO)),
        Some(Scalar::Text(s)) if s.trim_start().starts_with('-') => {
            let magnitude = &s.trim_start()[1..];
            parse_duration(magnitude)
                .map(|_| Some(Duration::ZERO))
                .map_err(|e| D::Error::custom(format!("{e:#}")))
        }
        scalar => scalar_to_duration(scalar),
    }
}

fn scalar_to_duration<E: serde::de::Error>(scalar: Option<Scalar>) -> Result<Option<Duration>, E> {
    match scalar {
        None => Ok(None),
        Some(Scalar::Int(n)) => u64::try_from(n)
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| E::custom(format!("invalid duration {n}"))),
        Some(Scalar::Float(f)) => Duration::try_from_secs_f64(f)
            .map(Some)
            .map_err(|e| E::custom(format!("invalid duration {f}: {e}"))),
        Some(Scalar::Text(s)) => parse_duration(&s)
            .map(Some)
            .map_err(|e| E::custom(format!("{e:#}"))),
        Some(Scalar::Bool(_)) => Err(E::custom("expected a duration")),
    }
}

/// Decode a string field that may have been written as a YAML number.
///
/// # Errors
///
/// Fails only for sequences and mappings.
pub fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map_or_else(String::new, Scalar::into_string))
}

/// Decode a string-to-string mapping whose values may have been written as
/// YAML numbers.
///
/// # Errors
///
/// Fails when the value is not a mapping or a value is not a scalar.
pub fn deserialize_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Scalar>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.into_string()))
        .collect())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
