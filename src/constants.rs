// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the DNS-01 providers.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// ACME Challenge Constants
// ============================================================================

/// Label prepended to the validated domain to form the challenge record name
pub const CHALLENGE_LABEL: &str = "_acme-challenge";

/// DNS record type written by every provider
pub const TXT_RECORD_TYPE: &str = "TXT";

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Default TTL for challenge records (2 minutes)
pub const DEFAULT_TTL_SECS: u32 = 120;

/// Default maximum time to wait for a record to propagate (60 seconds)
pub const DEFAULT_PROPAGATION_TIMEOUT_SECS: u64 = 60;

/// Default interval between propagation checks (2 seconds)
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 2;

/// Default minimum spacing between challenges for sequential providers (60 seconds)
pub const DEFAULT_SEQUENCE_INTERVAL_SECS: u64 = 60;

/// Default HTTP client timeout for backend API calls (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Environment Variable Suffixes
// ============================================================================

/// Suffix of the TTL variable (`<NAMESPACE>_TTL`)
pub const ENV_TTL: &str = "TTL";

/// Suffix of the propagation timeout variable
pub const ENV_PROPAGATION_TIMEOUT: &str = "PROPAGATION_TIMEOUT";

/// Suffix of the polling interval variable
pub const ENV_POLLING_INTERVAL: &str = "POLLING_INTERVAL";

/// Suffix of the sequence interval variable
pub const ENV_SEQUENCE_INTERVAL: &str = "SEQUENCE_INTERVAL";

/// Suffix of the HTTP timeout variable
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT";

/// Suffix appended to any key to read its value from a file instead
pub const ENV_FILE_SUFFIX: &str = "_FILE";

/// Comma-separated `ip:port` list overriding the nameservers used for SOA lookups
pub const ENV_NAMESERVERS: &str = "DNS01_NAMESERVERS";

// ============================================================================
// Document Keys
// ============================================================================

/// Document key for the record TTL
pub const KEY_TTL: &str = "ttl";

/// Document key for the propagation timeout
pub const KEY_PROPAGATION_TIMEOUT: &str = "propagationTimeout";

/// Document key for the polling interval
pub const KEY_POLLING_INTERVAL: &str = "pollingInterval";

/// Document key for the sequence interval
pub const KEY_SEQUENCE_INTERVAL: &str = "sequenceInterval";

/// Document key for the HTTP timeout
pub const KEY_HTTP_TIMEOUT: &str = "httpTimeout";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries
pub const DNS_PORT: u16 = 53;

/// Public resolvers used for SOA lookups when none are configured
pub const DEFAULT_NAMESERVERS: &[&str] = &["8.8.8.8:53", "1.1.1.1:53"];

// ============================================================================
// HTTP Client Constants
// ============================================================================

/// User agent sent with every backend request
pub const USER_AGENT: &str = concat!("dns01-providers/", env!("CARGO_PKG_VERSION"));
