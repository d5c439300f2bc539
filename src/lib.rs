// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dns01-providers - DNS-01 challenge providers for ACME clients
//!
//! An ACME client proves control of a domain with a DNS-01 challenge by
//! publishing a TXT record at `_acme-challenge.<domain>.`. This library puts many
//! DNS vendor APIs behind one narrow contract so the client can pick a backend
//! by name at runtime.
//!
//! ## Overview
//!
//! - A [`registry`] maps provider names (and legacy aliases) to constructors
//! - Configuration comes from environment variables or a YAML/JSON document;
//!   both paths share one validator ([`config`])
//! - The authoritative zone of a challenge is found by longest match against
//!   the account's zones or by public SOA lookup ([`zone`], [`resolver`])
//! - Each provider instance tracks the record it created for every token, so
//!   concurrent challenges on one instance never interfere ([`lifecycle`])
//!
//! ## Modules
//!
//! - [`provider`] - The `ChallengeProvider` contract, the `Backend` trait and
//!   the generic adapter
//! - [`providers`] - Built-in backends
//! - [`registry`] - Name → constructor dispatch
//! - [`config`] - Environment and document configuration paths
//! - [`errors`] - Error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use dns01_providers::registry;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = registry::lookup(
//!     "linode",
//!     "token: my-token\nttl: 300\npropagationTimeout: 20m\n",
//! )?;
//!
//! provider.present("example.com", "token", "key-auth").await?;
//! let (timeout, interval) = provider.timeout();
//! // ... wait for propagation with `timeout` / `interval`, let the CA validate ...
//! provider.cleanup("example.com", "token", "key-auth").await?;
//! # let _ = (timeout, interval);
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod config;
pub mod constants;
pub mod duration;
pub mod errors;
pub mod http;
pub mod http_errors;
pub mod lifecycle;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod resolver;
pub mod wait;
pub mod zone;
