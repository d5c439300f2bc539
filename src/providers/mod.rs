// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Built-in DNS backends.
//!
//! Each module implements [`crate::provider::Backend`] for one vendor API and
//! exposes a `with_base_url` constructor so the client can be pointed at a
//! mock server. Everything that is not vendor-specific (challenge derivation,
//! zone resolution, token tracking, metrics) lives in
//! [`crate::provider::DnsProvider`].
//!
//! | Backend | Zone lookup | Cleanup | Sequential |
//! |---|---|---|---|
//! | [`GoDaddy`] | SOA | by value (set replace) | no |
//! | [`HttpReq`] | none | by value | no |
//! | [`Hurricane`] | none | by value (overwrite) | yes |
//! | [`Linode`] | account zone list | tracked ID | no |
//! | [`Variomedia`] | SOA | tracked ID | yes |
//! | [`Vultr`] | account zone list | by value (all matches) | no |

use std::time::Duration;

use crate::errors::ProviderError;
use crate::http::{ApiClient, Auth};

pub mod godaddy;
pub mod httpreq;
pub mod hurricane;
pub mod linode;
pub mod variomedia;
pub mod vultr;

pub use godaddy::GoDaddy;
pub use httpreq::HttpReq;
pub use hurricane::Hurricane;
pub use linode::Linode;
pub use variomedia::Variomedia;
pub use vultr::Vultr;

/// Build the HTTP client of a backend, reporting failures as configuration errors.
pub(crate) fn api_client(
    provider: &str,
    base: &str,
    auth: Auth,
    timeout: Duration,
) -> Result<ApiClient, ProviderError> {
    ApiClient::new(base, auth, timeout).map_err(|e| ProviderError::Config {
        provider: provider.to_string(),
        reason: e.to_string(),
    })
}
