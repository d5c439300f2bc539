// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name → constructor dispatch for DNS providers.
//!
//! A [`ProviderDescriptor`] names one backend, its legacy aliases and the
//! constructors for both configuration paths. The built-in table is assembled
//! once per process and never mutated.
//!
//! # Example
//!
//! ```rust,no_run
//! use dns01_providers::registry;
//!
//! # async fn run() -> Result<(), dns01_providers::errors::ProviderError> {
//! let provider = registry::lookup("httpreq", "endpoint: https://hook.example.com")?;
//! provider.present("example.com", "token", "key-auth").await?;
//! provider.cleanup("example.com", "token", "key-auth").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::LazyLock;

use tracing::debug;

use crate::config::{template as render_template, EnvSnapshot};
use crate::errors::ProviderError;
use crate::provider::{Backend, ChallengeProvider, DnsProvider};
use crate::providers::{GoDaddy, HttpReq, Hurricane, Linode, Variomedia, Vultr};

/// A constructed provider, ready for `present`/`cleanup`.
pub type BoxedProvider = Box<dyn ChallengeProvider>;

/// Constructor from an environment snapshot.
pub type FromEnvFn = fn(&EnvSnapshot) -> Result<BoxedProvider, ProviderError>;

/// Constructor from a YAML or JSON document.
pub type FromDocumentFn = fn(&str) -> Result<BoxedProvider, ProviderError>;

/// One registered provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    /// Canonical registry name
    pub name: &'static str,
    /// Additional names routing to the same constructor
    pub aliases: &'static [&'static str],
    from_env: FromEnvFn,
    from_document: FromDocumentFn,
    template: fn() -> String,
}

impl ProviderDescriptor {
    /// Describe backend `B` under its own name plus `aliases`.
    #[must_use]
    pub fn of<B: Backend>(aliases: &'static [&'static str]) -> Self {
        Self {
            name: B::NAME,
            aliases,
            from_env: |env| Ok(Box::new(DnsProvider::<B>::from_env(env)?)),
            from_document: |raw| Ok(Box::new(DnsProvider::<B>::from_document(raw)?)),
            template: render_template::<B>,
        }
    }

    /// Whether `name` is the canonical name or one of the aliases.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    /// Build the provider from environment variables.
    ///
    /// # Errors
    ///
    /// Returns the configuration or validation error.
    pub fn from_env(&self, env: &EnvSnapshot) -> Result<BoxedProvider, ProviderError> {
        (self.from_env)(env)
    }

    /// Build the provider from a raw document. An empty document is the nil
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns the parse or validation error.
    pub fn from_document(&self, raw: &str) -> Result<BoxedProvider, ProviderError> {
        (self.from_document)(raw)
    }

    /// The commented YAML configuration template.
    #[must_use]
    pub fn template(&self) -> String {
        (self.template)()
    }
}

/// An immutable set of provider descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<ProviderDescriptor>,
}

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    Registry::new(vec![
        ProviderDescriptor::of::<GoDaddy>(&[]),
        ProviderDescriptor::of::<HttpReq>(&[]),
        ProviderDescriptor::of::<Hurricane>(&[]),
        ProviderDescriptor::of::<Linode>(&["linodev4"]),
        ProviderDescriptor::of::<Variomedia>(&[]),
        ProviderDescriptor::of::<Vultr>(&[]),
    ])
});

impl Registry {
    /// Build a registry from descriptors. Later duplicates of a name are ignored.
    #[must_use]
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Self {
        let mut unique: Vec<ProviderDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let taken = std::iter::once(descriptor.name)
                .chain(descriptor.aliases.iter().copied())
                .any(|name| unique.iter().any(|d| d.answers_to(name)));
            if !taken {
                unique.push(descriptor);
            }
        }
        Self {
            descriptors: unique,
        }
    }

    /// The built-in providers.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// All descriptors, in registration order.
    #[must_use]
    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    /// Canonical names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    /// Find the descriptor registered under `name`. Names match exactly.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnrecognizedProvider`] for unknown names.
    pub fn descriptor(&self, name: &str) -> Result<&ProviderDescriptor, ProviderError> {
        self.descriptors
            .iter()
            .find(|d| d.answers_to(name))
            .ok_or_else(|| ProviderError::UnrecognizedProvider {
                name: name.to_string(),
            })
    }

    /// Build the provider `name` from a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnrecognizedProvider`] for unknown names, or
    /// the parse/validation error of the provider.
    pub fn lookup(&self, name: &str, raw: &str) -> Result<BoxedProvider, ProviderError> {
        let descriptor = self.descriptor(name)?;
        debug!(
            requested = %name,
            provider = descriptor.name,
            "Building provider from document"
        );
        descriptor.from_document(raw)
    }

    /// Build the provider `name` from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnrecognizedProvider`] for unknown names, or
    /// the configuration error of the provider.
    pub fn lookup_from_env(
        &self,
        name: &str,
        env: &EnvSnapshot,
    ) -> Result<BoxedProvider, ProviderError> {
        let descriptor = self.descriptor(name)?;
        debug!(
            requested = %name,
            provider = descriptor.name,
            "Building provider from environment"
        );
        descriptor.from_env(env)
    }

    /// The configuration template of provider `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnrecognizedProvider`] for unknown names.
    pub fn template(&self, name: &str) -> Result<String, ProviderError> {
        self.descriptor(name).map(ProviderDescriptor::template)
    }
}

/// Build a built-in provider from a raw document.
///
/// # Errors
///
/// See [`Registry::lookup`].
pub fn lookup(name: &str, raw: &str) -> Result<BoxedProvider, ProviderError> {
    Registry::builtin().lookup(name, raw)
}

/// Build a built-in provider from the process environment.
///
/// # Errors
///
/// See [`Registry::lookup_from_env`].
pub fn lookup_from_env(name: &str) -> Result<BoxedProvider, ProviderError> {
    Registry::builtin().lookup_from_env(name, &EnvSnapshot::from_process())
}

/// Configuration template of a built-in provider.
///
/// # Errors
///
/// See [`Registry::template`].
pub fn template(name: &str) -> Result<String, ProviderError> {
    Registry::builtin().template(name)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
