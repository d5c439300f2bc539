// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for provider error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;
    use std::time::Duration;

    #[test]
    fn test_unrecognized_provider_names_the_request() {
        let error = ProviderError::UnrecognizedProvider {
            name: "nosuchdns".to_string(),
        };

        assert_eq!(error.to_string(), "DNS provider 'nosuchdns' is not supported");
        assert_eq!(error.provider(), None);
        assert_eq!(error.reason(), "UnrecognizedProvider");
    }

    #[test]
    fn test_missing_credentials_lists_fields() {
        let error = ProviderError::MissingCredentials {
            provider: "godaddy".to_string(),
            fields: vec![
                "apiKey (GODADDY_API_KEY)".to_string(),
                "apiSecret (GODADDY_API_SECRET)".to_string(),
            ],
        };

        assert_eq!(
            error.to_string(),
            "godaddy: some credentials information are missing: \
             apiKey (GODADDY_API_KEY), apiSecret (GODADDY_API_SECRET)"
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn test_ttl_too_low_message() {
        let error = ProviderError::TtlTooLow {
            provider: "linode".to_string(),
            ttl: 60,
            min: 300,
        };

        assert_eq!(
            error.to_string(),
            "linode: invalid TTL, TTL (60) must be greater than or equal to 300"
        );
        assert_eq!(error.reason(), "TTLTooLow");
    }

    #[test]
    fn test_backend_error_keeps_source() {
        let source = BackendError::Http {
            status: 503,
            reason: "GatewayError",
            body: "maintenance".to_string(),
        };
        let error = ProviderError::backend("vultr", source.clone());

        assert_eq!(
            error.to_string(),
            "vultr: unexpected HTTP status 503 (GatewayError): maintenance"
        );
        assert_eq!(error.provider(), Some("vultr"));
        assert_eq!(error.reason(), "GatewayError");
        assert!(error.is_transient());

        match error {
            ProviderError::Backend { source: inner, .. } => assert_eq!(inner, source),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_non_http_reason() {
        let error = ProviderError::backend(
            "hurricane",
            BackendError::Api {
                reason: "badauth".to_string(),
            },
        );

        assert_eq!(error.reason(), "BackendAPIError");
        assert!(!error.is_transient());
    }

    #[test]
    fn test_backend_error_transience() {
        let rate_limited = BackendError::Http {
            status: 429,
            reason: "BackendRateLimited",
            body: String::new(),
        };
        let unauthorized = BackendError::Http {
            status: 401,
            reason: "BackendAuthFailed",
            body: String::new(),
        };
        let transport = BackendError::Transport {
            reason: "connection refused".to_string(),
        };
        let decode = BackendError::Decode {
            reason: "expected value".to_string(),
        };

        assert!(rate_limited.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(transport.is_transient());
        assert!(!decode.is_transient());
    }

    #[test]
    fn test_zone_error_conversion() {
        let not_found = ProviderError::from_zone(
            "vultr",
            "_acme-challenge.example.org.",
            ZoneError::NotFound {
                fqdn: "_acme-challenge.example.org.".to_string(),
            },
        );
        assert_eq!(not_found.reason(), "ZoneNotFound");
        assert!(not_found
            .to_string()
            .starts_with("vultr: could not find zone for '_acme-challenge.example.org.'"));

        let ambiguous = ProviderError::from_zone(
            "vultr",
            "_acme-challenge.example.org.",
            ZoneError::Ambiguous {
                zone: "example.org".to_string(),
            },
        );
        assert_eq!(
            ambiguous,
            ProviderError::AmbiguousZone {
                provider: "vultr".to_string(),
                zone: "example.org".to_string(),
            }
        );

        let backend = ProviderError::from_zone(
            "vultr",
            "_acme-challenge.example.org.",
            ZoneError::Backend(BackendError::Transport {
                reason: "reset".to_string(),
            }),
        );
        assert!(matches!(backend, ProviderError::Backend { .. }));
    }

    #[test]
    fn test_unknown_record_is_permanent() {
        let error = ProviderError::UnknownRecord {
            provider: "variomedia".to_string(),
            fqdn: "_acme-challenge.example.com.".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "variomedia: unknown record ID for '_acme-challenge.example.com.'"
        );
        assert!(!error.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = ProviderError::Timeout {
            provider: "variomedia".to_string(),
            action: "apply change on example.com".to_string(),
            timeout: Duration::from_secs(60),
        };

        assert!(error.is_transient());
        assert_eq!(error.reason(), "Timeout");
        assert!(error.to_string().contains("60s"));
    }
}
