// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the Linode backend.

#[cfg(test)]
mod tests {
    use crate::challenge::challenge_value;
    use crate::config::{parse_config, EnvSnapshot};
    use crate::errors::ProviderError;
    use crate::provider::{ChallengeProvider, DnsProvider};
    use crate::providers::linode::{publication_wait, Linode};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{any, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, document: &str) -> DnsProvider<Linode> {
        let config = parse_config::<Linode>(document).unwrap().unwrap();
        let backend = Linode::with_base_url(&config, &server.uri()).unwrap();
        DnsProvider::with_backend(config, backend).unwrap()
    }

    async fn mount_domains(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/domains"))
            .and(query_param("page", "1"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 1, "domain": "example.com"}],
                "page": 1,
                "pages": 2,
                "results": 2
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/domains"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 2, "domain": "bar.example.com"}],
                "page": 2,
                "pages": 2,
                "results": 2
            })))
            .mount(server)
            .await;
    }

    // ========================================================================
    // Timeout Tests
    // ========================================================================

    #[test]
    fn test_publication_wait() {
        // 15 minutes left at the top of the cycle, plus TTL and slack.
        assert_eq!(publication_wait(0), Duration::from_secs(15 * 60 + 300 + 120));
        assert_eq!(publication_wait(14), Duration::from_secs(60 + 300 + 120));
        assert_eq!(publication_wait(15), Duration::from_secs(15 * 60 + 300 + 120));
        assert_eq!(publication_wait(52), Duration::from_secs(8 * 60 + 300 + 120));
    }

    #[tokio::test]
    async fn test_timeout_derived_when_unset() {
        let server = MockServer::start().await;
        let provider = provider(&server, "token: token");

        let (timeout, interval) = provider.timeout();

        assert!(timeout > Duration::from_secs(420));
        assert!(timeout <= Duration::from_secs(15 * 60 + 420));
        assert_eq!(interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_configured_timeout_wins() {
        let server = MockServer::start().await;
        let provider = provider(
            &server,
            "token: token\nttl: 3600\npropagationTimeout: 60s\npollingInterval: 2s",
        );

        assert_eq!(
            provider.timeout(),
            (Duration::from_secs(60), Duration::from_secs(2))
        );
    }

    #[tokio::test]
    async fn test_negative_timeout_falls_back_to_publication_wait() {
        let env = EnvSnapshot::from_pairs([
            ("LINODE_TOKEN", "token"),
            ("LINODE_PROPAGATION_TIMEOUT", "-1"),
        ]);
        let from_env = DnsProvider::<Linode>::from_env(&env).unwrap();
        let server = MockServer::start().await;
        let from_document = provider(&server, "token: token\npropagationTimeout: -1");

        for (timeout, _) in [from_env.timeout(), from_document.timeout()] {
            assert!(timeout > Duration::from_secs(420));
            assert!(timeout <= Duration::from_secs(15 * 60 + 420));
        }
    }

    #[test]
    fn test_ttl_minimum_applies_to_env_path() {
        let env = EnvSnapshot::from_pairs([("LINODE_TOKEN", "token"), ("LINODE_TTL", "120")]);

        let err = DnsProvider::<Linode>::from_env(&env).unwrap_err();

        assert_eq!(
            err,
            ProviderError::TtlTooLow {
                provider: "linode".to_string(),
                ttl: 120,
                min: 300,
            }
        );
    }

    // ========================================================================
    // Present / Cleanup Tests
    // ========================================================================

    #[tokio::test]
    async fn test_present_then_cleanup_by_tracked_id() {
        let server = MockServer::start().await;
        mount_domains(&server).await;
        let value = challenge_value("key-auth");

        Mock::given(method("POST"))
            .and(path("/domains/2/records"))
            .and(body_json(json!({
                "type": "TXT",
                "name": "_acme-challenge.foo",
                "target": value,
                "ttl_sec": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4242})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/domains/2/records/4242"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server, "token: token");
        provider
            .present("foo.bar.example.com", "token-1", "key-auth")
            .await
            .unwrap();

        let tracked = provider.tracker().get("token-1").unwrap();
        assert_eq!(tracked.zone_id.as_deref(), Some("2"));
        assert_eq!(tracked.record_id.as_deref(), Some("4242"));

        provider
            .cleanup("foo.bar.example.com", "token-1", "key-auth")
            .await
            .unwrap();
        assert!(provider.tracker().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_unknown_token_issues_no_requests() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider(&server, "token: token")
            .cleanup("example.com", "never-presented", "key-auth")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::UnknownRecord {
                provider: "linode".to_string(),
                fqdn: "_acme-challenge.example.com.".to_string(),
            }
        );
    }
}
