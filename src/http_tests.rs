// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the shared backend HTTP client.

#[cfg(test)]
mod tests {
    use crate::errors::BackendError;
    use crate::http::{build_api_url, ApiClient, Auth};
    use reqwest::Method;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    fn client(server: &MockServer, auth: Auth) -> ApiClient {
        ApiClient::new(&server.uri(), auth, Duration::from_secs(5)).unwrap()
    }

    // ========================================================================
    // URL Tests
    // ========================================================================

    #[test]
    fn test_build_api_url() {
        assert_eq!(build_api_url("https://api.example.com/"), "https://api.example.com");
        assert_eq!(build_api_url("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(build_api_url("api.example.com/v2//"), "https://api.example.com/v2");
    }

    #[test]
    fn test_url_joins_paths() {
        let client = ApiClient::new("https://api.example.com/v4/", Auth::None, Duration::ZERO)
            .unwrap();

        assert_eq!(client.base_url(), "https://api.example.com/v4");
        assert_eq!(client.url("/domains"), "https://api.example.com/v4/domains");
        assert_eq!(client.url("domains/1"), "https://api.example.com/v4/domains/1");
        assert_eq!(client.url(""), "https://api.example.com/v4");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ApiClient::new("http://exa mple.com", Auth::None, Duration::ZERO).unwrap_err();
        assert!(matches!(err, BackendError::Transport { .. }));
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let rendered = format!(
            "{:?}",
            Auth::Basic {
                username: "user".to_string(),
                password: "hunter2".to_string(),
            }
        );
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", Auth::Bearer("token".to_string())).contains("token"));
    }

    // ========================================================================
    // Request Tests
    // ========================================================================

    #[tokio::test]
    async fn test_get_json_sends_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let item: Item = client(&server, Auth::Bearer("secret-token".to_string()))
            .get_json("/items", &[("page", "2".to_string())])
            .await
            .unwrap();

        assert_eq!(item, Item { id: 7 });
    }

    #[tokio::test]
    async fn test_send_json_with_vendor_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/records"))
            .and(header("Authorization", "sso-key k:s"))
            .and(body_json(json!({"name": "_acme-challenge"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Auth::Header {
            name: "Authorization",
            value: "sso-key k:s".to_string(),
        };
        let item: Item = client(&server, auth)
            .send_json(Method::POST, "/records", &json!({"name": "_acme-challenge"}))
            .await
            .unwrap();

        assert_eq!(item.id, 9);
    }

    #[tokio::test]
    async fn test_basic_auth_and_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nic/update"))
            .and(basic_auth("user", "pass"))
            .respond_with(ResponseTemplate::new(200).set_body_string("good"))
            .expect(1)
            .mount(&server)
            .await;

        let auth = Auth::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let body = client(&server, auth)
            .post_form("/nic/update", &[("hostname", "example.com")])
            .await
            .unwrap();

        assert_eq!(body, "good");
    }

    // ========================================================================
    // Error Mapping Tests
    // ========================================================================

    #[tokio::test]
    async fn test_non_success_status_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such record"))
            .mount(&server)
            .await;

        let err = client(&server, Auth::None)
            .delete("/records/1")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BackendError::Http {
                status: 404,
                reason: "BackendNotFound",
                body: "no such record".to_string(),
            }
        );
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server, Auth::None)
            .get_json::<Item>("/items", &[])
            .await
            .unwrap_err();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unexpected_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server, Auth::None)
            .get_json::<Item>("/items", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_transport_error() {
        use std::io::{Read, Write};

        // Promise more bytes than are sent, then close the connection.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"id\":")
                .unwrap();
        });

        let client =
            ApiClient::new(&format!("http://{addr}"), Auth::None, Duration::from_secs(5)).unwrap();
        let err = client.get_json::<Item>("/items", &[]).await.unwrap_err();
        server.join().unwrap();

        match err {
            BackendError::Transport { reason } => {
                assert!(reason.starts_with("failed to read response body"), "{reason}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:9", Auth::None, Duration::from_secs(2))
            .unwrap();

        let err = client.delete("/records/1").await.unwrap_err();

        assert!(matches!(err, BackendError::Transport { .. }));
        assert!(err.is_transient());
    }
}
