//! HTTP client for the server backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use tracing::debug;

use crate::api::{ApiError, Result, Server, ServerApi, ServerUpdate};
use crate::config::ApiConfig;

const CONNECT_TIMEOUT_SECS: u64 = 8;

#[derive(Clone, Debug)]
pub struct HttpServerClient {
    base_url: String,
    token: Option<String>,
    request_timeout_secs: u64,
    http: Client,
}

impl HttpServerClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            request_timeout_secs: config.request_timeout_secs,
            http,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidUrl(format!("bad path segment {bad:?}")));
        }
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let Some(token) = self.token.as_deref() else {
            return Ok(builder);
        };
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::InvalidToken)?;
        Ok(builder.header(AUTHORIZATION, value))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorize(builder)?.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.request_timeout_secs)
            } else {
                ApiError::Http(e)
            }
        })?;
        check_response(response).await
    }
}

async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ServerApi for HttpServerClient {
    async fn list_servers(&self) -> Result<Vec<Server>> {
        let url = self.url(&["api", "servers"])?;
        debug!("GET {url}");
        let response = self.send(self.http.get(url)).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn update_server(&self, id: &str, update: &ServerUpdate) -> Result<Server> {
        let url = self.url(&["api", "servers", id])?;
        debug!("PATCH {url}");
        let response = self.send(self.http.patch(url).json(update)).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            token: None,
            request_timeout_secs: 5,
            submit_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_update_server_patches_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/servers/s1"))
            .and(body_json(serde_json::json!({
                "name": "New",
                "imageUrl": "http://img/old.png"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "s1",
                "name": "New",
                "imageUrl": "http://img/old.png",
                "members": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpServerClient::new(&config(server.uri())).unwrap();
        let update = ServerUpdate {
            name: "New".to_string(),
            image_url: "http://img/old.png".to_string(),
        };
        let updated = client.update_server("s1", &update).await.unwrap();
        assert_eq!(updated.name, "New");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/servers/s1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Error"))
            .mount(&server)
            .await;

        let client = HttpServerClient::new(&config(server.uri())).unwrap();
        let update = ServerUpdate {
            name: "New".to_string(),
            image_url: "http://img/new.png".to_string(),
        };
        let err = client.update_server("s1", &update).await.unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_servers_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/servers"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "s1", "name": "One", "imageUrl": "http://img/1.png" },
                { "id": "s2", "name": "Two", "imageUrl": "http://img/2.png" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config(format!("{}/", server.uri()));
        config.token = Some("secret".to_string());
        let client = HttpServerClient::new(&config).unwrap();
        let servers = client.list_servers().await.unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].name, "Two");
    }

    fn update() -> ServerUpdate {
        ServerUpdate {
            name: "New".to_string(),
            image_url: "http://img/new.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_server_id_is_one_path_segment() {
        let server = MockServer::start().await;
        for (id, encoded) in [
            ("a/b", "/api/servers/a%2Fb"),
            ("a?b=c", "/api/servers/a%3Fb=c"),
            ("../profiles/p1", "/api/servers/..%2Fprofiles%2Fp1"),
        ] {
            Mock::given(method("PATCH"))
                .and(path(encoded))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "id": id,
                    "name": "New",
                    "imageUrl": "http://img/new.png"
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = HttpServerClient::new(&config(server.uri())).unwrap();
        for id in ["a/b", "a?b=c", "../profiles/p1"] {
            let updated = client.update_server(id, &update()).await.unwrap();
            assert_eq!(updated.id, id);
        }
    }

    #[tokio::test]
    async fn test_dot_segment_id_is_rejected() {
        let client = HttpServerClient::new(&config("http://localhost:1".to_string())).unwrap();
        for id in ["..", ".", ""] {
            let err = client.update_server(id, &update()).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl(_)), "{id:?}: {err}");
        }
    }

    #[tokio::test]
    async fn test_invalid_token_is_not_an_http_status() {
        let mut config = config("http://localhost:1".to_string());
        config.token = Some("bad\ntoken".to_string());
        let client = HttpServerClient::new(&config).unwrap();
        let err = client.list_servers().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/api/servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpServerClient::new(&config(format!("{}/chat/", server.uri()))).unwrap();
        assert!(client.list_servers().await.unwrap().is_empty());
    }
}
