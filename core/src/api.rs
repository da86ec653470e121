//! Endpoint accessor.
//!
//! `Api` borrows a [`Client`] and builds authenticated requests against its
//! host. All dispatch goes back through the client, so two accessors from
//! the same client always behave the same way.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::Client;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// Borrowed view of a `Client` for calling endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Api<'a> {
    client: &'a Client,
}

impl<'a> Api<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Join `path` onto the client's host.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.client.host())
        } else {
            format!("{}/{path}", self.client.host())
        }
    }

    /// A request for `path` carrying the bearer credential.
    pub fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.url(path));
        request.headers.push((
            "authorization".to_string(),
            format!("Bearer {}", self.client.secret()),
        ));
        request
    }

    /// Like [`Api::build_request`], with `body` serialized as JSON.
    pub fn build_json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
        let mut request = self.build_request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    pub fn send_json_request<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Option<T>, ApiError> {
        self.client.send_json_request(request)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.client
            .send_json_request(self.build_request(HttpMethod::Get, path))
    }

    pub fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Post, path, body)?;
        self.client.send_json_request(request)
    }

    pub fn put<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Put, path, body)?;
        self.client.send_json_request(request)
    }

    pub fn patch<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Patch, path, body)?;
        self.client.send_json_request(request)
    }

    /// `DELETE path`; any success body is discarded.
    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.client
            .send_and_discard(self.build_request(HttpMethod::Delete, path))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::TransportError;
    use crate::http::HttpResponse;
    use crate::transport::Transport;

    /// Records every request and answers 200 with the request URL echoed.
    #[derive(Debug, Default)]
    struct Echo {
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for Echo {
        fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let body = json!({ "url": request.url, "method": request.method.as_str() });
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse::new(200, body.to_string()))
        }
    }

    fn client(echo: &Arc<Echo>) -> Client {
        Client::with_config(
            ClientConfig::new("https://api.example.com/")
                .with_secret("app-123")
                .with_transport(echo.clone()),
        )
    }

    #[test]
    fn url_joins_with_single_slash() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);
        let api = client.api();
        assert_eq!(api.url("/v1/parameters"), "https://api.example.com/v1/parameters");
        assert_eq!(api.url("v1/parameters"), "https://api.example.com/v1/parameters");
    }

    #[test]
    fn build_request_attaches_bearer_secret() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);
        let req = client.api().build_request(HttpMethod::Get, "/v1/messages");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/v1/messages");
        assert_eq!(req.header("Authorization"), Some("Bearer app-123"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_json_request_sets_body_and_content_type() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);
        let req = client
            .api()
            .build_json_request(HttpMethod::Post, "/v1/chat-messages", &json!({"query": "hi"}))
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["query"], "hi");
    }

    #[test]
    fn verbs_dispatch_through_the_client() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);
        let api = client.api();

        let got: Value = api.get("/v1/a").unwrap().unwrap();
        assert_eq!(got["method"], "GET");
        let got: Value = api.post("/v1/b", &json!({})).unwrap().unwrap();
        assert_eq!(got["method"], "POST");
        let got: Value = api.put("/v1/c", &json!({})).unwrap().unwrap();
        assert_eq!(got["method"], "PUT");
        let got: Value = api.patch("/v1/d", &json!({})).unwrap().unwrap();
        assert_eq!(got["method"], "PATCH");
        api.delete("/v1/e").unwrap();

        let seen = echo.seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[4].method, HttpMethod::Delete);
        assert_eq!(seen[4].url, "https://api.example.com/v1/e");
    }

    #[test]
    fn repeated_accessors_behave_identically() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);

        let first: Value = client.api().get("/v1/info").unwrap().unwrap();
        let second: Value = client.api().get("/v1/info").unwrap().unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(client.api().client(), client.api().client()));

        let seen = echo.seen.lock().unwrap();
        assert_eq!(seen[0], seen[1]);
    }

    #[test]
    #[allow(deprecated)]
    fn deprecated_accessor_matches_primary() {
        let echo = Arc::new(Echo::default());
        let client = client(&echo);

        let primary: Value = client.api().get("/v1/info").unwrap().unwrap();
        let legacy: Value = client.get_api().get("/v1/info").unwrap().unwrap();
        assert_eq!(primary, legacy);
        assert!(std::ptr::eq(client.get_api().client(), &client));

        let seen = echo.seen.lock().unwrap();
        assert_eq!(seen[0], seen[1]);
    }
}
