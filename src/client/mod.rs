//! Thin client for the geospatial server under test.
//!
//! Covers the management REST API (workspaces, datastores, feature types,
//! coverage stores, styles) and the OWS front doors (WMS/WFS/WMTS) that the
//! acceptance tests exercise. Calls return a [`ClientResponse`] carrying both
//! body and status so tests assert on status explicitly instead of catching
//! errors.

pub mod coverage;
pub mod datastore;
pub mod featuretype;
pub mod ows;
pub mod style;
pub mod workspace;

use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::HarnessResult;

pub use featuretype::{FeatureTypeAttribute, InternationalTitle};

#[derive(Clone)]
pub struct GeoServerClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl GeoServerClient {
    pub fn new(config: &Config) -> Self {
        Self::with_credentials(
            &config.geoserver_url,
            &config.geoserver_username,
            &config.geoserver_password,
        )
    }

    pub fn with_credentials(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a path (starting with `/`) onto the server base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> HarnessResult<ClientResponse> {
        self.request(Method::GET, path, RequestBody::Empty).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> HarnessResult<ClientResponse> {
        let request = self
            .http
            .get(self.url(path))
            .query(query)
            .basic_auth(&self.username, Some(&self.password));

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> HarnessResult<ClientResponse> {
        self.request(Method::POST, path, RequestBody::Json(body.clone()))
            .await
    }

    /// Make a PUT request with JSON body
    pub async fn put_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> HarnessResult<ClientResponse> {
        self.request(Method::PUT, path, RequestBody::Json(body.clone()))
            .await
    }

    /// Make a POST request with a raw body and explicit content type
    pub async fn post_raw(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> HarnessResult<ClientResponse> {
        self.request(
            Method::POST,
            path,
            RequestBody::Raw {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        )
        .await
    }

    /// Make a PUT request with a raw body and explicit content type
    pub async fn put_raw(
        &self,
        path: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> HarnessResult<ClientResponse> {
        self.request(
            Method::PUT,
            path,
            RequestBody::Raw {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        )
        .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> HarnessResult<ClientResponse> {
        self.request(Method::DELETE, path, RequestBody::Empty).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> HarnessResult<ClientResponse> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.password));

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Raw { body, content_type } => request
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body),
        };

        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> HarnessResult<ClientResponse> {
        let response = request.send().await?;
        ClientResponse::from_response(response).await
    }
}

enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Raw { body: Bytes, content_type: String },
}

/// A response from the server under test, with convenient assertion helpers.
pub struct ClientResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    url: String,
}

impl ClientResponse {
    async fn from_response(response: reqwest::Response) -> HarnessResult<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    /// Get the Content-Type header value
    pub fn content_type(&self) -> Option<String> {
        self.header("content-type")
    }

    /// Turn an unexpected status into an error, for library callers that
    /// propagate instead of asserting.
    pub fn ensure_status(self, expected: StatusCode) -> HarnessResult<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(crate::error::HarnessError::UnexpectedStatus {
                url: self.url.clone(),
                status: self.status.as_u16(),
                body: self.text(),
            })
        }
    }

    /// Assert the status code
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} from {}, got {}. Body: {}",
            expected,
            self.url,
            self.status,
            self.text()
        );
        self
    }

    /// Assert the status is success (2xx)
    #[track_caller]
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.status.is_success(),
            "Expected success status from {}, got {}. Body: {}",
            self.url,
            self.status,
            self.text()
        );
        self
    }

    /// Assert content type header
    #[track_caller]
    pub fn assert_content_type(&self, expected: &str) -> &Self {
        let content_type = self.content_type().unwrap_or_default();
        assert!(
            content_type.starts_with(expected),
            "Expected content type starting with {}, got {}",
            expected,
            content_type
        );
        self
    }
}
