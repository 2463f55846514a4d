//! HTTP transport implementations.

use crate::errors::{GatewayError, GatewayResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// HTTP transport trait for making requests to the provider API.
///
/// Status handling belongs to the service layer: any response the provider
/// sends back, success or not, is returned as `Ok`; only transport-level
/// failures (connect, DNS, socket) become errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and return the raw response
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> GatewayResult<Response<Bytes>>;
}

/// Reqwest-based HTTP transport implementation
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport.
    ///
    /// The client-level timeout is a backstop; per-attempt deadlines are
    /// enforced by the resilience layer.
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    fn to_reqwest_method(&self, method: Method) -> reqwest::Method {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
            Method::PATCH => reqwest::Method::PATCH,
            _ => reqwest::Method::GET,
        }
    }

    fn to_reqwest_headers(&self, headers: HeaderMap) -> reqwest::header::HeaderMap {
        let mut reqwest_headers = reqwest::header::HeaderMap::new();
        for (name, value) in headers.iter() {
            if let Ok(header_name) =
                reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes())
            {
                if let Ok(header_value) = reqwest::header::HeaderValue::from_bytes(value.as_bytes())
                {
                    reqwest_headers.insert(header_name, header_value);
                }
            }
        }
        reqwest_headers
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> GatewayResult<Response<Bytes>> {
        let reqwest_method = self.to_reqwest_method(method);
        let reqwest_headers = self.to_reqwest_headers(headers);

        let mut request = self
            .client
            .request(reqwest_method, url.as_str())
            .headers(reqwest_headers);

        if let Some(body_data) = body {
            request = request.body(body_data.to_vec());
        }

        let response = request.send().await?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body_bytes = response.bytes().await?;

        let mut http_response = Response::builder().status(
            StatusCode::from_u16(status.as_u16()).map_err(|e| GatewayError::Internal {
                message: format!("Invalid status code: {}", e),
            })?,
        );

        for (name, value) in response_headers.iter() {
            http_response = http_response.header(name.as_str(), value.as_bytes());
        }

        let response =
            http_response
                .body(body_bytes)
                .map_err(|e| GatewayError::Internal {
                    message: format!("Failed to build response: {}", e),
                })?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(Duration::from_secs(45));
        assert!(transport.is_ok());
    }

    #[test]
    fn test_method_conversion() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        assert_eq!(
            transport.to_reqwest_method(Method::POST),
            reqwest::Method::POST
        );
        assert_eq!(
            transport.to_reqwest_method(Method::GET),
            reqwest::Method::GET
        );
    }

    #[test]
    fn test_header_conversion() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());

        let converted = transport.to_reqwest_headers(headers);
        assert_eq!(converted.get("content-type").unwrap(), "application/json");
    }
}
