use crate::gateways::error::{GatewayError, GatewayResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Thin HTTP client shared by the gateway integrations.
///
/// Failed requests are not retried; failures surface at the handler
/// boundary as gateway errors.
#[derive(Clone)]
pub struct GatewayHttpClient {
    client: Client,
    timeout: Duration,
}

impl GatewayHttpClient {
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GatewayError::NetworkError {
                gateway: "http".to_string(),
                message: format!("failed to initialize HTTP client: {}", e),
            }
        })?;

        Ok(Self { client, timeout })
    }

    /// POST form-encoded fields, returning the raw response body.
    ///
    /// The card processor answers with a URL-encoded body rather than JSON,
    /// so decoding is left to the caller.
    pub async fn post_form<F: Serialize>(
        &self,
        gateway: &str,
        url: &str,
        fields: &F,
    ) -> GatewayResult<String> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .form(fields)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError {
                gateway: gateway.to_string(),
                message: format!("gateway request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::ApiError {
                gateway: gateway.to_string(),
                message: format!("HTTP {}: {}", status, body),
                code: Some(status.as_u16().to_string()),
                retryable: status.is_server_error(),
            });
        }

        Ok(body)
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        gateway: &str,
        url: &str,
        bearer_token: Option<&str>,
        body: &JsonValue,
    ) -> GatewayResult<T> {
        let mut request = self.client.post(url).timeout(self.timeout).json(body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError {
                gateway: gateway.to_string(),
                message: format!("gateway request failed: {}", e),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::ApiError {
                gateway: gateway.to_string(),
                message: format!("HTTP {}: {}", status, text),
                code: Some(status.as_u16().to_string()),
                retryable: status.is_server_error(),
            });
        }

        serde_json::from_str::<T>(&text).map_err(|e| GatewayError::InvalidResponse {
            gateway: gateway.to_string(),
            message: format!("invalid JSON response: {}", e),
        })
    }
}
