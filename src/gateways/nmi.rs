//! NMI card processor integration
//!
//! The processor takes form-encoded fields on a fixed endpoint and answers
//! with a URL-encoded body carrying a response code, a transaction id, and
//! the hosted-payment-page URL.

use crate::gateways::client::GatewayHttpClient;
use crate::gateways::error::{GatewayError, GatewayResult};
use crate::gateways::types::CardLink;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct NmiConfig {
    pub security_key: String,
    pub endpoint_url: String,
    pub redirect_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NmiConfig {
    fn default() -> Self {
        Self {
            security_key: String::new(),
            endpoint_url: "https://secure.nmi.com/api/transact.php".to_string(),
            redirect_url: None,
            timeout_secs: 30,
        }
    }
}

impl NmiConfig {
    pub fn from_env() -> GatewayResult<Self> {
        let security_key =
            std::env::var("NMI_SECURITY_KEY").map_err(|_| GatewayError::ValidationError {
                message: "NMI_SECURITY_KEY environment variable is required".to_string(),
                field: Some("NMI_SECURITY_KEY".to_string()),
            })?;

        Ok(Self {
            endpoint_url: std::env::var("NMI_ENDPOINT_URL")
                .unwrap_or_else(|_| "https://secure.nmi.com/api/transact.php".to_string()),
            redirect_url: std::env::var("NMI_REDIRECT_URL").ok(),
            timeout_secs: std::env::var("NMI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            security_key,
        })
    }
}

pub struct NmiGateway {
    config: NmiConfig,
    http: GatewayHttpClient,
}

#[derive(Debug, Serialize)]
struct NmiLinkRequest<'a> {
    security_key: &'a str,
    #[serde(rename = "type")]
    transaction_type: &'a str,
    amount: &'a str,
    order_id: &'a str,
    order_description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_url: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct NmiResponse {
    response: String,
    #[serde(default)]
    responsetext: Option<String>,
    #[serde(default)]
    response_code: Option<String>,
    #[serde(default)]
    transactionid: Option<String>,
    #[serde(default)]
    form_url: Option<String>,
}

impl NmiGateway {
    pub fn new(config: NmiConfig) -> GatewayResult<Self> {
        let http = GatewayHttpClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(NmiConfig::from_env()?)
    }

    /// Request a hosted-payment-page link for an invoice
    pub async fn create_payment_link(
        &self,
        invoice_number: &str,
        amount: &str,
    ) -> GatewayResult<CardLink> {
        if amount.trim().is_empty() {
            return Err(GatewayError::ValidationError {
                message: "amount is required".to_string(),
                field: Some("amount".to_string()),
            });
        }

        let description = format!("Invoice {}", invoice_number);
        let request = NmiLinkRequest {
            security_key: &self.config.security_key,
            transaction_type: "sale",
            amount,
            order_id: invoice_number,
            order_description: &description,
            redirect_url: self.config.redirect_url.as_deref(),
        };

        let body = self
            .http
            .post_form("nmi", &self.config.endpoint_url, &request)
            .await?;
        let parsed = parse_response(&body)?;

        // response 1 = approved, 2 = declined, 3 = error
        if parsed.response != "1" {
            let message = parsed
                .responsetext
                .unwrap_or_else(|| "transaction rejected".to_string());
            return Err(GatewayError::Declined {
                gateway: "nmi".to_string(),
                code: parsed.response_code.or(Some(parsed.response)),
                message,
            });
        }

        let transaction_id = parsed
            .transactionid
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse {
                gateway: "nmi".to_string(),
                message: "approved response missing transactionid".to_string(),
            })?;
        let payment_url = parsed
            .form_url
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse {
                gateway: "nmi".to_string(),
                message: "approved response missing form_url".to_string(),
            })?;

        info!(transaction_id = %transaction_id, order_id = %invoice_number, "nmi payment link created");

        Ok(CardLink {
            transaction_id,
            payment_url,
            amount: amount.to_string(),
        })
    }
}

/// Decode NMI's URL-encoded response body
fn parse_response(body: &str) -> GatewayResult<NmiResponse> {
    serde_urlencoded::from_str::<NmiResponse>(body).map_err(|e| GatewayError::InvalidResponse {
        gateway: "nmi".to_string(),
        message: format!("invalid URL-encoded response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approved_response_parses() {
        let body = "response=1&responsetext=SUCCESS&transactionid=1234567890\
                    &response_code=100&form_url=https%3A%2F%2Fsecure.nmi.com%2Fpay%2Fabc";
        let parsed = parse_response(body).expect("parse should succeed");
        assert_eq!(parsed.response, "1");
        assert_eq!(parsed.transactionid.as_deref(), Some("1234567890"));
        assert_eq!(
            parsed.form_url.as_deref(),
            Some("https://secure.nmi.com/pay/abc")
        );
    }

    #[test]
    fn declined_response_parses_without_link_fields() {
        let body = "response=2&responsetext=DECLINE&response_code=200";
        let parsed = parse_response(body).expect("parse should succeed");
        assert_eq!(parsed.response, "2");
        assert!(parsed.form_url.is_none());
    }

    #[test]
    fn link_request_serializes_to_form_fields() {
        let request = NmiLinkRequest {
            security_key: "sk_test",
            transaction_type: "sale",
            amount: "150.00",
            order_id: "INV-0042",
            order_description: "Invoice INV-0042",
            redirect_url: None,
        };
        let encoded = serde_urlencoded::to_string(&request).expect("encode should succeed");
        assert!(encoded.contains("security_key=sk_test"));
        assert!(encoded.contains("type=sale"));
        assert!(encoded.contains("order_id=INV-0042"));
        assert!(!encoded.contains("redirect_url"));
    }
}
