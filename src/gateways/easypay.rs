//! EasyPay mobile wallet integration
//!
//! Orders are created with a JSON POST against the provider API; the payer
//! completes the order on the provider's page and the provider confirms by
//! calling back our webhook with a signed status code.

use crate::gateways::client::GatewayHttpClient;
use crate::gateways::error::{GatewayError, GatewayResult};
use crate::gateways::signature;
use crate::gateways::types::WalletOrderQuote;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct EasyPayConfig {
    pub merchant_id: String,
    pub secret: String,
    pub base_url: String,
    /// Merchant domain the provider echoes back in callbacks
    pub domain: String,
    pub timeout_secs: u64,
}

impl EasyPayConfig {
    pub fn from_env() -> GatewayResult<Self> {
        let require = |name: &str| {
            std::env::var(name).map_err(|_| GatewayError::ValidationError {
                message: format!("{} environment variable is required", name),
                field: Some(name.to_string()),
            })
        };

        Ok(Self {
            merchant_id: require("EASYPAY_MERCHANT_ID")?,
            secret: require("EASYPAY_SECRET")?,
            base_url: std::env::var("EASYPAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.easypay.example".to_string()),
            domain: require("EASYPAY_DOMAIN")?,
            timeout_secs: std::env::var("EASYPAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }
}

pub struct EasyPayGateway {
    config: EasyPayConfig,
    http: GatewayHttpClient,
}

#[derive(Debug, Deserialize)]
struct EasyPayOrderResponse {
    #[serde(rename = "orderId")]
    order_id: String,
    #[serde(rename = "redirectUrl")]
    redirect_url: String,
}

impl EasyPayGateway {
    pub fn new(config: EasyPayConfig) -> GatewayResult<Self> {
        let http = GatewayHttpClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(EasyPayConfig::from_env()?)
    }

    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Create an order at the provider and return the payer redirect link
    pub async fn create_order(
        &self,
        invoice_number: &str,
        amount: &str,
        mobile_number: Option<&str>,
    ) -> GatewayResult<WalletOrderQuote> {
        if amount.trim().is_empty() {
            return Err(GatewayError::ValidationError {
                message: "amount is required".to_string(),
                field: Some("amount".to_string()),
            });
        }

        let url = format!("{}/orders", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "storeId": self.config.merchant_id,
            "orderRefNum": invoice_number,
            "amount": amount,
            "mobileNum": mobile_number,
            "merchantDomain": self.config.domain,
        });

        let response: EasyPayOrderResponse = self
            .http
            .post_json("easypay", &url, Some(&self.config.secret), &body)
            .await?;

        if response.order_id.is_empty() {
            return Err(GatewayError::InvalidResponse {
                gateway: "easypay".to_string(),
                message: "order response missing orderId".to_string(),
            });
        }

        info!(order_id = %response.order_id, order_ref = %invoice_number, "easypay order created");

        Ok(WalletOrderQuote {
            order_id: response.order_id,
            redirect_url: response.redirect_url,
        })
    }

    /// Check a callback signature against this merchant's secret.
    ///
    /// `domain` comes from the stored order row so a callback is checked
    /// against the domain the order was actually created under.
    pub fn verify_callback(&self, order_id: &str, status: &str, domain: &str, hash: &str) -> bool {
        signature::verify_callback_hash(&self.config.secret, order_id, status, domain, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::signature::compute_callback_hash;

    fn test_gateway() -> EasyPayGateway {
        EasyPayGateway::new(EasyPayConfig {
            merchant_id: "store_1".to_string(),
            secret: "wallet-secret".to_string(),
            base_url: "https://api.easypay.example".to_string(),
            domain: "billing.example.com".to_string(),
            timeout_secs: 5,
        })
        .expect("gateway should build")
    }

    #[test]
    fn valid_callback_signature_is_accepted() {
        let gateway = test_gateway();
        let hash = compute_callback_hash("wallet-secret", "ord_99", "E", "billing.example.com");
        assert!(gateway.verify_callback("ord_99", "E", "billing.example.com", &hash));
    }

    #[test]
    fn callback_signed_with_wrong_secret_is_rejected() {
        let gateway = test_gateway();
        let hash = compute_callback_hash("other-secret", "ord_99", "E", "billing.example.com");
        assert!(!gateway.verify_callback("ord_99", "E", "billing.example.com", &hash));
    }

    #[test]
    fn callback_for_different_status_is_rejected() {
        let gateway = test_gateway();
        let hash = compute_callback_hash("wallet-secret", "ord_99", "E", "billing.example.com");
        assert!(!gateway.verify_callback("ord_99", "C", "billing.example.com", &hash));
    }
}
