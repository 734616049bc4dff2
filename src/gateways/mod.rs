//! Payment gateway integrations
//!
//! Each gateway wraps one external processor behind a small typed surface:
//! NMI issues hosted card-payment links, EasyPay creates mobile wallet
//! orders and confirms them through a signed webhook callback.

pub mod client;
pub mod easypay;
pub mod error;
pub mod nmi;
pub mod signature;
pub mod types;

pub use easypay::{EasyPayConfig, EasyPayGateway};
pub use error::{GatewayError, GatewayResult};
pub use nmi::{NmiConfig, NmiGateway};
pub use types::{CardLink, WalletOrderQuote, WalletStatus};
