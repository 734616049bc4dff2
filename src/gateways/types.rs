use serde::{Deserialize, Serialize};

/// Wallet provider status codes carried by the webhook callback.
///
/// The provider reports a single-character code; anything outside the
/// documented set is treated as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    /// `E` - order executed, funds captured
    Completed,
    /// `R` - rejected by the payer or the provider
    Rejected,
    /// `X` - order expired before completion
    Expired,
    /// `C` - cancelled by the merchant
    Cancelled,
    /// Any other code
    Pending,
}

impl WalletStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "E" => WalletStatus::Completed,
            "R" => WalletStatus::Rejected,
            "X" => WalletStatus::Expired,
            "C" => WalletStatus::Cancelled,
            _ => WalletStatus::Pending,
        }
    }

    /// Internal invoice status this code maps to
    pub fn invoice_status(&self) -> &'static str {
        match self {
            WalletStatus::Completed => "paid",
            WalletStatus::Rejected | WalletStatus::Expired => "failed",
            WalletStatus::Cancelled => "void",
            WalletStatus::Pending => "pending",
        }
    }

    /// Internal payment status this code maps to
    pub fn payment_status(&self) -> &'static str {
        match self {
            WalletStatus::Completed => "paid",
            WalletStatus::Rejected | WalletStatus::Expired => "failed",
            WalletStatus::Cancelled => "void",
            WalletStatus::Pending => "pending",
        }
    }

    /// Terminal statuses are never reprocessed on a replayed callback
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WalletStatus::Pending)
    }

    /// Whether a stored payment status was set by an earlier terminal callback
    pub fn is_terminal_status(status: &str) -> bool {
        matches!(status, "paid" | "failed" | "void")
    }
}

/// Hosted-payment-page link returned by the card processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardLink {
    pub transaction_id: String,
    pub payment_url: String,
    pub amount: String,
}

/// Remote wallet order created at the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletOrderQuote {
    pub order_id: String,
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_internal_states() {
        assert_eq!(WalletStatus::from_code("E"), WalletStatus::Completed);
        assert_eq!(WalletStatus::from_code("E").invoice_status(), "paid");
        assert_eq!(WalletStatus::from_code("E").payment_status(), "paid");

        assert_eq!(WalletStatus::from_code("R").invoice_status(), "failed");
        assert_eq!(WalletStatus::from_code("X").payment_status(), "failed");

        assert_eq!(WalletStatus::from_code("C").invoice_status(), "void");
        assert_eq!(WalletStatus::from_code("C").payment_status(), "void");
    }

    #[test]
    fn unknown_codes_stay_pending() {
        for code in ["", "Z", "EE", "e", "0"] {
            let status = WalletStatus::from_code(code);
            assert_eq!(status, WalletStatus::Pending);
            assert_eq!(status.invoice_status(), "pending");
            assert_eq!(status.payment_status(), "pending");
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn documented_codes_are_terminal() {
        for code in ["E", "R", "X", "C"] {
            assert!(WalletStatus::from_code(code).is_terminal());
        }
    }

    #[test]
    fn settled_payment_statuses_are_terminal() {
        for status in ["paid", "failed", "void"] {
            assert!(WalletStatus::is_terminal_status(status));
        }
        for status in ["created", "pending", ""] {
            assert!(!WalletStatus::is_terminal_status(status));
        }
    }
}
