#[cfg(test)]
mod webhook_callback_tests {
    use billfold_backend::gateways::easypay::{EasyPayConfig, EasyPayGateway};
    use billfold_backend::gateways::signature::{compute_callback_hash, verify_callback_hash};
    use billfold_backend::gateways::types::WalletStatus;
    use billfold_backend::services::webhook_processor::CallbackOutcome;

    const SECRET: &str = "wallet-secret";
    const DOMAIN: &str = "billing.example.com";

    fn gateway() -> EasyPayGateway {
        EasyPayGateway::new(EasyPayConfig {
            merchant_id: "store_1".to_string(),
            secret: SECRET.to_string(),
            base_url: "https://api.easypay.example".to_string(),
            domain: DOMAIN.to_string(),
            timeout_secs: 5,
        })
        .expect("gateway should build")
    }

    #[test]
    fn signature_accepts_iff_hash_matches() {
        let hash = compute_callback_hash(SECRET, "ord_1", "E", DOMAIN);

        assert!(verify_callback_hash(SECRET, "ord_1", "E", DOMAIN, &hash));

        // any single changed input must flip the verdict
        assert!(!verify_callback_hash(SECRET, "ord_2", "E", DOMAIN, &hash));
        assert!(!verify_callback_hash(SECRET, "ord_1", "C", DOMAIN, &hash));
        assert!(!verify_callback_hash(SECRET, "ord_1", "E", "other.example", &hash));
        assert!(!verify_callback_hash("other-secret", "ord_1", "E", DOMAIN, &hash));
        assert!(!verify_callback_hash(SECRET, "ord_1", "E", DOMAIN, "deadbeef"));
        assert!(!verify_callback_hash(SECRET, "ord_1", "E", DOMAIN, ""));

        // not even a whitespace-padded copy of the right digest
        let padded = format!(" {}\n", hash);
        assert!(!verify_callback_hash(SECRET, "ord_1", "E", DOMAIN, &padded));
    }

    #[test]
    fn gateway_verification_uses_order_domain() {
        let gateway = gateway();
        let hash = compute_callback_hash(SECRET, "ord_7", "E", DOMAIN);

        assert!(gateway.verify_callback("ord_7", "E", DOMAIN, &hash));
        assert!(!gateway.verify_callback("ord_7", "E", "spoofed.example", &hash));
    }

    #[test]
    fn status_code_mapping_table() {
        let cases = [
            ("E", "paid", "paid"),
            ("R", "failed", "failed"),
            ("X", "failed", "failed"),
            ("C", "void", "void"),
            ("Z", "pending", "pending"),
            ("", "pending", "pending"),
            ("EE", "pending", "pending"),
        ];

        for (code, invoice_status, payment_status) in cases {
            let status = WalletStatus::from_code(code);
            assert_eq!(status.invoice_status(), invoice_status, "code {:?}", code);
            assert_eq!(status.payment_status(), payment_status, "code {:?}", code);
        }
    }

    #[test]
    fn only_documented_codes_are_terminal() {
        for code in ["E", "R", "X", "C"] {
            assert!(WalletStatus::from_code(code).is_terminal());
        }
        for code in ["", "P", "e", "other"] {
            assert!(!WalletStatus::from_code(code).is_terminal());
        }
    }

    #[test]
    fn callback_outcome_serializes_with_tag() {
        let processed = CallbackOutcome::Processed {
            payment_status: "paid".to_string(),
            invoice_status: "paid".to_string(),
        };
        let value = serde_json::to_value(&processed).expect("serialize");
        assert_eq!(value["outcome"], "processed");
        assert_eq!(value["payment_status"], "paid");

        let replay = serde_json::to_value(CallbackOutcome::AlreadyProcessed).expect("serialize");
        assert_eq!(replay["outcome"], "already_processed");
    }

    #[test]
    fn hash_is_hex_encoded_sha256_length() {
        let hash = compute_callback_hash(SECRET, "ord_1", "E", DOMAIN);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
