//! Webhook callback signature verification
//!
//! The wallet provider signs its callback by HMAC-SHA256 over the
//! concatenation `orderId + status + domain`, hex-encoded. Authenticity of
//! a callback rests entirely on this check.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Recompute the callback signature for the given parameters
pub fn compute_callback_hash(secret: &str, order_id: &str, status: &str, domain: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail in practice
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(order_id.as_bytes());
    mac.update(status.as_bytes());
    mac.update(domain.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received `hash` against the recomputed signature, in constant time
pub fn verify_callback_hash(
    secret: &str,
    order_id: &str,
    status: &str,
    domain: &str,
    hash: &str,
) -> bool {
    let computed = compute_callback_hash(secret, order_id, status, domain);
    secure_eq(computed.as_bytes(), hash.as_bytes())
}

pub fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_eq_behaves_correctly() {
        assert!(secure_eq(b"abc", b"abc"));
        assert!(!secure_eq(b"abc", b"abd"));
        assert!(!secure_eq(b"abc", b"ab"));
    }

    #[test]
    fn recomputed_hash_round_trips() {
        let hash = compute_callback_hash("secret", "ord_1", "E", "merchant.example");
        assert!(verify_callback_hash("secret", "ord_1", "E", "merchant.example", &hash));
    }

    #[test]
    fn tampered_parameters_are_rejected() {
        let hash = compute_callback_hash("secret", "ord_1", "E", "merchant.example");
        assert!(!verify_callback_hash("secret", "ord_1", "R", "merchant.example", &hash));
        assert!(!verify_callback_hash("secret", "ord_2", "E", "merchant.example", &hash));
        assert!(!verify_callback_hash("secret", "ord_1", "E", "other.example", &hash));
        assert!(!verify_callback_hash("wrong", "ord_1", "E", "merchant.example", &hash));
    }

    #[test]
    fn hash_is_over_concatenated_fields() {
        // Moving a character between fields must change the digest
        let a = compute_callback_hash("secret", "ord_1E", "", "d");
        let b = compute_callback_hash("secret", "ord_1", "E", "d");
        assert_eq!(a, b); // same byte stream, same digest

        let c = compute_callback_hash("secret", "ord_1", "", "Ed");
        assert_eq!(b, c);
    }

    #[test]
    fn received_hash_must_match_byte_for_byte() {
        let hash = compute_callback_hash("secret", "ord_1", "E", "merchant.example");
        assert!(verify_callback_hash("secret", "ord_1", "E", "merchant.example", &hash));

        // padded, truncated, or re-cased variants are all rejected
        assert!(!verify_callback_hash(
            "secret",
            "ord_1",
            "E",
            "merchant.example",
            &format!(" {}\n", hash)
        ));
        assert!(!verify_callback_hash(
            "secret",
            "ord_1",
            "E",
            "merchant.example",
            &hash[..hash.len() - 1]
        ));
        assert!(!verify_callback_hash(
            "secret",
            "ord_1",
            "E",
            "merchant.example",
            &hash.to_uppercase()
        ));
    }
}
