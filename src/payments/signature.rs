//! Webhook signature verification.
//!
//! The provider sends `Stripe-Signature: t=<unix seconds>,v1=<hex>[,v1=<hex>...]`
//! where each `v1` is the HMAC-SHA256 of `"{t}.{raw body}"` keyed with the
//! endpoint secret. Several `v1` entries appear while a secret is rolled.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::payments::{PaymentError, PaymentResult};

type HmacSha256 = Hmac<Sha256>;

pub static SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<Vec<u8>>,
}

pub fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(PaymentError::SignatureHeaderMalformed);
        };

        match key {
            "t" => {
                let parsed = value
                    .parse::<i64>()
                    .map_err(|_| PaymentError::SignatureHeaderMalformed)?;
                timestamp = Some(parsed);
            }
            "v1" => {
                // undecodable entries can never match, skip them
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {} // v0 and future schemes
        }
    }

    let timestamp = timestamp.ok_or(PaymentError::SignatureHeaderMalformed)?;
    if signatures.is_empty() {
        return Err(PaymentError::SignatureHeaderMalformed);
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Hex signature for `payload` signed at `timestamp`, as the provider computes it.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(mac_for(secret, timestamp, payload).finalize().into_bytes())
}

/// Full header value, handy for tests and local webhook replays.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)
    )
}

pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<()> {
    let header = parse_signature_header(header)?;

    let matches = header.signatures.iter().any(|candidate| {
        mac_for(secret, header.timestamp, payload)
            .verify_slice(candidate)
            .is_ok()
    });
    if !matches {
        return Err(PaymentError::SignatureMismatch);
    }

    if tolerance_secs > 0 && (now - header.timestamp).abs() > tolerance_secs {
        return Err(PaymentError::SignatureExpired {
            timestamp: header.timestamp,
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn valid_signature_test() {
        let header = signature_header(SECRET, NOW, PAYLOAD);
        assert!(verify_signature(SECRET, PAYLOAD, &header, 300, NOW + 10).is_ok());
    }

    #[test]
    fn wrong_secret_test() {
        let header = signature_header("wrong_secret", NOW, PAYLOAD);
        let result = verify_signature(SECRET, PAYLOAD, &header, 300, NOW);
        assert!(matches!(result, Err(PaymentError::SignatureMismatch)));
    }

    #[test]
    fn modified_payload_test() {
        let header = signature_header(SECRET, NOW, PAYLOAD);
        let tampered = br#"{"type":"checkout.session.completed","hacked":true}"#;
        let result = verify_signature(SECRET, tampered, &header, 300, NOW);
        assert!(matches!(result, Err(PaymentError::SignatureMismatch)));
    }

    #[test]
    fn stale_timestamp_test() {
        let header = signature_header(SECRET, NOW - 600, PAYLOAD);
        let result = verify_signature(SECRET, PAYLOAD, &header, 300, NOW);
        assert!(matches!(
            result,
            Err(PaymentError::SignatureExpired { timestamp }) if timestamp == NOW - 600
        ));
    }

    #[test]
    fn zero_tolerance_skips_timestamp_check_test() {
        let header = signature_header(SECRET, NOW - 86_400, PAYLOAD);
        assert!(verify_signature(SECRET, PAYLOAD, &header, 0, NOW).is_ok());
    }

    #[test]
    fn rolled_secret_test() {
        let old = compute_signature("whsec_old", NOW, PAYLOAD);
        let new = compute_signature(SECRET, NOW, PAYLOAD);
        let header = format!("t={NOW},v1={old},v1={new}");
        assert!(verify_signature(SECRET, PAYLOAD, &header, 300, NOW).is_ok());
    }

    #[test]
    fn malformed_headers_test() {
        for header in ["", "garbage", "t=1234567890", "v1=abcdef", "t=abc,v1=00", "t=1,v1=zz"] {
            let result = verify_signature(SECRET, PAYLOAD, header, 300, NOW);
            assert!(
                matches!(result, Err(PaymentError::SignatureHeaderMalformed)),
                "header `{header}` should be malformed"
            );
        }
    }

    #[test]
    fn parse_ignores_unknown_schemes_test() {
        let parsed = parse_signature_header("t=42,v0=ff,v1=00ff").unwrap();
        assert_eq!(parsed.timestamp, 42);
        assert_eq!(parsed.signatures, vec![vec![0x00, 0xff]]);
    }
}
