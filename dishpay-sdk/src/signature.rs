//! Webhook signature scheme used by Stripe.
//!
//! The processor signs every delivery and sends the result in a header:
//!
//! ```text
//! Stripe-Signature: t={unix_timestamp},v1={hex_signature}[,v1={hex_signature}...]
//! ```
//!
//! Each `v1` value is `HMAC-SHA256("{timestamp}.{raw_body}", webhook_secret)`.
//! Several `v1` entries appear while a secret is being rolled; a delivery is
//! authentic if any of them matches.

use ring::hmac;

use crate::objects::Event;

/// Header name carrying the webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Default maximum age of a signed delivery (in seconds).
pub const DEFAULT_TOLERANCE_SECS: i64 = 5 * 60;

const SIGNATURE_SCHEME: &str = "v1";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("unable to extract timestamp and signatures from header")]
    InvalidFormat,
    #[error("no signatures found with expected scheme v1")]
    NoSignatures,
    #[error("no signatures found matching the expected signature for payload")]
    SignatureMismatch,
    #[error("timestamp outside the tolerance zone")]
    Expired,
    #[error("invalid event payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<Box<[u8]>>,
}

impl SignatureHeader {
    /// Parse a raw header value.
    ///
    /// Unknown schemes (e.g. `v0`) and `v1` entries that are not valid hex
    /// are skipped; they can never match.
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in value.split(',') {
            let Some((key, val)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    let ts = val.parse().map_err(|_| SignatureError::InvalidFormat)?;
                    timestamp = Some(ts);
                }
                SIGNATURE_SCHEME => {
                    if let Ok(bytes) = hex::decode(val) {
                        signatures.push(bytes.into_boxed_slice());
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::InvalidFormat)?;
        if signatures.is_empty() {
            return Err(SignatureError::NoSignatures);
        }
        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

fn signing_key(secret: &[u8]) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, secret)
}

fn signed_payload(timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let prefix = format!("{timestamp}.");
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(payload);
    data
}

/// Compute a `Stripe-Signature` header value for `payload`.
///
/// Used to produce signed deliveries for local testing.
pub fn sign_payload(payload: &[u8], secret: &[u8], timestamp: i64) -> String {
    let tag = hmac::sign(&signing_key(secret), &signed_payload(timestamp, payload));
    format!("t={timestamp},{SIGNATURE_SCHEME}={}", hex::encode(tag.as_ref()))
}

/// Verify a raw webhook body against its `Stripe-Signature` header.
///
/// Comparison is constant time. A `tolerance_secs` of zero or less disables
/// the freshness check.
pub fn verify_payload(
    payload: &[u8],
    header_value: &str,
    secret: &[u8],
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let header = SignatureHeader::parse(header_value)?;
    let key = signing_key(secret);
    let data = signed_payload(header.timestamp, payload);

    let matched = header
        .signatures
        .iter()
        .any(|sig| hmac::verify(&key, &data, sig).is_ok());
    if !matched {
        return Err(SignatureError::SignatureMismatch);
    }

    check_timestamp(header.timestamp, tolerance_secs)
}

/// Check that a signature timestamp is within `tolerance_secs` of now.
pub fn check_timestamp(timestamp: i64, tolerance_secs: i64) -> Result<(), SignatureError> {
    if tolerance_secs <= 0 {
        return Ok(());
    }
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if now - timestamp > tolerance_secs {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

/// Verify a webhook delivery and decode it as an [`Event`].
pub fn construct_event(
    payload: &[u8],
    header_value: &str,
    secret: &[u8],
    tolerance_secs: i64,
) -> Result<Event, SignatureError> {
    verify_payload(payload, header_value, secret, tolerance_secs)?;
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test123secret456";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;

    fn now() -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn test_parse_header() {
        let header = SignatureHeader::parse("t=1609459200,v1=abcd,v0=ffff,v1=0102").unwrap();
        assert_eq!(header.timestamp, 1609459200);
        assert_eq!(header.signatures.len(), 2);
        assert_eq!(header.signatures[1].as_ref(), &[1u8, 2u8]);
    }

    #[test]
    fn test_parse_header_invalid() {
        assert!(matches!(
            SignatureHeader::parse("garbage"),
            Err(SignatureError::InvalidFormat)
        ));
        assert!(matches!(
            SignatureHeader::parse("v1=abcd"),
            Err(SignatureError::InvalidFormat)
        ));
        assert!(matches!(
            SignatureHeader::parse("t=1609459200"),
            Err(SignatureError::NoSignatures)
        ));
        assert!(matches!(
            SignatureHeader::parse("t=soon,v1=abcd"),
            Err(SignatureError::InvalidFormat)
        ));
    }

    #[test]
    fn test_valid_signature() {
        let header = sign_payload(PAYLOAD, SECRET, now());
        verify_payload(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE_SECS).unwrap();
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let header = sign_payload(PAYLOAD, b"wrong_secret", now());
        assert!(matches!(
            verify_payload(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_modified_payload_rejected() {
        let header = sign_payload(PAYLOAD, SECRET, now());
        let tampered = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_2"}}}"#;
        assert!(matches!(
            verify_payload(tampered, &header, SECRET, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let header = sign_payload(PAYLOAD, SECRET, now() - 600);
        assert!(matches!(
            verify_payload(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Expired)
        ));
        // Disabled tolerance accepts it.
        verify_payload(PAYLOAD, &header, SECRET, 0).unwrap();
    }

    #[test]
    fn test_any_matching_signature_accepted() {
        let ts = now();
        let good = sign_payload(PAYLOAD, SECRET, ts);
        let good_sig = good.split_once(",v1=").unwrap().1;
        let header = format!("t={ts},v1={},v1={good_sig}", "00".repeat(32));
        verify_payload(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE_SECS).unwrap();
    }

    #[test]
    fn test_construct_event() {
        let header = sign_payload(PAYLOAD, SECRET, now());
        let event = construct_event(PAYLOAD, &header, SECRET, DEFAULT_TOLERANCE_SECS).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.checkout_session().unwrap().id, "cs_1");

        let not_json = b"not json";
        let header = sign_payload(not_json, SECRET, now());
        assert!(matches!(
            construct_event(not_json, &header, SECRET, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Json(_))
        ));
    }
}
